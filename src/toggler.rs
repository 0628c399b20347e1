use super::*;
use std::str::FromStr;
use std::sync::OnceLock;

use fancy_regex::Regex;

pub const DEFAULT_MARKER_CLASS: &str = "click-me";

const CLASS_NAME_PATTERN: &str = r"^-?[_a-zA-Z][_a-zA-Z0-9-]*$";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionMode {
    /// Clicking an element clears the selected class from its siblings first.
    #[default]
    Exclusive,
    /// Clicking an element flips its own selected class only.
    Toggle,
}

impl SelectionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exclusive => "exclusive",
            Self::Toggle => "toggle",
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "exclusive" => Ok(Self::Exclusive),
            "toggle" => Ok(Self::Toggle),
            other => Err(Error::InvalidConfig(format!("unknown selection mode: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionConfig {
    marker_class: String,
    selected_class: String,
    mode: SelectionMode,
}

impl SelectionConfig {
    pub fn new(selected_class: &str, mode: SelectionMode) -> Result<Self> {
        validate_class_name("selected class", selected_class)?;
        Ok(Self {
            marker_class: DEFAULT_MARKER_CLASS.to_string(),
            selected_class: selected_class.to_string(),
            mode,
        })
    }

    pub fn with_marker_class(mut self, marker_class: &str) -> Result<Self> {
        validate_class_name("marker class", marker_class)?;
        self.marker_class = marker_class.to_string();
        Ok(self)
    }

    pub fn marker_class(&self) -> &str {
        &self.marker_class
    }

    pub fn selected_class(&self) -> &str {
        &self.selected_class
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }
}

fn class_name_pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<std::result::Result<Regex, String>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(CLASS_NAME_PATTERN).map_err(|err| err.to_string()))
        .as_ref()
        .map_err(|err| Error::InvalidConfig(format!("class name pattern: {err}")))
}

fn validate_class_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidConfig(format!("{kind} must not be empty")));
    }
    let valid = class_name_pattern()?
        .is_match(name)
        .map_err(|err| Error::InvalidConfig(format!("{kind} {name:?}: {err}")))?;
    if !valid {
        return Err(Error::InvalidConfig(format!(
            "{kind} {name:?} is not a valid CSS identifier"
        )));
    }
    Ok(())
}

/// Keeps the selected class on a group of sibling elements in step with
/// clicks, according to the configured [`SelectionMode`].
///
/// One toggler owns one listener callback. Attaching the same toggler to an
/// element more than once registers it only once.
#[derive(Debug, Clone)]
pub struct SelectionToggler {
    config: SelectionConfig,
    handler: EventHandler,
}

impl SelectionToggler {
    pub fn new(config: SelectionConfig) -> Self {
        let captured = config.clone();
        let handler = EventHandler::new(
            format!("selection:{}", config.mode),
            move |harness, event| handle_click(harness, event, &captured),
        );
        Self { config, handler }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn handler(&self) -> &EventHandler {
        &self.handler
    }

    pub fn attach(&self, harness: &mut Harness, elements: &[NodeId]) {
        for element in elements {
            harness.add_event_listener(*element, "click", false, self.handler.clone());
        }
    }

    /// Attaches to every connected element carrying the marker class, in
    /// document order, and returns how many elements were found.
    pub fn attach_to_marker(&self, harness: &mut Harness) -> usize {
        let marker = self.config.marker_class.as_str();
        let elements = harness
            .dom
            .elements()
            .into_iter()
            .filter(|node| harness.has_class(*node, marker))
            .collect::<Vec<_>>();
        self.attach(harness, &elements);
        elements.len()
    }

    pub fn detach(&self, harness: &mut Harness, elements: &[NodeId]) -> usize {
        elements
            .iter()
            .filter(|element| {
                harness.remove_event_listener(**element, "click", false, &self.handler)
            })
            .count()
    }

    pub fn selected(&self, harness: &Harness, parent: NodeId) -> Vec<NodeId> {
        harness
            .child_elements(parent)
            .into_iter()
            .filter(|child| harness.has_class(*child, &self.config.selected_class))
            .collect()
    }
}

fn handle_click(
    harness: &mut Harness,
    event: &mut EventState,
    config: &SelectionConfig,
) -> Result<()> {
    let target = event.current_target();
    if harness.dom.element(target).is_none() {
        return Ok(());
    }
    if !harness.dom.is_connected(target) {
        if harness.trace.is_enabled() {
            let line = format!(
                "[selection] skip target={} reason=detached",
                harness.dom.node_label(target)
            );
            harness.trace.line(line);
        }
        return Ok(());
    }

    let selected_class = config.selected_class.as_str();
    let (selected, cleared) = match config.mode {
        SelectionMode::Exclusive => {
            let siblings = harness
                .dom
                .parent(target)
                .map(|parent| harness.dom.child_elements(parent))
                .unwrap_or_default();
            let mut cleared = 0usize;
            for sibling in siblings {
                if sibling == target {
                    continue;
                }
                if harness.dom.class_contains(sibling, selected_class)? {
                    harness.dom.class_remove(sibling, selected_class)?;
                    cleared += 1;
                }
            }
            harness.dom.class_add(target, selected_class)?;
            (true, cleared)
        }
        SelectionMode::Toggle => (harness.dom.class_toggle(target, selected_class)?, 0),
    };

    if harness.trace.is_enabled() {
        let line = format!(
            "[selection] {} target={} selected={} cleared={}",
            config.mode,
            harness.dom.node_label(target),
            selected,
            cleared
        );
        harness.trace.line(line);
    }
    Ok(())
}
