use super::*;

const DISPATCH_STACK_SIZE: usize = 32 * 1024 * 1024;
const DOCUMENT_READY_EVENT: &str = "DOMContentLoaded";
const DISABLEABLE_TAGS: &[&str] = &[
    "button", "fieldset", "input", "optgroup", "option", "select", "textarea",
];

/// An owned document session: the parsed tree, its listeners, and the trace
/// and console buffers.
#[derive(Debug)]
pub struct Harness {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    pub(crate) trace: TraceState,
    pub(crate) console: ConsoleState,
    document_ready_fired: bool,
}

impl Harness {
    pub fn from_html(html: &str) -> Result<Self> {
        let dom = parse_html(html)?;
        Ok(Self {
            dom,
            listeners: ListenerStore::default(),
            trace: TraceState::default(),
            console: ConsoleState::default(),
            document_ready_fired: false,
        })
    }

    pub fn document(&self) -> NodeId {
        self.dom.root
    }

    pub fn query_one(&self, selector: &str) -> Result<NodeId> {
        self.select_one(selector)
    }

    pub fn query_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.dom.query_selector_all(selector)
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.dom.by_id(id)
    }

    pub fn matches(&self, node: NodeId, selector: &str) -> Result<bool> {
        self.dom.matches_selector(node, selector)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.dom.parent(node)
    }

    pub fn child_elements(&self, node: NodeId) -> Vec<NodeId> {
        self.dom.child_elements(node)
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.dom.is_connected(node)
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.dom.tag_name(node)
    }

    pub fn text_content(&self, node: NodeId) -> String {
        if !self.dom.is_valid_node(node) {
            return String::new();
        }
        self.dom.text_content(node)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.dom.attr(node, &name.to_ascii_lowercase())
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        self.dom.set_attr(node, name, value)
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<()> {
        self.dom.remove_attr(node, name)
    }

    pub fn class_list(&self, node: NodeId) -> Vec<String> {
        self.dom.class_list(node)
    }

    pub fn has_class(&self, node: NodeId, class_name: &str) -> bool {
        self.dom.class_contains(node, class_name).unwrap_or(false)
    }

    pub fn add_class(&mut self, node: NodeId, class_name: &str) -> Result<()> {
        self.dom.class_add(node, class_name)
    }

    pub fn remove_class(&mut self, node: NodeId, class_name: &str) -> Result<()> {
        self.dom.class_remove(node, class_name)
    }

    pub fn toggle_class(&mut self, node: NodeId, class_name: &str) -> Result<bool> {
        self.dom.class_toggle(node, class_name)
    }

    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.dom.detached_element(tag_name.to_ascii_lowercase())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.dom.append_child(parent, child)
    }

    pub fn remove(&mut self, selector: &str) -> Result<NodeId> {
        let target = self.select_one(selector)?;
        self.dom.remove_node(target)?;
        Ok(target)
    }

    pub fn remove_node(&mut self, node: NodeId) -> Result<()> {
        if !self.dom.is_valid_node(node) {
            return Err(Error::DomOperation(format!("unknown node: {}", node.0)));
        }
        self.dom.remove_node(node)
    }

    pub fn add_event_listener(
        &mut self,
        node: NodeId,
        event: &str,
        capture: bool,
        handler: EventHandler,
    ) -> bool {
        self.listeners.add(node, event, capture, handler)
    }

    pub fn remove_event_listener(
        &mut self,
        node: NodeId,
        event: &str,
        capture: bool,
        handler: &EventHandler,
    ) -> bool {
        self.listeners.remove(node, event, capture, handler)
    }

    pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
        self.listeners.count(node, event)
    }

    pub fn total_listener_count(&self) -> usize {
        self.listeners.total()
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.click_node(target)
    }

    pub fn click_node(&mut self, target: NodeId) -> Result<()> {
        if !self.dom.is_valid_node(target) {
            return Err(Error::DomOperation(format!("unknown node: {}", target.0)));
        }
        if self.is_disabled_control(target) {
            return Ok(());
        }
        stacker::grow(DISPATCH_STACK_SIZE, || {
            self.dispatch_event(target, "click")?;
            Ok(())
        })
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_node(target, event)?;
        Ok(())
    }

    pub fn dispatch_node(&mut self, target: NodeId, event: &str) -> Result<EventState> {
        if !self.dom.is_valid_node(target) {
            return Err(Error::DomOperation(format!("unknown node: {}", target.0)));
        }
        stacker::grow(DISPATCH_STACK_SIZE, || self.dispatch_event(target, event))
    }

    pub fn on_document_ready(&mut self, handler: EventHandler) -> bool {
        let root = self.dom.root;
        self.listeners.add(root, DOCUMENT_READY_EVENT, false, handler)
    }

    /// Fires `DOMContentLoaded` on the document. Returns `false` without
    /// dispatching when the document was already signalled.
    pub fn signal_document_ready(&mut self) -> Result<bool> {
        if self.document_ready_fired {
            return Ok(false);
        }
        self.document_ready_fired = true;
        let root = self.dom.root;
        self.dispatch_node(root, DOCUMENT_READY_EVENT)?;
        Ok(true)
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_class(&self, selector: &str, class_name: &str) -> Result<()> {
        self.assert_class_state(selector, class_name, true)
    }

    pub fn assert_no_class(&self, selector: &str, class_name: &str) -> Result<()> {
        self.assert_class_state(selector, class_name, false)
    }

    fn assert_class_state(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.class_contains(target, class_name)?;
        if actual != expected {
            let describe = |present: bool| {
                if present {
                    format!("class {class_name}")
                } else {
                    format!("no class {class_name}")
                }
            };
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: describe(expected),
                actual: describe(actual),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    // only form controls honor `disabled`; on other elements it is inert
    fn is_disabled_control(&self, node: NodeId) -> bool {
        self.dom.tag_name(node).is_some_and(|tag| DISABLEABLE_TAGS.contains(&tag))
            && self.dom.has_attr(node, "disabled")
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }
}
