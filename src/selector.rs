use super::*;
use crate::dom::Element;

/// One compound selector such as `li.click-me#a`. An absent tag matches any
/// element, which is also what `*` means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn parse(text: &str) -> Option<Self> {
        let mut compound = Self::default();
        let mut rest = match text.strip_prefix('*') {
            Some(after) => after,
            None => {
                let (tag, after) = split_ident(text);
                if !tag.is_empty() {
                    compound.tag = Some(tag.to_ascii_lowercase());
                }
                after
            }
        };

        while !rest.is_empty() {
            if let Some(body) = rest.strip_prefix('#') {
                let (id, after) = split_ident(body);
                if id.is_empty() || compound.id.replace(id.to_string()).is_some() {
                    return None;
                }
                rest = after;
            } else if let Some(body) = rest.strip_prefix('.') {
                let (class_name, after) = split_ident(body);
                if class_name.is_empty() {
                    return None;
                }
                compound.classes.push(class_name.to_string());
                rest = after;
            } else {
                return None;
            }
        }
        Some(compound)
    }

    fn matches(&self, element: &Element) -> bool {
        self.tag
            .as_deref()
            .is_none_or(|tag| element.tag_name.eq_ignore_ascii_case(tag))
            && self.id.as_deref().is_none_or(|id| element.id() == Some(id))
            && self.classes.iter().all(|class_name| element.has_class(class_name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Descendant,
    Child,
}

/// Compounds left to right; `relations[i]` joins `compounds[i]` to
/// `compounds[i + 1]`.
#[derive(Debug, Clone)]
struct Chain {
    compounds: Vec<Compound>,
    relations: Vec<Relation>,
}

impl Chain {
    fn parse(group: &str) -> Option<Self> {
        let mut compounds = Vec::new();
        let mut relations = Vec::new();
        let mut pending = None;
        let mut rest = group.trim_start();

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix('>') {
                if compounds.is_empty() || pending.is_some() {
                    return None;
                }
                pending = Some(Relation::Child);
                rest = after.trim_start();
                continue;
            }

            let end = rest
                .find(|ch: char| ch.is_ascii_whitespace() || ch == '>')
                .unwrap_or(rest.len());
            let compound = Compound::parse(&rest[..end])?;
            if !compounds.is_empty() {
                relations.push(pending.take().unwrap_or(Relation::Descendant));
            }
            compounds.push(compound);
            rest = rest[end..].trim_start();
        }

        if compounds.is_empty() || pending.is_some() {
            return None;
        }
        Some(Self {
            compounds,
            relations,
        })
    }

    fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        match self.compounds.len().checked_sub(1) {
            Some(last) => self.matches_from(dom, node, last),
            None => false,
        }
    }

    // recursion depth is bounded by the number of compounds, not the tree
    fn matches_from(&self, dom: &Dom, node: NodeId, index: usize) -> bool {
        let Some(element) = dom.element(node) else {
            return false;
        };
        if !self.compounds[index].matches(element) {
            return false;
        }
        let Some(left) = index.checked_sub(1) else {
            return true;
        };
        match self.relations[left] {
            Relation::Child => dom
                .parent(node)
                .is_some_and(|parent| self.matches_from(dom, parent, left)),
            Relation::Descendant => dom
                .ancestors(node)
                .any(|ancestor| self.matches_from(dom, ancestor, left)),
        }
    }
}

/// A comma-separated selector list.
#[derive(Debug, Clone)]
pub(crate) struct Selector {
    groups: Vec<Chain>,
}

impl Selector {
    pub(crate) fn parse(source: &str) -> Result<Self> {
        source
            .split(',')
            .map(Chain::parse)
            .collect::<Option<Vec<_>>>()
            .map(|groups| Self { groups })
            .ok_or_else(|| Error::UnsupportedSelector(source.to_string()))
    }

    pub(crate) fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        self.groups.iter().any(|chain| chain.matches(dom, node))
    }
}

fn split_ident(text: &str) -> (&str, &str) {
    let end = text
        .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'))
        .unwrap_or(text.len());
    text.split_at(end)
}

impl Dom {
    pub(crate) fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(self.root)
            .find(|node| selector.matches(self, *node)))
    }

    pub(crate) fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(self.root)
            .filter(|node| selector.matches(self, *node))
            .collect())
    }

    pub(crate) fn matches_selector(&self, node: NodeId, selector: &str) -> Result<bool> {
        Ok(Selector::parse(selector)?.matches(self, node))
    }
}
