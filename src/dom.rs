use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
}

impl Element {
    pub(crate) fn classes(&self) -> impl Iterator<Item = &str> {
        self.attrs
            .get("class")
            .map(String::as_str)
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    pub(crate) fn has_class(&self, class_name: &str) -> bool {
        self.classes().any(|token| token == class_name)
    }

    pub(crate) fn id(&self) -> Option<&str> {
        self.attrs
            .get("id")
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    fn unique_classes(&self) -> Vec<String> {
        let mut tokens: Vec<String> = Vec::new();
        for token in self.classes() {
            if !tokens.iter().any(|seen| seen == token) {
                tokens.push(token.to_string());
            }
        }
        tokens
    }

    // an empty token list drops the attribute instead of leaving class=""
    fn store_classes(&mut self, tokens: &[String]) {
        if tokens.is_empty() {
            self.attrs.remove("class");
        } else {
            self.attrs.insert("class".to_string(), tokens.join(" "));
        }
    }
}

/// Pre-order walk over a subtree, driven by an explicit stack so document
/// depth never turns into call depth.
pub(crate) struct Descendants<'a> {
    dom: &'a Dom,
    pending: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.pending.pop()?;
        if let Some(entry) = self.dom.nodes.get(node.0) {
            self.pending.extend(entry.children.iter().rev().copied());
        }
        Some(node)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    nodes: Vec<Node>,
    pub(crate) root: NodeId,
}

impl Dom {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
        }
    }

    fn push_node(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        if let Some(entry) = parent.and_then(|parent| self.nodes.get_mut(parent.0)) {
            entry.children.push(id);
        }
        id
    }

    pub(crate) fn append_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        self.push_node(Some(parent), NodeKind::Element(Element { tag_name, attrs }))
    }

    pub(crate) fn append_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.push_node(Some(parent), NodeKind::Text(text))
    }

    pub(crate) fn detached_element(&mut self, tag_name: String) -> NodeId {
        self.push_node(
            None,
            NodeKind::Element(Element {
                tag_name,
                ..Element::default()
            }),
        )
    }

    pub(crate) fn is_valid_node(&self, node_id: NodeId) -> bool {
        node_id.0 < self.nodes.len()
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes.get(node_id.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node_id.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn require_element(&mut self, node_id: NodeId, operation: &str) -> Result<&mut Element> {
        self.element_mut(node_id)
            .ok_or_else(|| Error::DomOperation(format!("{operation} target is not an element")))
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|element| element.tag_name.as_str())
    }

    pub(crate) fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.nodes.get(node_id.0)?.parent
    }

    pub(crate) fn ancestors(&self, node_id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node_id), |node| self.parent(*node))
    }

    pub(crate) fn is_connected(&self, node_id: NodeId) -> bool {
        node_id == self.root || self.ancestors(node_id).any(|node| node == self.root)
    }

    pub(crate) fn descendants(&self, node_id: NodeId) -> Descendants<'_> {
        let pending = if self.is_valid_node(node_id) {
            vec![node_id]
        } else {
            Vec::new()
        };
        Descendants { dom: self, pending }
    }

    /// Every connected element, in document order.
    pub(crate) fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .filter(|node| self.element(*node).is_some())
            .collect()
    }

    pub(crate) fn child_elements(&self, node_id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.get(node_id.0) else {
            return Vec::new();
        };
        node.children
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
            .collect()
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .find(|node| self.element(*node).and_then(Element::id) == Some(id))
    }

    pub(crate) fn attr(&self, node_id: NodeId, name: &str) -> Option<String> {
        self.element(node_id)?.attrs.get(name).cloned()
    }

    pub(crate) fn has_attr(&self, node_id: NodeId, name: &str) -> bool {
        self.element(node_id)
            .is_some_and(|element| element.attrs.contains_key(name))
    }

    pub(crate) fn set_attr(&mut self, node_id: NodeId, name: &str, value: &str) -> Result<()> {
        self.require_element(node_id, "setAttribute")?
            .attrs
            .insert(name.to_ascii_lowercase(), value.to_string());
        Ok(())
    }

    pub(crate) fn remove_attr(&mut self, node_id: NodeId, name: &str) -> Result<()> {
        self.require_element(node_id, "removeAttribute")?
            .attrs
            .remove(&name.to_ascii_lowercase());
        Ok(())
    }

    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let accepts_children = matches!(
            self.nodes.get(parent.0).map(|node| &node.kind),
            Some(NodeKind::Document | NodeKind::Element(_))
        );
        if !accepts_children {
            return Err(Error::DomOperation(
                "appendChild target cannot have children".into(),
            ));
        }
        if !self.is_valid_node(child) || child == self.root {
            return Err(Error::DomOperation("invalid appendChild node".into()));
        }
        if child == parent || self.ancestors(parent).any(|node| node == child) {
            return Err(Error::DomOperation(
                "appendChild would create a cycle".into(),
            ));
        }

        self.unlink(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    pub(crate) fn remove_node(&mut self, node_id: NodeId) -> Result<()> {
        if node_id == self.root {
            return Err(Error::DomOperation("cannot remove document root".into()));
        }
        self.unlink(node_id);
        Ok(())
    }

    fn unlink(&mut self, node_id: NodeId) {
        let Some(parent) = self.parent(node_id) else {
            return;
        };
        self.nodes[parent.0].children.retain(|child| *child != node_id);
        self.nodes[node_id.0].parent = None;
    }

    pub(crate) fn class_contains(&self, node_id: NodeId, class_name: &str) -> Result<bool> {
        self.element(node_id)
            .map(|element| element.has_class(class_name))
            .ok_or_else(|| Error::DomOperation("classList target is not an element".into()))
    }

    pub(crate) fn class_add(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self.require_element(node_id, "classList")?;
        let mut tokens = element.unique_classes();
        if !tokens.iter().any(|token| token == class_name) {
            tokens.push(class_name.to_string());
        }
        element.store_classes(&tokens);
        Ok(())
    }

    pub(crate) fn class_remove(&mut self, node_id: NodeId, class_name: &str) -> Result<()> {
        let element = self.require_element(node_id, "classList")?;
        if element.has_class(class_name) {
            let mut tokens = element.unique_classes();
            tokens.retain(|token| token != class_name);
            element.store_classes(&tokens);
        }
        Ok(())
    }

    pub(crate) fn class_toggle(&mut self, node_id: NodeId, class_name: &str) -> Result<bool> {
        let present = self.class_contains(node_id, class_name)?;
        if present {
            self.class_remove(node_id, class_name)?;
        } else {
            self.class_add(node_id, class_name)?;
        }
        Ok(!present)
    }

    pub(crate) fn class_list(&self, node_id: NodeId) -> Vec<String> {
        self.element(node_id)
            .map(Element::unique_classes)
            .unwrap_or_default()
    }

    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        self.descendants(node_id)
            .filter_map(|node| match &self.nodes[node.0].kind {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Serializes a subtree with attributes in sorted order, so dumps compare
    /// stably across runs.
    pub(crate) fn dump_node(&self, node_id: NodeId) -> String {
        enum Visit {
            Open(NodeId),
            Close(NodeId),
        }

        let mut out = String::new();
        let mut pending = vec![Visit::Open(node_id)];
        while let Some(visit) = pending.pop() {
            match visit {
                Visit::Close(node) => {
                    if let Some(tag) = self.tag_name(node) {
                        out.push_str(&format!("</{tag}>"));
                    }
                }
                Visit::Open(node) => {
                    let Some(entry) = self.nodes.get(node.0) else {
                        continue;
                    };
                    match &entry.kind {
                        NodeKind::Text(text) => {
                            out.push_str(text);
                            continue;
                        }
                        NodeKind::Document => {}
                        NodeKind::Element(element) => {
                            out.push_str(&open_tag(element));
                            if crate::html::is_void_tag(&element.tag_name) {
                                continue;
                            }
                            pending.push(Visit::Close(node));
                        }
                    }
                    pending.extend(entry.children.iter().rev().map(|child| Visit::Open(*child)));
                }
            }
        }
        out
    }

    pub(crate) fn node_label(&self, node_id: NodeId) -> String {
        let Some(element) = self.element(node_id) else {
            return match self.nodes.get(node_id.0).map(|node| &node.kind) {
                Some(NodeKind::Document) => "#document".to_string(),
                _ => format!("node-{}", node_id.0),
            };
        };
        if let Some(id) = element.id() {
            return format!("{}#{id}", element.tag_name);
        }
        match element.classes().next() {
            Some(class_name) => format!("{}.{class_name}", element.tag_name),
            None => element.tag_name.clone(),
        }
    }
}

fn open_tag(element: &Element) -> String {
    let mut attrs = element.attrs.iter().collect::<Vec<_>>();
    attrs.sort();
    let mut out = format!("<{}", element.tag_name);
    for (name, value) in attrs {
        out.push_str(&format!(" {name}=\"{value}\""));
    }
    out.push('>');
    out
}
