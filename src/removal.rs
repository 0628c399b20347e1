use super::*;

/// Makes each element remove itself from its parent when clicked.
///
/// Returns the shared handler so callers can detach it again.
pub fn attach_remover(harness: &mut Harness, elements: &[NodeId]) -> EventHandler {
    let handler = EventHandler::new("remove-on-click", |harness, event| {
        let target = event.current_target();
        if harness.dom.element(target).is_none() || harness.dom.parent(target).is_none() {
            return Ok(());
        }
        let label = harness.dom.node_label(target);
        harness.dom.remove_node(target)?;
        harness.trace.line(format!("[removal] removed target={label}"));
        Ok(())
    });
    for element in elements {
        harness.add_event_listener(*element, "click", false, handler.clone());
    }
    handler
}
