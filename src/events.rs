use super::*;

type ListenerCallback = dyn Fn(&mut Harness, &mut EventState) -> Result<()>;

/// A native listener callback with a label used in trace output.
///
/// Clones share the same callback, and the listener store treats clones as the
/// same listener when deduplicating registrations.
#[derive(Clone)]
pub struct EventHandler {
    label: String,
    callback: Rc<ListenerCallback>,
}

impl EventHandler {
    pub fn new(
        label: impl Into<String>,
        callback: impl Fn(&mut Harness, &mut EventState) -> Result<()> + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            callback: Rc::new(callback),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn call(&self, harness: &mut Harness, event: &mut EventState) -> Result<()> {
        (self.callback)(harness, event)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.callback), Rc::as_ptr(&other.callback))
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    Capturing,
    AtTarget,
    Bubbling,
}

#[derive(Debug, Clone)]
pub struct EventState {
    event_type: String,
    target: NodeId,
    current_target: NodeId,
    phase: EventPhase,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
}

impl EventState {
    pub(crate) fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            phase: EventPhase::AtTarget,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn current_target(&self) -> NodeId {
        self.current_target
    }

    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Listener {
    capture: bool,
    handler: EventHandler,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Listener>>>,
}

impl ListenerStore {
    pub(crate) fn add(
        &mut self,
        node_id: NodeId,
        event: &str,
        capture: bool,
        handler: EventHandler,
    ) -> bool {
        let listeners = self
            .map
            .entry(node_id)
            .or_default()
            .entry(event.to_string())
            .or_default();

        // same callback for the same type/capture pair registers once
        if listeners
            .iter()
            .any(|existing| existing.capture == capture && existing.handler == handler)
        {
            return false;
        }

        listeners.push(Listener { capture, handler });
        true
    }

    pub(crate) fn remove(
        &mut self,
        node_id: NodeId,
        event: &str,
        capture: bool,
        handler: &EventHandler,
    ) -> bool {
        let Some(events) = self.map.get_mut(&node_id) else {
            return false;
        };
        let Some(listeners) = events.get_mut(event) else {
            return false;
        };

        let Some(pos) = listeners
            .iter()
            .position(|listener| listener.capture == capture && listener.handler == *handler)
        else {
            return false;
        };

        listeners.remove(pos);
        if listeners.is_empty() {
            events.remove(event);
        }
        if events.is_empty() {
            self.map.remove(&node_id);
        }
        true
    }

    pub(crate) fn get(&self, node_id: NodeId, event: &str, capture: bool) -> Vec<Listener> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|listener| listener.capture == capture)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, node_id: NodeId, event: &str) -> usize {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map_or(0, Vec::len)
    }

    pub(crate) fn total(&self) -> usize {
        self.map
            .values()
            .flat_map(HashMap::values)
            .map(Vec::len)
            .sum()
    }
}

impl Harness {
    pub(crate) fn dispatch_event(
        &mut self,
        target: NodeId,
        event_type: &str,
    ) -> Result<EventState> {
        let mut event = EventState::new(event_type, target);

        // outermost first
        let mut ancestors = self.dom.ancestors(target).collect::<Vec<_>>();
        ancestors.reverse();

        event.phase = EventPhase::Capturing;
        for node in &ancestors {
            event.current_target = *node;
            self.invoke_listeners(*node, &mut event, true)?;
            if event.propagation_stopped {
                self.trace_event_done(&event, "propagation_stopped");
                return Ok(event);
            }
        }

        // capture listeners on the target run before bubble listeners
        event.phase = EventPhase::AtTarget;
        event.current_target = target;
        for capture in [true, false] {
            self.invoke_listeners(target, &mut event, capture)?;
            if event.propagation_stopped {
                self.trace_event_done(&event, "propagation_stopped");
                return Ok(event);
            }
        }

        event.phase = EventPhase::Bubbling;
        for node in ancestors.iter().rev() {
            event.current_target = *node;
            self.invoke_listeners(*node, &mut event, false)?;
            if event.propagation_stopped {
                self.trace_event_done(&event, "propagation_stopped");
                return Ok(event);
            }
        }

        self.trace_event_done(&event, "completed");
        Ok(event)
    }

    fn invoke_listeners(
        &mut self,
        node_id: NodeId,
        event: &mut EventState,
        capture: bool,
    ) -> Result<()> {
        let listeners = self.listeners.get(node_id, &event.event_type, capture);
        for listener in listeners {
            if self.trace.wants_events() {
                let phase = if capture { "capture" } else { "bubble" };
                let line = format!(
                    "[event] {} target={} current={} phase={} listener={}",
                    event.event_type,
                    self.dom.node_label(event.target),
                    self.dom.node_label(event.current_target),
                    phase,
                    listener.handler.label()
                );
                self.trace.event_line(line);
            }
            listener.handler.call(self, event)?;
            if event.immediate_propagation_stopped {
                break;
            }
        }
        Ok(())
    }

    fn trace_event_done(&mut self, event: &EventState, outcome: &str) {
        if !self.trace.wants_events() {
            return;
        }
        let line = format!(
            "[event] done {} target={} outcome={} default_prevented={}",
            event.event_type,
            self.dom.node_label(event.target),
            outcome,
            event.default_prevented
        );
        self.trace.event_line(line);
    }
}
