use super::*;

#[derive(Debug)]
pub(crate) struct TraceState {
    enabled: bool,
    events: bool,
    logs: VecDeque<String>,
    log_limit: usize,
    to_stderr: bool,
}

impl Default for TraceState {
    fn default() -> Self {
        Self {
            enabled: false,
            events: true,
            logs: VecDeque::new(),
            log_limit: 10_000,
            to_stderr: true,
        }
    }
}

impl TraceState {
    pub(crate) fn wants_events(&self) -> bool {
        self.enabled && self.events
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn event_line(&mut self, line: String) {
        if self.wants_events() {
            self.line(line);
        }
    }

    pub(crate) fn line(&mut self, line: String) {
        if !self.enabled {
            return;
        }
        if self.to_stderr {
            eprintln!("{line}");
        }
        while self.logs.len() >= self.log_limit {
            self.logs.pop_front();
        }
        self.logs.push_back(line);
    }
}

#[derive(Debug, Default)]
pub(crate) struct ConsoleState {
    pub(crate) lines: Vec<String>,
}

impl Harness {
    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace.enabled = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace.events = enabled;
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace.to_stderr = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidConfig(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace.log_limit = max_entries;
        while self.trace.logs.len() > max_entries {
            self.trace.logs.pop_front();
        }
        Ok(())
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace.logs.drain(..).collect()
    }

    pub fn console_log(&mut self, message: &str) {
        self.trace.line(format!("[console] {message}"));
        self.console.lines.push(message.to_string());
    }

    pub fn take_console_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.console.lines)
    }
}

/// Registers a click listener on `node` that writes `message` to the console.
pub fn log_on_click(harness: &mut Harness, node: NodeId, message: &str) -> EventHandler {
    let message = message.to_string();
    let handler = EventHandler::new("console-log", move |harness, _event| {
        harness.console_log(&message);
        Ok(())
    });
    harness.add_event_listener(node, "click", false, handler.clone());
    handler
}
