use std::collections::{HashMap, VecDeque};
use std::error::Error as StdError;
use std::fmt;
use std::rc::Rc;

mod dom;
mod events;
mod harness;
mod html;
mod removal;
mod selector;
mod toggler;
mod trace;

pub use dom::NodeId;
pub use events::{EventHandler, EventPhase, EventState};
pub use harness::Harness;
pub use removal::attach_remover;
pub use toggler::{SelectionConfig, SelectionMode, SelectionToggler, DEFAULT_MARKER_CLASS};
pub use trace::log_on_click;

use dom::Dom;
use events::ListenerStore;
use html::parse_html;
use trace::{ConsoleState, TraceState};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    InvalidConfig(String),
    DomOperation(String),
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::DomOperation(msg) => write!(f, "dom operation error: {msg}"),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = it.next() else {
            return out;
        };
        out.push(ch);
    }
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}
