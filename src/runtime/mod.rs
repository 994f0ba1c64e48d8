//! Execution contexts and cross-context dispatch
//!
//! Setup starts on the control context, transport finalization and the
//! handshake run on a dedicated network context, and privacy state is read on
//! a presentation context. Every hop between contexts is an explicit message
//! with a completion signal, see [`ContextThread::dispatch`].

#[cfg(test)]
mod runtime_test;

pub mod context_thread;

pub use context_thread::{Completion, ContextThread};

use std::cell::Cell;
use std::fmt;

use crate::error::{Error, Result};

/// ExecutionContext names the logical thread an operation must run on.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ExecutionContext {
    /// Thread where negotiation and pipeline factory calls originate.
    #[default]
    Control,
    /// Thread where transport layers are finalized and handshakes execute.
    Network,
    /// Thread owning document and privacy state.
    Presentation,
}

const EXECUTION_CONTEXT_CONTROL_STR: &str = "control";
const EXECUTION_CONTEXT_NETWORK_STR: &str = "network";
const EXECUTION_CONTEXT_PRESENTATION_STR: &str = "presentation";

impl fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            ExecutionContext::Control => EXECUTION_CONTEXT_CONTROL_STR,
            ExecutionContext::Network => EXECUTION_CONTEXT_NETWORK_STR,
            ExecutionContext::Presentation => EXECUTION_CONTEXT_PRESENTATION_STR,
        };
        write!(f, "{s}")
    }
}

thread_local! {
    static CURRENT_CONTEXT: Cell<Option<ExecutionContext>> = const { Cell::new(None) };
}

impl ExecutionContext {
    /// current returns the context of the calling thread. Threads not owned by
    /// a [`ContextThread`] are treated as the control context.
    pub fn current() -> Self {
        CURRENT_CONTEXT
            .with(|c| c.get())
            .unwrap_or(ExecutionContext::Control)
    }

    pub(crate) fn enter(self) {
        CURRENT_CONTEXT.with(|c| c.set(Some(self)));
    }
}

/// ensure_context fails with ErrWrongExecutionContext unless the caller runs
/// on the expected context.
pub fn ensure_context(expected: ExecutionContext) -> Result<()> {
    let actual = ExecutionContext::current();
    if actual == expected {
        Ok(())
    } else {
        Err(Error::ErrWrongExecutionContext { expected, actual })
    }
}
