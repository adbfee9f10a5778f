// src/completion.rs
//
// What the test author's callback receives, and the once-only guard that
// decides which of the response path or the error path gets to deliver it.

use eyre::Report;
use log::{debug, warn};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

use crate::cfg::CallbackConvention;
use crate::response::ResponseMethod;

/// Boxed completion callback.
pub type Callback = Box<dyn FnOnce(Completion)>;

/// How a dispatch settled.
#[derive(Debug)]
pub enum Outcome {
    /// The handler called a captured response method.
    Responded {
        method: ResponseMethod,
        tag: &'static str,
        args: Vec<Value>,
    },
    /// The handler forwarded or returned an error.
    Failed { error: Report },
}

/// Delivered to the completion callback exactly once per settled dispatch.
#[derive(Debug)]
pub struct Completion {
    convention: CallbackConvention,
    outcome: Outcome,
}

impl Completion {
    pub fn responded(
        convention: CallbackConvention,
        method: ResponseMethod,
        tag: &'static str,
        args: Vec<Value>,
    ) -> Self {
        Self {
            convention,
            outcome: Outcome::Responded { method, tag, args },
        }
    }

    pub fn failed(convention: CallbackConvention, error: Report) -> Self {
        Self {
            convention,
            outcome: Outcome::Failed { error },
        }
    }

    pub fn convention(&self) -> CallbackConvention {
        self.convention
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn into_outcome(self) -> Outcome {
        self.outcome
    }

    /// The response method tag, or the convention's error tag on failure.
    pub fn tag(&self) -> &str {
        match &self.outcome {
            Outcome::Responded { tag, .. } => *tag,
            Outcome::Failed { .. } => self.convention.error_tag(),
        }
    }

    /// Arguments the handler passed to the captured response method.
    pub fn args(&self) -> &[Value] {
        match &self.outcome {
            Outcome::Responded { args, .. } => args,
            Outcome::Failed { .. } => &[],
        }
    }

    /// First argument, handy for the common single-payload methods.
    pub fn payload(&self) -> Option<&Value> {
        self.args().first()
    }

    pub fn method(&self) -> Option<ResponseMethod> {
        match &self.outcome {
            Outcome::Responded { method, .. } => Some(*method),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&Report> {
        match &self.outcome {
            Outcome::Responded { .. } => None,
            Outcome::Failed { error } => Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error().is_some()
    }

    /// `false` when the handler responded, the error message otherwise.
    pub fn error_indicator(&self) -> Value {
        match &self.outcome {
            Outcome::Responded { .. } => Value::Bool(false),
            Outcome::Failed { error } => Value::String(error.to_string()),
        }
    }

    /// The flat argument list a callback would receive under the convention.
    pub fn arguments(&self) -> Vec<Value> {
        let tag = Value::String(self.tag().to_string());
        match (&self.convention, &self.outcome) {
            (CallbackConvention::ErrorFirst, Outcome::Responded { args, .. }) => {
                let mut out = vec![self.error_indicator(), tag];
                out.extend(args.iter().cloned());
                out
            }
            (CallbackConvention::ErrorFirst, Outcome::Failed { .. }) => {
                vec![self.error_indicator(), tag]
            }
            (CallbackConvention::TagFirst, Outcome::Responded { args, .. }) => {
                let mut out = vec![tag];
                out.extend(args.iter().cloned());
                out
            }
            (CallbackConvention::TagFirst, Outcome::Failed { .. }) => {
                vec![tag, self.error_indicator()]
            }
        }
    }
}

struct SettlementState {
    callback: Option<Callback>,
    settled: bool,
}

/// Hands the completion callback to whichever path settles first.
#[derive(Clone)]
pub struct Settlement {
    convention: CallbackConvention,
    state: Rc<RefCell<SettlementState>>,
}

impl Settlement {
    pub fn new(convention: CallbackConvention, callback: Callback) -> Self {
        Self {
            convention,
            state: Rc::new(RefCell::new(SettlementState {
                callback: Some(callback),
                settled: false,
            })),
        }
    }

    /// A settlement whose completions go nowhere.
    pub fn detached(convention: CallbackConvention) -> Self {
        Self::new(convention, Box::new(|_| {}))
    }

    pub fn convention(&self) -> CallbackConvention {
        self.convention
    }

    pub fn is_settled(&self) -> bool {
        self.state.borrow().settled
    }

    /// Deliver `completion` if nothing settled yet. Returns whether it was delivered.
    pub fn settle(&self, completion: Completion) -> bool {
        // Release the borrow before running the callback; it may inspect us.
        let callback = {
            let mut state = self.state.borrow_mut();
            if state.settled {
                None
            } else {
                state.settled = true;
                state.callback.take()
            }
        };

        match callback {
            Some(callback) => {
                debug!("Settling dispatch with '{}'", completion.tag());
                callback(completion);
                true
            }
            None => {
                warn!(
                    "Dispatch already settled; dropping later '{}' completion",
                    completion.tag()
                );
                false
            }
        }
    }

    pub fn respond(&self, method: ResponseMethod, tag: &'static str, args: Vec<Value>) -> bool {
        self.settle(Completion::responded(self.convention, method, tag, args))
    }

    pub fn fail(&self, error: Report) -> bool {
        self.settle(Completion::failed(self.convention, error))
    }
}

/// Captures a completion so a test can inspect it after `end` returns.
#[derive(Clone, Default)]
pub struct CompletionSlot {
    inner: Rc<RefCell<Vec<Completion>>>,
}

impl CompletionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback that stores its completion in this slot.
    pub fn callback(&self) -> impl FnOnce(Completion) + 'static {
        let inner = Rc::clone(&self.inner);
        move |completion| inner.borrow_mut().push(completion)
    }

    /// Number of completions received.
    pub fn count(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Remove and return the first completion received.
    pub fn take(&self) -> Option<Completion> {
        let mut inner = self.inner.borrow_mut();
        if inner.is_empty() {
            None
        } else {
            Some(inner.remove(0))
        }
    }

    /// Like `take`, but panics with a readable message when nothing arrived.
    pub fn expect_completion(&self) -> Completion {
        self.take()
            .unwrap_or_else(|| panic!("Expected a completion but the handler never settled"))
    }
}
