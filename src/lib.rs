// src/lib.rs
//
// Library entry point for controller-harness.
// Simulates controller invocations in unit tests with mock request/response objects.

pub mod cfg;
pub mod completion;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod request;
pub mod response;

pub use cfg::{load_config, AuthMode, CallbackConvention, HarnessConfig};
pub use completion::{Completion, CompletionSlot, Outcome};
pub use controller::{test_controller, TestController};
pub use dispatch::{Controller, Dispatch, Next};
pub use error::HarnessError;
pub use request::{PendingRequest, Request};
pub use response::{MethodKind, Response, ResponseMethod};
