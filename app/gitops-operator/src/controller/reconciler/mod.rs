use std::time::Duration;

pub mod console_link;
pub mod context;
pub mod error;

/// What the dispatcher should do with a request once it was reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    RequeueAfter(Duration),
}
