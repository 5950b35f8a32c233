#![doc = include_str!("../README.md")]

pub mod cli;
pub mod client;
pub mod error;
pub mod orchestrator;
pub mod transaction;
pub mod workflow;


pub use chatload_core as core;

pub mod prelude {
    pub use crate::client::{ChatService, HttpChatService, SessionToken};
    pub use crate::error::{ServiceError, WorkflowError};
    pub use crate::orchestrator::{run, RunSummary};
    pub use crate::workflow::{UserWorkflow, WorkflowOutcome, WorkflowState};
    pub use chatload_core::{Credential, DelayRange, LatencyRecorder, Report, TestConfig};
}
