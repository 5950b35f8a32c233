//! Runs one workflow per configured user, in parallel, and waits for all of them.
use crate::client::ChatService;
use crate::workflow::{UserWorkflow, WorkflowOutcome, WorkflowState};
use chatload_core::{LatencyRecorder, TestConfig};
use std::sync::Arc;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, warn, Instrument};

/// Terminal state of every workflow of a run, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub outcomes: Vec<WorkflowOutcome>,
}

impl RunSummary {
    pub fn completed(&self) -> usize {
        self.count(WorkflowState::Done)
    }

    pub fn failed(&self) -> usize {
        self.count(WorkflowState::Failed)
    }

    pub fn total_messages(&self) -> usize {
        self.outcomes.iter().map(|o| o.messages_sent).sum()
    }

    fn count(&self, state: WorkflowState) -> usize {
        self.outcomes.iter().filter(|o| o.state == state).count()
    }
}

/// Launches a task per user and returns once every one of them has stopped.
///
/// A failing (or panicking) workflow only ends itself: its error is logged,
/// its siblings keep running, and the samples it recorded so far stay in
/// `recorder`. Nothing is retried or cancelled.
#[instrument(name = "orchestrator", skip_all, fields(users = config.users.len()))]
pub async fn run<S>(
    config: &TestConfig,
    service: Arc<S>,
    recorder: &LatencyRecorder,
) -> RunSummary
where
    S: ChatService + Send + Sync + 'static,
{
    info!(
        "Starting {} users, {} messages each, delay {}",
        config.users.len(),
        config.messages_per_user,
        config.delay
    );

    let tasks: Vec<_> = config
        .users
        .iter()
        .map(|credential| {
            let mut workflow =
                UserWorkflow::new(service.clone(), recorder.clone(), credential.clone(), config);
            let handle = tokio::spawn(
                async move {
                    if let Err(error) = workflow.run().await {
                        error!("{error}");
                    }
                    workflow.outcome()
                }
                .in_current_span(),
            );
            (credential.username.clone(), handle)
        })
        .collect();

    // NOTE: Join barrier. Every task is awaited regardless of how its siblings ended.
    let mut outcomes = Vec::with_capacity(tasks.len());
    for (user, handle) in tasks {
        match handle.await {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => {
                error!("Workflow for {user} aborted: {err}");
                outcomes.push(WorkflowOutcome {
                    user,
                    state: WorkflowState::Failed,
                    messages_sent: 0,
                });
            }
        }
    }

    let summary = RunSummary { outcomes };
    info!(
        "All users finished: {} completed, {} failed, {} messages sent",
        summary.completed(),
        summary.failed(),
        summary.total_messages()
    );
    summary
}
