//! A single simulated user: log in once, then post messages one after another.
use crate::client::ChatService;
use crate::error::WorkflowError;
use crate::transaction::measure;
use chatload_core::{
    Credential, DelayRange, LatencyRecorder, TestConfig, LOGIN_LABELS, POST_MESSAGE_LABELS,
};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Progress of a [`UserWorkflow`].
///
/// `Unauthenticated -> Authenticated -> Sending { .. } -> Done`, or `Failed` from any step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Unauthenticated,
    Authenticated,
    Sending { index: usize },
    Done,
    Failed,
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Done | WorkflowState::Failed)
    }
}

/// What a workflow achieved once it stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOutcome {
    pub user: String,
    pub state: WorkflowState,
    pub messages_sent: usize,
}

pub struct UserWorkflow<S> {
    service: Arc<S>,
    recorder: LatencyRecorder,
    credential: Credential,
    room_id: String,
    messages: usize,
    delay: DelayRange,
    state: WorkflowState,
    messages_sent: usize,
}

impl<S> UserWorkflow<S>
where
    S: ChatService + Send + Sync,
{
    pub fn new(
        service: Arc<S>,
        recorder: LatencyRecorder,
        credential: Credential,
        config: &TestConfig,
    ) -> Self {
        Self {
            service,
            recorder,
            credential,
            room_id: config.room_id.clone(),
            messages: config.messages_per_user,
            delay: config.delay,
            state: WorkflowState::Unauthenticated,
            messages_sent: 0,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn messages_sent(&self) -> usize {
        self.messages_sent
    }

    pub fn outcome(&self) -> WorkflowOutcome {
        WorkflowOutcome {
            user: self.credential.username.clone(),
            state: self.state,
            messages_sent: self.messages_sent,
        }
    }

    /// Runs the workflow to a terminal state. Every call to the service is
    /// timed into the recorder, failed calls included. The first failure
    /// stops the workflow; nothing is retried.
    #[instrument(name = "workflow", skip_all, fields(user = %self.credential.username))]
    pub async fn run(&mut self) -> Result<(), WorkflowError> {
        info!("Login -> {}", self.credential.username);
        let login = self.service.login(&self.credential);
        let token = match measure(&self.recorder, LOGIN_LABELS, login).await {
            Ok(token) => token,
            Err(source) => {
                self.state = WorkflowState::Failed;
                return Err(WorkflowError::Authentication {
                    user: self.credential.username.clone(),
                    source,
                });
            }
        };
        self.state = WorkflowState::Authenticated;

        for index in 0..self.messages {
            self.state = WorkflowState::Sending { index };
            let content = message_content(&self.credential.username, index);

            let post = self.service.post_message(&token, &self.room_id, &content);
            if let Err(source) = measure(&self.recorder, POST_MESSAGE_LABELS, post).await {
                self.state = WorkflowState::Failed;
                return Err(WorkflowError::MessageSend {
                    user: self.credential.username.clone(),
                    index,
                    source,
                });
            }
            self.messages_sent += 1;
            trace!("Sent message {index}");

            let pause = random_delay(&self.delay);
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        debug!("All {} messages sent", self.messages);
        self.state = WorkflowState::Done;
        Ok(())
    }
}

pub fn message_content(username: &str, index: usize) -> String {
    format!("{username} msg {index}")
}

/// Uniformly distributed within the (inclusive) range.
pub fn random_delay(range: &DelayRange) -> Duration {
    if range.min >= range.max {
        return range.min;
    }
    rand::thread_rng().gen_range(range.min..=range.max)
}
