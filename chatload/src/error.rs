use thiserror::Error;

/// Failure of a single call against the chat service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service responded with status {0}")]
    Status(u16),

    #[error("Service rejected the request: {0}")]
    Rejected(String),
}

/// Reason a user workflow stopped before sending all of its messages.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Authentication failed for {user}: {source}")]
    Authentication {
        user: String,
        #[source]
        source: ServiceError,
    },

    #[error("Message {index} from {user} failed: {source}")]
    MessageSend {
        user: String,
        index: usize,
        #[source]
        source: ServiceError,
    },
}

impl WorkflowError {
    pub fn user(&self) -> &str {
        match self {
            WorkflowError::Authentication { user, .. } | WorkflowError::MessageSend { user, .. } => {
                user
            }
        }
    }
}
