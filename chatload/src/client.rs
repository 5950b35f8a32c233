//! Access to the chat service under test.
use crate::error::ServiceError;
use chatload_core::Credential;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Opaque token handed out by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// The two operations a simulated user performs.
///
/// `ChatService` is the `Send` variant required to drive users on separate tasks.
#[trait_variant::make(ChatService: Send)]
pub trait LocalChatService {
    async fn login(&self, credential: &Credential) -> Result<SessionToken, ServiceError>;

    async fn post_message(
        &self,
        token: &SessionToken,
        room_id: &str,
        content: &str,
    ) -> Result<(), ServiceError>;
}

/// [`ChatService`] speaking JSON over HTTP.
#[derive(Clone, Debug)]
pub struct HttpChatService {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
struct MessageRequest<'a> {
    content: &'a str,
}

impl HttpChatService {
    /// `timeout` bounds every request; without it a hung service hangs the user.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates the account. An account that already exists counts as registered.
    pub async fn register(&self, credential: &Credential) -> Result<(), ServiceError> {
        let res = self
            .client
            .post(format!("{}/auth/register", self.base_url))
            .json(credential)
            .send()
            .await?;

        if res.status() == StatusCode::CONFLICT {
            debug!("User {} already registered", credential.username);
            return Ok(());
        }

        check_status(res)?;
        Ok(())
    }
}

impl ChatService for HttpChatService {
    async fn login(&self, credential: &Credential) -> Result<SessionToken, ServiceError> {
        let res = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(credential)
            .send()
            .await?;

        let body: LoginResponse = check_status(res)?.json().await?;
        Ok(SessionToken(body.token))
    }

    async fn post_message(
        &self,
        token: &SessionToken,
        room_id: &str,
        content: &str,
    ) -> Result<(), ServiceError> {
        let res = self
            .client
            .post(format!("{}/rooms/{room_id}/messages", self.base_url))
            .bearer_auth(token.as_str())
            .json(&MessageRequest { content })
            .send()
            .await?;

        // Only success matters, but the body is still read so the call completes.
        let _ack: serde_json::Value = check_status(res)?.json().await?;
        Ok(())
    }
}

fn check_status(res: Response) -> Result<Response, ServiceError> {
    if res.status().is_success() {
        Ok(res)
    } else {
        Err(ServiceError::Status(res.status().as_u16()))
    }
}
