use chatload::prelude::*;
use chatload_tests::*;
use mock_service::MockConfig;

#[tokio::test]
async fn login_and_post() -> anyhow::Result<()> {
    let base_url = start_mock(MockConfig::with_default_users()).await?;
    let service = HttpChatService::new(&base_url, None)?;

    let token = service.login(&Credential::new("user1", "pass123")).await?;
    service.post_message(&token, "3", "user1 msg 0").await?;

    assert_eq!(accepted_messages(&base_url, "3").await?, 1);
    Ok(())
}

#[tokio::test]
async fn rejected_login_is_status_error() -> anyhow::Result<()> {
    let base_url = start_mock(MockConfig::with_default_users()).await?;
    let service = HttpChatService::new(&base_url, None)?;

    let res = service.login(&Credential::new("user1", "nope")).await;
    assert!(matches!(res, Err(ServiceError::Status(401))));
    Ok(())
}

#[tokio::test]
async fn stale_token_is_rejected() -> anyhow::Result<()> {
    let base_url = start_mock(MockConfig::with_default_users()).await?;
    let service = HttpChatService::new(&base_url, None)?;

    let res = service
        .post_message(&SessionToken::new("forged"), "11", "hello")
        .await;
    assert!(matches!(res, Err(ServiceError::Status(401))));
    Ok(())
}

#[tokio::test]
async fn register_is_idempotent() -> anyhow::Result<()> {
    let base_url = start_mock(MockConfig::new()).await?;
    let service = HttpChatService::new(&base_url, None)?;
    let credential = Credential::new("fresh", "pw");

    service.register(&credential).await?;
    // Second registration answers 409, which counts as registered.
    service.register(&credential).await?;
    service.login(&credential).await?;
    Ok(())
}

#[tokio::test]
async fn slow_service_hits_client_timeout() -> anyhow::Result<()> {
    let base_url = start_mock(
        MockConfig::with_default_users().delay(std::time::Duration::from_millis(500)),
    )
    .await?;
    let service = HttpChatService::new(&base_url, Some(std::time::Duration::from_millis(50)))?;

    let res = service.login(&Credential::new("user1", "pass123")).await;
    match res {
        Err(ServiceError::Http(err)) => assert!(err.is_timeout()),
        other => panic!("expected a timeout, got {other:?}"),
    }
    Ok(())
}
