mod common;

use anyhow::Result;
use common::{TestServer, PASSWORD};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn registered_user_can_log_in() -> Result<()> {
    let server = TestServer::spawn().await?;
    server
        .post("/auth/register", &server.registration("701234567"))
        .await?;

    let (status, body) = server
        .post(
            "/auth/login",
            &json!({ "mobile_number": "701234567", "password": PASSWORD }),
        )
        .await?;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["mobile_number"], "701234567");
    assert!(body["data"]["tokens"]["access"].as_str().is_some());
    assert!(body["data"]["tokens"]["refresh"].as_str().is_some());
    Ok(())
}

#[tokio::test]
async fn wrong_password_and_unknown_number_are_indistinguishable() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.insert_user("501234567", true).await?;

    let (wrong_status, wrong) = server
        .post(
            "/auth/login",
            &json!({ "mobile_number": "501234567", "password": "Wr0ngPass!" }),
        )
        .await?;
    let (unknown_status, unknown) = server
        .post(
            "/auth/login",
            &json!({ "mobile_number": "509999999", "password": PASSWORD }),
        )
        .await?;

    assert_eq!(wrong_status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_status, unknown_status);
    assert_eq!(wrong, unknown);
    assert_eq!(
        wrong["field_errors"]["non_field_errors"][0]["code"],
        "INVALID_CREDENTIALS"
    );
    Ok(())
}

#[tokio::test]
async fn malformed_number_fails_like_wrong_credentials() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.insert_user("501234567", true).await?;

    let (status, body) = server
        .post(
            "/auth/login",
            &json!({ "mobile_number": "50-123-4567", "password": PASSWORD }),
        )
        .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
    assert!(body["field_errors"].get("mobile_number").is_none());
    Ok(())
}

#[tokio::test]
async fn disabled_account_cannot_log_in() -> Result<()> {
    let server = TestServer::spawn().await?;
    server.insert_user("501234567", false).await?;

    let (status, body) = server
        .post(
            "/auth/login",
            &json!({ "mobile_number": "501234567", "password": PASSWORD }),
        )
        .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ACCOUNT_DISABLED");
    Ok(())
}

#[tokio::test]
async fn missing_credentials_are_field_errors() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (status, body) = server.post("/auth/login", &json!({})).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["mobile_number"][0]["code"], "REQUIRED");
    assert_eq!(body["field_errors"]["password"][0]["code"], "REQUIRED");
    Ok(())
}
