mod common;

use anyhow::Result;
use common::TestServer;
use reqwest::StatusCode;

#[tokio::test]
async fn root_lists_endpoints() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (status, body) = server.get("/").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["data"]["endpoints"].get("register").is_some());
    Ok(())
}

#[tokio::test]
async fn health_reports_store() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (status, body) = server.get("/health").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn reference_lists_are_public() -> Result<()> {
    let server = TestServer::spawn().await?;

    let (status, body) = server.get("/reference/regions").await?;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|r| r["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Bakı", "Gəncə", "Sumqayıt"]);

    let (status, body) = server.get("/reference/fields").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], server.field_id);

    let (status, body) = server.get("/reference/countries").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}
