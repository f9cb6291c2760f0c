//! Health and entry point tests.

use reqwest::StatusCode;
use roster_integration_tests::TestEnv;

/// Tests health endpoints.
#[tokio::test]
async fn test_health_endpoints() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let (status, body) = env.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = env.get("/health/live").await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = env.get("/health/ready").await?;
    assert_eq!(status, StatusCode::OK, "Readiness should reach the storage engine");
    assert_eq!(body["status"], "ready");

    Ok(())
}

/// Tests that the root document links every collection.
#[tokio::test]
async fn test_root_links_collections() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let (status, root) = env.get("/").await?;
    assert_eq!(status, StatusCode::OK);

    for collection in ["accounts", "groups", "roles"] {
        let href = root["_links"][collection]["href"]
            .as_str()
            .expect("collection link");
        assert_eq!(href, format!("{}/{collection}", env.base_url));

        let (status, _) = env.get(href).await?;
        assert_eq!(status, StatusCode::OK, "{collection} link should resolve");
    }

    Ok(())
}
