//! Search tests.

use reqwest::StatusCode;
use roster_integration_tests::{TestEnv, embedded_ids};

/// Tests the search index of each collection.
#[tokio::test]
async fn test_search_index() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let (status, index) = env.get("/accounts/search").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        index["_links"]["by-lastname"]["href"],
        format!("{}/accounts/search/by-lastname{{?q}}", env.base_url)
    );
    assert_eq!(index["_links"]["by-lastname"]["templated"], true);

    let (_, accounts) = env.get("/accounts").await?;
    assert_eq!(
        accounts["_links"]["search"]["href"],
        format!("{}/accounts/search", env.base_url)
    );

    Ok(())
}

/// Tests case-insensitive substring matching.
#[tokio::test]
async fn test_search_matches_substrings() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let doe = env.account("jdoe", Some("Doe")).await?;
    let dover = env.account("bdover", Some("Dover")).await?;
    env.account("asmith", Some("Smith")).await?;
    env.account("nolast", None).await?;

    let (status, found) = env
        .get("/accounts/search/by-lastname?q=DO&sort=lastname,asc")
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(embedded_ids(&found, "accounts"), vec![doe, dover]);
    assert_eq!(
        found["_links"]["self"]["href"],
        format!(
            "{}/accounts/search/by-lastname?q=DO&page=0&size=20&sort=lastname%2Casc",
            env.base_url
        )
    );

    let (_, none) = env.get("/accounts/search/by-lastname?q=zz").await?;
    assert_eq!(none["page"]["totalElements"], 0);

    Ok(())
}

/// Tests token parameters and search errors.
#[tokio::test]
async fn test_search_errors() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    env.group("Operations", "ops").await?;

    let (status, found) = env.get("/groups/search/by-code?q=op").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["page"]["totalElements"], 1);

    // Missing required parameter
    let (status, error) = env.get("/groups/search/by-code").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "bad_request");

    // Tokens cannot carry whitespace
    let (status, _) = env.get("/groups/search/by-code?q=o%20p").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown search
    let (status, _) = env.get("/groups/search/by-colour?q=red").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}
