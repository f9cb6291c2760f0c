//! Projection rendering tests.

use reqwest::StatusCode;
use roster_integration_tests::TestEnv;
use serde_json::Value;

/// Account `jdoe` in group `ops`, which holds roles `admin` and `audit`.
struct Fixture {
    env: TestEnv,
    account: String,
    group: String,
}

async fn fixture() -> anyhow::Result<Fixture> {
    let env = TestEnv::new().await?;
    let account = env.account("jdoe", Some("Doe")).await?;
    let group = env.group("Ops", "ops").await?;
    let admin = env.role("Admin", "admin").await?;
    let audit = env.role("Auditor", "audit").await?;
    env.attach("accounts", &account, "groups", &group).await?;
    env.attach("groups", &group, "roles", &admin).await?;
    env.attach("groups", &group, "roles", &audit).await?;
    Ok(Fixture {
        env,
        account,
        group,
    })
}

fn keys(doc: &Value) -> Vec<&str> {
    doc.as_object()
        .map(|o| o.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Tests that the default representation links relations without inlining.
#[tokio::test]
async fn test_default_representation() -> anyhow::Result<()> {
    let fx = fixture().await?;

    let (status, doc) = fx.env.get(&format!("/accounts/{}", fx.account)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(keys(&doc), ["id", "username", "firstname", "lastname", "_links"]);
    assert!(doc.get("_embedded").is_none());

    Ok(())
}

/// Tests the three-level chain account -> groups -> roles.
#[tokio::test]
async fn test_chained_projection() -> anyhow::Result<()> {
    let fx = fixture().await?;

    let (status, doc) = fx
        .env
        .get(&format!("/accounts/{}?projection=withGroupsAndRoles", fx.account))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(keys(&doc), ["id", "username", "firstname", "lastname", "_embedded", "_links"]);

    let groups = doc["_embedded"]["groups"].as_array().expect("groups");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["code"], "ops");

    let mut codes: Vec<&str> = groups[0]["_embedded"]["roles"]
        .as_array()
        .expect("roles")
        .iter()
        .filter_map(|r| r["code"].as_str())
        .collect();
    codes.sort_unstable();
    assert_eq!(codes, ["admin", "audit"]);

    // Role summary stops the chain
    let role = &groups[0]["_embedded"]["roles"][0];
    assert_eq!(keys(role), ["id", "name", "code", "_links"]);

    Ok(())
}

/// Tests raw expansion.
#[tokio::test]
async fn test_raw_expansion() -> anyhow::Result<()> {
    let fx = fixture().await?;

    let (_, doc) = fx
        .env
        .get(&format!("/accounts/{}?projection=withGroups", fx.account))
        .await?;
    let group = &doc["_embedded"]["groups"][0];
    assert_eq!(keys(group), ["id", "_links"]);
    assert_eq!(group["id"], fx.group.as_str());
    assert_eq!(
        group["_links"]["self"]["href"],
        format!("{}/groups/{}", fx.env.base_url, fx.group)
    );

    Ok(())
}

/// Tests projections on collections and relation listings.
#[tokio::test]
async fn test_projection_on_listings() -> anyhow::Result<()> {
    let fx = fixture().await?;

    let (status, doc) = fx.env.get("/groups?projection=withRoles").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        doc["_embedded"]["groups"][0]["_embedded"]["roles"]
            .as_array()
            .map(Vec::len),
        Some(2)
    );
    assert!(
        doc["_links"]["self"]["href"]
            .as_str()
            .is_some_and(|href| href.ends_with("projection=withRoles"))
    );

    // The projection applies to the related kind
    let (status, doc) = fx
        .env
        .get(&format!("/accounts/{}/groups?projection=summary", fx.account))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(keys(&doc["_embedded"]["groups"][0]), ["id", "name", "code", "_links"]);

    Ok(())
}

/// Tests that an unknown projection is a client error.
#[tokio::test]
async fn test_unknown_projection() -> anyhow::Result<()> {
    let fx = fixture().await?;

    for path in [
        format!("/accounts/{}?projection=withRoles", fx.account),
        "/roles?projection=withAccounts".to_string(),
    ] {
        let (status, error) = fx.env.get(&path).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(error["error"], "unknown_projection");
    }

    Ok(())
}
