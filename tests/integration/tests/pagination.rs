//! Paging and sorting tests.

use reqwest::StatusCode;
use roster_integration_tests::{TestEnv, embedded_ids};
use serde_json::{Value, json};

async fn seed_roles(env: &TestEnv, count: usize) -> anyhow::Result<()> {
    for n in 0..count {
        env.create("roles", json!({"name": format!("Role {n:02}"), "code": format!("r{n:02}")}))
            .await?;
    }
    Ok(())
}

fn link<'a>(doc: &'a Value, rel: &str) -> Option<&'a str> {
    doc["_links"][rel]["href"].as_str()
}

/// Tests walking a collection through its navigation links.
#[tokio::test]
async fn test_walk_pages_by_links() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    seed_roles(&env, 5).await?;

    let (status, first) = env.get("/roles?size=2&sort=code,desc").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["page"], json!({"size": 2, "totalElements": 5, "totalPages": 3, "number": 0}));
    assert!(link(&first, "prev").is_none());
    assert_eq!(
        link(&first, "last"),
        Some(format!("{}/roles?page=2&size=2&sort=code%2Cdesc", env.base_url).as_str())
    );

    let mut codes = Vec::new();
    let mut doc = first;
    loop {
        for item in doc["_embedded"]["roles"].as_array().into_iter().flatten() {
            codes.extend(item["code"].as_str().map(String::from));
        }
        let Some(next) = link(&doc, "next").map(String::from) else {
            break;
        };
        let (status, page) = env.get(&next).await?;
        assert_eq!(status, StatusCode::OK);
        assert!(link(&page, "prev").is_some());
        doc = page;
    }

    assert_eq!(codes, ["r04", "r03", "r02", "r01", "r00"]);
    assert_eq!(doc["page"]["number"], 2);

    Ok(())
}

/// Tests size defaults and clamping.
#[tokio::test]
async fn test_size_is_clamped() -> anyhow::Result<()> {
    let mut config = roster_core::Config::for_testing();
    config.paging.default_size = 2;
    config.paging.max_size = 3;
    let env = TestEnv::with_config(config).await?;
    seed_roles(&env, 4).await?;

    let (_, doc) = env.get("/roles").await?;
    assert_eq!(doc["page"]["size"], 2);
    assert_eq!(embedded_ids(&doc, "roles").len(), 2);

    let (_, doc) = env.get("/roles?size=50").await?;
    assert_eq!(doc["page"]["size"], 3);
    assert_eq!(doc["page"]["totalPages"], 2);

    // Past the end is an empty page, not an error
    let (status, doc) = env.get("/roles?page=9").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(embedded_ids(&doc, "roles").is_empty());
    assert!(link(&doc, "next").is_none());

    Ok(())
}

/// Tests malformed paging and sorting parameters.
#[tokio::test]
async fn test_invalid_paging_parameters() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    for query in [
        "size=0",
        "size=many",
        "page=-1",
        "sort=salary",
        "sort=name,sideways",
    ] {
        let (status, error) = env.get(&format!("/roles?{query}")).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
        assert_eq!(error["error"], "bad_request");
    }

    Ok(())
}

/// Tests that null values sort first in ascending order.
#[tokio::test]
async fn test_sort_with_nulls() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let smith = env.account("asmith", Some("Smith")).await?;
    let anon = env.account("anon", None).await?;
    let doe = env.account("jdoe", Some("Doe")).await?;

    let (_, doc) = env.get("/accounts?sort=lastname").await?;
    assert_eq!(embedded_ids(&doc, "accounts"), vec![anon, doe, smith]);

    Ok(())
}
