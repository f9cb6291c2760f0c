//! Tests against the `PostgreSQL` storage engine.
//!
//! These need a container runtime; each test starts its own database.

use reqwest::{Method, StatusCode};
use roster_integration_tests::{TestEnv, embedded_ids};
use serde_json::json;

/// Tests edges added from one side, seen from the other, and removed again.
#[tokio::test]
async fn test_pg_relations_are_bidirectional() -> anyhow::Result<()> {
    let env = TestEnv::with_postgres().await?;
    let account = env.account("jdoe", None).await?;
    let group = env.group("Ops", "ops").await?;

    env.attach("accounts", &account, "groups", &group).await?;
    // Repeated from the inverse side
    env.attach("groups", &group, "accounts", &account).await?;

    let (status, accounts) = env.get(&format!("/groups/{group}/accounts")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(embedded_ids(&accounts, "accounts"), vec![account.clone()]);
    assert_eq!(accounts["page"]["totalElements"], 1);

    let (status, _) = env
        .get(&format!("/accounts/{account}/groups/{group}"))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = env
        .send(Method::DELETE, &format!("/groups/{group}/accounts/{account}"), None)
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, groups) = env.get(&format!("/accounts/{account}/groups")).await?;
    assert!(embedded_ids(&groups, "groups").is_empty());
    let (status, _) = env
        .get(&format!("/accounts/{account}/groups/{group}"))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

/// Tests that deleting an entity removes its join rows on both sides.
#[tokio::test]
async fn test_pg_delete_cascades_edges() -> anyhow::Result<()> {
    let env = TestEnv::with_postgres().await?;
    let account = env.account("jdoe", None).await?;
    let group = env.group("Ops", "ops").await?;
    let role = env.role("Admin", "admin").await?;
    env.attach("accounts", &account, "groups", &group).await?;
    env.attach("groups", &group, "roles", &role).await?;

    let (status, _) = env.send(Method::DELETE, &format!("/groups/{group}"), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, groups) = env.get(&format!("/accounts/{account}/groups")).await?;
    assert_eq!(groups["page"]["totalElements"], 0);
    let (_, groups) = env.get(&format!("/roles/{role}/groups")).await?;
    assert_eq!(groups["page"]["totalElements"], 0);

    // Both ends survive
    let (status, _) = env.get(&format!("/accounts/{account}")).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = env.get(&format!("/roles/{role}")).await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

/// Tests that unique constraint violations come back as conflicts naming the
/// field.
#[tokio::test]
async fn test_pg_duplicate_username_conflicts() -> anyhow::Result<()> {
    let env = TestEnv::with_postgres().await?;
    env.account("jdoe", None).await?;
    let other = env.account("asmith", None).await?;

    let (status, error) = env
        .send(Method::POST, "/accounts", Some(&json!({"username": "jdoe"})))
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"], "conflict");
    assert!(
        error["error_description"]
            .as_str()
            .is_some_and(|d| d.contains("username 'jdoe'")),
        "{error}"
    );

    let (status, _) = env
        .send(
            Method::PATCH,
            &format!("/accounts/{other}"),
            Some(&json!({"username": "jdoe"})),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, accounts) = env.get("/accounts").await?;
    assert_eq!(accounts["page"]["totalElements"], 2);

    Ok(())
}

/// Tests paging, sorting and missing entities on the database engine.
#[tokio::test]
async fn test_pg_paging_and_missing_entities() -> anyhow::Result<()> {
    let env = TestEnv::with_postgres().await?;
    for n in 0..5 {
        env.role(&format!("Role {n:02}"), &format!("r{n:02}")).await?;
    }

    let (status, first) = env.get("/roles?size=2&sort=code,desc").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        first["page"],
        json!({"size": 2, "totalElements": 5, "totalPages": 3, "number": 0})
    );

    let mut codes = Vec::new();
    let mut doc = first;
    loop {
        for item in doc["_embedded"]["roles"].as_array().into_iter().flatten() {
            codes.extend(item["code"].as_str().map(String::from));
        }
        let Some(next) = doc["_links"]["next"]["href"].as_str().map(String::from) else {
            break;
        };
        let (status, page) = env.get(&next).await?;
        assert_eq!(status, StatusCode::OK);
        doc = page;
    }
    assert_eq!(codes, ["r04", "r03", "r02", "r01", "r00"]);

    // Nulls first in ascending order
    let smith = env.account("asmith", Some("Smith")).await?;
    let anon = env.account("anon", None).await?;
    let (_, accounts) = env.get("/accounts?sort=lastname").await?;
    assert_eq!(embedded_ids(&accounts, "accounts"), vec![anon, smith]);

    let missing = uuid::Uuid::new_v4();
    let (status, _) = env
        .send(
            Method::PUT,
            &format!("/roles/{missing}"),
            Some(&json!({"name": "Ghost", "code": "ghost"})),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = env.send(Method::DELETE, &format!("/roles/{missing}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}
