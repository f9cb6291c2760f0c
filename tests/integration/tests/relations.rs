//! Nested relation resource tests.

use reqwest::{Method, StatusCode};
use roster_integration_tests::{TestEnv, embedded_ids};
use serde_json::json;

/// Tests that an edge added from one side is visible from the other.
#[tokio::test]
async fn test_attach_is_bidirectional() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let account = env.account("jdoe", None).await?;
    let group = env.group("Ops", "ops").await?;

    env.attach("accounts", &account, "groups", &group).await?;

    let (status, groups) = env.get(&format!("/accounts/{account}/groups")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(embedded_ids(&groups, "groups"), vec![group.clone()]);
    assert_eq!(
        groups["_links"]["self"]["href"],
        format!("{}/accounts/{account}/groups?page=0&size=20", env.base_url)
    );
    assert!(groups["_links"].get("search").is_none());

    let (status, accounts) = env.get(&format!("/groups/{group}/accounts")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(embedded_ids(&accounts, "accounts"), vec![account.clone()]);

    // Attaching again changes nothing
    env.attach("groups", &group, "accounts", &account).await?;
    let (_, accounts) = env.get(&format!("/groups/{group}/accounts")).await?;
    assert_eq!(accounts["page"]["totalElements"], 1);

    Ok(())
}

/// Tests attaching through an href taken from a document.
#[tokio::test]
async fn test_attach_by_href() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let group = env.group("Ops", "ops").await?;
    let role_doc = env.create("roles", json!({"name": "Admin", "code": "admin"})).await?;
    let role_href = role_doc["_links"]["self"]["href"].as_str().expect("self link");

    let (status, _) = env
        .send(
            Method::POST,
            &format!("/groups/{group}/roles"),
            Some(&json!({ "href": role_href })),
        )
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, roles) = env.get(&format!("/groups/{group}/roles")).await?;
    assert_eq!(roles["_embedded"]["roles"][0]["code"], "admin");

    // An href of the wrong kind is rejected
    let (status, error) = env
        .send(
            Method::POST,
            &format!("/groups/{group}/roles"),
            Some(&json!({ "href": format!("{}/groups/{group}", env.base_url) })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], "bad_request");

    Ok(())
}

/// Tests the single related item resource.
#[tokio::test]
async fn test_related_item() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let group = env.group("Ops", "ops").await?;
    let admin = env.role("Admin", "admin").await?;
    let viewer = env.role("Viewer", "viewer").await?;
    env.attach("groups", &group, "roles", &admin).await?;

    let (status, role) = env.get(&format!("/groups/{group}/roles/{admin}")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(role["code"], "admin");
    assert_eq!(
        role["_links"]["self"]["href"],
        format!("{}/roles/{admin}", env.base_url)
    );

    let (status, _) = env.get(&format!("/groups/{group}/roles/{viewer}")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND, "Unrelated entity must not resolve");

    Ok(())
}

/// Tests detaching, including repeated and unknown targets.
#[tokio::test]
async fn test_detach() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let account = env.account("jdoe", None).await?;
    let group = env.group("Ops", "ops").await?;
    env.attach("accounts", &account, "groups", &group).await?;

    let path = format!("/groups/{group}/accounts/{account}");
    let (status, _) = env.send(Method::DELETE, &path, None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, groups) = env.get(&format!("/accounts/{account}/groups")).await?;
    assert!(embedded_ids(&groups, "groups").is_empty());

    // Removing an absent edge is not an error
    let (status, _) = env.send(Method::DELETE, &path, None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = env
        .send(
            Method::DELETE,
            &format!("/groups/{group}/accounts/{}", uuid::Uuid::new_v4()),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

/// Tests that deleting an entity drops its edges from both sides.
#[tokio::test]
async fn test_delete_cascades_edges() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let account = env.account("jdoe", None).await?;
    let group = env.group("Ops", "ops").await?;
    let role = env.role("Admin", "admin").await?;
    env.attach("accounts", &account, "groups", &group).await?;
    env.attach("roles", &role, "groups", &group).await?;

    let (status, _) = env.send(Method::DELETE, &format!("/groups/{group}"), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, groups) = env.get(&format!("/accounts/{account}/groups")).await?;
    assert_eq!(groups["page"]["totalElements"], 0);
    let (_, groups) = env.get(&format!("/roles/{role}/groups")).await?;
    assert_eq!(groups["page"]["totalElements"], 0);

    Ok(())
}

/// Tests relation addressing errors.
#[tokio::test]
async fn test_relation_errors() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let account = env.account("jdoe", None).await?;
    let missing = uuid::Uuid::new_v4().to_string();

    // Undeclared relation
    let (status, _) = env.get(&format!("/accounts/{account}/roles")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Unknown source
    let (status, _) = env.get(&format!("/accounts/{missing}/groups")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Unknown target
    let (status, _) = env
        .send(
            Method::POST,
            &format!("/accounts/{account}/groups"),
            Some(&json!({ "id": missing })),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Malformed attach bodies
    for body in [json!({}), json!({"id": "nope"}), json!({"id": missing, "href": "x"})] {
        let (status, _) = env
            .send(Method::POST, &format!("/accounts/{account}/groups"), Some(&body))
            .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }

    Ok(())
}
