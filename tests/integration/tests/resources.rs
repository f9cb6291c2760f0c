//! Entity CRUD tests.

use reqwest::{Method, StatusCode};
use roster_integration_tests::{TestEnv, id_of};
use serde_json::{Value, json};

/// Tests create, fetch, replace, patch and delete of one account.
#[tokio::test]
async fn test_account_lifecycle() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    // Create
    let response = env
        .client
        .post(env.url("/accounts"))
        .json(&json!({"username": "jdoe", "firstname": "John", "lastname": "Doe"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .expect("Location header");
    let created: Value = response.json().await?;
    let id = id_of(&created)?;
    assert_eq!(location, format!("{}/accounts/{id}", env.base_url));
    assert_eq!(created["_links"]["self"]["href"], location);
    assert_eq!(
        created["_links"]["groups"]["href"],
        format!("{location}/groups")
    );

    // Fetch
    let (status, fetched) = env.get(&location).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["username"], "jdoe");
    assert_eq!(fetched["firstname"], "John");

    // Replace: absent optional fields become null
    let (status, replaced) = env
        .send(Method::PUT, &location, Some(&json!({"username": "john.doe"})))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["username"], "john.doe");
    assert_eq!(replaced["firstname"], Value::Null);
    assert_eq!(replaced["lastname"], Value::Null);

    // Patch: only present members change
    let (status, patched) = env
        .send(Method::PATCH, &location, Some(&json!({"lastname": "Doe"})))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["username"], "john.doe");
    assert_eq!(patched["lastname"], "Doe");

    // Delete
    let (status, _) = env.send(Method::DELETE, &location, None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, error) = env.get(&location).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "not_found");

    let (status, _) = env.send(Method::DELETE, &location, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

/// Tests that unique fields are enforced on create and update.
#[tokio::test]
async fn test_unique_fields_conflict() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    env.group("Operations", "ops").await?;
    let dev = env.group("Development", "dev").await?;

    let (status, error) = env
        .send(
            Method::POST,
            "/groups",
            Some(&json!({"name": "Other ops", "code": "ops"})),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"], "conflict");

    let (status, _) = env
        .send(
            Method::PATCH,
            &format!("/groups/{dev}"),
            Some(&json!({"name": "Operations"})),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    // Unchanged unique values are not a conflict with the entity itself
    let (status, _) = env
        .send(
            Method::PUT,
            &format!("/groups/{dev}"),
            Some(&json!({"name": "Development", "code": "dev", "description": "Builders"})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

/// Tests body validation.
#[tokio::test]
async fn test_invalid_bodies_are_bad_requests() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let role = env.role("Auditor", "audit").await?;
    let path = format!("/roles/{role}");

    let cases = [
        (Method::POST, "/roles".to_string(), json!({"code": "x"})),
        (Method::POST, "/roles".to_string(), json!({"name": "X", "code": "x", "level": "3"})),
        (Method::POST, "/roles".to_string(), json!({"name": "X", "code": 3})),
        (Method::POST, "/roles".to_string(), json!({"id": role, "name": "X", "code": "x"})),
        (Method::POST, "/roles".to_string(), json!(["not", "an", "object"])),
        (Method::PATCH, path.clone(), json!({"name": null})),
        (Method::PUT, path.clone(), json!({"code": "audit"})),
        (
            Method::PUT,
            path.clone(),
            json!({"id": uuid::Uuid::new_v4(), "name": "Auditor", "code": "audit"}),
        ),
    ];

    for (method, path, body) in cases {
        let (status, error) = env.send(method.clone(), &path, Some(&body)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {path} {body}");
        assert_eq!(error["error"], "bad_request");
    }

    // Nothing above was written
    let (_, roles) = env.get("/roles").await?;
    assert_eq!(roles["page"]["totalElements"], 1);

    Ok(())
}

/// Tests that a fetched document can be sent back as a replacement.
#[tokio::test]
async fn test_document_round_trips_through_put() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;
    let doc = env
        .create("groups", json!({"name": "Ops", "code": "ops", "description": "Operations"}))
        .await?;
    let path = format!("/groups/{}", id_of(&doc)?);

    let (status, replaced) = env.send(Method::PUT, &path, Some(&doc)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced, doc);

    Ok(())
}

/// Tests unknown collections and identities.
#[tokio::test]
async fn test_unknown_addresses_are_not_found() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    for path in [
        "/realms".to_string(),
        "/accounts/not-a-uuid".to_string(),
        format!("/accounts/{}", uuid::Uuid::new_v4()),
    ] {
        let (status, _) = env.get(&path).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
    }

    let (status, _) = env
        .send(
            Method::PUT,
            &format!("/roles/{}", uuid::Uuid::new_v4()),
            Some(&json!({"name": "Ghost", "code": "ghost"})),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}
