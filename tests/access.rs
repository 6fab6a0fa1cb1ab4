mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use supply_network_api::{
    dto::auth::TokenType, services::auth_service::issue_token,
};
use uuid::Uuid;

use common::{JWT_SECRET, create_user, database_state, offline_state, send};

#[tokio::test]
async fn anonymous_list_is_forbidden() {
    let state = offline_state();
    let (status, body) = send(&state, Method::GET, "/api/suppliers/", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden");
}

#[tokio::test]
async fn anonymous_writes_are_forbidden() {
    let state = offline_state();
    let id = Uuid::new_v4();

    let body = serde_json::json!({ "name": "Updated Supplier" });
    let (status, _) = send(
        &state,
        Method::PATCH,
        &format!("/api/suppliers/{id}/"),
        None,
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&state, Method::DELETE, &format!("/api/suppliers/{id}"), None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_and_foreign_tokens_are_forbidden() {
    let state = offline_state();

    let (status, _) = send(&state, Method::GET, "/api/suppliers/", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let foreign = issue_token("someone-else", Uuid::new_v4(), TokenType::Access, Duration::minutes(5))
        .expect("token");
    let (status, _) = send(&state, Method::GET, "/api/suppliers/", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn refresh_token_cannot_be_used_as_access_token() {
    let state = offline_state();
    let refresh = issue_token(JWT_SECRET, Uuid::new_v4(), TokenType::Refresh, Duration::hours(1))
        .expect("token");
    let (status, _) = send(&state, Method::GET, "/api/suppliers/", Some(&refresh), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_surface_is_forbidden_to_anonymous_callers() {
    let state = offline_state();
    let body = serde_json::json!({ "ids": [Uuid::new_v4()] });
    let (status, _) = send(
        &state,
        Method::POST,
        "/api/admin/suppliers/clear-debt",
        None,
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn anonymous_callers_cannot_create_accounts() {
    let state = offline_state();
    let body = serde_json::json!({ "username": "intruder", "password": "intruder-pass" });
    let (status, _) = send(&state, Method::POST, "/api/admin/users", None, Some(body)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn products_api_is_not_mounted_by_default() {
    let state = offline_state();
    let (status, _) = send(&state, Method::GET, "/api/products/", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn active_employee_passes_and_inactive_does_not() -> anyhow::Result<()> {
    let Some(state) = database_state().await? else {
        return Ok(());
    };

    let employee = create_user(&state, true, false).await?;
    let (status, _) =
        send(&state, Method::GET, "/api/suppliers/", Some(&employee.token), None).await;
    assert_eq!(status, StatusCode::OK);

    let non_employee = create_user(&state, false, false).await?;
    let (status, body) =
        send(&state, Method::GET, "/api/suppliers/", Some(&non_employee.token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden");

    // a non-staff employee still cannot reach the operator surface
    let (status, _) =
        send(&state, Method::GET, "/api/admin/suppliers", Some(&employee.token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let staff = create_user(&state, true, true).await?;
    let (status, _) =
        send(&state, Method::GET, "/api/admin/suppliers", Some(&staff.token), None).await;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn token_pair_grants_access_and_refreshes() -> anyhow::Result<()> {
    let Some(state) = database_state().await? else {
        return Ok(());
    };
    let user = create_user(&state, true, false).await?;

    let credentials = serde_json::json!({ "username": user.username, "password": user.password });
    let (status, body) = send(&state, Method::POST, "/api/token/", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    let access = body["data"]["access"].as_str().expect("access").to_string();
    let refresh = body["data"]["refresh"].as_str().expect("refresh").to_string();

    let (status, _) = send(&state, Method::GET, "/api/suppliers/", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &state,
        Method::POST,
        "/api/token/refresh/",
        None,
        Some(serde_json::json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["access"].is_string());

    let wrong = serde_json::json!({ "username": user.username, "password": "wrong" });
    let (status, _) = send(&state, Method::POST, "/api/token/", None, Some(wrong)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn staff_created_account_can_obtain_tokens() -> anyhow::Result<()> {
    let Some(state) = database_state().await? else {
        return Ok(());
    };
    let staff = create_user(&state, true, true).await?;
    let employee = create_user(&state, true, false).await?;
    let username = format!("clerk-{}", Uuid::new_v4());
    let account = serde_json::json!({
        "username": username,
        "email": "clerk@example.com",
        "password": "clerk-password",
    });

    let (status, _) = send(
        &state,
        Method::POST,
        "/api/admin/users",
        Some(&employee.token),
        Some(account.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &state,
        Method::POST,
        "/api/admin/users",
        Some(&staff.token),
        Some(account.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["username"], username.as_str());
    assert_eq!(body["data"]["is_active"], true);
    assert_eq!(body["data"]["is_staff"], false);
    assert!(body["data"].get("password").is_none());
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = send(
        &state,
        Method::POST,
        "/api/admin/users",
        Some(&staff.token),
        Some(account),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Bad Request a user with that username already exists."
    );

    let credentials = serde_json::json!({ "username": username, "password": "clerk-password" });
    let (status, body) = send(&state, Method::POST, "/api/token/", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let access = body["data"]["access"].as_str().expect("access").to_string();
    let (status, _) = send(&state, Method::GET, "/api/suppliers/", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);

    // accounts created inactive cannot sign in
    let dormant = format!("dormant-{}", Uuid::new_v4());
    let (status, _) = send(
        &state,
        Method::POST,
        "/api/admin/users",
        Some(&staff.token),
        Some(serde_json::json!({
            "username": dormant,
            "password": "dormant-password",
            "is_active": false,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let credentials = serde_json::json!({ "username": dormant, "password": "dormant-password" });
    let (status, _) = send(&state, Method::POST, "/api/token/", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}
