//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use financeflow_core::db::{Database, DEMO_USER_ID};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

fn setup_test_app() -> Router {
    let db = Database::in_memory().unwrap();
    db.seed_demo_data().unwrap();
    let config = ServerConfig {
        require_auth: false,
        ..Default::default()
    };
    create_router(db, None, config)
}

fn setup_auth_app() -> Router {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        require_auth: true,
        allowed_origins: vec![],
        jwt: Some(JwtConfig::new("test-access-secret", "test-refresh-secret")),
    };
    create_router(db, None, config)
}

async fn get_body_json(response: axum::response::Response) -> Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Send one request and return the status and decoded JSON body
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, get_body_json(response).await)
}

/// Money fields are serialized as decimal strings
fn amount(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

async fn signup(app: &Router, email: &str) -> Value {
    let (status, json) = send(
        app,
        "POST",
        "/api/auth/signup",
        Some(json!({ "name": "Alice", "email": email, "password": "hunter22" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json
}

async fn first_category_id(app: &Router, name: &str) -> String {
    let (_, json) = send(app, "GET", "/api/categories", None, None).await;
    json.as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == name)
        .map(|c| c["id"].as_str().unwrap().to_string())
        .unwrap()
}

// ========== Auth API Tests ==========

#[tokio::test]
async fn test_signup_returns_user_and_tokens() {
    let app = setup_auth_app();

    let json = signup(&app, "alice@example.com").await;
    assert_eq!(json["message"], "User created successfully");
    assert_eq!(json["user"]["email"], "alice@example.com");
    assert_eq!(json["user"]["name"], "Alice");
    assert!(json["user"].get("passwordHash").is_none());
    assert!(json["accessToken"].as_str().is_some());
    assert!(json["refreshToken"].as_str().is_some());
}

#[tokio::test]
async fn test_signup_duplicate_email_conflicts() {
    let app = setup_auth_app();
    signup(&app, "alice@example.com").await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/auth/signup",
        Some(json!({ "name": "Other", "email": "alice@example.com", "password": "secret99" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "User with this email already exists");
}

#[tokio::test]
async fn test_signup_validates_fields() {
    let app = setup_auth_app();

    let (status, json) = send(
        &app,
        "POST",
        "/api/auth/signup",
        Some(json!({ "email": "bob@example.com", "password": "secret99" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Name, email, and password are required");

    let (status, json) = send(
        &app,
        "POST",
        "/api/auth/signup",
        Some(json!({ "name": "Bob", "email": "bob@example.com", "password": "abc" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Password must be at least 6 characters long");
}

#[tokio::test]
async fn test_login_and_profile() {
    let app = setup_auth_app();
    signup(&app, "alice@example.com").await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "alice@example.com", "password": "hunter22" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Login successful");

    let token = json["accessToken"].as_str().unwrap();
    let (status, profile) = send(&app, "GET", "/api/auth/profile", None, Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "alice@example.com");
    assert_eq!(profile["id"], json["user"]["id"]);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = setup_auth_app();
    signup(&app, "alice@example.com").await;

    for body in [
        json!({ "email": "alice@example.com", "password": "wrong-password" }),
        json!({ "email": "nobody@example.com", "password": "hunter22" }),
    ] {
        let (status, json) = send(&app, "POST", "/api/auth/login", Some(body), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Invalid email or password");
    }

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "alice@example.com" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_rotates_and_rejects_reuse() {
    let app = setup_auth_app();
    let json = signup(&app, "alice@example.com").await;
    let original = json["refreshToken"].as_str().unwrap().to_string();

    let (status, pair) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        Some(json!({ "refreshToken": original })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rotated = pair["refreshToken"].as_str().unwrap();
    assert_ne!(rotated, original);
    assert!(pair["accessToken"].as_str().is_some());

    // The original token was consumed by the rotation
    let (status, json) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        Some(json!({ "refreshToken": original })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "Invalid or expired refresh token");

    // The rotated one still works
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        Some(json!({ "refreshToken": rotated })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_requires_token() {
    let app = setup_auth_app();

    let (status, json) = send(&app, "POST", "/api/auth/refresh", Some(json!({})), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Refresh token is required");

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        Some(json!({ "refreshToken": "not-a-jwt" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let app = setup_auth_app();
    let json = signup(&app, "alice@example.com").await;
    let refresh = json["refreshToken"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        "POST",
        "/api/auth/logout",
        Some(json!({ "refreshToken": refresh })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Logout successful");

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/refresh",
        Some(json!({ "refreshToken": refresh })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_logout_without_body_succeeds() {
    let app = setup_auth_app();

    let (status, json) = send(&app, "POST", "/api/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Logout successful");
}

// ========== Middleware Tests ==========

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = setup_auth_app();

    let (status, json) = send(&app, "GET", "/api/transactions", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "Access token required");
}

#[tokio::test]
async fn test_protected_route_rejects_bad_token() {
    let app = setup_auth_app();

    let (status, json) = send(&app, "GET", "/api/transactions", None, Some("garbage")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"], "Invalid or expired token");
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = setup_auth_app();
    let json = signup(&app, "alice@example.com").await;
    let refresh = json["refreshToken"].as_str().unwrap();

    let (status, _) = send(&app, "GET", "/api/auth/profile", None, Some(refresh)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_users_only_see_their_own_data() {
    let app = setup_auth_app();
    let alice = signup(&app, "alice@example.com").await;
    let bob = signup(&app, "bob@example.com").await;
    let alice_token = alice["accessToken"].as_str().unwrap();
    let bob_token = bob["accessToken"].as_str().unwrap();

    let (status, tx) = send(
        &app,
        "POST",
        "/api/transactions",
        Some(json!({ "amount": 25, "description": "Lunch", "type": "expense" })),
        Some(alice_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = tx["id"].as_str().unwrap();

    let (_, list) = send(&app, "GET", "/api/transactions", None, Some(bob_token)).await;
    assert!(list.as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/transactions/{}", id),
        None,
        Some(bob_token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_no_auth_mode_acts_as_demo_user() {
    let app = setup_test_app();

    let (status, profile) = send(&app, "GET", "/api/auth/profile", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["id"], DEMO_USER_ID);

    let (status, goals) = send(&app, "GET", "/api/goals", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(goals.as_array().unwrap().len(), 2);
}

// ========== Category API Tests ==========

#[tokio::test]
async fn test_category_lifecycle() {
    let app = setup_test_app();

    let (status, created) = send(
        &app,
        "POST",
        "/api/categories",
        Some(json!({ "name": "Pets", "icon": "paw", "color": "#123456", "type": "expense" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["name"], "Pets");
    assert_eq!(created["userId"], DEMO_USER_ID);

    let id = created["id"].as_str().unwrap();
    let (status, json) = send(&app, "DELETE", &format!("/api/categories/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (status, json) = send(&app, "DELETE", &format!("/api/categories/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Category not found");
}

#[tokio::test]
async fn test_create_category_rejects_bad_kind() {
    let app = setup_test_app();

    let (status, json) = send(
        &app,
        "POST",
        "/api/categories",
        Some(json!({ "name": "Pets", "icon": "paw", "color": "#123456", "type": "transfer" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid category data"));
}

// ========== Transaction API Tests ==========

#[tokio::test]
async fn test_transaction_lifecycle() {
    let app = setup_test_app();
    let food = first_category_id(&app, "Food & Dining").await;

    let (status, created) = send(
        &app,
        "POST",
        "/api/transactions",
        Some(json!({
            "amount": "42.50",
            "description": "Groceries",
            "type": "expense",
            "categoryId": food,
            "date": "2024-12-03T12:00:00Z"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(amount(&created["amount"]), Decimal::new(4250, 2));
    assert_eq!(created["categoryId"], food.as_str());

    let id = created["id"].as_str().unwrap();
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/transactions/{}", id),
        Some(json!({ "description": "Weekly groceries" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], "Weekly groceries");
    assert_eq!(amount(&updated["amount"]), Decimal::new(4250, 2));

    let (status, _) = send(&app, "DELETE", &format!("/api/transactions/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/transactions/{}", id),
        Some(json!({ "description": "Gone" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Transaction not found");
}

#[tokio::test]
async fn test_create_transaction_validation() {
    let app = setup_test_app();

    let (status, json) = send(
        &app,
        "POST",
        "/api/transactions",
        Some(json!({ "amount": -5, "description": "Refund", "type": "expense" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Amount must be a non-negative magnitude");

    let (status, json) = send(
        &app,
        "POST",
        "/api/transactions",
        Some(json!({ "description": "No amount", "type": "expense" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid transaction data"));

    let (status, json) = send(
        &app,
        "POST",
        "/api/transactions",
        Some(json!({
            "amount": 5,
            "description": "Mystery",
            "type": "expense",
            "categoryId": "no-such-category"
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Unknown category: no-such-category");
}

#[tokio::test]
async fn test_list_transactions_paging() {
    let app = setup_test_app();

    for day in 1..=5 {
        let (status, _) = send(
            &app,
            "POST",
            "/api/transactions",
            Some(json!({
                "amount": day,
                "description": format!("Day {}", day),
                "type": "expense",
                "date": format!("2024-12-0{}T09:00:00Z", day)
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, page) = send(&app, "GET", "/api/transactions?limit=2&offset=1", None, None).await;
    let page = page.as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["description"], "Day 4");
    assert_eq!(page[1]["description"], "Day 3");

    // Out-of-range parameters are clamped rather than rejected
    let (status, all) = send(&app, "GET", "/api/transactions?limit=0&offset=-3", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (_, all) = send(&app, "GET", "/api/transactions?limit=99999", None, None).await;
    assert_eq!(all.as_array().unwrap().len(), 5);
}

// ========== Goal API Tests ==========

#[tokio::test]
async fn test_goal_progress_accumulates() {
    let app = setup_test_app();

    let (status, goal) = send(
        &app,
        "POST",
        "/api/goals",
        Some(json!({ "title": "Bike", "targetAmount": 500 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(amount(&goal["currentAmount"]).is_zero());
    assert_eq!(goal["achieved"], false);

    let uri = format!("/api/goals/{}/progress", goal["id"].as_str().unwrap());
    let (status, goal) = send(&app, "POST", &uri, Some(json!({ "amount": 200.5 })), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(amount(&goal["currentAmount"]), Decimal::new(2005, 1));

    let (_, goal) = send(&app, "POST", &uri, Some(json!({ "amount": 300 })), None).await;
    assert_eq!(amount(&goal["currentAmount"]), Decimal::new(5005, 1));
    assert_eq!(goal["achieved"], true);
}

#[tokio::test]
async fn test_goal_progress_rejects_string_amount() {
    let app = setup_test_app();
    let (_, goals) = send(&app, "GET", "/api/goals", None, None).await;
    let id = goals[0]["id"].as_str().unwrap();

    let (status, json) = send(
        &app,
        "POST",
        &format!("/api/goals/{}/progress", id),
        Some(json!({ "amount": "100" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Amount must be a number");
}

#[tokio::test]
async fn test_goal_responses_include_progress_display() {
    let app = setup_test_app();

    let (status, goals) = send(&app, "GET", "/api/goals", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let emergency = goals
        .as_array()
        .unwrap()
        .iter()
        .find(|g| g["title"] == "Emergency Fund")
        .unwrap();
    assert_eq!(emergency["progressPercent"], 32.5);
    assert!(!emergency["timeLeft"].as_str().unwrap().is_empty());
    assert_eq!(amount(&emergency["targetAmount"]), Decimal::from(10_000));

    let (_, goal) = send(
        &app,
        "POST",
        "/api/goals",
        Some(json!({ "title": "Bike", "targetAmount": 400 })),
        None,
    )
    .await;
    assert_eq!(goal["progressPercent"], 0.0);
    assert_eq!(goal["timeLeft"], "No deadline");

    let uri = format!("/api/goals/{}/progress", goal["id"].as_str().unwrap());
    let (_, goal) = send(&app, "POST", &uri, Some(json!({ "amount": 100 })), None).await;
    assert_eq!(goal["progressPercent"], 25.0);
}

#[tokio::test]
async fn test_goal_progress_rejects_out_of_range_amount() {
    let app = setup_test_app();
    let (_, goal) = send(
        &app,
        "POST",
        "/api/goals",
        Some(json!({ "title": "Yacht", "targetAmount": 1000 })),
        None,
    )
    .await;
    let uri = format!("/api/goals/{}/progress", goal["id"].as_str().unwrap());

    let (status, json) = send(&app, "POST", &uri, Some(json!({ "amount": 5e28 })), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("must not exceed"));

    // The goal is still writable afterwards
    let (status, goal) = send(&app, "POST", &uri, Some(json!({ "amount": 10 })), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(amount(&goal["currentAmount"]), Decimal::from(10));
}

#[tokio::test]
async fn test_goal_not_found() {
    let app = setup_test_app();

    let (status, json) = send(
        &app,
        "POST",
        "/api/goals/missing/progress",
        Some(json!({ "amount": 10 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Goal not found");

    let (status, _) = send(
        &app,
        "PUT",
        "/api/goals/missing",
        Some(json!({ "title": "Renamed" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/api/goals/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ========== Budget API Tests ==========

#[tokio::test]
async fn test_budget_lifecycle_and_period_filter() {
    let app = setup_test_app();
    let food = first_category_id(&app, "Food & Dining").await;

    for (month, amount) in [(11, 300), (12, 350)] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/budgets",
            Some(json!({
                "categoryId": food,
                "amount": amount,
                "period": "monthly",
                "month": month,
                "year": 2024
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, all) = send(&app, "GET", "/api/budgets", None, None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, december) = send(&app, "GET", "/api/budgets?month=12&year=2024", None, None).await;
    let december = december.as_array().unwrap();
    assert_eq!(december.len(), 1);
    assert_eq!(amount(&december[0]["amount"]), Decimal::from(350));

    let id = december[0]["id"].as_str().unwrap();
    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/api/budgets/{}", id),
        Some(json!({ "amount": 400 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(amount(&updated["amount"]), Decimal::from(400));

    let (status, _) = send(&app, "DELETE", &format!("/api/budgets/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = send(&app, "DELETE", &format!("/api/budgets/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Budget not found");
}

#[tokio::test]
async fn test_budget_filter_needs_month_and_year() {
    let app = setup_test_app();

    let (status, _) = send(&app, "GET", "/api/budgets?month=12", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/api/budgets?month=13&year=2024", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ========== Analytics API Tests ==========

async fn record_december(app: &Router) {
    let food = first_category_id(app, "Food & Dining").await;
    let salary = first_category_id(app, "Salary").await;

    for (amount, kind, category) in [
        (3000, "income", salary.as_str()),
        (400, "expense", food.as_str()),
        (200, "expense", food.as_str()),
    ] {
        let (status, _) = send(
            app,
            "POST",
            "/api/transactions",
            Some(json!({
                "amount": amount,
                "description": "December",
                "type": kind,
                "categoryId": category,
                "date": "2024-12-10T10:00:00Z"
            })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_monthly_summary() {
    let app = setup_test_app();
    record_december(&app).await;

    let (status, json) = send(
        &app,
        "GET",
        "/api/analytics/monthly-summary?month=12&year=2024",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalIncome"].as_f64(), Some(3000.0));
    assert_eq!(json["totalExpenses"].as_f64(), Some(600.0));
    assert_eq!(json["netSavings"].as_f64(), Some(2400.0));
    assert_eq!(json["savingsRate"].as_f64(), Some(80.0));
    assert_eq!(json["transactionCount"], 3);

    // Another month is empty
    let (_, json) = send(
        &app,
        "GET",
        "/api/analytics/monthly-summary?month=11&year=2024",
        None,
        None,
    )
    .await;
    assert_eq!(json["transactionCount"], 0);
    assert_eq!(json["savingsRate"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn test_category_breakdown_and_health() {
    let app = setup_test_app();
    record_december(&app).await;

    let (status, breakdown) = send(
        &app,
        "GET",
        "/api/analytics/category-breakdown?month=12&year=2024",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(breakdown["Food & Dining"]["amount"].as_f64(), Some(600.0));
    assert_eq!(breakdown["Food & Dining"]["color"], "#3B82F6");
    assert!(breakdown.get("Salary").is_none());

    let (status, health) = send(
        &app,
        "GET",
        "/api/analytics/health-score?month=12&year=2024",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // 40 (savings capped) + 24 (expenses at 20% of income) + 30
    assert_eq!(health["score"], 94);
    assert_eq!(health["label"], "Excellent");
}

#[tokio::test]
async fn test_analytics_rejects_invalid_month() {
    let app = setup_test_app();

    let (status, json) = send(
        &app,
        "GET",
        "/api/analytics/monthly-summary?month=13&year=2024",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Month must be between 1 and 12, got 13");
}

#[tokio::test]
async fn test_predictions_and_recommendations() {
    let app = setup_test_app();
    record_december(&app).await;

    let (status, predictions) = send(&app, "GET", "/api/analytics/predictions", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let predictions = predictions.as_array().unwrap();
    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0]["category"], "Food & Dining");
    assert!(predictions[0]["predictedAmount"].as_i64().is_some());

    let (status, advice) = send(&app, "GET", "/api/analytics/recommendations", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(advice.is_array());
}

#[tokio::test]
async fn test_spending_trend_window() {
    let app = setup_test_app();

    let (status, trend) = send(&app, "GET", "/api/analytics/spending-trend", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let trend = trend.as_array().unwrap();
    assert_eq!(trend.len(), 7);
    assert!(trend.iter().all(|d| d["expenses"] == 0));

    let (_, trend) = send(
        &app,
        "GET",
        "/api/analytics/spending-trend?days=30",
        None,
        None,
    )
    .await;
    assert_eq!(trend.as_array().unwrap().len(), 30);

    let (status, _) = send(
        &app,
        "GET",
        "/api/analytics/spending-trend?days=0",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ========== Error Shape Tests ==========

#[tokio::test]
async fn test_error_responses_are_json() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/transactions/missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    let json = get_body_json(response).await;
    assert_eq!(json, json!({ "error": "Transaction not found" }));
}

#[tokio::test]
async fn test_malformed_query_is_json_error() {
    let app = setup_test_app();

    for uri in [
        "/api/analytics/monthly-summary?month=abc",
        "/api/analytics/spending-trend?days=-3",
        "/api/budgets?month=xx&year=2024",
        "/api/transactions?limit=lots",
    ] {
        let (status, json) = send(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(json["error"].as_str().is_some(), "{}", uri);
    }
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let app = setup_auth_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/signup")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().is_some());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .body(Body::from("email=a@example.com"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let json = get_body_json(response).await;
    assert!(json["error"].as_str().is_some());
}

#[test]
fn test_app_error_from_core_status() {
    use financeflow_core::Error;

    assert_eq!(
        AppError::from_core(Error::InvalidData("bad".into())).status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        AppError::from_core(Error::NotFound("gone".into())).status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        AppError::from_core(Error::Conflict("dup".into())).status(),
        StatusCode::CONFLICT
    );
    assert_eq!(
        AppError::from_core(Error::DataIntegrity("corrupt".into())).status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_serve_refuses_auth_without_secrets() {
    let db = Database::in_memory().unwrap();
    let result = serve(db, "127.0.0.1", 0, None, ServerConfig::default()).await;
    assert!(result.is_err());
}
