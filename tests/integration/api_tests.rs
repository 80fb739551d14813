//! API integration tests
//!
//! These run against a live server seeded with an admin/admin account.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to log in and get a token for the given account
async fn get_token(client: &Client, login: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": login,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn get_admin_token(client: &Client) -> String {
    get_token(client, "admin", "admin").await
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "login": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_list_stages_seeded() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let response = client
        .get(format!("{}/stages", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let stages = body.as_array().expect("Expected stage array");
    assert!(stages.len() >= 4);
    assert_eq!(stages[0]["name"], "New");
}

#[tokio::test]
#[ignore]
async fn test_list_requests() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let response = client
        .get(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["items"].is_array());
    assert!(body["total"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_requests_require_auth() {
    let client = Client::new();

    let response = client
        .get(format!("{}/requests", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

/// Full lifecycle: create a request as a user, assign a team technician,
/// start and complete the work as the technician, scrap as admin.
#[tokio::test]
#[ignore]
async fn test_request_lifecycle() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let auth = |token: &str| format!("Bearer {}", token);

    // Fixture accounts
    let suffix = std::process::id();
    let tech_login = format!("tech-{}", suffix);
    let user_login = format!("user-{}", suffix);

    let technician: Value = client
        .post(format!("{}/users", BASE_URL))
        .header("Authorization", auth(&admin_token))
        .json(&json!({"login": tech_login, "password": "secret", "role": "technician"}))
        .send()
        .await
        .expect("Failed to create technician")
        .json()
        .await
        .expect("Failed to parse technician");

    let requester: Value = client
        .post(format!("{}/users", BASE_URL))
        .header("Authorization", auth(&admin_token))
        .json(&json!({"login": user_login, "password": "secret", "role": "user"}))
        .send()
        .await
        .expect("Failed to create user")
        .json()
        .await
        .expect("Failed to parse user");

    // Team with the technician as member
    let team: Value = client
        .post(format!("{}/teams", BASE_URL))
        .header("Authorization", auth(&admin_token))
        .json(&json!({"name": format!("team-{}", suffix)}))
        .send()
        .await
        .expect("Failed to create team")
        .json()
        .await
        .expect("Failed to parse team");

    client
        .post(format!("{}/teams/{}/members", BASE_URL, team["id"]))
        .header("Authorization", auth(&admin_token))
        .json(&json!({"user_id": technician["id"]}))
        .send()
        .await
        .expect("Failed to add team member");

    // Equipment defaulting the team, with no default technician
    let equipment: Value = client
        .post(format!("{}/equipment", BASE_URL))
        .header("Authorization", auth(&admin_token))
        .json(&json!({"name": format!("pump-{}", suffix), "team_id": team["id"]}))
        .send()
        .await
        .expect("Failed to create equipment")
        .json()
        .await
        .expect("Failed to parse equipment");

    // The user opens a request; it lands in the initial stage
    let user_token = get_token(&client, &user_login, "secret").await;
    let request: Value = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", auth(&user_token))
        .json(&json!({"subject": "pump is leaking", "equipment_id": equipment["id"]}))
        .send()
        .await
        .expect("Failed to create request")
        .json()
        .await
        .expect("Failed to parse request");

    assert_eq!(request["state"], "new");
    assert_eq!(request["stage_name"], "New");
    assert_eq!(request["team_id"], team["id"]);

    let request_id = request["id"].as_i64().unwrap();

    // Assign the team technician
    let assigned: Value = client
        .post(format!("{}/requests/{}/assign", BASE_URL, request_id))
        .header("Authorization", auth(&admin_token))
        .json(&json!({"technician_id": technician["id"]}))
        .send()
        .await
        .expect("Failed to assign technician")
        .json()
        .await
        .expect("Failed to parse assignment");
    assert_eq!(assigned["technician_id"], technician["id"]);

    // The technician starts the work
    let stages: Value = client
        .get(format!("{}/stages", BASE_URL))
        .header("Authorization", auth(&admin_token))
        .send()
        .await
        .expect("Failed to list stages")
        .json()
        .await
        .expect("Failed to parse stages");
    let in_progress = stages
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "In Progress")
        .expect("No In Progress stage");
    let scrap_stage = stages
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["is_scrap"] == true)
        .expect("No scrap stage");

    let tech_token = get_token(&client, &tech_login, "secret").await;
    let started: Value = client
        .post(format!("{}/requests/{}/stage", BASE_URL, request_id))
        .header("Authorization", auth(&tech_token))
        .json(&json!({"stage_id": in_progress["id"]}))
        .send()
        .await
        .expect("Failed to change stage")
        .json()
        .await
        .expect("Failed to parse stage change");
    assert_eq!(started["state"], "in_progress");

    // The requester cannot complete it
    let forbidden = client
        .post(format!("{}/requests/{}/complete", BASE_URL, request_id))
        .header("Authorization", auth(&user_token))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send complete");
    assert_eq!(forbidden.status(), 403);

    // The assigned technician completes with details
    let completed: Value = client
        .post(format!("{}/requests/{}/complete", BASE_URL, request_id))
        .header("Authorization", auth(&tech_token))
        .json(&json!({"duration": 2.5, "maintenance_cost": "80.00", "note": "replaced the seal"}))
        .send()
        .await
        .expect("Failed to complete request")
        .json()
        .await
        .expect("Failed to parse completion");
    assert_eq!(completed["state"], "repaired");
    assert!(completed["date_end"].is_string());

    // Admin scraps; the equipment goes inactive
    let scrapped: Value = client
        .post(format!("{}/requests/{}/stage", BASE_URL, request_id))
        .header("Authorization", auth(&admin_token))
        .json(&json!({"stage_id": scrap_stage["id"]}))
        .send()
        .await
        .expect("Failed to scrap request")
        .json()
        .await
        .expect("Failed to parse scrap");
    assert_eq!(scrapped["state"], "scrap");

    let equipment_after: Value = client
        .get(format!("{}/equipment/{}", BASE_URL, equipment["id"]))
        .header("Authorization", auth(&admin_token))
        .send()
        .await
        .expect("Failed to fetch equipment")
        .json()
        .await
        .expect("Failed to parse equipment");
    assert_eq!(equipment_after["active"], false);

    // Deleting is refused once the request left the new state
    let delete_response = client
        .delete(format!("{}/requests/{}", BASE_URL, request_id))
        .header("Authorization", auth(&admin_token))
        .send()
        .await
        .expect("Failed to send delete");
    assert_eq!(delete_response.status(), 400);

    // The activity trail covers creation and the three transitions
    let activity: Value = client
        .get(format!("{}/requests/{}/activity", BASE_URL, request_id))
        .header("Authorization", auth(&admin_token))
        .send()
        .await
        .expect("Failed to fetch activity")
        .json()
        .await
        .expect("Failed to parse activity");
    assert!(activity.as_array().unwrap().len() >= 4);
}

#[tokio::test]
#[ignore]
async fn test_user_visibility_is_scoped() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;

    let suffix = std::process::id();
    let login = format!("viewer-{}", suffix);
    client
        .post(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({"login": login, "password": "secret", "role": "user"}))
        .send()
        .await
        .expect("Failed to create user");

    let token = get_token(&client, &login, "secret").await;
    let body: Value = client
        .get(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to list requests")
        .json()
        .await
        .expect("Failed to parse response");

    // A brand new user with no equipment sees nothing
    assert_eq!(body["total"], 0);
}
