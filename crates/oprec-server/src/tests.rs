//! End-to-end API tests: the real router over an in-memory SQLite store,
//! with the payment gateway and file storage mocked out.

use std::{
  convert::Infallible,
  path::PathBuf,
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
};

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use oprec_core::{
  applicant::{Applicant, Registration, Role},
  files::{FileStore, UploadedFile},
  gateway::{CreatedTransaction, PaymentGateway, TransactionRequest},
  store::RecruitStore,
};
use oprec_store_sqlite::{SqliteStore, seed::seed_hierarchy};
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{
  AppState, ServerConfig, auth, auth::AuthConfig,
  gateway::notification_signature, router,
};

const SERVER_KEY: &str = "sk-test";

// ─── Mocks ───────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct MockGateway {
  calls: Arc<AtomicUsize>,
}

impl MockGateway {
  fn call_count(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

impl PaymentGateway for MockGateway {
  type Error = Infallible;

  async fn create_transaction(
    &self,
    request: TransactionRequest,
  ) -> Result<CreatedTransaction, Infallible> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok(CreatedTransaction {
      token:        format!("token-{}", request.order_id),
      redirect_url: format!("https://pay.example.com/{}", request.order_id),
    })
  }
}

#[derive(Clone, Default)]
struct MemFiles;

impl FileStore for MemFiles {
  type Error = Infallible;

  async fn upload(
    &self,
    file:   UploadedFile,
    folder: &str,
  ) -> Result<String, Infallible> {
    Ok(format!("/uploads/{folder}/{}-{}", Uuid::new_v4().simple(), file.filename))
  }

  async fn delete(&self, _url: &str) -> Result<(), Infallible> {
    Ok(())
  }
}

type TestState = AppState<SqliteStore, MockGateway, MemFiles>;

async fn make_state() -> TestState {
  let store = SqliteStore::open_in_memory().await.unwrap();
  seed_hierarchy(&store).await.unwrap();

  AppState {
    store:   Arc::new(store),
    gateway: Arc::new(MockGateway::default()),
    files:   Arc::new(MemFiles),
    config:  Arc::new(ServerConfig {
      host:               "127.0.0.1".to_string(),
      port:               0,
      frontend_url:       "http://localhost:5173".to_string(),
      store_path:         PathBuf::from(":memory:"),
      upload_dir:         std::env::temp_dir().join("oprec-test-uploads"),
      token_secret:       "test-secret".to_string(),
      token_ttl_hours:    24,
      registration_fee:   50_000,
      gateway_base_url:   "http://gateway.invalid".to_string(),
      gateway_server_key: SERVER_KEY.to_string(),
      admin_email:        None,
      admin_password:     None,
    }),
    auth:    Arc::new(AuthConfig {
      token_secret: "test-secret".to_string(),
      token_ttl:    chrono::Duration::hours(24),
    }),
  }
}

// ─── Request helpers ─────────────────────────────────────────────────────────

async fn send(
  state:  &TestState,
  method: &str,
  uri:    &str,
  token:  Option<&str>,
  body:   Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(token) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  let req = match body {
    Some(json) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(json.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = router(state.clone()).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
  };
  (status, value)
}

const BOUNDARY: &str = "oprec-test-boundary";

fn multipart_body(files: &[(&str, &str)], texts: &[(&str, &str)]) -> Body {
  let mut out = String::new();
  for (name, filename) in files {
    out.push_str(&format!(
      "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
       filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n\
       file contents\r\n"
    ));
  }
  for (name, value) in texts {
    out.push_str(&format!(
      "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
    ));
  }
  out.push_str(&format!("--{BOUNDARY}--\r\n"));
  Body::from(out)
}

async fn send_multipart(
  state: &TestState,
  uri:   &str,
  token: &str,
  body:  Body,
) -> (StatusCode, Value) {
  let req = Request::builder()
    .method("POST")
    .uri(uri)
    .header(header::AUTHORIZATION, format!("Bearer {token}"))
    .header(
      header::CONTENT_TYPE,
      format!("multipart/form-data; boundary={BOUNDARY}"),
    )
    .body(body)
    .unwrap();

  let resp = router(state.clone()).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, value)
}

// ─── Scenario helpers ────────────────────────────────────────────────────────

async fn register(state: &TestState, email: &str, nim: &str) -> String {
  let (status, body) = send(
    state,
    "POST",
    "/api/auth/register",
    None,
    Some(json!({
      "email":     email,
      "password":  "s3cret-password",
      "full_name": "Alice Liddell",
      "nim":       nim,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
  body["token"].as_str().unwrap().to_string()
}

async fn make_admin(state: &TestState) -> (Applicant, String) {
  let admin = state
    .store
    .register_applicant(Registration {
      email:         "admin@example.com".into(),
      password_hash: auth::hash_password("adminpass123").unwrap(),
      role:          Role::Admin,
      full_name:     "Administrator".into(),
      nim:           "ADMIN-0001".into(),
    })
    .await
    .unwrap();
  let token = auth::issue_token(&admin, &state.auth).unwrap();
  (admin, token)
}

/// A (department, division, sub-division) triple that satisfies containment.
async fn hierarchy_triple(state: &TestState) -> (Uuid, Uuid, Uuid) {
  let departments = state.store.departments().await.unwrap();
  for department in departments {
    let divisions = state.store.divisions(department.department_id).await.unwrap();
    for division in divisions {
      let subs = state.store.sub_divisions(division.division_id).await.unwrap();
      if let Some(sub) = subs.first() {
        return (
          department.department_id,
          division.division_id,
          sub.sub_division_id,
        );
      }
    }
  }
  panic!("seed produced no full hierarchy path");
}

async fn complete_profile(state: &TestState, token: &str) {
  let (department_id, division_id, sub_division_id) =
    hierarchy_triple(state).await;
  let (status, body) = send(
    state,
    "PATCH",
    "/api/profile/me",
    Some(token),
    Some(json!({
      "whatsapp_number": "+628123456789",
      "study_program":   "Informatics",
      "department_id":   department_id,
      "division_id":     division_id,
      "sub_division_id": sub_division_id,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "profile update failed: {body}");
}

async fn submit_and_approve(state: &TestState, token: &str, admin_token: &str) {
  let (status, body) = send_multipart(
    state,
    "/api/verification/submit",
    token,
    multipart_body(
      &[("study_plan", "plan.pdf"), ("formal_photo", "photo.png")],
      &[("social_link", "https://instagram.com/p/abc")],
    ),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "submit failed: {body}");
  let submission_id = body["submission_id"].as_str().unwrap().to_string();

  let (status, body) = send(
    state,
    "PATCH",
    &format!("/api/verification/admin/review/{submission_id}"),
    Some(admin_token),
    Some(json!({ "decision": "APPROVED" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "review failed: {body}");
}

async fn create_payment(state: &TestState, token: &str) -> Value {
  let (status, body) =
    send(state, "POST", "/api/payments/create", Some(token), None).await;
  assert!(
    status == StatusCode::CREATED || status == StatusCode::OK,
    "payment create failed: {body}"
  );
  body
}

fn settlement_notification(order_id: &str) -> Value {
  json!({
    "order_id":           order_id,
    "transaction_status": "settlement",
    "fraud_status":       null,
    "status_code":        "200",
    "gross_amount":       "50000.00",
    "signature_key":      notification_signature(order_id, "200", "50000.00", SERVER_KEY),
  })
}

async fn dashboard(state: &TestState, token: &str) -> Value {
  let (status, body) =
    send(state, "GET", "/api/dashboard/me", Some(token), None).await;
  assert_eq!(status, StatusCode::OK);
  body
}

// ─── Auth ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_then_login() {
  let state = make_state().await;
  register(&state, "alice@example.com", "24060122001").await;

  let (status, body) = send(
    &state,
    "POST",
    "/api/auth/login",
    None,
    Some(json!({ "email": "alice@example.com", "password": "s3cret-password" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(body["token"].is_string());
  assert_eq!(body["applicant"]["email"], "alice@example.com");
  // The password hash never leaves the server.
  assert!(body["applicant"]["password_hash"].is_null());
}

#[tokio::test]
async fn auth_me_returns_the_token_holder() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;

  let (status, body) =
    send(&state, "GET", "/api/auth/me", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["email"], "alice@example.com");
  assert_eq!(body["role"], "APPLICANT");
  assert!(body["password_hash"].is_null());
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
  let state = make_state().await;
  register(&state, "alice@example.com", "24060122001").await;

  let (status, _) = send(
    &state,
    "POST",
    "/api/auth/login",
    None,
    Some(json!({ "email": "alice@example.com", "password": "wrong-password" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
  let state = make_state().await;
  register(&state, "alice@example.com", "24060122001").await;

  let (status, _) = send(
    &state,
    "POST",
    "/api/auth/register",
    None,
    Some(json!({
      "email":     "alice@example.com",
      "password":  "s3cret-password",
      "full_name": "Other Alice",
      "nim":       "24060122999",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, _) = send(
    &state,
    "POST",
    "/api/auth/register",
    None,
    Some(json!({
      "email":     "bob@example.com",
      "password":  "s3cret-password",
      "full_name": "Bob",
      "nim":       "24060122001",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn short_password_is_rejected() {
  let state = make_state().await;
  let (status, _) = send(
    &state,
    "POST",
    "/api/auth/register",
    None,
    Some(json!({
      "email":     "alice@example.com",
      "password":  "short",
      "full_name": "Alice",
      "nim":       "24060122001",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
  let state = make_state().await;
  for uri in [
    "/api/profile/me",
    "/api/dashboard/me",
    "/api/verification/me",
    "/api/timeline",
  ] {
    let (status, _) = send(&state, "GET", uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
  }
}

// ─── Profile ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn profile_starts_incomplete_then_completes() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;

  let body = dashboard(&state, &token).await;
  assert_eq!(body["progress"]["current_step"], 1);
  assert_eq!(body["progress"]["percentage"], 0);

  complete_profile(&state, &token).await;

  let body = dashboard(&state, &token).await;
  assert_eq!(body["progress"]["current_step"], 2);
  assert_eq!(body["progress"]["percentage"], 25);
  assert_eq!(body["steps"][0]["is_completed"], true);
}

#[tokio::test]
async fn mismatched_hierarchy_selection_is_rejected() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;

  // A division paired with a department that is not its parent.
  let departments = state.store.departments().await.unwrap();
  let foreign_department = departments
    .iter()
    .find(|d| d.name == "Organisational")
    .unwrap();
  let operational = departments.iter().find(|d| d.name == "Operational").unwrap();
  let division = &state
    .store
    .divisions(operational.department_id)
    .await
    .unwrap()[0];

  let (status, _) = send(
    &state,
    "PATCH",
    "/api/profile/me",
    Some(&token),
    Some(json!({
      "department_id": foreign_department.department_id,
      "division_id":   division.division_id,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_division_is_rejected() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;

  let (status, _) = send(
    &state,
    "PATCH",
    "/api/profile/me",
    Some(&token),
    Some(json!({ "division_id": Uuid::new_v4() })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn avatar_upload_sets_the_url() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;

  let body = format!(
    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"avatar\"; \
     filename=\"me.png\"\r\nContent-Type: image/png\r\n\r\npng bytes\r\n--{BOUNDARY}--\r\n"
  );
  let (status, body) =
    send_multipart(&state, "/api/profile/me/avatar", &token, Body::from(body)).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert!(
    body["avatar_url"]
      .as_str()
      .unwrap()
      .starts_with("/uploads/avatars/")
  );
}

// ─── Verification ────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_requires_a_complete_profile() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;

  let (status, _) = send_multipart(
    &state,
    "/api/verification/submit",
    &token,
    multipart_body(&[("study_plan", "plan.pdf")], &[]),
  )
  .await;
  assert_eq!(status, StatusCode::PRECONDITION_FAILED);
}

#[tokio::test]
async fn review_requires_admin_role() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;

  let (status, _) = send(
    &state,
    "GET",
    "/api/verification/admin/list",
    Some(&token),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn rejection_without_a_reason_is_rejected() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;
  let (_, admin_token) = make_admin(&state).await;
  complete_profile(&state, &token).await;

  let (_, body) = send_multipart(
    &state,
    "/api/verification/submit",
    &token,
    multipart_body(&[("study_plan", "plan.pdf")], &[]),
  )
  .await;
  let submission_id = body["submission_id"].as_str().unwrap();

  let (status, _) = send(
    &state,
    "PATCH",
    &format!("/api/verification/admin/review/{submission_id}"),
    Some(&admin_token),
    Some(json!({ "decision": "REJECTED" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reviewing_twice_conflicts() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;
  let (_, admin_token) = make_admin(&state).await;
  complete_profile(&state, &token).await;
  submit_and_approve(&state, &token, &admin_token).await;

  let submission = state
    .store
    .submissions(None)
    .await
    .unwrap()
    .into_iter()
    .next()
    .unwrap();
  let (status, _) = send(
    &state,
    "PATCH",
    &format!("/api/verification/admin/review/{}", submission.submission_id),
    Some(&admin_token),
    Some(json!({ "decision": "REJECTED", "rejection_reason": "late" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn verification_me_reports_the_latest_state() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;

  let (status, body) =
    send(&state, "GET", "/api/verification/me", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "NOT_STARTED");

  complete_profile(&state, &token).await;
  send_multipart(
    &state,
    "/api/verification/submit",
    &token,
    multipart_body(&[("study_plan", "plan.pdf")], &[]),
  )
  .await;

  let (_, body) =
    send(&state, "GET", "/api/verification/me", Some(&token), None).await;
  assert_eq!(body["status"], "PENDING");
}

// ─── Payments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn payment_requires_approved_documents() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;
  complete_profile(&state, &token).await;

  let (status, _) =
    send(&state, "POST", "/api/payments/create", Some(&token), None).await;
  assert_eq!(status, StatusCode::PRECONDITION_FAILED);
}

#[tokio::test]
async fn payment_create_is_idempotent_while_pending() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;
  let (_, admin_token) = make_admin(&state).await;
  complete_profile(&state, &token).await;
  submit_and_approve(&state, &token, &admin_token).await;

  let first = create_payment(&state, &token).await;
  let second = create_payment(&state, &token).await;

  assert_eq!(first["order_id"], second["order_id"]);
  assert_eq!(first["payment_url"], second["payment_url"]);
  // Only the first request reached the gateway.
  assert_eq!(state.gateway.call_count(), 1);
}

#[tokio::test]
async fn paying_twice_conflicts() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;
  let (_, admin_token) = make_admin(&state).await;
  complete_profile(&state, &token).await;
  submit_and_approve(&state, &token, &admin_token).await;

  let payment = create_payment(&state, &token).await;
  let order_id = payment["order_id"].as_str().unwrap();

  let (status, _) = send(
    &state,
    "POST",
    "/api/payments/webhook",
    None,
    Some(settlement_notification(order_id)),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) =
    send(&state, "POST", "/api/payments/create", Some(&token), None).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn webhook_with_a_bad_signature_is_rejected() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;
  let (_, admin_token) = make_admin(&state).await;
  complete_profile(&state, &token).await;
  submit_and_approve(&state, &token, &admin_token).await;

  let payment = create_payment(&state, &token).await;
  let order_id = payment["order_id"].as_str().unwrap().to_string();

  let mut notification = settlement_notification(&order_id);
  notification["signature_key"] = json!("deadbeef");
  let (status, _) =
    send(&state, "POST", "/api/payments/webhook", None, Some(notification)).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  // Nothing changed.
  let payment = state.store.payment(&order_id).await.unwrap().unwrap();
  assert_eq!(payment.status, oprec_core::payment::PaymentStatus::Pending);
}

#[tokio::test]
async fn webhook_for_an_unknown_order_is_acknowledged() {
  let state = make_state().await;
  let (status, body) = send(
    &state,
    "POST",
    "/api/payments/webhook",
    None,
    Some(settlement_notification("OR-20260801-unknown")),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "ignored");
}

#[tokio::test]
async fn stale_pending_webhook_does_not_regress_paid() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;
  let (_, admin_token) = make_admin(&state).await;
  complete_profile(&state, &token).await;
  submit_and_approve(&state, &token, &admin_token).await;

  let payment = create_payment(&state, &token).await;
  let order_id = payment["order_id"].as_str().unwrap().to_string();

  send(
    &state,
    "POST",
    "/api/payments/webhook",
    None,
    Some(settlement_notification(&order_id)),
  )
  .await;

  let mut stale = settlement_notification(&order_id);
  stale["transaction_status"] = json!("pending");
  let (status, _) =
    send(&state, "POST", "/api/payments/webhook", None, Some(stale)).await;
  assert_eq!(status, StatusCode::OK);

  let stored = state.store.payment(&order_id).await.unwrap().unwrap();
  assert_eq!(stored.status, oprec_core::payment::PaymentStatus::Paid);
  assert!(stored.paid_at.is_some());
}

// ─── Full walkthrough ────────────────────────────────────────────────────────

#[tokio::test]
async fn full_recruitment_walkthrough() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;
  let (_, admin_token) = make_admin(&state).await;

  // Step 1 → 2: complete the profile.
  complete_profile(&state, &token).await;
  let body = dashboard(&state, &token).await;
  assert_eq!(body["progress"]["current_step"], 2);

  // Step 2 → 3: submit and get approved.
  submit_and_approve(&state, &token, &admin_token).await;
  let body = dashboard(&state, &token).await;
  assert_eq!(body["progress"]["current_step"], 3);
  assert_eq!(body["progress"]["percentage"], 50);
  assert_eq!(body["steps"][1]["status"], "APPROVED");

  // Step 3 → 4: pay and settle.
  let payment = create_payment(&state, &token).await;
  let order_id = payment["order_id"].as_str().unwrap().to_string();
  send(
    &state,
    "POST",
    "/api/payments/webhook",
    None,
    Some(settlement_notification(&order_id)),
  )
  .await;

  let body = dashboard(&state, &token).await;
  assert_eq!(body["progress"]["current_step"], 4);
  assert_eq!(body["progress"]["percentage"], 75);
  assert_eq!(body["steps"][2]["status"], "PAID");
  // The exam step never auto-completes.
  assert_eq!(body["steps"][3]["is_completed"], false);

  let stored = state.store.payment(&order_id).await.unwrap().unwrap();
  assert!(stored.paid_at.is_some());
}

// ─── Timeline ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn timeline_mutation_is_admin_only() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;

  let (status, _) = send(
    &state,
    "POST",
    "/api/timeline",
    Some(&token),
    Some(json!({
      "title":       "Interview",
      "start_at":    "2026-09-01T09:00:00Z",
      "end_at":      "2026-09-01T17:00:00Z",
      "order_index": 0,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn timeline_crud() {
  let state = make_state().await;
  let token = register(&state, "alice@example.com", "24060122001").await;
  let (_, admin_token) = make_admin(&state).await;

  let (status, created) = send(
    &state,
    "POST",
    "/api/timeline",
    Some(&admin_token),
    Some(json!({
      "title":       "Interview",
      "description": "Panel interview",
      "start_at":    "2026-09-01T09:00:00Z",
      "end_at":      "2026-09-01T17:00:00Z",
      "order_index": 1,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let event_id = created["event_id"].as_str().unwrap().to_string();

  let (status, updated) = send(
    &state,
    "PATCH",
    &format!("/api/timeline/{event_id}"),
    Some(&admin_token),
    Some(json!({ "title": "Final interview" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["title"], "Final interview");
  assert_eq!(updated["description"], "Panel interview");

  // Applicants can read the timeline.
  let (status, events) =
    send(&state, "GET", "/api/timeline", Some(&token), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(events.as_array().unwrap().len(), 1);

  let (status, _) = send(
    &state,
    "DELETE",
    &format!("/api/timeline/{event_id}"),
    Some(&admin_token),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = send(
    &state,
    "DELETE",
    &format!("/api/timeline/{event_id}"),
    Some(&admin_token),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn timeline_rejects_an_inverted_interval() {
  let state = make_state().await;
  let (_, admin_token) = make_admin(&state).await;

  let (status, _) = send(
    &state,
    "POST",
    "/api/timeline",
    Some(&admin_token),
    Some(json!({
      "title":       "Interview",
      "start_at":    "2026-09-02T09:00:00Z",
      "end_at":      "2026-09-01T09:00:00Z",
      "order_index": 0,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Uploads ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upload_paths_cannot_traverse() {
  let state = make_state().await;
  let (status, _) =
    send(&state, "GET", "/uploads/avatars/..%2F..%2Fconfig.toml", None, None)
      .await;
  assert_ne!(status, StatusCode::OK);
}
