//! Handlers for `/api/payments` endpoints.
//!
//! Creating a transaction requires a complete profile and an approved
//! submission. While a payment is Pending the create endpoint returns the
//! existing record instead of opening a second transaction; a Paid payment
//! refuses further attempts. The webhook reconciles provider outcomes and
//! answers 2xx even for unknown orders so the provider stops retrying.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use oprec_core::{
  files::FileStore,
  gateway::{PaymentGateway, TransactionRequest},
  payment::{
    NewPayment, Payment, PaymentStatus, WebhookNotification,
    apply_notification, new_order_id,
  },
  store::RecruitStore,
  verification::VerificationStatus,
};
use serde_json::json;

use crate::{
  AppState,
  auth::{AdminOnly, CurrentUser},
  error::ApiError,
  gateway::verify_signature,
};

/// `POST /api/payments/create`
pub async fn create<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  user: CurrentUser,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  let profile = state
    .store
    .profile(user.applicant_id)
    .await
    .map_err(ApiError::store)?
    .filter(|p| p.is_complete())
    .ok_or_else(|| {
      ApiError::PreconditionFailed(
        "complete your profile before paying".into(),
      )
    })?;

  let latest = state
    .store
    .latest_submission(user.applicant_id)
    .await
    .map_err(ApiError::store)?;
  if !latest.is_some_and(|s| s.status == VerificationStatus::Approved) {
    return Err(ApiError::PreconditionFailed(
      "documents must be approved before paying".into(),
    ));
  }

  if let Some(active) = state
    .store
    .active_payment(user.applicant_id)
    .await
    .map_err(ApiError::store)?
  {
    return match active.status {
      PaymentStatus::Paid => Err(ApiError::Conflict(
        "registration fee has already been paid".into(),
      )),
      // Hand the open transaction back instead of creating another.
      _ => Ok((StatusCode::OK, Json(active))),
    };
  }

  let order_id = new_order_id(Utc::now());
  let created = state
    .gateway
    .create_transaction(TransactionRequest {
      order_id:       order_id.clone(),
      gross_amount:   state.config.registration_fee,
      customer_name:  profile.full_name.clone(),
      customer_email: user.email.clone(),
      customer_phone: profile.whatsapp_number.clone(),
      return_url:     state.config.frontend_url.clone(),
    })
    .await
    .map_err(|e| ApiError::Gateway(e.to_string()))?;

  let payment = state
    .store
    .create_payment(NewPayment {
      order_id,
      applicant_id:       user.applicant_id,
      provider:           "midtrans".into(),
      amount:             state.config.registration_fee,
      payment_url:        Some(created.redirect_url),
      external_reference: Some(created.token),
    })
    .await
    .map_err(ApiError::store)?;

  tracing::info!(order_id = %payment.order_id, "payment transaction opened");
  Ok((StatusCode::CREATED, Json(payment)))
}

/// `POST /api/payments/webhook` — the provider's notification endpoint.
/// Unauthenticated; authenticity comes from the payload signature.
pub async fn webhook<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  Json(notification): Json<WebhookNotification>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  if !verify_signature(&notification, &state.config.gateway_server_key) {
    tracing::warn!(
      order_id = %notification.order_id,
      "webhook signature mismatch"
    );
    return Err(ApiError::Unauthorized);
  }

  let Some(payment) = state
    .store
    .payment(&notification.order_id)
    .await
    .map_err(ApiError::store)?
  else {
    // Unknown order: acknowledge so the provider stops retrying.
    tracing::warn!(
      order_id = %notification.order_id,
      "webhook for unknown order"
    );
    return Ok((StatusCode::OK, Json(json!({ "status": "ignored" }))));
  };

  let next = apply_notification(
    payment.status,
    notification.transaction_status,
    notification.fraud_status,
  );
  let paid_at = if next == PaymentStatus::Paid {
    payment.paid_at.or_else(|| Some(Utc::now()))
  } else {
    None
  };

  if next != payment.status || paid_at != payment.paid_at {
    state
      .store
      .set_payment_status(&notification.order_id, next, paid_at)
      .await
      .map_err(ApiError::store)?;
    tracing::info!(
      order_id = %notification.order_id,
      from = ?payment.status,
      to = ?next,
      "payment reconciled"
    );
  }

  Ok((StatusCode::OK, Json(json!({ "status": "ok" }))))
}

/// `GET /api/payments/admin/list`
pub async fn admin_list<S, G, F>(
  State(state): State<AppState<S, G, F>>,
  _admin: AdminOnly,
) -> Result<Json<Vec<Payment>>, ApiError>
where
  S: RecruitStore + 'static,
  G: PaymentGateway + 'static,
  F: FileStore + 'static,
{
  let payments = state.store.payments().await.map_err(ApiError::store)?;
  Ok(Json(payments))
}
