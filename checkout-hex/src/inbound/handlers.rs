//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use checkout_types::{
    AppError, CheckoutRequest, CreatePaymentRequest, CustomerId, ErrorResponse, PaymentId,
    PaymentQuery, PaymentRepository,
};

use crate::openapi::ApiDoc;
use crate::{CheckoutAggregator, PaymentLedger};

/// Application state shared across handlers.
pub struct AppState<R: PaymentRepository> {
    pub ledger: Arc<PaymentLedger<R>>,
    pub checkout: CheckoutAggregator<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::InvalidPayment(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidTransition { .. } | AppError::IdempotencyConflict(_) => {
                StatusCode::CONFLICT
            }
            AppError::NothingPending(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::CustomerUnresolved { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        let body = ErrorResponse {
            error: self.0.kind().to_string(),
            message: self.0.to_string(),
            code: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

fn parse_payment_id(id: &str) -> Result<PaymentId, ApiError> {
    id.parse()
        .map_err(|_| ApiError(AppError::BadRequest(format!("Invalid payment ID: {}", id))))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError(AppError::BadRequest(e.body_text())))
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Serves the OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ─────────────────────────────────────────────────────────────────────────────
// Checkout
// ─────────────────────────────────────────────────────────────────────────────

/// Check out everything a customer owes.
#[tracing::instrument(skip(state, payload), fields(customer_id = %customer_id))]
pub async fn checkout<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(customer_id): Path<String>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let customer_id: CustomerId = customer_id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid customer ID: {}", customer_id)))?;
    let req = json_body(payload)?;

    let payment = state.checkout.checkout(customer_id, req).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

/// Create a payment directly.
#[tracing::instrument(skip(state, payload))]
pub async fn create_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let new = json_body(payload)?
        .into_new_payment()
        .map_err(AppError::from)?;

    let payment = state.ledger.create(new).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// List payments, optionally narrowed by one query parameter.
#[tracing::instrument(skip(state, query))]
pub async fn list_payments<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    query: Result<Query<PaymentQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let filter = query.into_filter()?;

    let payments = state.ledger.list(filter).await?;
    Ok(Json(payments))
}

/// Get payment by ID.
#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn get_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.ledger.get(parse_payment_id(&id)?).await?;
    Ok(Json(payment))
}

/// Approve a pending payment.
#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn approve_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.ledger.approve(parse_payment_id(&id)?).await?;
    Ok(Json(payment))
}

/// Reject a pending payment.
#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn reject_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.ledger.reject(parse_payment_id(&id)?).await?;
    Ok(Json(payment))
}

/// Cancel a pending or approved payment.
#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn cancel_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.ledger.cancel(parse_payment_id(&id)?).await?;
    Ok(Json(payment))
}

/// Delete a payment (administrative, ignores status).
#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn delete_payment<R: PaymentRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.ledger.delete(parse_payment_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
