//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use checkout_types::domain::{
    OrderReference, Payment, PaymentId, PaymentMethod, PaymentStatus, UserId,
};
use checkout_types::dto::{CheckoutRequest, CreatePaymentRequest, ErrorResponse, PaymentQuery};
use utoipa::OpenApi;

// Path documentation stubs; the real handlers live in `inbound::handlers`.

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Check out everything a customer owes
///
/// Resolves the customer, sums the cart subtotal and the pending appointment
/// charges, and records one PENDING PIX payment for the total. A cart or
/// scheduling outage counts that source as zero.
#[utoipa::path(
    post,
    path = "/api/payments/checkout/{customer_id}",
    tag = "checkout",
    params(
        ("customer_id" = i64, Path, description = "Customer identifier")
    ),
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Pending payment created", body = Payment),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 409, description = "Idempotency key used for another customer or user", body = ErrorResponse),
        (status = 422, description = "Nothing to pay", body = ErrorResponse),
        (status = 502, description = "Customer could not be resolved", body = ErrorResponse)
    )
)]
async fn checkout() {}

/// Create a payment directly
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment created", body = Payment),
        (status = 400, description = "Invalid payment", body = ErrorResponse),
        (status = 409, description = "Idempotency key used for another customer or user", body = ErrorResponse)
    )
)]
async fn create_payment() {}

/// List payments
#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "payments",
    params(PaymentQuery),
    responses(
        (status = 200, description = "Matching payments", body = Vec<Payment>),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    )
)]
async fn list_payments() {}

/// Get payment by ID
#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    tag = "payments",
    params(
        ("id" = PaymentId, Path, description = "Payment ID (UUID)")
    ),
    responses(
        (status = 200, description = "Payment details", body = Payment),
        (status = 404, description = "Payment not found", body = ErrorResponse)
    )
)]
async fn get_payment() {}

/// Approve a pending payment
#[utoipa::path(
    put,
    path = "/api/payments/{id}/approve",
    tag = "payments",
    params(
        ("id" = PaymentId, Path, description = "Payment ID (UUID)")
    ),
    responses(
        (status = 200, description = "Payment approved", body = Payment),
        (status = 404, description = "Payment not found", body = ErrorResponse),
        (status = 409, description = "Payment is not pending", body = ErrorResponse)
    )
)]
async fn approve_payment() {}

/// Reject a pending payment
#[utoipa::path(
    put,
    path = "/api/payments/{id}/reject",
    tag = "payments",
    params(
        ("id" = PaymentId, Path, description = "Payment ID (UUID)")
    ),
    responses(
        (status = 200, description = "Payment rejected", body = Payment),
        (status = 404, description = "Payment not found", body = ErrorResponse),
        (status = 409, description = "Payment is not pending", body = ErrorResponse)
    )
)]
async fn reject_payment() {}

/// Cancel a pending or approved payment
#[utoipa::path(
    put,
    path = "/api/payments/{id}/cancel",
    tag = "payments",
    params(
        ("id" = PaymentId, Path, description = "Payment ID (UUID)")
    ),
    responses(
        (status = 200, description = "Payment cancelled", body = Payment),
        (status = 404, description = "Payment not found", body = ErrorResponse),
        (status = 409, description = "Payment is rejected or already cancelled", body = ErrorResponse)
    )
)]
async fn cancel_payment() {}

/// Delete a payment regardless of status
#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    tag = "payments",
    params(
        ("id" = PaymentId, Path, description = "Payment ID (UUID)")
    ),
    responses(
        (status = 204, description = "Payment deleted"),
        (status = 404, description = "Payment not found", body = ErrorResponse)
    )
)]
async fn delete_payment() {}

/// OpenAPI documentation for the Checkout API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Checkout Service API",
        version = "1.0.0",
        description = "Aggregates a customer's cart and pending appointments into one payment and manages the payment lifecycle (PENDING, APPROVED, REJECTED, CANCELLED).",
        license(name = "MIT"),
    ),
    paths(
        health,
        checkout,
        create_payment,
        list_payments,
        get_payment,
        approve_payment,
        reject_payment,
        cancel_payment,
        delete_payment,
    ),
    components(
        schemas(
            Payment,
            PaymentId,
            PaymentMethod,
            PaymentStatus,
            OrderReference,
            UserId,
            CheckoutRequest,
            CreatePaymentRequest,
            ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "checkout", description = "Customer checkout"),
        (name = "payments", description = "Payment records and lifecycle transitions"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/health",
            "/api/payments/checkout/{customer_id}",
            "/api/payments",
            "/api/payments/{id}",
            "/api/payments/{id}/approve",
            "/api/payments/{id}/reject",
            "/api/payments/{id}/cancel",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {}",
                expected
            );
        }
    }
}
