//! # Checkout Client SDK
//!
//! A typed Rust client for the Checkout API.

use checkout_types::{
    CheckoutRequest, CreatePaymentRequest, CustomerId, Payment, PaymentId, PaymentQuery, UserId,
};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Checkout API client.
pub struct CheckoutClient {
    base_url: String,
    http: Client,
}

impl CheckoutClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Uses a preconfigured reqwest client (timeouts, proxies).
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Checks out everything `customer_id` owes.
    pub async fn checkout(
        &self,
        customer_id: CustomerId,
        requesting_user_id: UserId,
        idempotency_key: Option<String>,
    ) -> Result<Payment, ClientError> {
        let req = CheckoutRequest {
            requesting_user_id,
            idempotency_key,
        };
        self.send_json(
            Method::POST,
            &format!("/api/payments/checkout/{}", customer_id),
            Some(&req),
        )
        .await
    }

    /// Creates a payment directly.
    pub async fn create_payment(&self, req: &CreatePaymentRequest) -> Result<Payment, ClientError> {
        self.send_json(Method::POST, "/api/payments", Some(req)).await
    }

    /// Gets a payment by ID.
    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment, ClientError> {
        self.send_json::<_, ()>(Method::GET, &format!("/api/payments/{}", id), None)
            .await
    }

    /// Lists payments, narrowed by at most one field of `query`.
    pub async fn list_payments(&self, query: &PaymentQuery) -> Result<Vec<Payment>, ClientError> {
        let resp = self
            .http
            .get(format!("{}/api/payments", self.base_url))
            .query(query)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    pub async fn approve_payment(&self, id: PaymentId) -> Result<Payment, ClientError> {
        self.transition(id, "approve").await
    }

    pub async fn reject_payment(&self, id: PaymentId) -> Result<Payment, ClientError> {
        self.transition(id, "reject").await
    }

    pub async fn cancel_payment(&self, id: PaymentId) -> Result<Payment, ClientError> {
        self.transition(id, "cancel").await
    }

    /// Deletes a payment regardless of its status.
    pub async fn delete_payment(&self, id: PaymentId) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(format!("{}/api/payments/{}", self.base_url, id))
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(resp).await)
        }
    }

    async fn transition(&self, id: PaymentId, action: &str) -> Result<Payment, ClientError> {
        self.send_json::<_, ()>(
            Method::PUT,
            &format!("/api/payments/{}/{}", id, action),
            None,
        )
        .await
    }

    async fn send_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        if resp.status().is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            Err(Self::api_error(resp).await)
        }
    }

    async fn api_error(resp: reqwest::Response) -> ClientError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or(body);
        ClientError::Api { status, message }
    }
}
