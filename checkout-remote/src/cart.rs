//! Shopping-cart subtotal adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use checkout_types::{CartLedger, CustomerId, RemoteError};

use crate::{map_send_error, trim_base_url};

#[derive(Debug, Deserialize)]
struct CartEnvelope {
    #[serde(default)]
    success: bool,
    data: Option<CartData>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CartData {
    total: Option<Decimal>,
}

/// HTTP client for `GET {base}/carrinho/{id}`.
pub struct HttpCartLedger {
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl HttpCartLedger {
    pub fn new(base_url: impl Into<String>, http: Client, timeout: Duration) -> Self {
        Self {
            base_url: trim_base_url(base_url),
            http,
            timeout,
        }
    }
}

#[async_trait]
impl CartLedger for HttpCartLedger {
    #[tracing::instrument(skip(self), fields(customer_id = %id))]
    async fn cart_subtotal(&self, id: CustomerId) -> Result<Decimal, RemoteError> {
        let resp = self
            .http
            .get(format!("{}/carrinho/{}", self.base_url, id))
            .send()
            .await
            .map_err(|e| map_send_error(e, self.timeout))?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status(resp.status().as_u16()));
        }

        let envelope: CartEnvelope = resp
            .json()
            .await
            .map_err(|e| map_send_error(e, self.timeout))?;

        if !envelope.success {
            return Err(RemoteError::Unsuccessful(
                envelope
                    .message
                    .unwrap_or_else(|| "cart service returned success=false".into()),
            ));
        }

        envelope
            .data
            .and_then(|data| data.total)
            .ok_or_else(|| RemoteError::Malformed("cart response has no total".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server;
    use axum::{Json, Router, extract::Path, routing::get};
    use rust_decimal_macros::dec;

    const TIMEOUT: Duration = Duration::from_millis(200);

    fn ledger(base_url: String) -> HttpCartLedger {
        HttpCartLedger::new(base_url, crate::http_client(TIMEOUT).unwrap(), TIMEOUT)
    }

    async fn cart_server() -> String {
        let router = Router::new().route(
            "/carrinho/{id}",
            get(|Path(id): Path<i64>| async move {
                match id {
                    42 => Json(serde_json::json!({
                        "success": true,
                        "data": { "idCarrinho": 1, "itens": [], "total": 150.00 }
                    })),
                    43 => Json(serde_json::json!({ "success": false, "message": "nope" })),
                    44 => Json(serde_json::json!({ "success": true, "data": {} })),
                    _ => {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        Json(serde_json::json!({}))
                    }
                }
            }),
        );
        test_server::serve(router).await
    }

    #[tokio::test]
    async fn test_cart_subtotal() {
        let ledger = ledger(cart_server().await);

        let total = ledger.cart_subtotal(CustomerId::new(42)).await.unwrap();

        assert_eq!(total, dec!(150.00));
    }

    #[tokio::test]
    async fn test_unsuccessful_response() {
        let ledger = ledger(cart_server().await);

        let result = ledger.cart_subtotal(CustomerId::new(43)).await;

        assert!(matches!(result, Err(RemoteError::Unsuccessful(msg)) if msg == "nope"));
    }

    #[tokio::test]
    async fn test_missing_total_is_malformed() {
        let ledger = ledger(cart_server().await);

        let result = ledger.cart_subtotal(CustomerId::new(44)).await;

        assert!(matches!(result, Err(RemoteError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_slow_cart_times_out() {
        let ledger = ledger(cart_server().await);

        let result = ledger.cart_subtotal(CustomerId::new(1)).await;

        assert!(matches!(result, Err(RemoteError::Timeout(_))));
    }
}
