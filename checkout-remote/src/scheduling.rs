//! Scheduling service adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use checkout_types::{CustomerId, PendingCharge, RemoteError, SchedulingLedger};

use crate::{map_send_error, trim_base_url};

#[derive(Debug, Deserialize)]
struct AppointmentCharge {
    id: Option<i64>,
    #[serde(alias = "valorServico")]
    charge: Option<Decimal>,
}

/// HTTP client for `GET {base}/agendamentos/cliente/{id}/pendentes`.
pub struct HttpSchedulingLedger {
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl HttpSchedulingLedger {
    pub fn new(base_url: impl Into<String>, http: Client, timeout: Duration) -> Self {
        Self {
            base_url: trim_base_url(base_url),
            http,
            timeout,
        }
    }
}

#[async_trait]
impl SchedulingLedger for HttpSchedulingLedger {
    #[tracing::instrument(skip(self), fields(customer_id = %id))]
    async fn pending_charges(&self, id: CustomerId) -> Result<Vec<PendingCharge>, RemoteError> {
        let resp = self
            .http
            .get(format!(
                "{}/agendamentos/cliente/{}/pendentes",
                self.base_url, id
            ))
            .send()
            .await
            .map_err(|e| map_send_error(e, self.timeout))?;

        if !resp.status().is_success() {
            return Err(RemoteError::Status(resp.status().as_u16()));
        }

        let items: Vec<AppointmentCharge> = resp
            .json()
            .await
            .map_err(|e| map_send_error(e, self.timeout))?;

        Ok(items
            .into_iter()
            .map(|item| PendingCharge {
                appointment_id: item.id,
                charge: item.charge,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server;
    use axum::{Json, Router, extract::Path, http::StatusCode, routing::get};
    use rust_decimal_macros::dec;

    const TIMEOUT: Duration = Duration::from_millis(500);

    fn ledger(base_url: String) -> HttpSchedulingLedger {
        HttpSchedulingLedger::new(base_url, crate::http_client(TIMEOUT).unwrap(), TIMEOUT)
    }

    async fn scheduling_server() -> String {
        let router = Router::new().route(
            "/agendamentos/cliente/{id}/pendentes",
            get(|Path(id): Path<i64>| async move {
                match id {
                    42 => Ok(Json(serde_json::json!([
                        { "id": 1, "valorServico": 50.00 },
                        { "id": 2, "valorServico": 30.00 },
                        { "id": 3, "valorServico": null }
                    ]))),
                    43 => Ok(Json(serde_json::json!({ "unexpected": "object" }))),
                    _ => Err(StatusCode::SERVICE_UNAVAILABLE),
                }
            }),
        );
        test_server::serve(router).await
    }

    #[tokio::test]
    async fn test_pending_charges_are_not_aggregated() {
        let ledger = ledger(scheduling_server().await);

        let charges = ledger.pending_charges(CustomerId::new(42)).await.unwrap();

        assert_eq!(charges.len(), 3);
        assert_eq!(charges[0].charge, Some(dec!(50.00)));
        assert_eq!(charges[2].appointment_id, Some(3));
        assert_eq!(charges[2].charge, None);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_malformed() {
        let ledger = ledger(scheduling_server().await);

        let result = ledger.pending_charges(CustomerId::new(43)).await;

        assert!(matches!(result, Err(RemoteError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_unavailable_is_status() {
        let ledger = ledger(scheduling_server().await);

        let result = ledger.pending_charges(CustomerId::new(7)).await;

        assert!(matches!(result, Err(RemoteError::Status(503))));
    }
}
