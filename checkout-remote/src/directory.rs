//! Customer directory adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use checkout_types::{CustomerDirectory, CustomerId, CustomerSnapshot, RemoteError};

use crate::{map_send_error, trim_base_url};

/// Customer record as served by the account service.
#[derive(Debug, Deserialize)]
struct CustomerRecord {
    id: Option<i64>,
    #[serde(alias = "nome")]
    name: Option<String>,
    #[serde(alias = "cpf")]
    tax_id: Option<String>,
}

/// HTTP client for `GET {base}/api/contas/clientes/{id}`.
pub struct HttpCustomerDirectory {
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl HttpCustomerDirectory {
    /// Creates a directory client on top of a shared HTTP client.
    ///
    /// `timeout` must match the one configured on `http`; it is only used
    /// to report expiries.
    pub fn new(base_url: impl Into<String>, http: Client, timeout: Duration) -> Self {
        Self {
            base_url: trim_base_url(base_url),
            http,
            timeout,
        }
    }
}

#[async_trait]
impl CustomerDirectory for HttpCustomerDirectory {
    #[tracing::instrument(skip(self), fields(customer_id = %id))]
    async fn find_customer(
        &self,
        id: CustomerId,
    ) -> Result<Option<CustomerSnapshot>, RemoteError> {
        let resp = self
            .http
            .get(format!("{}/api/contas/clientes/{}", self.base_url, id))
            .send()
            .await
            .map_err(|e| map_send_error(e, self.timeout))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(RemoteError::Status(resp.status().as_u16()));
        }

        let record: CustomerRecord = resp
            .json()
            .await
            .map_err(|e| map_send_error(e, self.timeout))?;

        // Only a record carrying both a name and a tax id is verified.
        let (name, tax_id) = match (record.name, record.tax_id) {
            (Some(name), Some(tax_id)) if !name.trim().is_empty() && !tax_id.trim().is_empty() => {
                (name, tax_id)
            }
            _ => {
                tracing::debug!("Customer record lacks a name or tax id, treating it as absent");
                return Ok(None);
            }
        };

        Ok(Some(CustomerSnapshot {
            id: record.id.map(CustomerId::new).unwrap_or(id),
            name,
            tax_id,
        }))
    }
}
