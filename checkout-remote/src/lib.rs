//! # Checkout Remote
//!
//! Outbound adapters for the services a checkout reads from:
//! - `directory` - customer directory (mandatory dependency)
//! - `cart` - shopping-cart subtotal (best-effort)
//! - `scheduling` - pending appointment charges (best-effort)
//!
//! Every adapter issues one request per call with a finite timeout and
//! maps transport, status and payload failures into [`RemoteError`].
//! None of them retries.

use std::time::Duration;

use checkout_types::RemoteError;
use reqwest::Client;

mod cart;
mod directory;
mod scheduling;

pub use cart::HttpCartLedger;
pub use directory::HttpCustomerDirectory;
pub use scheduling::HttpSchedulingLedger;

/// Builds a shared HTTP client whose every request expires after `timeout`.
pub fn http_client(timeout: Duration) -> Result<Client, RemoteError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RemoteError::Transport(e.to_string()))
}

/// Maps a reqwest failure, keeping timeouts distinguishable.
pub(crate) fn map_send_error(err: reqwest::Error, timeout: Duration) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout(timeout)
    } else if err.is_decode() {
        RemoteError::Malformed(err.to_string())
    } else {
        RemoteError::Transport(err.to_string())
    }
}

pub(crate) fn trim_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_base_url() {
        assert_eq!(trim_base_url("http://cart:3000/"), "http://cart:3000");
        assert_eq!(trim_base_url("http://cart:3000"), "http://cart:3000");
    }
}
