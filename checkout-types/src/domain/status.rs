//! Payment lifecycle state machine.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DomainError;

/// Lifecycle status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Initial state, set at creation
    Pending,
    Approved,
    /// Terminal
    Rejected,
    /// Terminal
    Cancelled,
}

impl PaymentStatus {
    /// Returns true if no transition may leave this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Rejected | PaymentStatus::Cancelled)
    }
}

impl AsRef<str> for PaymentStatus {
    fn as_ref(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(DomainError::InvalidPayment(format!(
                "Unrecognized payment status: {}",
                other
            ))),
        }
    }
}

/// A requested change of a payment's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Approve,
    Reject,
    Cancel,
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Approve => write!(f, "approve"),
            Transition::Reject => write!(f, "reject"),
            Transition::Cancel => write!(f, "cancel"),
        }
    }
}

/// Evaluates a requested transition against the current status.
///
/// This is the only place the lifecycle table is encoded:
///
/// | current  | approve  | reject   | cancel    |
/// |----------|----------|----------|-----------|
/// | PENDING  | APPROVED | REJECTED | CANCELLED |
/// | APPROVED | error    | error    | CANCELLED |
/// | REJECTED | error    | error    | error     |
/// | CANCELLED| error    | error    | error     |
pub fn attempt(current: PaymentStatus, requested: Transition) -> Result<PaymentStatus, DomainError> {
    use PaymentStatus::*;

    match (current, requested) {
        (Pending, Transition::Approve) => Ok(Approved),
        (Pending, Transition::Reject) => Ok(Rejected),
        (Pending, Transition::Cancel) | (Approved, Transition::Cancel) => Ok(Cancelled),
        (from, requested) => Err(DomainError::InvalidTransition { from, requested }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_transitions() {
        assert_eq!(
            attempt(PaymentStatus::Pending, Transition::Approve).unwrap(),
            PaymentStatus::Approved
        );
        assert_eq!(
            attempt(PaymentStatus::Pending, Transition::Reject).unwrap(),
            PaymentStatus::Rejected
        );
        assert_eq!(
            attempt(PaymentStatus::Pending, Transition::Cancel).unwrap(),
            PaymentStatus::Cancelled
        );
    }

    #[test]
    fn test_approved_can_only_be_cancelled() {
        assert_eq!(
            attempt(PaymentStatus::Approved, Transition::Cancel).unwrap(),
            PaymentStatus::Cancelled
        );
        for t in [Transition::Approve, Transition::Reject] {
            assert!(matches!(
                attempt(PaymentStatus::Approved, t),
                Err(DomainError::InvalidTransition {
                    from: PaymentStatus::Approved,
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for from in [PaymentStatus::Rejected, PaymentStatus::Cancelled] {
            assert!(from.is_terminal());
            for t in [Transition::Approve, Transition::Reject, Transition::Cancel] {
                assert!(attempt(from, t).is_err(), "{} -> {} should fail", from, t);
            }
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "approved".parse::<PaymentStatus>().unwrap(),
            PaymentStatus::Approved
        );
        assert!("PAID".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&PaymentStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }
}
