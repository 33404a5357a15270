//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod remote;
mod repository;

pub use remote::{CartLedger, CustomerDirectory, RemoteError, SchedulingLedger};
pub use repository::PaymentRepository;
