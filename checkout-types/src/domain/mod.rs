//! Domain models for the checkout service.

pub mod customer;
pub mod payment;
pub mod status;

pub use customer::{CustomerId, CustomerSnapshot, PendingCharge, UserId};
pub use payment::{NewPayment, OrderReference, Payment, PaymentFilter, PaymentId, PaymentMethod};
pub use status::{PaymentStatus, Transition, attempt};
