//! Checkout orchestrator
//!
//! Drives a [`CheckoutSession`] from editing through review to a placed order. Validation,
//! payment labels and payload construction live in [`storefront::checkout`]; this module adds
//! the backend calls, profile persistence, document generation and upload around them.

pub mod errors;
pub mod service;

pub use errors::{CheckoutError, friendly_order_error};
pub use service::{CheckoutSession, CheckoutStep, CompletedOrder, GeneratedDocument};
