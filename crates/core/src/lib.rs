//! Storefront
//!
//! Cart, checkout and billing-document core for the STATIC storefront. Everything in this crate is
//! synchronous and free of I/O: the stateful client lives in `storefront-app`.

pub mod cart;
pub mod checkout;
pub mod documents;
pub mod money;
pub mod orders;
pub mod payments;
pub mod products;
pub mod snapshot;
pub mod users;
pub mod wire;
