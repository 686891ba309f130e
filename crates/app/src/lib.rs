//! Storefront App
//!
//! The stateful side of the storefront: persisted session and cart stores, optimistic cart sync
//! against the commerce backend, the checkout orchestrator, and order history with document
//! viewing. Everything is wired through an [`AppContext`](context::AppContext).

pub mod account;
pub mod api;
pub mod blobs;
pub mod cart;
pub mod checkout;
pub mod clock;
pub mod config;
pub mod context;
pub mod history;
pub mod observability;
pub mod session;
pub mod storage;

#[cfg(test)]
mod test;
