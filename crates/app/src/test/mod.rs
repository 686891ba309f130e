//! Test support: fixtures, an in-memory backend, and a wired-up context.

pub mod context;
pub mod helpers;
