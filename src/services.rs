//! Typed dashboard endpoints implemented on [`ApiClient`](crate::client::ApiClient).

pub mod auth;
pub mod payment;

pub use auth::*;
pub use payment::*;
