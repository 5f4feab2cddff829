//! Bearer-token models: redacted secrets, decoded claims, and the persisted token pair.

pub mod claims;
pub mod secret;
pub mod token_store;

pub use claims::*;
pub use secret::*;
pub use token_store::*;
