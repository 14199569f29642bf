//! Session credentials and ownership checks.

pub mod ownership;
pub mod token;

pub use ownership::is_owner;
pub use token::{SessionClaim, TokenIssuer, TokenKeys, TokenVerifier, VerifyError};
