//! # SimpleWAF Auth
//!
//! Token issuance and verification for the SimpleWAF management API.
//!
//! - [`claims`]: The claim set carried by every access token
//! - [`jwt`]: [`TokenCodec`], which signs and verifies HS256 tokens
//!
//! Claims only describe the user at issuance time. Anything that gates
//! access (role, disabled flag, pending password reset) must be re-read from
//! the user store on every request.

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{IssuedToken, TokenCodec, TokenError};
