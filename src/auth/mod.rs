//! Session authentication
//!
//! Session tokens are HS512 JWTs signed with a shared secret, carrying the
//! local user's database id. They are independent of the provider's own
//! tokens and arrive as `Authorization: Bearer <token>` or as an `authToken`
//! cookie.

pub mod extractors;
pub mod token;

pub use extractors::{AdminOnly, Authenticated};
pub use token::{Claims, SessionTokens, TokenError};
