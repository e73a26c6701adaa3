//! Authentication infrastructure module
//!
//! JWT token codec and the auth flow controller built on the user and session
//! services.

mod jwt;
mod service;

pub use jwt::{JwtClaims, JwtConfig, JwtService, TokenCodec, DEV_ACCESS_SECRET, DEV_REFRESH_SECRET};
pub use service::{AuthService, SigninResult};

#[cfg(test)]
pub use jwt::MockTokenCodec;
