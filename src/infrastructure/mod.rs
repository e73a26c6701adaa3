//! Infrastructure layer - storage, credentials, tokens, sessions and observability

pub mod auth;
pub mod logging;
pub mod observability;
pub mod session;
pub mod storage;
pub mod user;
