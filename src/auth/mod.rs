//! # Authentication Module
//!
//! Credential checks, token issuance and validation, and middleware for securing
//! API endpoints. Both the credential store and the JWT service are immutable
//! once built and are shared by every request.

pub mod credentials;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
