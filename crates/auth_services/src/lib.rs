//! # Auth Services
//!
//! This crate provides request authentication for the reservation platform.
//! Token minting lives in the account service; this crate verifies bearer
//! tokens, attaches the caller's identity and role to the request, and
//! exposes extractors for the handler layer.

/// JWT encoding and verification.
pub mod jwt;
/// Middleware and request extractors for authenticated identities.
pub mod middleware;
/// Roles, claims, and authentication error types.
pub mod types;

pub use jwt::JwtService;
pub use middleware::{AuthMiddleware, AuthenticatedUser, MaybeUser, OperatorUser};
pub use types::{AuthContext, AuthError, Claims, Role};
