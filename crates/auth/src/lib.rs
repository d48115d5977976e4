//! `pvz-auth`: token and role boundary.
//!
//! Decoupled from HTTP and storage: the API layer extracts the bearer token
//! and asks a [`JwtValidator`] who the caller is, then [`authorize`]s the role.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod principal;
pub mod roles;

pub use authorize::{authorize, AuthzError};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use jwt::{Hs256Jwt, JwtValidator};
pub use principal::{Principal, PrincipalId};
pub use roles::{Role, UnknownRole};
