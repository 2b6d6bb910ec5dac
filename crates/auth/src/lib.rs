//! `stockflow-auth` — authentication boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: password
//! hashing, claims, and token mint/validate live here; the API layer wires
//! them into requests, and identity storage goes through `UserRepository`.

pub mod claims;
pub mod password;
pub mod roles;
pub mod token;
pub mod user;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use password::{PasswordError, hash_password, verify_password};
pub use roles::Role;
pub use token::{Hs256TokenAuthority, TokenAuthority, TokenError};
pub use user::{User, UserRepository};
