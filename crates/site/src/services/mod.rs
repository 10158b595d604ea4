//! Business logic services for the site.
//!
//! # Services
//!
//! - `auth` - Admin credential checks and session tokens
//! - `blob` - Image uploads to blob storage

pub mod auth;
pub mod blob;

pub use auth::{AuthError, Claims, CredentialVerifier, LoginOutcome, TokenCodec};
pub use blob::{BlobError, BlobStore, VercelBlobStore};
