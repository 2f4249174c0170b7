//! Core domain types for the authgate authentication gateway.
//!
//! This crate holds the pure pieces of the multi-datacenter OAuth bridge:
//! - [`DcRecord`]: the regional endpoint a login was issued from
//! - [`DcRegistry`]: the allow-list every captured endpoint is checked against
//! - [`CanonicalProfile`]: the provider profile normalized for downstream sign-in
//! - [`AuthorizationCode`] / [`AccessToken`]: secret wrappers that never print in full
//!
//! Nothing here performs I/O.

pub mod dc;
pub mod profile;
pub mod registry;
pub mod secret;

pub use dc::DcRecord;
pub use profile::{CanonicalProfile, ProfileError};
pub use registry::{DcRegistry, RegistryError};
pub use secret::{AccessToken, AuthorizationCode};
