//! Identity platform management API client.
//!
//! Provides the organization request/response types, secret-key
//! handling and the HTTP client used to create organizations.

pub mod api;
pub mod organization;
pub mod secret;

pub use api::{IdentityApi, IdentityApiError, OrganizationApi, DEFAULT_API_URL};
pub use organization::{CreatedOrganization, NewOrganization};
pub use secret::{KeyEnvironment, SecretKey};
