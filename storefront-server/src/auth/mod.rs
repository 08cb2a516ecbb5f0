//! Authentication and authorization
//!
//! - [`JwtService`] - bearer token verification
//! - [`Identity`] / [`CurrentUser`] - request identity
//! - [`require_auth`] / [`require_operator`] / [`require_permission`] - middleware
//! - [`permissions`] - role defaults

pub mod accounts;
pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod permissions;

pub use extractor::{CurrentUser, Identity};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_operator, require_permission};
