//! Bearer-token authentication and caller identity.

mod helpers;
mod identity;
mod middleware;
mod token;

pub use helpers::extract_bearer_token;
pub use identity::{IdentityError, IdentityProvider, StoreIdentityProvider};
pub use middleware::RequireUser;
pub use token::{GeneratedToken, TokenGenerator, parse_token};
