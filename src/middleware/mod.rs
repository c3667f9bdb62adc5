pub mod auth;
pub mod rate_limit;

pub use auth::{authorize_bearer, token_auth_middleware, AuthUser};
pub use rate_limit::{rate_limit_middleware, RateLimiter};
