// handlers/protected/mod.rs - Handlers behind the bearer token guard
//
// Every handler here receives the caller as an `AuthUser` extension and
// talks to Sankhya with that user's session.
pub mod auth;
pub mod inspection;
pub mod tables;
