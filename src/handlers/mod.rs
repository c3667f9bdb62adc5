// handlers/mod.rs - Route handlers grouped by access tier
//
// Public (no token) → Protected (bearer token guard)
pub mod protected;
pub mod public;
pub mod system;
