// handlers/public/mod.rs - Public handlers (no token required)
//
// Token acquisition only. The guard is not applied to these routes.
pub mod auth;
