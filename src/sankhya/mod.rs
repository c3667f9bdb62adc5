//! Sankhya ERP integration: upstream client, token lifecycle and the
//! read-only query gateway every table endpoint goes through.

pub mod client;
pub mod error;
pub mod gateway;
pub mod inspection;
pub mod token_cache;
pub mod trim;
pub mod validator;

pub use client::{HttpUpstream, LoginResponse, SankhyaUpstream};
pub use error::{SankhyaError, UpstreamFailure};
pub use gateway::{FallbackCredential, SankhyaGateway, SankhyaSession};
pub use inspection::{extract_module_info, ModuleInfo, TableInfo, TableInspector};
pub use token_cache::{CachedToken, TokenCache};
pub use validator::validate_query;
