//! Pan-domain session authorizer library.
//!
//! Decides, per request, whether an inbound signed session cookie authorizes
//! the request, and on whose behalf. The pipeline fetches the current public
//! verification key, splits the cookie into message and signature, verifies
//! the RSA signature, decodes the message into claims, and validates those
//! claims against policy (expiry, organization domain, multi-factor flag).
//! Every failure path converges to a logged Deny decision.
//!
//! # Architecture
//!
//! ```text
//! authorizer.rs -> auth/cookie.rs -> key_source.rs -> auth/crypto.rs
//!               -> auth/claims.rs -> auth/validate.rs -> policy.rs
//! ```
//!
//! # Modules
//!
//! - `config` - Stage detection and configuration from environment
//! - `errors` - Error taxonomy (all recoverable at the decision boundary)
//! - `auth` - Cookie decoding, signature verification, claims validation
//! - `key_source` - Public key retrieval from the settings endpoint
//! - `policy` - Gateway request/response envelope types
//! - `authorizer` - Pipeline composition

pub mod auth;
pub mod authorizer;
pub mod config;
pub mod errors;
pub mod key_source;
pub mod policy;

pub use authorizer::{Authorizer, Clock, SystemClock};
pub use config::{Config, Stage};
pub use errors::AuthError;
pub use key_source::{HttpKeySource, KeySource};
pub use policy::{AuthorizerRequest, AuthorizerResponse, Effect};
