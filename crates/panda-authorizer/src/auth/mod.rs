//! Authentication pipeline pieces: cookie decoding, signature
//! verification, claims decoding and validation.

pub mod claims;
pub mod cookie;
pub mod crypto;
pub mod validate;
