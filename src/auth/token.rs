//! Token secrets, credential pairs, and cached token records.

pub mod credentials;
pub mod record;
pub mod secret;
