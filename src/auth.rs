//! Auth-domain models: redacted secrets, credential pairs, cached tokens, scope sets,
//! and bearer extraction.

pub mod bearer;
pub mod scope;
pub mod token;

pub use bearer::*;
pub use scope::*;
pub use token::{credentials::*, record::*, secret::*};
