//! Keysmith Types
//!
//! Shared value types for keysets: key identifiers, lifecycle status,
//! algorithm families and the serialized record layouts used by
//! crypto providers and the persistence layer.

pub mod error;
pub mod key;
pub mod records;

pub use error::*;
pub use key::*;
pub use records::*;
