//! URL encode/decode, query parsing, path-pattern matching, and MIME classification.
//! Kept as independently testable free-function modules rather than inlined into
//! [`crate::req::Request`].

pub mod encode;
pub mod mime;
pub mod path;
pub mod query;
