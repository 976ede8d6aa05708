//! Resolution and eligibility rules for referenced asset URLs.
//!
//! Splitting the two concerns keeps them independently testable: `resolve`
//! turns a URL into a contained absolute path (or a traversal error), while
//! `filters` decides whether a reference should be processed at all.

mod filters;
mod resolve;

pub use filters::{FilterMode, is_derived, is_eligible};
pub use resolve::resolve_reference;
