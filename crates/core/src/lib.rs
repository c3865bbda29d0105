//! Spookify domain core.
//!
//! Pure domain logic with no I/O: shared id/timestamp types, the domain
//! error enum, track listing validation, the duration wire format, and
//! account activation tokens. Both the repository layer and the HTTP layer
//! depend on this crate.

pub mod activation;
pub mod duration;
pub mod error;
pub mod listing;
pub mod types;
