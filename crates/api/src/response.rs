//! Shared response envelope types for API handlers.
//!
//! Single resources use a `{ "data": ... }` envelope; track listings add a
//! `message` and pagination `metadata` next to `data`.

use serde::Serialize;
use spookify_core::listing::PageMetadata;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "message": ... }` body for operations with nothing to return.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// One page of a listing with its pagination metadata.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub message: String,
    pub metadata: PageMetadata,
    pub data: Vec<T>,
}
