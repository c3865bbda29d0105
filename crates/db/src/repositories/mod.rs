//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod artist_repo;
pub mod like_repo;
pub mod token_repo;
pub mod track_repo;
pub mod user_repo;

pub use artist_repo::ArtistRepo;
pub use like_repo::LikeRepo;
pub use token_repo::TokenRepo;
pub use track_repo::TrackRepo;
pub use user_repo::UserRepo;
