pub mod tracks;
pub mod users;
