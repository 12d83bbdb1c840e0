pub mod auth;
pub mod guest_types;
pub mod guests;
pub mod users;
