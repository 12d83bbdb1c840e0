//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod guest_repo;
pub mod guest_type_repo;
pub mod session_repo;
pub mod user_repo;

pub use guest_repo::{GuestRepo, GuestWriteError};
pub use guest_type_repo::GuestTypeRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
