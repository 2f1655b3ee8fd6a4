pub mod poll_repository;
pub mod response_repository;
pub mod user_repository;

pub use poll_repository::*;
pub use response_repository::*;
pub use user_repository::*;
