pub mod connection;
pub mod models;
pub mod repositories;
pub mod transaction;

pub use connection::*;
pub use models::*;
pub use repositories::*;
pub use transaction::*;
