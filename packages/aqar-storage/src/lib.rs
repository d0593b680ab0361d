pub mod db;
pub mod leases;
pub mod listings;
pub mod models;
pub mod schema;
pub mod sync_state;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
