//! Listing search and synchronization behind the HTTP surface.
//!
//! [`AqarService`] owns the primary-store handle and the search engine
//! client. The search path is stateless and touches only the engine; the
//! sync path walks the primary store under a run lease and feeds the engine.

pub mod search;
pub mod sync;
pub mod time_serde;

mod error;

pub use error::{Error, Result};
pub use search::{SearchRequest, SearchResponse};
pub use sync::SyncReport;

use std::sync::Arc;

use aqar_config::Config;
use aqar_engine::SearchEngine;
use aqar_storage::db::Db;

pub struct AqarService {
	pub cfg: Config,
	pub db: Db,
	pub engine: Arc<dyn SearchEngine>,
}
impl AqarService {
	pub fn new(cfg: Config, db: Db, engine: Arc<dyn SearchEngine>) -> Self {
		Self { cfg, db, engine }
	}
}
