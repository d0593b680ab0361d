use std::sync::Arc;

use aqar_config::Config;
use aqar_engine::http::HttpSearchEngine;
use aqar_service::AqarService;
use aqar_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<AqarService>,
}
impl AppState {
	pub async fn new(config: Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let engine = HttpSearchEngine::new(&config.storage.engine)?;
		let service = AqarService::new(config, db, Arc::new(engine));

		Ok(Self { service: Arc::new(service) })
	}
}
