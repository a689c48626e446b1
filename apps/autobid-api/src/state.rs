use std::sync::Arc;

use autobid_service::AutobidService;
use autobid_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<AutobidService>,
}
impl AppState {
	pub async fn new(config: autobid_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(Self::from_service(AutobidService::new(config, db)))
	}

	pub fn from_service(service: AutobidService) -> Self {
		Self { service: Arc::new(service) }
	}
}
