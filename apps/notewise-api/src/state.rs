use std::sync::Arc;

use notewise_service::{NotewiseService, Providers};
use notewise_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<NotewiseService>,
}
impl AppState {
	pub async fn new(config: notewise_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let providers = Providers::from_config(&config)?;
		let service = NotewiseService::new(config, Arc::new(db), providers);

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: NotewiseService) -> Self {
		Self { service: Arc::new(service) }
	}
}
