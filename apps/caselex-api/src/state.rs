use std::sync::Arc;

use caselex_service::CaseSearchService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<CaseSearchService>,
}
impl AppState {
	pub fn new(config: caselex_config::Config) -> color_eyre::Result<Self> {
		let service = CaseSearchService::from_config(config)?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: CaseSearchService) -> Self {
		Self { service: Arc::new(service) }
	}
}
