use crate::{
    domain::common::{NutriscanConfig, entities::app_errors::CoreError, services::Service},
    infrastructure::llm::GatewayLLMClient,
};

pub type NutriscanService = Service<GatewayLLMClient>;

pub fn create_service(config: NutriscanConfig) -> Result<NutriscanService, CoreError> {
    let llm_client = GatewayLLMClient::new(&config.llm)?;

    if config.llm.api_key.is_none() {
        tracing::warn!("LLM API key is not configured, chat requests will be rejected");
    }

    Ok(Service::new(llm_client))
}
