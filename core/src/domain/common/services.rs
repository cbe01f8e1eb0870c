use crate::domain::chat::ports::ChatCompletionClient;

/// Application service. Domain service traits are implemented on it in
/// their own modules.
#[derive(Clone)]
pub struct Service<LLM>
where
    LLM: ChatCompletionClient,
{
    pub(crate) llm_client: LLM,
}

impl<LLM> Service<LLM>
where
    LLM: ChatCompletionClient,
{
    pub fn new(llm_client: LLM) -> Self {
        Self { llm_client }
    }
}
