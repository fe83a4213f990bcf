//! Azure OpenAI.

use aicore::ModelKind;

/// Azure OpenAI chat, streaming chat and embedding models.
#[derive(Debug, Clone, Copy, Default)]
pub struct AzureOpenAi;

impl AzureOpenAi {
    pub const NAME: &'static str = "azure-openai";
    pub const FEATURE: &'static str = "aiservice-azure-openai";

    pub fn capabilities(&self) -> &'static [ModelKind] {
        &[ModelKind::Chat, ModelKind::Embedding]
    }

    /// A selected chat model also yields its streaming variant.
    pub fn bean_kinds(&self, kind: ModelKind) -> &'static [ModelKind] {
        match kind {
            ModelKind::Chat => &[ModelKind::Chat, ModelKind::StreamingChat],
            ModelKind::Embedding => &[ModelKind::Embedding],
            ModelKind::StreamingChat | ModelKind::Moderation => &[],
        }
    }
}
