//! IBM watsonx.ai.

use aicore::ModelKind;

/// watsonx.ai chat models.
#[derive(Debug, Clone, Copy, Default)]
pub struct Watsonx;

impl Watsonx {
    pub const NAME: &'static str = "watsonx";
    pub const FEATURE: &'static str = "aiservice-watsonx";

    pub fn capabilities(&self) -> &'static [ModelKind] {
        &[ModelKind::Chat]
    }

    pub fn bean_kinds(&self, kind: ModelKind) -> &'static [ModelKind] {
        match kind {
            ModelKind::Chat => &[ModelKind::Chat],
            _ => &[],
        }
    }
}
