//! Model provider wiring.
//!
//! Every provider offers model capabilities as candidates, one per model
//! kind, unless disabled in configuration. Selection picks one provider per
//! requested model and the selected providers emit the synthetic model beans
//! the container creates at run-time init.

pub use {
    azure_openai::AzureOpenAi,
    config::{KindToggles, LoadError, NamedSelection, ProvidersConfig, Selection, Toggle},
    provider::{Provider, ProviderKind, model_bean},
    select::{Candidate, Requests, SelectedModel, SelectionError, Wiring, candidates, select, wire},
    watsonx::Watsonx,
};

mod azure_openai;
mod config;
mod provider;
mod select;
mod watsonx;
