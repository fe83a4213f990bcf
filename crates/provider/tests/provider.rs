//! Tests for provider candidates, selection and bean wiring.

use aicore::{BeanSupplier, ModelKind, Qualifier, Scope};
use aiservice_provider::{
    Candidate, Provider, ProviderKind, ProvidersConfig, Requests, SelectionError, candidates,
    select, wire,
};

fn config(toml: &str) -> ProvidersConfig {
    ProvidersConfig::from_toml(toml).unwrap()
}

fn chat_requests(names: &[&str]) -> Requests {
    Requests {
        chat_models: names.iter().map(|n| n.to_string()).collect(),
        ..Requests::default()
    }
}

// --- candidates ---

#[test]
fn every_capability_by_default() {
    let found = candidates(&Provider::all(), &ProvidersConfig::default());
    assert_eq!(
        found,
        [
            Candidate {
                provider: "azure-openai".into(),
                kind: ModelKind::Chat
            },
            Candidate {
                provider: "azure-openai".into(),
                kind: ModelKind::Embedding
            },
            Candidate {
                provider: "watsonx".into(),
                kind: ModelKind::Chat
            },
        ]
    );
}

#[test]
fn disabled_kinds_are_not_offered() {
    let config = config(
        r#"
        [providers.azure-openai.chat_model]
        enabled = false

        [providers.watsonx.embedding_model]
        enabled = true
        "#,
    );
    let found = candidates(&Provider::all(), &config);
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|c| !(c.provider == "azure-openai" && c.kind == ModelKind::Chat)));
}

#[test]
fn provider_names() {
    for provider in Provider::all() {
        assert_eq!(ProviderKind::from_name(provider.name()), Some(provider.kind()));
    }
    assert_eq!(ProviderKind::from_name("openai"), None);
    assert_eq!(Provider::of(ProviderKind::Watsonx).feature(), "aiservice-watsonx");
}

// --- selection ---

#[test]
fn single_candidate_is_selected() {
    let providers = [Provider::of(ProviderKind::Watsonx)];
    let found = candidates(&providers, &ProvidersConfig::default());
    let selected = select(&found, ModelKind::Chat, "<default>", &ProvidersConfig::default());
    assert_eq!(selected.unwrap(), "watsonx");
}

#[test]
fn single_candidate_conflicting_with_configuration() {
    let providers = [Provider::of(ProviderKind::Watsonx)];
    let config = config("[selection]\nchat_model = \"azure-openai\"");
    let found = candidates(&providers, &config);
    let err = select(&found, ModelKind::Chat, "<default>", &config).unwrap_err();
    assert_eq!(
        err,
        SelectionError::Unavailable {
            bean: "ChatModel",
            requested: "azure-openai".into(),
            available: "watsonx".into(),
        }
    );
}

#[test]
fn several_candidates_need_configuration() {
    let found = candidates(&Provider::all(), &ProvidersConfig::default());
    let err = select(&found, ModelKind::Chat, "<default>", &ProvidersConfig::default()).unwrap_err();
    assert_eq!(
        err,
        SelectionError::Ambiguous {
            bean: "ChatModel",
            key: "selection.chat_model".into(),
            available: "azure-openai, watsonx".into(),
        }
    );
    assert!(err.to_string().contains("'selection.chat_model'"));

    let config = config("[selection]\nchat_model = \"watsonx\"");
    assert_eq!(select(&found, ModelKind::Chat, "<default>", &config).unwrap(), "watsonx");
}

#[test]
fn unknown_configured_provider() {
    let config = config("[selection]\nchat_model = \"openai\"");
    let found = candidates(&Provider::all(), &config);
    let err = select(&found, ModelKind::Chat, "<default>", &config).unwrap_err();
    assert!(matches!(err, SelectionError::Unknown { ref requested, .. } if requested == "openai"));
}

#[test]
fn no_candidate() {
    let found = candidates(&Provider::all(), &ProvidersConfig::default());
    let err = select(&found, ModelKind::Moderation, "<default>", &ProvidersConfig::default()).unwrap_err();
    assert_eq!(err, SelectionError::NoProvider { bean: "ModerationModel" });
}

#[test]
fn named_models_override_the_default_selection() {
    let config = config(
        r#"
        [selection]
        chat_model = "azure-openai"

        [selection.named.fast]
        chat_model = "watsonx"
        "#,
    );
    let found = candidates(&Provider::all(), &config);
    assert_eq!(select(&found, ModelKind::Chat, "fast", &config).unwrap(), "watsonx");
    assert_eq!(select(&found, ModelKind::Chat, "slow", &config).unwrap(), "azure-openai");
    assert_eq!(
        select(&found, ModelKind::Chat, "<default>", &config).unwrap(),
        "azure-openai"
    );
}

// --- wiring ---

#[test]
fn azure_chat_yields_streaming_bean() {
    let providers = [Provider::of(ProviderKind::AzureOpenAi)];
    let wiring = wire(&providers, &ProvidersConfig::default(), &chat_requests(&["<default>"])).unwrap();
    let types = wiring
        .beans
        .iter()
        .map(|b| b.bean_type.as_str())
        .collect::<Vec<_>>();
    assert_eq!(types, ["ChatModel", "StreamingChatModel"]);

    let bean = &wiring.beans[0];
    assert_eq!(bean.scope, Scope::Application);
    assert!(bean.default_bean);
    assert!(bean.runtime_init);
    assert!(bean.qualifiers.is_empty());
    assert_eq!(
        bean.supplier,
        BeanSupplier::Model {
            provider: "azure-openai".into(),
            model: ModelKind::Chat,
            model_name: "<default>".into(),
        }
    );
}

#[test]
fn named_models_are_qualified() {
    let config = config("[selection]\nchat_model = \"watsonx\"\nembedding_models = [\"docs\"]");
    let requests = Requests {
        embedding_models: ["docs".to_owned()].into(),
        ..chat_requests(&["fast"])
    };
    let wiring = wire(&Provider::all(), &config, &requests).unwrap();
    assert_eq!(wiring.selected.len(), 2);
    assert_eq!(wiring.beans.len(), 2);

    let embedding = wiring
        .beans
        .iter()
        .find(|b| b.bean_type == "EmbeddingModel")
        .unwrap();
    assert_eq!(embedding.qualifiers, [Qualifier::ModelName("docs".into())]);

    let chat = wiring.beans.iter().find(|b| b.bean_type == "ChatModel").unwrap();
    assert_eq!(chat.qualifiers, [Qualifier::ModelName("fast".into())]);
    assert!(matches!(&chat.supplier, BeanSupplier::Model { provider, .. } if provider == "watsonx"));
}

#[test]
fn moderation_request_without_provider_fails() {
    let requests = Requests {
        moderation: true,
        ..Requests::default()
    };
    let err = wire(&Provider::all(), &ProvidersConfig::default(), &requests).unwrap_err();
    assert!(matches!(err, SelectionError::NoProvider { .. }));
}

// --- configuration ---

#[test]
fn load_ignores_other_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aiservice.toml");
    std::fs::write(
        &path,
        r#"
        [codegen]
        impl_suffix = "Service"

        [providers.watsonx.chat_model]
        enabled = false
        "#,
    )
    .unwrap();
    let config = ProvidersConfig::load(&path).unwrap();
    assert!(!config.enabled("watsonx", ModelKind::Chat));
    assert!(config.enabled("watsonx", ModelKind::Embedding));
    assert!(config.enabled("azure-openai", ModelKind::Chat));
    assert!(ProvidersConfig::load(dir.path().join("missing.toml")).is_err());
}
