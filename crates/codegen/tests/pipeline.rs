//! Tests for class synthesis and the full pipeline.

use aicore::Scope;
use aiservice_codegen::{
    BEANS_FILE, BeanManifest, Build, Capabilities, CodegenConfig, ConfigError, Error, HEADER,
    METADATA_FILE, Processor, SOURCE_FILE, Synthesizer, TypeIndex,
};

const SOURCE: &str = r#"
    use crate::model::{Mood, Review};

    pub trait Greeter {
        fn greet(&self, name: &str) -> String;

        fn helper(&self) -> String {
            String::new()
        }
    }

    #[register_ai_service(tools = [Search])]
    #[scope(application)]
    pub trait Assistant: Greeter + Send {
        #[system_message("You are a helpful assistant")]
        #[user_message("Answer: {{question}}")]
        #[retry(max_retries = 3)]
        #[deprecated]
        fn chat(&self, question: String) -> String;

        fn mood(&self, #[memory_id] id: u64, #[user_message] text: String) -> Mood;
    }

    pub trait Critic {
        #[user_message("Review {{it}}")]
        fn review(&self, (a, b): (String, String)) -> Review;
    }

    #[derive(Default)]
    pub struct Search;
"#;

const MODEL: &str = r#"
    pub enum Mood { Happy, Sad }

    pub struct Review {
        #[description("one line summary")]
        pub summary: String,
        pub stars: u8,
    }
"#;

fn index() -> TypeIndex {
    TypeIndex::builder()
        .source("crate", SOURCE)
        .source("crate::model", MODEL)
        .build()
}

// --- naming ---

#[test]
fn implementation_names() {
    let config = CodegenConfig::default();
    let synth = Synthesizer::new(&config).unwrap();
    assert_eq!(synth.implementation_name("crate::Assistant"), "AssistantImpl");
    assert_eq!(
        synth.implementation_name("crate::chat::support::Assistant"),
        "ChatSupportAssistantImpl"
    );
    assert_eq!(synth.implementation_name("crate::r#type::Assistant"), "TypeAssistantImpl");
}

#[test]
fn invalid_runtime_path() {
    let config = CodegenConfig {
        runtime_crate: "not a path".into(),
        ..CodegenConfig::default()
    };
    assert!(matches!(
        Synthesizer::new(&config),
        Err(Error::RuntimePath { .. })
    ));
}

// --- synthesis ---

#[test]
fn generated_source_parses() {
    let generated = Processor::new(CodegenConfig::default())
        .process(&index())
        .unwrap();
    assert!(generated.source.starts_with(HEADER));
    syn::parse_file(&generated.source).unwrap();
}

#[test]
fn implementation_of_each_candidate() {
    let generated = Processor::new(CodegenConfig::default())
        .process(&index())
        .unwrap();
    let source = &generated.source;

    assert!(source.contains("pub struct AssistantImpl"));
    assert!(source.contains("pub struct CriticImpl"));
    assert!(!source.contains("GreeterImpl"));

    assert!(source.contains("impl crate::Assistant for AssistantImpl"));
    assert!(source.contains("impl crate::Greeter for AssistantImpl"));
    assert!(source.contains("fn greet(&self, name: &str) -> String"));
    assert!(!source.contains("fn helper"));
    assert!(source.contains("fn review(&self, arg0: (String, String)) -> crate::model::Review"));
    assert!(source.contains("\"chat(String)\""));
    assert!(source.contains("\"mood(u64,String)\""));
}

#[test]
fn only_passthrough_attributes_are_kept() {
    let generated = Processor::new(CodegenConfig::default())
        .process(&index())
        .unwrap();
    assert!(generated.source.contains("#[retry(max_retries = 3)]"));
    assert!(!generated.source.contains("#[deprecated]"));
    assert!(!generated.source.contains("#[system_message"));
}

#[test]
fn lifecycle_of_registered_services() {
    let generated = Processor::new(CodegenConfig::default())
        .process(&index())
        .unwrap();
    let source = &generated.source;
    assert!(source.contains("impl aiservice_core::ScopedBean for AssistantImpl"));
    assert!(source.contains("aiservice_core::Scope::Application"));
    assert!(source.contains("impl aiservice_core::Closeable for AssistantImpl"));
    assert!(!source.contains("impl aiservice_core::ScopedBean for CriticImpl"));
    assert!(!source.contains("impl aiservice_core::Closeable for CriticImpl"));
    assert!(source.contains("impl aiservice_core::ChatMemoryRemovable for AssistantImpl"));
    assert!(source.contains("impl aiservice_core::ChatMemoryRemovable for CriticImpl"));
}

#[test]
fn custom_runtime_path() {
    let config = CodegenConfig {
        runtime_crate: "crate::ai".into(),
        ..CodegenConfig::default()
    };
    let generated = Processor::new(config).process(&index()).unwrap();
    assert!(generated.source.contains("crate::ai::AiServiceRuntime"));
    assert!(!generated.source.contains("aiservice_core"));
}

// --- metadata ---

#[test]
fn metadata_covers_inherited_methods() {
    let generated = Processor::new(CodegenConfig::default())
        .process(&index())
        .unwrap();
    let metadata = &generated.metadata;
    assert_eq!(
        metadata.interfaces().collect::<Vec<_>>(),
        ["crate::Assistant", "crate::Critic"]
    );

    let greet = metadata
        .method_create_info("crate::Assistant", "greet(&str)")
        .unwrap();
    assert_eq!(greet.interface, "crate::Greeter");
    assert_eq!(greet.user_message.parameter(), Some(0));

    let mood = metadata
        .method_create_info("crate::Assistant", "mood(u64,String)")
        .unwrap();
    assert_eq!(mood.memory_id_position, Some(0));
    assert_eq!(mood.return_type, "crate::model::Mood");

    let review = metadata
        .method_create_info("crate::Critic", "review((String,String))")
        .unwrap();
    assert_eq!(
        review.user_message.output_format_instructions,
        "\nYou must answer strictly in the following JSON format: {\n\"summary\": (one line summary; type: string),\n\"stars\": (type: integer)\n}"
    );
    assert!(metadata.method_create_info("crate::Assistant", "helper()").is_none());
}

#[test]
fn configuration_errors_abort() {
    let index = TypeIndex::builder()
        .source(
            "crate",
            r#"
            trait Assistant {
                #[user_message("Hi")]
                fn chat(&self, q: String);
            }
            "#,
        )
        .build();
    let err = Processor::new(CodegenConfig::default())
        .process(&index)
        .unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::VoidReturn { .. })));
}

// --- beans ---

#[test]
fn bean_manifest() {
    let config = CodegenConfig {
        capabilities: Capabilities {
            metrics: true,
            tracing: true,
        },
        ..CodegenConfig::default()
    };
    let generated = Processor::new(config).process(&index()).unwrap();
    let beans = &generated.beans;

    assert_eq!(beans.plan.beans.len(), 1);
    assert_eq!(beans.plan.beans[0].scope, Scope::Dependent);
    assert!(beans.plan.unremovable.contains("crate::Search"));
    assert!(beans.requested_chat_models.contains("<default>"));
    assert!(!beans.needs_moderation_model);

    assert!(beans.reflective.constructors.contains("AssistantImpl"));
    assert!(beans.reflective.constructors.contains("CriticImpl"));
    assert!(beans.reflective.fields.contains("crate::model::Review"));
    assert!(beans.reflective.types.contains("crate::model::Mood"));
    assert!(!beans.reflective.types.contains("String"));

    assert_eq!(
        beans.additional_beans,
        ["MetricsTimedWrapper", "MetricsCountedWrapper", "SpanWrapper"]
    );
}

#[test]
fn unselected_provider_drops_chat_model() {
    let generated = Processor::new(CodegenConfig::default())
        .chat_model_provider_selected(false)
        .process(&index())
        .unwrap();
    assert!(!generated.beans.plan.unremovable.contains("ChatModel"));
    assert!(generated.beans.additional_beans.is_empty());
}

// --- output ---

#[test]
fn write_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let generated = Processor::new(CodegenConfig::default())
        .process(&index())
        .unwrap();
    generated.write_to(dir.path().join("gen")).unwrap();

    let source = std::fs::read_to_string(dir.path().join("gen").join(SOURCE_FILE)).unwrap();
    assert_eq!(source, generated.source);

    let json = std::fs::read_to_string(dir.path().join("gen").join(METADATA_FILE)).unwrap();
    let metadata = aicore::AiServiceMetadata::from_json(&json).unwrap();
    assert_eq!(metadata, generated.metadata);

    let json = std::fs::read_to_string(dir.path().join("gen").join(BEANS_FILE)).unwrap();
    let beans: BeanManifest = serde_json::from_str(&json).unwrap();
    assert_eq!(beans, generated.beans);
}

#[test]
fn build_from_source_dir() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir_all(src.join("model")).unwrap();
    std::fs::write(src.join("lib.rs"), SOURCE).unwrap();
    std::fs::write(src.join("model").join("mod.rs"), MODEL).unwrap();
    let out = dir.path().join("out");

    let generated = Build::new()
        .src(&src)
        .out_dir(&out)
        .config(CodegenConfig::default())
        .run()
        .unwrap();
    assert_eq!(generated.metadata.len(), 2);
    assert!(out.join(SOURCE_FILE).exists());
    assert!(out.join(METADATA_FILE).exists());
    assert!(out.join(BEANS_FILE).exists());
}
