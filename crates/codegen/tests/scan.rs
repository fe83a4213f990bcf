//! Tests for candidate discovery.

use aiservice_codegen::{
    CodegenConfig, Discovery, TypeIndex, scan,
    usage::{self, UsageEntry},
};
use std::collections::BTreeSet;

fn index(sources: &[(&str, &str)]) -> TypeIndex {
    sources
        .iter()
        .fold(TypeIndex::builder(), |builder, (module, text)| {
            builder.source(module, *text)
        })
        .build()
}

fn registered(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

const SERVICES: &str = r#"
    pub trait Assistant {
        fn chat(&self, #[memory_id] id: u64, q: String) -> String;
    }

    pub trait Poet {
        fn write(&self, topic: String) -> String;
    }

    pub trait Tagged {
        #[system_message("Be brief")]
        fn chat(&self, q: String) -> String;
    }

    #[created_aware]
    pub trait Aware {
        fn chat(&self, q: String) -> String;
    }

    pub trait Plain {
        fn chat(&self, q: String) -> String;
    }
"#;

// --- usage ---

#[test]
fn builder_chain_with_memory_provider() {
    let index = index(&[
        ("crate::services", SERVICES),
        (
            "crate",
            r#"
            use crate::services::{Assistant, Poet};

            fn wire(memories: Memories) {
                let assistant = AiServices::builder::<dyn Assistant>()
                    .chat_memory_provider(memories)
                    .build();
                let poet = AiServices::<dyn Poet>::builder().build();
            }
            "#,
        ),
    ]);
    let report = usage::analyze(&index, &CodegenConfig::default());
    assert_eq!(
        report.entries,
        [
            UsageEntry {
                service: "crate::services::Assistant".into(),
                chat_memory_provider_used: true,
                site: "<crate>:wire".into(),
            },
            UsageEntry {
                service: "crate::services::Poet".into(),
                chat_memory_provider_used: false,
                site: "<crate>:wire".into(),
            },
        ]
    );
}

#[test]
fn memory_provider_through_bindings() {
    let index = index(&[(
        "crate",
        r#"
        trait Assistant {
            fn chat(&self, q: String) -> String;
        }

        impl Wiring {
            fn wire(&self) {
                let mut builder = AiServices::builder::<dyn Assistant>();
                builder = builder.tools(self.tools());
                let configured = builder.chat_memory_provider(self.memories());
                configured.build()
            }
        }
        "#,
    )]);
    let services = usage::analyze(&index, &CodegenConfig::default()).services();
    assert_eq!(services.get("crate::Assistant"), Some(&true));
}

#[test]
fn memory_provider_on_any_site_counts() {
    let index = index(&[(
        "crate",
        r#"
        trait Assistant {}

        fn first() {
            AiServices::create::<dyn Assistant>(model);
        }

        fn second() {
            AiServices::builder::<dyn Assistant>().chat_memory_provider(p).build();
        }
        "#,
    )]);
    let report = usage::analyze(&index, &CodegenConfig::default());
    assert_eq!(report.entries.len(), 2);
    assert!(!report.entries[0].chat_memory_provider_used);
    assert!(report.services()["crate::Assistant"]);
}

#[test]
fn unknown_service_type_is_skipped() {
    let index = index(&[(
        "crate",
        r#"
        fn wire<T: ?Sized>() {
            let builder = AiServices::builder();
        }
        "#,
    )]);
    assert!(usage::analyze(&index, &CodegenConfig::default()).entries.is_empty());
}

#[test]
fn framework_modules_are_ignored() {
    let index = index(&[(
        "crate::framework::wiring",
        r#"
        fn wire() {
            AiServices::builder::<dyn crate::Assistant>().build();
        }
        "#,
    )]);
    let config = CodegenConfig {
        framework_prefixes: vec!["crate::framework".into()],
        ..CodegenConfig::default()
    };
    assert!(usage::analyze(&index, &config).entries.is_empty());
    assert_eq!(usage::analyze(&index, &CodegenConfig::default()).entries.len(), 1);
}

#[test]
fn sites_in_every_kind_of_function() {
    let index = index(&[(
        "crate",
        r#"
        trait Assistant {}

        fn free() {
            AiServices::create::<dyn Assistant>(model);
        }

        impl Wiring {
            fn method(&self) {
                AiServices::builder::<dyn Assistant>().build();
            }
        }

        trait Factory {
            fn provided(&self) {
                AiServices::builder::<dyn Assistant>().chat_memory_provider(p).build();
            }

            fn required(&self);
        }
        "#,
    )]);
    let report = usage::analyze(&index, &CodegenConfig::default());
    let sites = report
        .entries
        .iter()
        .map(|e| e.site.as_str())
        .collect::<Vec<_>>();
    assert_eq!(sites, ["<crate>:free", "<crate>:method", "<crate>:provided"]);
    assert!(report.entries[2].chat_memory_provider_used);
}

// --- candidates ---

#[test]
fn every_discovery_path() {
    let index = index(&[
        ("crate::services", SERVICES),
        (
            "crate",
            r#"
            use crate::services::Poet;

            fn wire() {
                AiServices::builder::<dyn Poet>().build();
            }
            "#,
        ),
    ]);
    let report = scan(
        &index,
        &CodegenConfig::default(),
        &registered(&["crate::services::Assistant"]),
    );
    let names = report.candidates.keys().map(String::as_str).collect::<Vec<_>>();
    assert_eq!(
        names,
        [
            "crate::services::Assistant",
            "crate::services::Aware",
            "crate::services::Poet",
            "crate::services::Tagged",
        ]
    );

    let assistant = &report.candidates["crate::services::Assistant"];
    assert!(assistant.registered);
    assert!(assistant.discovered_by.contains(&Discovery::Registered));
    assert!(
        report.candidates["crate::services::Aware"]
            .discovered_by
            .contains(&Discovery::CreatedAware)
    );
    assert!(
        report.candidates["crate::services::Poet"]
            .discovered_by
            .contains(&Discovery::Usage)
    );
    assert!(
        report.candidates["crate::services::Tagged"]
            .discovered_by
            .contains(&Discovery::MessageAnnotations)
    );
    assert!(!report.candidates["crate::services::Poet"].registered);
    assert!(report.warnings.is_empty());
}

#[test]
fn memory_id_without_provider_warns() {
    let index = index(&[
        ("crate::services", SERVICES),
        (
            "crate",
            r#"
            fn wire() {
                AiServices::builder::<dyn crate::services::Assistant>().build();
            }
            "#,
        ),
    ]);
    let report = scan(&index, &CodegenConfig::default(), &BTreeSet::new());
    assert!(report.candidates.contains_key("crate::services::Assistant"));
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("#[memory_id]"));
    assert!(report.warnings[0].contains("crate::services::Assistant"));
}

#[test]
fn unusable_types_are_reported() {
    let index = index(&[(
        "crate",
        r#"
        struct Concrete;

        trait Generic<T> {
            #[user_message("{{it}}")]
            fn chat(&self, q: T) -> String;
        }

        fn wire() {
            AiServices::builder::<dyn Missing>().build();
            AiServices::builder::<Concrete>().build();
        }
        "#,
    )]);
    let report = scan(&index, &CodegenConfig::default(), &BTreeSet::new());
    assert!(report.candidates.is_empty());
    assert_eq!(report.warnings.len(), 3);
    assert!(report.warnings.iter().any(|w| w.contains("'Missing'") && w.contains("not found")));
    assert!(report.warnings.iter().any(|w| w.contains("crate::Concrete") && w.contains("not a trait")));
    assert!(report.warnings.iter().any(|w| w.contains("crate::Generic") && w.contains("generic")));
}
