//! Tests for the type index and name resolution.

use aiservice_codegen::{
    CodegenConfig, TypeIndex, TypeKind, format_instructions,
    index::{AnnotationValue, Resolver, type_text},
};
use syn::parse_quote;

// --- resolution ---

#[test]
fn resolve_local_and_imported_names() {
    let mut resolver = Resolver::new("crate::chat");
    resolver.declare("Answer");
    resolver.import(&parse_quote!(super::model::{Mood, Review as Critique}));
    resolver.import(&parse_quote!(std::collections::BTreeMap));

    let ty = resolver.resolve_type(&parse_quote!(BTreeMap<String, Vec<Answer>>));
    assert_eq!(
        type_text(&ty),
        "std::collections::BTreeMap<String,Vec<crate::chat::Answer>>"
    );
    let ty = resolver.resolve_type(&parse_quote!(Option<Critique>));
    assert_eq!(type_text(&ty), "Option<crate::model::Review>");
    let ty = resolver.resolve_type(&parse_quote!(&'a mut Mood));
    assert_eq!(type_text(&ty), "&'a mut crate::model::Mood");
    let ty = resolver.resolve_type(&parse_quote!(self::Answer));
    assert_eq!(type_text(&ty), "crate::chat::Answer");
}

#[test]
fn module_paths_of_files() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path();
    std::fs::create_dir_all(src.join("chat")).unwrap();
    std::fs::create_dir_all(src.join("bin")).unwrap();
    std::fs::write(src.join("lib.rs"), "pub trait Root {}").unwrap();
    std::fs::write(src.join("chat").join("mod.rs"), "pub trait Chat {}").unwrap();
    std::fs::write(src.join("chat").join("memory.rs"), "pub trait Memory {}").unwrap();
    std::fs::write(src.join("bin").join("tool.rs"), "trait Tool {}").unwrap();
    std::fs::write(src.join("notes.txt"), "not rust").unwrap();

    let index = TypeIndex::builder().dir(src).unwrap().build();
    let names = index.types().map(|t| t.name.as_str()).collect::<Vec<_>>();
    assert_eq!(
        names,
        ["crate::Root", "crate::Tool", "crate::chat::Chat", "crate::chat::memory::Memory"]
    );
}

// --- declarations ---

#[test]
fn inline_modules_and_supertraits() {
    let index = TypeIndex::builder()
        .source(
            "crate",
            r#"
            mod base {
                pub trait Named {
                    fn name(&self) -> String;
                }

                pub trait Greeter: Named {
                    fn greet(&self, who: String) -> String;
                }
            }

            use base::Greeter;

            trait Assistant: Greeter + Clone {
                fn chat(&self, q: String) -> String;
            }
            "#,
        )
        .build();
    let assistant = index.get("crate::Assistant").unwrap();
    assert_eq!(assistant.supertraits, ["crate::base::Greeter", "Clone"]);
    let parents = index
        .all_supertraits("crate::Assistant")
        .into_iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(parents, ["crate::base::Greeter", "crate::base::Named"]);
}

#[test]
fn no_arg_constructors() {
    let index = TypeIndex::builder()
        .source(
            "crate",
            r#"
            struct Unit;

            #[derive(Debug, Default)]
            struct Derived { a: u8 }

            struct Manual { a: u8 }
            impl Default for Manual {
                fn default() -> Self { Self { a: 1 } }
            }

            struct Inherent { a: u8 }
            impl Inherent {
                fn new() -> Inherent { Inherent { a: 1 } }
            }

            struct Argument { a: u8 }
            impl Argument {
                fn new(a: u8) -> Self { Self { a } }
            }
            "#,
        )
        .build();
    for name in ["Unit", "Derived", "Manual", "Inherent"] {
        let decl = index.get(&format!("crate::{name}")).unwrap();
        assert!(decl.no_arg_constructor, "{name}");
    }
    assert!(!index.get("crate::Argument").unwrap().no_arg_constructor);
}

#[test]
fn unparsable_files_are_skipped() {
    let index = TypeIndex::builder()
        .source("crate::broken", "trait {")
        .source("crate", "trait Fine {}")
        .build();
    assert!(index.get("crate::Fine").is_some());
    assert_eq!(index.types().count(), 1);
}

#[test]
fn annotation_values() {
    let index = TypeIndex::builder()
        .source(
            "crate",
            r#"
            use tools::Search;

            #[register_ai_service(tools = [Search], model_name = "fast", temperature = 0.5, retries = -2, on)]
            trait Assistant {}
            "#,
        )
        .build();
    let decl = index.get("crate::Assistant").unwrap();
    assert_eq!(decl.kind, TypeKind::Trait);
    let annotation = decl.annotation("register_ai_service").unwrap();
    assert_eq!(
        annotation.value("tools").unwrap().as_class_array(),
        ["tools::Search"]
    );
    assert_eq!(annotation.string("model_name"), Some("fast"));
    assert_eq!(annotation.value("temperature"), Some(&AnnotationValue::Float(0.5)));
    assert_eq!(annotation.value("retries"), Some(&AnnotationValue::Int(-2)));
    assert!(annotation.flag("on"));
    assert!(!annotation.flag("off"));
}

// --- output instructions ---

fn instructions(src: &str, ty: syn::Type) -> String {
    let index = TypeIndex::builder().source("crate", src).build();
    format_instructions(&ty, &index)
}

#[test]
fn instructions_for_std_types() {
    assert_eq!(instructions("", parse_quote!(String)), "");
    assert_eq!(
        instructions("", parse_quote!(bool)),
        "\nYou must answer strictly in the following format: one of [true, false]"
    );
    assert_eq!(
        instructions("", parse_quote!(Option<u32>)),
        "\nYou must answer strictly in the following format: integer number"
    );
    assert_eq!(
        instructions("", parse_quote!(Result<f64, Error>)),
        "\nYou must answer strictly in the following format: floating point number"
    );
    assert_eq!(
        instructions("", parse_quote!(Vec<String>)),
        "\nYou must put every item on a separate line."
    );
    assert_eq!(instructions("", parse_quote!(crate::Unknown)), "");
}

#[test]
fn instructions_for_indexed_types() {
    let src = r#"
        pub enum Kind { Bug, Feature }

        pub struct Ticket {
            pub title: String,
            #[description("labels to apply")]
            pub labels: Vec<String>,
            pub kind: Kind,
            pub estimate: Option<f32>,
        }
    "#;
    assert_eq!(
        instructions(src, parse_quote!(crate::Kind)),
        "\nYou must answer strictly in the following format: one of [Bug, Feature]"
    );
    assert_eq!(
        instructions(src, parse_quote!(Box<crate::Ticket>)),
        "\nYou must answer strictly in the following JSON format: {\n\
         \"title\": (type: string),\n\
         \"labels\": (labels to apply; type: array of string),\n\
         \"kind\": (type: enum, must be one of [Bug, Feature]),\n\
         \"estimate\": (type: number)\n\
         }"
    );
}

// --- configuration ---

#[test]
fn config_defaults_and_overrides() {
    let config = CodegenConfig::from_toml(
        r#"
        impl_suffix = "Service"
        passthrough_prefixes = ["retry"]

        [capabilities]
        metrics = true
        "#,
    )
    .unwrap();
    assert_eq!(config.impl_suffix, "Service");
    assert_eq!(config.runtime_crate, "aiservice_core");
    assert!(config.capabilities.metrics);
    assert!(!config.capabilities.tracing);
    assert!(config.is_passthrough("retry"));
    assert!(!config.is_passthrough("timeout"));
    assert!(config.is_transparent("validate"));
    assert!(config.is_transparent("garde::length"));
    assert!(config.is_transparent("checks::not_null"));
    assert!(!config.is_transparent("v"));
}

#[test]
fn config_from_manifest_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aiservice.toml");
    std::fs::write(
        &path,
        r#"
        [codegen]
        framework_prefixes = ["crate::framework"]

        [providers.azure_openai]
        enabled = true
        "#,
    )
    .unwrap();
    let config = CodegenConfig::from_manifest(&path).unwrap();
    assert!(config.is_framework("crate::framework::wiring"));
    assert!(!config.is_framework("crate::app"));
    assert!(CodegenConfig::from_toml("impl_suffix = 1").is_err());
}
