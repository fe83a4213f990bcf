//! Tests for the `AiServiceMetadata` table.

use aiservice_core::{
    AiServiceMetadata, ClassCreateInfo, MethodDescriptor, TemplateInfo, UserMessageInfo,
};
use std::collections::BTreeMap;

fn descriptor(method: &str) -> MethodDescriptor {
    MethodDescriptor {
        interface: "crate::assistant::Assistant".into(),
        method: method.into(),
        parameter_count: 1,
        bindings: BTreeMap::from([("question".to_owned(), 0), ("it".to_owned(), 0)]),
        system_message: Some(TemplateInfo {
            template: "Be helpful".into(),
        }),
        user_message: UserMessageInfo::from_parameter(0, None, ""),
        memory_id_position: None,
        requires_moderation: false,
        return_type: "String".into(),
        metrics_timed: None,
        metrics_counted: None,
        span: None,
    }
}

fn table() -> AiServiceMetadata {
    let methods = BTreeMap::from([("chat(String)".to_owned(), descriptor("chat"))]);
    AiServiceMetadata::new(BTreeMap::from([(
        "crate::assistant::Assistant".to_owned(),
        ClassCreateInfo::new("AssistantAssistantImpl", methods),
    )]))
}

// --- lookup ---

#[test]
fn lookup_by_interface_and_method_id() {
    let table = table();
    let info = table
        .method_create_info("crate::assistant::Assistant", "chat(String)")
        .unwrap();
    assert_eq!(info.method, "chat");
    assert_eq!(info.binding("it"), Some(0));
    assert_eq!(info.user_message.parameter(), Some(0));
}

#[test]
fn lookup_misses() {
    let table = table();
    assert!(table.method_create_info("crate::assistant::Assistant", "chat()").is_none());
    assert!(table.method_create_info("crate::Other", "chat(String)").is_none());
}

#[test]
fn interfaces_listed() {
    let table = table();
    assert_eq!(table.len(), 1);
    assert!(!table.is_empty());
    assert_eq!(
        table.interfaces().collect::<Vec<_>>(),
        vec!["crate::assistant::Assistant"]
    );
    assert_eq!(
        table.class("crate::assistant::Assistant").unwrap().implementation,
        "AssistantAssistantImpl"
    );
}

// --- serialization ---

#[test]
fn json_survives_reload() {
    let table = table();
    let json = table.to_json().unwrap();
    assert_eq!(AiServiceMetadata::from_json(&json).unwrap(), table);
}

#[test]
fn json_is_keyed_by_interface() {
    let json = table().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let methods = &value["crate::assistant::Assistant"]["methods"];
    assert_eq!(methods["chat(String)"]["user_message"]["source"]["kind"], "parameter");
    assert!(methods["chat(String)"].get("span").is_none());
}

#[test]
fn invalid_json_rejected() {
    let err = AiServiceMetadata::from_json("[1, 2]").unwrap_err();
    assert!(err.to_string().contains("invalid ai service metadata"));
}

#[test]
fn templated_user_message() {
    let info = UserMessageInfo::from_template(
        TemplateInfo {
            template: "Tell me about {{it}}".into(),
        },
        Some(1),
        "\nYou must answer strictly in the following format: integer number",
    );
    assert_eq!(info.template().unwrap().template, "Tell me about {{it}}");
    assert_eq!(info.parameter(), None);
    assert_eq!(info.user_name_position, Some(1));
}
