//! Tests for generated implementations dispatching through the runtime.

use aicore::{
    AiServiceContext, AiServiceRuntime, Bean, BeanKey, CONTEXT_BEAN_TYPE, ChatMemoryRemovable,
    Closeable, MemoryId, MethodImplementationSupport, MethodInput, Scope, ScopedBean,
    StaticLocator,
};
use aiservice_demo::{Assistant, AssistantImpl, Greeter, Poet, PoetImpl, model::Mood};
use parking_lot::Mutex;
use std::{any::Any, sync::Arc};

/// Records every call and answers with the method name and its text argument.
#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<String>>,
}

impl MethodImplementationSupport for Recorder {
    fn implement(&self, input: MethodInput<'_>) -> Box<dyn Any + Send> {
        let info = input.create_info;
        self.calls.lock().push(format!(
            "{}::{} ctx={}",
            info.interface,
            info.method,
            input.context.is_some()
        ));
        if info.return_type == "crate::model::Mood" {
            return Box::new(Mood::Happy);
        }
        let text = (0..info.parameter_count)
            .find_map(|position| input.param::<String>(position))
            .cloned()
            .unwrap_or_default();
        Box::new(format!("{}:{text}", info.method))
    }
}

fn runtime(recorder: &Arc<Recorder>, context: Option<&Arc<AiServiceContext>>) -> Arc<AiServiceRuntime> {
    let metadata = aiservice_demo::metadata().unwrap();
    let mut locator = StaticLocator::new(recorder.clone());
    if let Some(context) = context {
        let bean: Bean = context.clone();
        locator = locator.with_bean(BeanKey::qualified(CONTEXT_BEAN_TYPE, "crate::Assistant"), bean);
    }
    Arc::new(AiServiceRuntime::new(Arc::new(metadata), Arc::new(locator)))
}

// --- dispatch ---

#[test]
fn registered_service_dispatches_with_context() {
    let recorder = Arc::new(Recorder::default());
    let context = Arc::new(AiServiceContext::new("crate::Assistant"));
    let runtime = runtime(&recorder, Some(&context));

    let bean = runtime
        .construct(&aiservice_demo::constructors(), "crate::Assistant")
        .unwrap();
    let assistant = bean.downcast::<AssistantImpl>().unwrap();
    assert_eq!(assistant.chat("q".into()), "chat:q");
    assert_eq!(assistant.greet("bob"), "greet:bob");
    assert_eq!(assistant.mood(7, "sunny".into()), Mood::Happy);
    assert_eq!(assistant.wave(), "o/");

    assert_eq!(
        *recorder.calls.lock(),
        [
            "crate::Assistant::chat ctx=true",
            "crate::Greeter::greet ctx=true",
            "crate::Assistant::mood ctx=true",
        ]
    );
}

#[test]
fn unbound_service_dispatches_without_context() {
    let recorder = Arc::new(Recorder::default());
    let runtime = runtime(&recorder, None);

    let bean = runtime
        .construct(&aiservice_demo::constructors(), "crate::Poet")
        .unwrap();
    let poet = bean.downcast::<PoetImpl>().unwrap();
    assert_eq!(poet.poem("rust"), "poem:rust");

    let unbound = PoetImpl::unbound(runtime);
    assert_eq!(unbound.poem("crabs"), "poem:crabs");
    assert_eq!(
        *recorder.calls.lock(),
        ["crate::Poet::poem ctx=false", "crate::Poet::poem ctx=false"]
    );
}

// --- lifecycle ---

#[test]
fn registered_service_has_scope_and_closes_its_context() {
    assert_eq!(<AssistantImpl as ScopedBean>::SCOPE, Scope::Application);

    let recorder = Arc::new(Recorder::default());
    let context = Arc::new(AiServiceContext::new("crate::Assistant"));
    let assistant = AssistantImpl::new(runtime(&recorder, None), context.clone());

    assistant.remove(&[MemoryId::from(7u64)]);
    assert!(!context.is_closed());
    assistant.close();
    assert!(context.is_closed());
}

// --- metadata ---

#[test]
fn generated_metadata_and_constructors() {
    let metadata = aiservice_demo::metadata().unwrap();
    assert_eq!(
        metadata.interfaces().collect::<Vec<_>>(),
        ["crate::Assistant", "crate::Poet"]
    );
    let chat = metadata
        .method_create_info("crate::Assistant", "chat(String)")
        .unwrap();
    assert_eq!(chat.binding("question"), Some(0));
    let mood = metadata
        .method_create_info("crate::Assistant", "mood(u64,String)")
        .unwrap();
    assert_eq!(mood.memory_id_position, Some(0));
    assert_eq!(mood.user_message.parameter(), Some(1));

    let constructors = aiservice_demo::constructors();
    let names = constructors
        .iter()
        .map(|c| (c.interface, c.implementation))
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        [("crate::Assistant", "AssistantImpl"), ("crate::Poet", "PoetImpl")]
    );
}
