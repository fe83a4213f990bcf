//! Tests for `AiServiceContext`.

use aiservice_core::{AiServiceContext, ChatMemory, ChatMemoryProvider, MemoryId};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

#[derive(Default)]
struct CountingMemory {
    cleared: AtomicUsize,
}

impl ChatMemory for CountingMemory {
    fn clear(&self) {
        self.cleared.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct Provider {
    created: AtomicUsize,
}

impl ChatMemoryProvider for Provider {
    fn get(&self, _id: &MemoryId) -> Arc<dyn ChatMemory> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Arc::new(CountingMemory::default())
    }
}

fn context(provider: Arc<Provider>) -> AiServiceContext {
    AiServiceContext::new("crate::Assistant").with_chat_memory_provider(provider)
}

// --- memory ---

#[test]
fn memory_created_once_per_id() {
    let provider = Arc::new(Provider::default());
    let context = context(provider.clone());
    context.chat_memory(&"a".into()).unwrap();
    context.chat_memory(&"a".into()).unwrap();
    context.chat_memory(&MemoryId::from(7u64)).unwrap();
    assert_eq!(provider.created.load(Ordering::SeqCst), 2);
    assert_eq!(context.chat_memory_count(), 2);
}

#[test]
fn no_provider_no_memory() {
    let context = AiServiceContext::new("crate::Assistant");
    assert!(!context.has_chat_memory_provider());
    assert!(context.chat_memory(&"a".into()).is_none());
}

#[test]
fn remove_clears_only_given_ids() {
    let context = context(Arc::new(Provider::default()));
    context.chat_memory(&"a".into()).unwrap();
    context.chat_memory(&"b".into()).unwrap();
    context.remove_chat_memory_ids(&["a".into(), "missing".into()]);
    assert_eq!(context.chat_memory_count(), 1);
}

// --- close ---

#[test]
fn close_is_idempotent() {
    let context = context(Arc::new(Provider::default()));
    context.chat_memory(&"a".into()).unwrap();
    context.close();
    context.close();
    assert!(context.is_closed());
    assert_eq!(context.chat_memory_count(), 0);
    assert!(context.chat_memory(&"a".into()).is_none());
}

#[test]
fn memory_id_display() {
    assert_eq!(MemoryId::from(-3i64).to_string(), "-3");
    assert_eq!(MemoryId::new("user-1").as_str(), "user-1");
}
