//! Shared per-service context.

use crate::{Bean, DeclarativeAiServiceCreateInfo};
use compact_str::CompactString;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// Key selecting one conversation history.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryId(CompactString);

impl MemoryId {
    /// Create a memory id.
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }

    /// The id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemoryId {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl From<String> for MemoryId {
    fn from(value: String) -> Self {
        Self(value.into())
    }
}

impl From<u64> for MemoryId {
    fn from(value: u64) -> Self {
        Self(compact_str::format_compact!("{value}"))
    }
}

impl From<i64> for MemoryId {
    fn from(value: i64) -> Self {
        Self(compact_str::format_compact!("{value}"))
    }
}

/// One conversation history.
pub trait ChatMemory: Send + Sync {
    /// Drop every stored message.
    fn clear(&self);
}

/// Hands out conversation histories by memory id.
pub trait ChatMemoryProvider: Send + Sync {
    /// The history for `id`, created on first use.
    fn get(&self, id: &MemoryId) -> Arc<dyn ChatMemory>;
}

/// Components and conversation state shared by all methods of one service.
///
/// Components are resolved by the container from the injection points of the
/// service's synthetic bean. The context does not serialize access to the
/// components themselves; only the memory map is guarded.
pub struct AiServiceContext {
    service: CompactString,
    create_info: Option<DeclarativeAiServiceCreateInfo>,
    components: BTreeMap<CompactString, Bean>,
    chat_memory_provider: Option<Arc<dyn ChatMemoryProvider>>,
    memories: Mutex<BTreeMap<MemoryId, Arc<dyn ChatMemory>>>,
    closed: AtomicBool,
}

impl AiServiceContext {
    /// Create an empty context for a service.
    pub fn new(service: impl Into<CompactString>) -> Self {
        Self {
            service: service.into(),
            create_info: None,
            components: BTreeMap::new(),
            chat_memory_provider: None,
            memories: Mutex::new(BTreeMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Create the context of a declarative service.
    pub fn declarative(create_info: DeclarativeAiServiceCreateInfo) -> Self {
        let mut context = Self::new(create_info.service.as_str());
        context.create_info = Some(create_info);
        context
    }

    /// Attach a resolved component, keyed by bean type.
    pub fn with_component(mut self, bean_type: impl Into<CompactString>, bean: Bean) -> Self {
        self.components.insert(bean_type.into(), bean);
        self
    }

    /// Attach the chat memory provider.
    pub fn with_chat_memory_provider(mut self, provider: Arc<dyn ChatMemoryProvider>) -> Self {
        self.chat_memory_provider = Some(provider);
        self
    }

    /// Qualified interface name of the service.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Creation info, for declarative services.
    pub fn create_info(&self) -> Option<&DeclarativeAiServiceCreateInfo> {
        self.create_info.as_ref()
    }

    /// A resolved component by bean type.
    pub fn component(&self, bean_type: &str) -> Option<&Bean> {
        self.components.get(bean_type)
    }

    /// Whether a chat memory provider is configured.
    pub fn has_chat_memory_provider(&self) -> bool {
        self.chat_memory_provider.is_some()
    }

    /// The history for `id`, created through the provider on first use.
    ///
    /// Returns `None` when no provider is configured or the context is closed.
    pub fn chat_memory(&self, id: &MemoryId) -> Option<Arc<dyn ChatMemory>> {
        if self.is_closed() {
            return None;
        }
        let provider = self.chat_memory_provider.as_ref()?;
        let mut memories = self.memories.lock();
        let memory = memories
            .entry(id.clone())
            .or_insert_with(|| provider.get(id));
        Some(Arc::clone(memory))
    }

    /// Number of live histories.
    pub fn chat_memory_count(&self) -> usize {
        self.memories.lock().len()
    }

    /// Clear and forget the histories of the given ids.
    pub fn remove_chat_memory_ids(&self, ids: &[MemoryId]) {
        let mut memories = self.memories.lock();
        for id in ids {
            if let Some(memory) = memories.remove(id) {
                memory.clear();
            }
        }
    }

    /// Clear every history. Later calls are no-ops.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let memories = std::mem::take(&mut *self.memories.lock());
        tracing::debug!(
            "closing context of '{}', clearing {} chat memories",
            self.service,
            memories.len()
        );
        for memory in memories.into_values() {
            memory.clear();
        }
    }

    /// Whether [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for AiServiceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiServiceContext")
            .field("service", &self.service)
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .field("memories", &self.memories.lock().len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
