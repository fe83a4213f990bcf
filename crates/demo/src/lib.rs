//! AI services whose implementations are generated by `build.rs`.

use macros::{ai_service, register_ai_service};

pub mod model {
    /// Mood of a message.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Mood {
        Happy,
        Sad,
    }
}

use model::Mood;

pub trait Greeter {
    fn greet(&self, name: &str) -> String;

    fn wave(&self) -> String {
        "o/".to_owned()
    }
}

#[register_ai_service(tools = [Search])]
#[scope(application)]
pub trait Assistant: Greeter + Send + Sync {
    #[system_message("You are a helpful assistant")]
    #[user_message("Answer: {{question}}")]
    fn chat(&self, question: String) -> String;

    fn mood(&self, #[memory_id] id: u64, #[user_message] text: String) -> Mood;
}

#[ai_service]
pub trait Poet {
    #[user_message("Write a poem about {{it}}")]
    fn poem(&self, topic: &str) -> String;
}

/// Tool handed to the assistant.
#[derive(Default)]
pub struct Search;

include!(concat!(env!("OUT_DIR"), "/ai_services.rs"));
