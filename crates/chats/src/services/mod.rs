//! Business logic services for chats

pub mod chat_service;
pub mod global_chat_service;
pub mod message_service;

pub use chat_service::ChatService;
pub use global_chat_service::{GlobalChatService, GLOBAL_FEED_WINDOW};
pub use message_service::MessageService;
