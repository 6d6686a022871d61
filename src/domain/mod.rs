pub mod chat;
pub mod error;
pub mod idea;
pub mod llm_config;
pub mod project;
pub mod task;
