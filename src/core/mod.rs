pub mod access;
pub mod config;
pub mod llm;
pub mod store;
pub mod suggest;
pub mod terminal;
