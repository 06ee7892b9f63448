pub mod config;
pub mod errors;
pub mod events;
pub mod gateway;
pub mod manifest;
pub mod orchestrator;
pub mod resolver;
pub mod stack;
pub mod ui;
