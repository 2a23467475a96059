pub mod auth;
pub mod budget;
pub mod collector;
pub mod config;
pub mod errors;
pub mod git;
pub mod llm;
pub mod logging;
pub mod mcp;
pub mod ui;
pub mod workflow;
