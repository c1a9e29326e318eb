pub mod commands;
pub mod config;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod process;
pub mod prompt;
pub mod report;
pub mod settings;
