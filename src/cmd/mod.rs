pub mod config;
pub mod summarize;
