pub mod history;
pub mod metrics;
pub mod summarize;
pub mod work;
