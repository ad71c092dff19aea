pub mod git;
pub mod llm;
