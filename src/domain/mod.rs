pub mod commit;
pub mod history;
pub mod range;
pub mod summary;
