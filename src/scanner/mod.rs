pub mod cache;
pub mod coordinator;
pub mod engine;
pub mod patterns;
pub mod registry;
pub mod report;
