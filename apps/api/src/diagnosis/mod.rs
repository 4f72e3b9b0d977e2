pub mod advice;
pub mod attributes;
pub mod context;
pub mod export;
pub mod handlers;
pub mod prompts;
