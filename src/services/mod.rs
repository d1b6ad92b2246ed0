pub mod language_model;
pub mod work_api;

pub use language_model::{CompletionRequest, CompletionService};
pub use work_api::WorkApiService;
