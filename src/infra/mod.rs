pub mod llm;
pub mod work_api;
