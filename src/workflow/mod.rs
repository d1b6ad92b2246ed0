pub mod extract;
pub mod insights;
pub mod record;
pub mod reply;
