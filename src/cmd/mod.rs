pub mod analysis;
pub mod auth;
pub mod config;
pub mod entry;
pub mod parse;
pub mod team;
