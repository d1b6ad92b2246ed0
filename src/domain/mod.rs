pub mod analysis;
pub mod team;
pub mod work;
