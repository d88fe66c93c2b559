pub mod import;
pub mod manage;
pub mod search;
