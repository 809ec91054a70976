pub mod admin;
pub mod lists;
