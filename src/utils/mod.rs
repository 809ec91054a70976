pub mod formatting;
pub mod links;
pub mod permissions;
