pub mod catalog;
pub mod swap;
