pub mod arguments;
pub mod error;
