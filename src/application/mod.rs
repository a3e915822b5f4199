pub mod articles;
pub mod cache;
pub mod error;
pub mod pagination;
pub mod repos;
