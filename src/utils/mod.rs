pub mod config;
pub mod error;
pub mod hashing;
pub mod helpers;
pub mod model;
pub mod pagination;
pub mod validation;
