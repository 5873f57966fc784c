//! HTTP request handlers outside the `/auth` form router

pub mod health;
pub mod pages;
pub mod types;

pub use health::*;
pub use pages::*;
pub use types::*;
