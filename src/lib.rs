pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod kernel;
pub mod math;
pub mod merge;
pub mod operations;
pub mod shape;
pub mod topology;

pub use error::{GeomergeError, Result};
