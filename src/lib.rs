#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod loader;
pub mod util;

pub use graph::{DependencyGraph, DependencyResolver, GraphError, GraphSnapshot};
