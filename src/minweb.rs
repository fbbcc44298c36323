//! Main module for minweb library functionality

pub mod config;
pub mod consumers;
pub mod graph;
pub mod includes;
pub mod lexing;
pub mod loader;
pub mod processor;
pub mod tangle;
pub mod testing;
