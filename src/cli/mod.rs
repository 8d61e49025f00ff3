//! CLI module for rankbridge
//!
//! Handles command-line argument parsing; the binary is the thin boundary
//! in front of the pipeline.

pub mod args;

pub use args::{Args, Commands, Verbosity};
