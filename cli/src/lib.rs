//! The `slipit` crate provides the command-line interface for building
//! archives that contain path traversal entries.
//!
//! It handles argument parsing, archive format selection and command
//! execution. Archive handling itself lives in [`libslipit`].
pub mod cli;
pub mod command;
