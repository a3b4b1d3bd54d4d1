//! Gitty Up - keep every Git repository under a directory tree up to date.
//!
//! The library is split into a small core and the surfaces around it:
//! - [`scanner`] finds repository roots with exclusion-aware traversal
//! - [`git`] runs single git commands with a hard timeout
//! - [`repo`] classifies one repository's update into a [`models::RepoResult`]
//! - [`orchestrator`] runs the scan once and the updates concurrently
//! - [`config`], [`cli`] and [`output`] wrap the core for the binary

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod git;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod repo;
pub mod scanner;
