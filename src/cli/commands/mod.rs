//! CLI command implementations

pub mod add;
pub mod analysis;
pub mod catalog;
pub mod completions;
pub mod edit;
pub mod export;
pub mod import;
pub mod indicators;
pub mod init;
pub mod list;
pub mod plan;
pub mod sensitivity;
