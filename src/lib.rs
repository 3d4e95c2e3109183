//! riskreg: a risk register with automatic recalculation
//!
//! Records threats and opportunities, derives their adjusted impact and
//! expected value from a global sensitivity, and keeps per-nature priority
//! rankings consistent after every edit.

pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;
