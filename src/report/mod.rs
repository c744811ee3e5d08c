//! Report output.

pub mod generator;

pub use generator::save_report;
