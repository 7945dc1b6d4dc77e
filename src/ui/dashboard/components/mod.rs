//! Dashboard component modules
//!
//! Contains all individual rendering components

pub mod cards;
pub mod footer;
pub mod header;
pub mod logs;
pub mod revenue;
pub mod tables;
