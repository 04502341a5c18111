pub mod challenge;
pub mod config;
pub mod tracker;
