pub mod config;
pub mod entity;
pub mod error;
pub mod normalizer;
pub mod preprocessor;
pub mod sentiment;
pub mod table;
pub mod themes;
