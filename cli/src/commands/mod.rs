pub mod config;
pub mod info;
pub mod list;
pub mod pull;
pub mod remove;
