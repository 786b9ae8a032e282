pub mod config;
pub mod events;
pub mod pose;
pub mod trace;
