pub mod actor;
pub mod machine;
pub mod sink;
pub mod state;
