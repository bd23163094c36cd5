pub mod batch;
pub mod config;
pub mod process;
pub mod verify;
