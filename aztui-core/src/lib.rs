pub mod catalog;
pub mod config;
pub mod model;
pub mod remote;
pub mod workspace;

// Navigation state machine
pub mod focus;
pub mod orchestrator;
pub mod store;
