pub mod args;
pub mod asset;
pub mod cluster;
pub mod config;
pub mod constants;
pub mod errors;
pub mod nodes;
pub mod scenario;
pub mod status;
pub mod submitter;
pub mod tracker;
pub mod types;
pub mod waiter;
