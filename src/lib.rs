pub mod analysis;
pub mod app;
pub mod config;
pub mod error;
pub mod nutrition;
pub mod ratelimit;
pub mod session;
pub mod state;
pub mod vision;
