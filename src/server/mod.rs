// src/server/mod.rs

pub mod dashboard;
pub mod guard;
pub mod routes;

pub use guard::LockoutGuard;
pub use routes::{run_server, SharedGuard};
