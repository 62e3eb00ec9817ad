// src/lib.rs
// BFHL - single-endpoint dispatcher for numeric kernels and short AI answers

pub mod answer;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod http;
pub mod kernels;
pub mod llm;
pub mod operation;
pub mod server;

pub use config::ServerConfig;
pub use error::{BfhlError, Result};
pub use server::{AppState, create_router};
