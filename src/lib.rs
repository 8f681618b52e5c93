#![forbid(unsafe_code)]
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod session;
pub mod task;
pub mod tui;
