//! InfraBot - IT helpdesk chat client
//!
//! Sends support questions to a completion endpoint and renders the answer
//! as it streams in. A guided topic menu composes common questions.

pub mod api;
pub mod app;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod history;
pub mod navigator;
pub mod runtime;
pub mod session;
pub mod state_machine;
pub mod topics;
pub mod transcript;
pub mod tui;
pub mod ui;
