//! SwiftSolves - demonstration chatbot for Swift Solves Studios
//!
//! This library wires chat channels (terminal, Telegram) to a Gemini-backed
//! agent loop, with a handful of school-record lookup tools the agent may call.

pub mod adapters;
pub mod agent;
pub mod bots;
pub mod config;
pub mod error;
pub mod session;
pub mod tools;
pub mod ui;

pub use error::{Error, Result};
