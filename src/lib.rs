//! FlightGenius is a terminal-first chat client for an AI flight-search
//! assistant backed by a search-grounded hosted model.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation store, the session phase machine,
//!   attachment encoding, configuration, and the model gateway boundary.
//! - [`audio`] captures microphone input and finalizes it into a single
//!   audio attachment per recording.
//! - [`ui`] renders the terminal interface, runs the interactive event
//!   loop, and produces the itinerary export document.
//! - [`api`] defines the wire payloads exchanged with the remote service.
//!
//! The binary entrypoint (`src/main.rs`) wires configuration, credentials,
//! and the gateway together, then hands control to
//! [`ui::chat_loop::run_chat_loop`].

pub mod api;
pub mod audio;
pub mod core;
pub mod ui;
pub mod utils;
