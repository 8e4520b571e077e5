//! Terminal UI layer for the interactive session.
//!
//! - [`chat_loop`]: the main interaction loop that drives session
//!   transitions and dispatches gateway calls.
//! - [`renderer`] and [`markdown`]: view composition and frame output.
//! - [`export`]: the itinerary download document.
//!
//! Ownership boundary: this layer presents and captures interaction state;
//! [`crate::core`] owns the transcript and the phase machine.

pub mod chat_loop;
pub mod export;
pub mod markdown;
pub mod renderer;
