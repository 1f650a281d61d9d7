//! State module for tracking page load progress
//!
//! A page load moves through a fixed sequence of stages. `LoadState`
//! names those stages and validates transitions between them.

mod load_state;

pub use load_state::LoadState;
