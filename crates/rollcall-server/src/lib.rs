//! # rollcall-server
//!
//! HTTP server library for the rollcall attendance system.
//!
//! Provides the API handlers, caller identity extraction, and state
//! management around [`rollcall_core`].

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod api;
pub mod auth;
pub mod logging;
pub mod state;
