//! Echo application built on the network layer.
//!
//! # Data Flow
//! ```text
//! client.rs: connect → send one frame → receive one frame → close
//! server.rs: accept → (receive → send)* until peer closes → accept next
//! ```
//!
//! # Design Decisions
//! - One connection is served to completion before the next is accepted;
//!   later peers wait in the OS backlog
//! - A failing connection is closed and logged; the listener keeps going

pub mod client;
pub mod server;

pub use client::request;
pub use server::{serve_connection, EchoServer};
