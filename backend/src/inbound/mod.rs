//! Inbound adapters that translate external requests into desk operations
//! while keeping framework details at the edge.
//!
//! The local JSON API lives under [`http`].

pub mod http;
