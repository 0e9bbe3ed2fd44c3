//! Outbound adapters

pub mod http;
