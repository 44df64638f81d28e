//! WhatsApp webhook integration module
//!
//! ## Submodules
//!
//! - [`routes`] - HTTP endpoint handlers for the webhook (GET handshake, POST events)
//! - [`validation`] - Schema checks for handshake params and event payloads
//! - [`handler`] - Picks the messages to answer and sends the replies
//! - [`client`] - WhatsApp API client for sending messages
//! - [`schemas`] / [`outgoing_schemas`] - Incoming and outgoing payloads
//! - [`security`] - `X-Hub-Signature-256` verification

pub mod client;
pub mod handler;
pub mod outgoing_schemas;
pub mod routes;
pub mod schemas;
pub mod security;
pub mod validation;

pub use routes::{method_not_implemented, receive, verify};
