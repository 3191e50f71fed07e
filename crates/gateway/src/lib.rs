//! # Gateway
//!
//! The connection-facing half of the companion backend:
//!
//! - [`wire`] - inbound/outbound JSON envelopes
//! - [`gate`] - single-occupancy connection admission state machine
//! - [`engine`] - per-frame conversation orchestration
//! - [`ws`] - axum WebSocket handler wiring the gate and engine together
//! - [`server`] - router, static frontend, graceful shutdown,
//!   save-on-shutdown
//! - [`config`] - typed views over the settings file

pub mod config;
pub mod engine;
pub mod gate;
pub mod server;
pub mod wire;
pub mod ws;

pub use config::{EngineConfig, ServerConfig};
pub use engine::ConversationEngine;
pub use gate::ConnectionGate;
pub use server::run_server;
pub use wire::{InboundMessage, OutboundMessage, ReadyPayload};
