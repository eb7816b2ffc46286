//! Curio session gateway: WebSocket protocol, services, and HTTP surface.

pub mod auth;
pub mod config;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;
pub mod ws;
