//! HTTP routes. The guide protocol itself runs over the WebSocket
//! gateway; HTTP only carries the health check and the upgrade endpoint.

pub mod health;
