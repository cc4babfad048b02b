//! HTTP routes and handlers.

pub mod events;
pub mod handlers;
pub mod routes;
