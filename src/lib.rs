// Core game logic modules
pub mod core;

// Room event fan-out
pub mod broadcast;

// Environment-driven settings
pub mod config;

// Domain errors
pub mod error;

// Services (turn timer)
pub mod services;

// Wire models (commands/events)
pub mod models;

// WebSocket transport
pub mod routes;

// Application state
pub mod state;
