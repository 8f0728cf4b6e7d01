//! API Module
//!
//! HTTP handlers, the request gate and routing for the board backend.
//!
//! # Endpoints
//! - `GET /boards` - List boards
//! - `POST /boards` - Create a board
//! - `GET /home/trending` - Trending threads
//! - `GET /boards/:uri/threads?page=N` - One page of a board's threads
//! - `GET /threads/:id` - A thread with its posts
//! - `POST /bans/ip` - Ban an address
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod gate;
pub mod handlers;
pub mod routes;

pub use gate::block_banned;
pub use handlers::*;
pub use routes::create_router;
