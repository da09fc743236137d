//! # Sponsorscope server
//!
//! HTTP REST API over the detection pipeline:
//!
//! - `GET /api/analyze?url=` — crawl a blog and classify each recent post.
//! - `POST /api/detect/banner` — match a batch of candidate image URLs.
//! - `POST /api/detect/banner-file` — match one uploaded image.
//! - `POST /api/detect/from-page` — single-shot page extraction, text
//!   scoring, banner matching, and decision fusion.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
