//! Browser front end
//!
//! Routes:
//!
//! - `GET /` - upload form
//! - `POST /analyze` - multipart upload (field `card`), renders the results
//! - `GET /health` - liveness probe returning JSON

pub mod handlers;
pub mod render;
pub mod server;

pub use server::{build_router, serve, AppState};
