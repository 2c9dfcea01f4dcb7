//! HTTP API handlers for imgrank-server

pub mod batch;
pub mod health;
pub mod images;
pub mod leaderboard;
pub mod rank;
pub mod ui;

pub use batch::next_batch;
pub use health::health_routes;
pub use images::serve_image;
pub use leaderboard::get_leaderboard;
pub use rank::rank_images;
pub use ui::{serve_app_js, serve_index};
