//! Fmbadge - embeddable "now playing" badges for Last.fm users
//!
//! This library looks up a user's most recent scrobble and serves it as an SVG
//! badge, a redirect to the track page, and a copy-paste embed snippet.

/// Badge view-models and icon selection
pub mod badge;
/// Client modules for interacting with external services
pub mod clients;
/// Startup configuration shared by all requests
pub mod config;
/// HTTP routes and server loop
pub mod server;
/// HTML and SVG templates
pub mod templates;
