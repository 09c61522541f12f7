/// Data entities for tracks and artists
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// Image-to-data-URI conversion
pub mod inliner;
/// Last.fm API client
pub mod lastfm;
/// Deadline and retry policy for outbound calls
pub mod policy;

pub use inliner::ImageInliner;
pub use lastfm::LastFmClient;
pub use policy::RequestPolicy;
