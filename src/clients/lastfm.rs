use log::debug;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::clients::{
    entities::{Artist, Image, ImageSize, Track},
    errors::{Error, Result},
    policy::RequestPolicy,
};

pub const DEFAULT_API_ROOT: &str = "https://ws.audioscrobbler.com/2.0/";

#[derive(Deserialize, Debug)]
struct LastFMText {
    #[serde(rename = "#text", default)]
    text: String,
}

#[derive(Deserialize, Debug)]
struct LastFMImage {
    #[serde(rename = "#text", default)]
    url: String,
    #[serde(default)]
    size: String,
}

#[derive(Deserialize, Debug, Default)]
struct LastFMTrackAttr {
    #[serde(default)]
    nowplaying: Option<String>,
}

#[derive(Deserialize, Debug)]
struct LastFMAPITrack {
    name: String,
    url: String,
    artist: LastFMText,
    #[serde(default)]
    image: Vec<LastFMImage>,
    #[serde(rename = "@attr", default)]
    attr: Option<LastFMTrackAttr>,
}

// A single scrobble comes back as a bare object instead of a one-element list
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<LastFMAPITrack>),
    One(Box<LastFMAPITrack>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl From<OneOrMany> for Vec<LastFMAPITrack> {
    fn from(tracks: OneOrMany) -> Self {
        match tracks {
            OneOrMany::Many(v) => v,
            OneOrMany::One(t) => vec![*t],
        }
    }
}

#[derive(Deserialize, Debug)]
struct RecentTracks {
    #[serde(default)]
    track: OneOrMany,
}

#[derive(Deserialize, Debug)]
struct RecentTracksResponse {
    recenttracks: RecentTracks,
}

#[derive(Deserialize, Debug)]
struct LastFMAPIError {
    error: u32,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum APIResponse {
    Error(LastFMAPIError),
    Success(RecentTracksResponse),
}

impl From<LastFMAPITrack> for Track {
    fn from(t: LastFMAPITrack) -> Track {
        Track {
            name: t.name,
            artist: Artist {
                name: t.artist.text,
            },
            url: t.url,
            images: t
                .image
                .into_iter()
                .map(|i| Image {
                    size: ImageSize::from_label(&i.size),
                    url: i.url,
                })
                .collect(),
            now_playing: t
                .attr
                .and_then(|a| a.nowplaying)
                .is_some_and(|v| v == "true"),
        }
    }
}

/// Decodes a `user.getRecentTracks` body and returns the most recent entry.
fn first_recent_track(user: &str, body: &[u8]) -> Result<Track> {
    let response: APIResponse = serde_json::from_slice(body)?;
    let tracks: Vec<LastFMAPITrack> = match response {
        APIResponse::Success(value) => value.recenttracks.track.into(),
        APIResponse::Error(err) => {
            return Err(Error::LastFMError {
                code: err.error,
                message: err.message,
            });
        }
    };
    tracks
        .into_iter()
        .next()
        .map(Track::from)
        .ok_or_else(|| Error::NoRecentTracks(user.to_string()))
}

#[derive(Debug, Clone)]
pub struct LastFmClient {
    http: Client,
    api_key: String,
    api_root: Url,
    policy: RequestPolicy,
}

impl LastFmClient {
    pub fn new(http: Client, api_key: String, api_root: Url, policy: RequestPolicy) -> Self {
        LastFmClient {
            http,
            api_key,
            api_root,
            policy,
        }
    }

    // Create a LastFmClient from environment variables or raise a configuration error
    pub fn try_default(http: Client, policy: RequestPolicy) -> Result<Self> {
        Self::from_env(http, policy, &|name: &str| std::env::var(name).ok())
    }

    /// Same as `try_default`, reading variables through `env`.
    pub fn from_env(
        http: Client,
        policy: RequestPolicy,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let api_key = env("LASTFM_API_KEY")
            .filter(|k| !k.is_empty())
            .or_else(|| env("LASTFM_KEY").filter(|k| !k.is_empty()))
            .ok_or_else(|| {
                Error::ConfigurationError(
                    "Missing LASTFM_API_KEY in environment variables".into(),
                )
            })?;
        let api_root = match env("LASTFM_API_ROOT") {
            Some(root) if !root.is_empty() => Url::parse(&root)?,
            _ => Url::parse(DEFAULT_API_ROOT)?,
        };
        Ok(LastFmClient::new(http, api_key, api_root, policy))
    }

    /// Fetches the user's most recent scrobble, the currently playing one if any.
    pub async fn recent_track(&self, user: &str) -> Result<Track> {
        debug!("Fetching recent tracks of {user:?} from Last.fm");
        let response = self
            .policy
            .send(|| {
                self.http.get(self.api_root.clone()).query(&[
                    ("method", "user.getrecenttracks"),
                    ("user", user),
                    ("api_key", self.api_key.as_str()),
                    ("format", "json"),
                    ("limit", "1"),
                ])
            })
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        // API errors come with a 4xx status and a JSON body, so decode before judging status
        match first_recent_track(user, &body) {
            Err(Error::LastFMDeserializationError(e)) if !status.is_success() => Err(
                Error::InvalidResponse(format!("Last.fm answered {status}: {e}")),
            ),
            other => other,
        }
    }
}
