use std::str::FromStr;

use serde::Serialize;
use url::Url;

use crate::clients::entities::{Image, ImageSize, Track};

/// Titles longer than this many characters scroll in the badge.
pub const ANIMATE_AFTER_CHARS: usize = 10;

/// Which artwork variant goes into the badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IconChoice {
    /// The `small` variant, or the first one when none is labelled.
    #[default]
    Smallest,
    /// The `extralarge` variant, or the last one when none is labelled.
    Largest,
}

impl IconChoice {
    pub fn pick(self, images: &[Image]) -> Option<&Image> {
        let (wanted, fallback) = match self {
            IconChoice::Smallest => (ImageSize::Small, images.first()),
            IconChoice::Largest => (ImageSize::ExtraLarge, images.last()),
        };
        images.iter().find(|i| i.size == wanted).or(fallback)
    }
}

impl FromStr for IconChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smallest" | "first" => Ok(IconChoice::Smallest),
            "largest" | "last" => Ok(IconChoice::Largest),
            other => Err(format!("unknown icon choice {other:?}, expected smallest or largest")),
        }
    }
}

/// Counts characters, not bytes, so multi-byte titles are judged by what is displayed.
pub fn should_animate(title: &str) -> bool {
    title.chars().count() > ANIMATE_AFTER_CHARS
}

/// Data handed to `playing.svg`.
#[derive(Debug, Serialize)]
pub struct Playing {
    pub url: String,
    pub icon: Option<String>,
    pub title: String,
    pub status: String,
    pub now_playing: bool,
    pub animate: bool,
}

impl Playing {
    pub fn new(track: Track, icon: Option<String>) -> Self {
        Playing {
            animate: should_animate(&track.name),
            url: track.url,
            icon,
            title: track.name,
            status: track.artist.name,
            now_playing: track.now_playing,
        }
    }
}

/// Data handed to `embed.html`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct EmbedCode {
    pub user: String,
    pub link_url: String,
    pub image_url: String,
}

fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty();
        // URL parsing collapses dot segments, so they are dropped like empty ones
        for segment in segments
            .iter()
            .filter(|s| !s.is_empty() && **s != "." && **s != "..")
        {
            path.push(segment);
        }
    }
    url
}

impl EmbedCode {
    /// Builds `<base>/playing/<user>/url` and `<base>/playing/<user>`.
    ///
    /// `user` is percent-encoded as a single path segment. An empty user, `.` or `..`
    /// is skipped.
    pub fn new(base: &Url, user: &str) -> Self {
        EmbedCode {
            user: user.to_string(),
            link_url: join_segments(base, &["playing", user, "url"]).to_string(),
            image_url: join_segments(base, &["playing", user]).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::entities::Artist;

    fn image(url: &str) -> Image {
        Image {
            url: url.to_string(),
            size: ImageSize::Other,
        }
    }

    #[test]
    fn animate_threshold_counts_chars() {
        assert!(!should_animate("abcdefghij"));
        assert!(should_animate("abcdefghijk"));
        // ten multi-byte characters
        assert!(!should_animate("ありがとうございます"));
        assert!(should_animate("ありがとうございますね"));
        assert!(!should_animate(""));
    }

    #[test]
    fn icon_choice_picks_ends() {
        let images = vec![image("s"), image("m"), image("l")];
        assert_eq!(IconChoice::Smallest.pick(&images).unwrap().url, "s");
        assert_eq!(IconChoice::Largest.pick(&images).unwrap().url, "l");
        assert!(IconChoice::Largest.pick(&[]).is_none());
    }

    #[test]
    fn icon_choice_prefers_size_labels() {
        let labelled = |url: &str, size| Image {
            url: url.to_string(),
            size,
        };
        let images = vec![
            labelled("xl", ImageSize::ExtraLarge),
            labelled("s", ImageSize::Small),
            labelled("m", ImageSize::Medium),
        ];
        assert_eq!(IconChoice::Smallest.pick(&images).unwrap().url, "s");
        assert_eq!(IconChoice::Largest.pick(&images).unwrap().url, "xl");
    }

    #[test]
    fn icon_choice_parses() {
        assert_eq!("largest".parse::<IconChoice>(), Ok(IconChoice::Largest));
        assert_eq!(" Smallest ".parse::<IconChoice>(), Ok(IconChoice::Smallest));
        assert!("huge".parse::<IconChoice>().is_err());
    }

    #[test]
    fn playing_view_from_track() {
        let track = Track {
            name: "Windowlicker".to_string(),
            artist: Artist {
                name: "Aphex Twin".to_string(),
            },
            url: "https://www.last.fm/music/Aphex+Twin/_/Windowlicker".to_string(),
            images: vec![],
            now_playing: true,
        };
        let view = Playing::new(track, None);
        assert_eq!(view.title, "Windowlicker");
        assert_eq!(view.status, "Aphex Twin");
        assert!(view.animate);
        assert!(view.now_playing);
    }

    #[test]
    fn embed_urls_from_base() {
        let base = Url::parse("https://badge.example").unwrap();
        let code = EmbedCode::new(&base, "alice");
        assert_eq!(code.link_url, "https://badge.example/playing/alice/url");
        assert_eq!(code.image_url, "https://badge.example/playing/alice");
    }

    #[test]
    fn embed_urls_keep_base_path_and_encode_user() {
        let base = Url::parse("http://host:8080/fm/").unwrap();
        let code = EmbedCode::new(&base, "a b/c");
        assert_eq!(code.link_url, "http://host:8080/fm/playing/a%20b%2Fc/url");
        assert_eq!(code.image_url, "http://host:8080/fm/playing/a%20b%2Fc");
    }

    #[test]
    fn embed_urls_skip_dot_users() {
        let base = Url::parse("http://host").unwrap();
        for user in [".", ".."] {
            let code = EmbedCode::new(&base, user);
            assert_eq!(code.link_url, "http://host/playing/url");
            assert_eq!(code.image_url, "http://host/playing");
            assert_eq!(code.user, user);
        }
        let code = EmbedCode::new(&base, "...");
        assert_eq!(code.image_url, "http://host/playing/...");
    }

    #[test]
    fn embed_urls_skip_empty_user() {
        let base = Url::parse("http://host").unwrap();
        let code = EmbedCode::new(&base, "");
        assert_eq!(code.link_url, "http://host/playing/url");
        assert_eq!(code.image_url, "http://host/playing");
    }
}
