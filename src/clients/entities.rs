#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artist {
    pub name: String,
}

/// Size label Last.fm attaches to each artwork variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Small,
    Medium,
    Large,
    ExtraLarge,
    Other,
}

impl ImageSize {
    pub fn from_label(label: &str) -> Self {
        match label {
            "small" => ImageSize::Small,
            "medium" => ImageSize::Medium,
            "large" => ImageSize::Large,
            "extralarge" => ImageSize::ExtraLarge,
            _ => ImageSize::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub url: String,
    pub size: ImageSize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub name: String,
    pub artist: Artist, // assume one artist for simplicity
    pub url: String,
    // ordered the way the API returns them, smallest first
    pub images: Vec<Image>,
    pub now_playing: bool,
}
