use std::{path::PathBuf, str::FromStr, time::Duration};

use log::debug;
use reqwest::Client;
use url::Url;

use crate::{
    badge::IconChoice,
    clients::{
        ImageInliner, LastFmClient, RequestPolicy,
        errors::{Error, Result},
    },
    templates::Templates,
};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_CACHE_SECONDS: u32 = 180;

/// Normalizes the `PORT` forms seen in deployments: `:8080`, `8080` and `host:port`.
pub fn parse_listen_addr(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        DEFAULT_LISTEN_ADDR.to_string()
    } else if let Some(port) = raw.strip_prefix(':') {
        format!("0.0.0.0:{port}")
    } else if raw.chars().all(|c| c.is_ascii_digit()) {
        format!("0.0.0.0:{raw}")
    } else {
        raw.to_string()
    }
}

/// Where unset builder fields are looked up, by variable name.
pub type EnvSource = dyn Fn(&str) -> Option<String>;

/// The process environment (non-unicode values count as unset).
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

// Reads an optional variable; a present but malformed value is a configuration error
fn env_parse<T>(env: &EnvSource, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env(name) {
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::ConfigurationError(format!("{name}={raw:?}: {e}"))),
        None => Ok(None),
    }
}

// Process-wide, read-only state shared by every request
pub struct Config {
    pub lastfm: LastFmClient,
    pub inliner: ImageInliner,
    pub templates: Templates,
    pub icon: IconChoice,
    pub cache_seconds: u32,
    pub public_base_url: Option<Url>,
    pub listen_addr: String,
    pub policy: RequestPolicy,
}

#[derive(Default)]
pub struct ConfigBuilder {
    lastfm: Option<LastFmClient>,
    inliner: Option<ImageInliner>,
    templates: Option<Templates>,
    icon: Option<IconChoice>,
    cache_seconds: Option<u32>,
    public_base_url: Option<Url>,
    listen_addr: Option<String>,
    policy: Option<RequestPolicy>,
    env: Option<Box<EnvSource>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lastfm(mut self, lastfm: LastFmClient) -> Self {
        self.lastfm = Some(lastfm);
        self
    }

    #[must_use]
    pub fn inliner(mut self, inliner: ImageInliner) -> Self {
        self.inliner = Some(inliner);
        self
    }

    #[must_use]
    pub fn templates(mut self, templates: Templates) -> Self {
        self.templates = Some(templates);
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: IconChoice) -> Self {
        self.icon = Some(icon);
        self
    }

    #[must_use]
    pub fn cache_seconds(mut self, seconds: u32) -> Self {
        self.cache_seconds = Some(seconds);
        self
    }

    #[must_use]
    pub fn public_base_url(mut self, url: Url) -> Self {
        self.public_base_url = Some(url);
        self
    }

    #[must_use]
    pub fn listen_addr(mut self, addr: &str) -> Self {
        self.listen_addr = Some(parse_listen_addr(addr));
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: RequestPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Replaces the process environment as the source for unset fields.
    #[must_use]
    pub fn env_source(mut self, env: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.env = Some(Box::new(env));
        self
    }

    /// Fills every unset field from the environment.
    pub fn build(self) -> Result<Config> {
        let env: &EnvSource = self.env.as_deref().unwrap_or(&process_env);
        let policy = match self.policy {
            Some(p) => p,
            None => RequestPolicy::new(
                Duration::from_secs(env_parse(env, "UPSTREAM_TIMEOUT_SECS")?.unwrap_or(10)),
                env_parse(env, "UPSTREAM_RETRIES")?.unwrap_or(0),
            ),
        };
        let http = Client::builder()
            .user_agent(concat!("fmbadge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let lastfm = match self.lastfm {
            Some(l) => l,
            None => LastFmClient::from_env(http.clone(), policy, env)?,
        };
        let inliner = self
            .inliner
            .unwrap_or_else(|| ImageInliner::new(http, policy));
        let templates = match self.templates {
            Some(t) => t,
            None => match env_parse::<PathBuf>(env, "TEMPLATES_DIR")? {
                Some(dir) => Templates::from_dir(&dir)?,
                None => Templates::embedded()?,
            },
        };
        let icon = match self.icon {
            Some(i) => i,
            None => env_parse(env, "BADGE_ICON")?.unwrap_or_default(),
        };
        let cache_seconds = match self.cache_seconds {
            Some(s) => s,
            None => env_parse(env, "BADGE_CACHE_SECONDS")?.unwrap_or(DEFAULT_CACHE_SECONDS),
        };
        let public_base_url = match self.public_base_url {
            Some(u) => Some(u),
            None => env_parse(env, "PUBLIC_BASE_URL")?,
        };
        let listen_addr = match self.listen_addr {
            Some(a) => a,
            None => parse_listen_addr(&env("PORT").unwrap_or_default()),
        };

        debug!(
            "Config: icon={icon:?}, cache={cache_seconds}s, base={public_base_url:?}, policy={policy:?}"
        );
        Ok(Config {
            lastfm,
            inliner,
            templates,
            icon,
            cache_seconds,
            public_base_url,
            listen_addr,
            policy,
        })
    }
}
