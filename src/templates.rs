use std::path::Path;

use log::info;
use minijinja::{AutoEscape, Environment};
use serde::Serialize;

use crate::clients::errors::Result;

pub const INDEX: &str = "index.html";
pub const EMBED: &str = "embed.html";
pub const PLAYING: &str = "playing.svg";

const REQUIRED: [&str; 3] = [INDEX, EMBED, PLAYING];

// Markup formats always escape, whatever the loader returns
fn auto_escape(name: &str) -> AutoEscape {
    match name.rsplit('.').next() {
        Some("html" | "htm" | "svg" | "xml") => AutoEscape::Html,
        _ => AutoEscape::None,
    }
}

/// Parsed template set, read-only once the server is up.
#[derive(Debug)]
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Templates compiled into the binary.
    pub fn embedded() -> Result<Self> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(auto_escape);
        env.add_template(INDEX, include_str!("../templates/index.html"))?;
        env.add_template(EMBED, include_str!("../templates/embed.html"))?;
        env.add_template(PLAYING, include_str!("../templates/playing.svg"))?;
        Ok(Templates { env })
    }

    /// Templates read from `dir`. Fails if one of the required files is missing or broken.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(auto_escape);
        env.set_loader(minijinja::path_loader(dir.to_path_buf()));
        for name in REQUIRED {
            env.get_template(name)?;
        }
        info!("Loaded templates from {}", dir.display());
        Ok(Templates { env })
    }

    pub fn render<T: Serialize>(&self, name: &str, ctx: &T) -> Result<String> {
        Ok(self.env.get_template(name)?.render(ctx)?)
    }
}
