use clap::{Parser, Subcommand};
use fmbadge::{config::ConfigBuilder, server};
use log::info;

#[derive(Parser)]
#[command(name = "fmbadge")]
#[command(version, about = "Embeddable now-playing badges for Last.fm users", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve {
        /// Listen address, e.g. `:8080` or `127.0.0.1:3000`. Overrides PORT.
        #[arg(long)]
        addr: Option<String>,
    },
    /// Print the most recent track of a Last.fm user
    Playing { user: String },
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve { addr: None }) {
        Commands::Serve { addr } => {
            info!("Building config ...");
            let mut builder = ConfigBuilder::new();
            if let Some(addr) = addr {
                builder = builder.listen_addr(&addr);
            }
            let config = builder.build()?;
            // a bind failure ends the process
            server::serve(config).await?;
        }
        Commands::Playing { user } => {
            let config = ConfigBuilder::new().build()?;
            let track = config.lastfm.recent_track(&user).await?;
            let state = if track.now_playing {
                "now playing"
            } else {
                "last played"
            };
            println!(
                "{} - {} ({state})\n{}",
                track.artist.name, track.name, track.url
            );
        }
    }
    Ok(())
}
