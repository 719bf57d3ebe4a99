mod config;
mod logging;
mod ports;
mod services;
mod spotify_rs;
mod ytmusic_rs;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::{
    Result,
    eyre::{Context, OptionExt},
};

use crate::{
    config::Config,
    logging::{SERVICE_NAME, init_tracing},
    ports::source::SourcePlaylistSummary,
    ports::target::{Privacy, TargetPlaylistSummary},
    services::{
        backup::JsonBackupStore,
        notification::ConsoleNotifier,
        source_fallback::FallbackSourceCatalog,
        spotify::client::{SpotifyApiAdapter, SpotifyEmbedAdapter},
        sync::{CancelFlag, error::SyncError, session::SyncSession},
        ytmusic::client::YtMusicHttpAdapter,
    },
    spotify_rs::parse_playlist_id,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, global = true, env = "PLAYLIST_MIRROR_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter directive, e.g. `info` or `playlist_mirror=debug`
    #[arg(long, default_value = "warn", global = true, env = "PLAYLIST_MIRROR_LOG")]
    log_level: String,

    /// OTLP collector endpoint to export traces to
    #[arg(long, global = true, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export a Spotify playlist as a new YouTube Music playlist
    Export {
        /// Spotify playlist id or URL
        source: String,

        /// Privacy of the created playlist
        #[arg(long, value_enum, default_value_t = Privacy::Private)]
        privacy: Privacy,
    },
    /// Update an existing YouTube Music playlist to match a Spotify playlist
    Update {
        /// Spotify playlist id or URL
        source: String,

        /// YouTube Music playlist id
        #[arg(short, long)]
        target: String,

        /// Skip the backup of the YouTube Music playlist
        #[arg(long)]
        no_backup: bool,
    },
    /// List your Spotify playlists
    ListSource,
    /// List the playlists in your YouTube Music library
    ListTarget,
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

type Session = SyncSession<
    FallbackSourceCatalog<SpotifyApiAdapter, SpotifyEmbedAdapter>,
    YtMusicHttpAdapter,
    JsonBackupStore,
    ConsoleNotifier,
>;

fn build_session(config: &Config, cancel: CancelFlag) -> Result<Session> {
    let client = reqwest::Client::new();

    let primary = SpotifyApiAdapter::new(client.clone(), config.spotify_credentials());
    let secondary = config
        .web_fallback()
        .then(|| SpotifyEmbedAdapter::new(client.clone()));
    let source = FallbackSourceCatalog::new(primary, secondary);

    let target = YtMusicHttpAdapter::new(client, config.headers_file()?);
    let backups = JsonBackupStore::new(config.backup_directory()?);
    tracing::debug!("Backup directory: {}", backups.directory().display());

    Ok(SyncSession::new(source, target, backups, ConsoleNotifier).with_cancel_flag(cancel))
}

fn print_source_playlists(playlists: &[SourcePlaylistSummary]) {
    println!("Found {} playlists:\n", playlists.len());
    for playlist in playlists {
        println!("{}", playlist.name);
        println!("  ID: {}", playlist.id);
        println!("  Tracks: {}", playlist.track_count);
        println!("  Owner: {}", playlist.owner.as_deref().unwrap_or("unknown"));
        println!("  Visibility: {}\n", playlist.visibility);
    }
}

fn print_target_playlists(playlists: &[TargetPlaylistSummary]) {
    println!("Found {} playlists:\n", playlists.len());
    for playlist in playlists {
        println!("{}", playlist.title);
        println!("  ID: {}", playlist.id);
        match playlist.track_count {
            Some(count) => println!("  Tracks: {}\n", count),
            None => println!("  Tracks: unknown\n"),
        }
    }
}

/// Cancel the running sync on Ctrl-C. Takes effect at the next track or batch boundary.
fn cancel_on_ctrl_c(cancel: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after the current step");
            cancel.cancel();
        }
    });
}

/// Exit code for a failed run. The failure itself was already reported through the notifier.
fn stopped(error: &SyncError) -> ExitCode {
    if let Some(progress) = error.progress() {
        tracing::warn!(%progress, "Run stopped early");
    }
    ExitCode::FAILURE
}

async fn run(args: Args) -> Result<ExitCode> {
    let config_path = args.config.clone().or_else(Config::config_path);

    if let Commands::Config(command) = &args.command {
        let path = config_path.ok_or_eyre("Could not determine the config directory")?;
        match command {
            ConfigCommands::CreateDefault => {
                if Config::create_default(&path)? {
                    println!("Created default config at {}", path.display());
                } else {
                    println!("Config already exists at {}", path.display());
                }
            }
            ConfigCommands::Path => println!("{}", path.display()),
        }
        return Ok(ExitCode::SUCCESS);
    }

    tracing::debug!("Loading configuration");
    let config = Config::load(args.config.as_deref()).wrap_err("Failed to load config")?;

    let cancel = CancelFlag::new();
    let session = build_session(&config, cancel.clone())?;

    match args.command {
        Commands::Export { source, privacy } => {
            let source_id = parse_playlist_id(&source)?;
            cancel_on_ctrl_c(cancel);
            tracing::info!(%source_id, privacy = privacy.as_str(), "Starting export");
            match session.export(&source_id, privacy).await {
                Ok(report) => tracing::info!(
                    playlist_id = ?report.playlist_id,
                    "Exported {} of {} tracks",
                    report.added.len(),
                    report.total_tracks
                ),
                Err(e) => return Ok(stopped(&e)),
            }
        }
        Commands::Update {
            source,
            target,
            no_backup,
        } => {
            let source_id = parse_playlist_id(&source)?;
            cancel_on_ctrl_c(cancel);
            tracing::info!(%source_id, %target, no_backup, "Starting update");
            match session.update(&source_id, &target, !no_backup).await {
                Ok(report) if report.is_unchanged() => {
                    tracing::info!(playlist_id = %report.playlist_id, "Nothing to change")
                }
                Ok(report) => tracing::info!(
                    playlist_id = %report.playlist_id,
                    "Update finished with {} tracks",
                    report.final_count
                ),
                Err(e) => return Ok(stopped(&e)),
            }
        }
        Commands::ListSource => {
            print_source_playlists(&session.list_source_playlists().await?);
        }
        Commands::ListTarget => {
            print_target_playlists(&session.list_target_playlists().await?);
        }
        Commands::Config(_) => {}
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let args = Args::parse();
    let tracer_provider = init_tracing(
        SERVICE_NAME,
        args.otlp_endpoint.as_deref(),
        &args.log_level,
    )?;

    let result = run(args).await;

    if let Some(provider) = tracer_provider {
        if let Err(e) = provider.shutdown() {
            eprintln!("Failed to flush traces: {e}");
        }
    }

    result
}
