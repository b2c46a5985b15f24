//! SoundTouch Remote - command-line remote control for SoundTouch speakers.
//!
//! Talks to the speaker either directly on its control port or through a
//! `soundtouch-relay` instance. The last connected address and the favorites
//! list are kept in a JSON file in the data directory.

mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use soundtouch_core::{
    build_directory, Config, ContentItem, DeviceController, DeviceHttp, DeviceKey,
    DeviceTransport, DirectTransport, DirectoryProvider, JsonFileStore, LoggingEventEmitter,
    RelayDirectory, RelayTransport, Session, StationDirectory,
};

/// SoundTouch Remote - control a speaker from the terminal.
#[derive(Parser, Debug)]
#[command(name = "soundtouch-remote")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Relay base URL (e.g. http://192.168.1.10:49400). Talks to the speaker directly when omitted.
    #[arg(short, long, env = "SOUNDTOUCH_RELAY_URL")]
    relay: Option<String>,

    /// Directory holding remembered address and favorites.
    #[arg(short, long, default_value = ".", env = "SOUNDTOUCH_DATA_DIR")]
    data_dir: PathBuf,

    /// Speaker control port, for direct mode.
    #[arg(long, default_value_t = 8090, env = "SOUNDTOUCH_DEVICE_PORT")]
    device_port: u16,

    /// Directory provider for search in direct mode: tunein or radio_browser.
    #[arg(long, default_value = "tunein", env = "SOUNDTOUCH_DIRECTORY_PROVIDER")]
    provider: DirectoryProvider,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "warn", env = "SOUNDTOUCH_LOG_LEVEL")]
    log_level: log::LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect to a speaker and remember its address.
    Connect {
        /// IPv4/IPv6 address or hostname.
        address: String,
    },
    /// Show device, now playing, volume and presets.
    Status,
    /// Press and release a key (PLAY, PAUSE, NEXT_TRACK, POWER, PRESET_3, ...).
    Key { key: DeviceKey },
    /// Set the volume (0-100).
    Volume { level: u8 },
    /// Toggle mute.
    Mute,
    /// Preset operations.
    #[command(subcommand)]
    Preset(PresetCommand),
    /// Favorites kept by this client.
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    /// Search the station directory.
    Search {
        query: String,
        /// Play the Nth result (1-based).
        #[arg(long, value_name = "N")]
        play: Option<usize>,
    },
    /// Play a content item by source and location.
    Play {
        #[arg(long)]
        source: String,
        #[arg(long)]
        location: String,
        #[arg(long, default_value = "")]
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum PresetCommand {
    /// List the six preset slots.
    List,
    /// Recall a preset slot.
    Select { slot: u8 },
    /// Store the current station in a preset slot.
    Save { slot: u8 },
}

#[derive(Subcommand, Debug)]
enum FavoritesCommand {
    /// List favorites.
    List,
    /// Add the current station to favorites.
    Add,
    /// Remove a favorite by id.
    Remove { id: u64 },
    /// Play a favorite by id.
    Play { id: u64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    let controller = build_controller(&args)?;
    run(&args, &controller).await
}

/// Wires transport, directory, session and emitter for the selected mode.
fn build_controller(args: &Args) -> Result<DeviceController> {
    let config = Config {
        device_port: args.device_port,
        directory_provider: args.provider,
        ..Default::default()
    };
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;

    // Per-request timeouts on the device and directory clients take precedence
    let client = reqwest::Client::builder()
        .timeout(config.device_timeout())
        .build()
        .context("Failed to create HTTP client")?;

    let (transport, directory): (Arc<dyn DeviceTransport>, Arc<dyn StationDirectory>) =
        match args.relay.as_deref() {
            Some(relay) => {
                log::info!("[Remote] Using relay at {}", relay);
                (
                    Arc::new(RelayTransport::new(client.clone(), relay)),
                    Arc::new(RelayDirectory::new(
                        client,
                        relay,
                        config.directory_timeout(),
                    )),
                )
            }
            None => {
                log::info!("[Remote] Talking to devices directly");
                (
                    Arc::new(DirectTransport::new(DeviceHttp::from_config(
                        client.clone(),
                        &config,
                    ))),
                    build_directory(config.directory_provider, client, &config),
                )
            }
        };

    let store = Arc::new(JsonFileStore::new(&args.data_dir));
    log::debug!("[Remote] Settings file: {}", store.path().display());
    let session = Arc::new(Session::new(store));

    Ok(DeviceController::new(transport, session, Arc::new(LoggingEventEmitter))
        .with_directory(directory))
}

async fn run(args: &Args, controller: &DeviceController) -> Result<()> {
    match &args.command {
        Command::Connect { address } => {
            let info = controller.connect(address).await?;
            println!("{}", output::connected(address, &info));
            return Ok(());
        }
        // Favorites are local; no device needed to list or remove them.
        Command::Favorites(FavoritesCommand::List) => {
            print_favorites(args, controller)?;
            return Ok(());
        }
        Command::Favorites(FavoritesCommand::Remove { id }) => {
            controller.remove_favorite(*id)?;
            println!("Removed favorite {id}");
            return Ok(());
        }
        _ => {}
    }

    if controller.reconnect_saved().await?.is_none() {
        bail!("No saved device. Run `soundtouch-remote connect <ADDRESS>` first.");
    }

    match &args.command {
        Command::Connect { .. }
        | Command::Favorites(FavoritesCommand::List)
        | Command::Favorites(FavoritesCommand::Remove { .. }) => {}
        Command::Status => {}
        Command::Key { key } => controller.send_key(*key).await?,
        Command::Volume { level } => {
            let volume = controller.set_volume(*level).await?;
            println!("{}", output::volume(&volume));
            return Ok(());
        }
        Command::Mute => {
            let volume = controller.toggle_mute().await?;
            println!("{}", output::volume(&volume));
            return Ok(());
        }
        Command::Preset(PresetCommand::List) => {
            let presets = controller.fetch_presets().await?;
            println!("{}", output::presets(&presets));
            return Ok(());
        }
        Command::Preset(PresetCommand::Select { slot }) => controller.select_preset(*slot).await?,
        Command::Preset(PresetCommand::Save { slot }) => {
            let presets = controller.save_current_to_preset(*slot).await?;
            println!("{}", output::presets(&presets));
            return Ok(());
        }
        Command::Favorites(FavoritesCommand::Add) => {
            let entry = controller.add_current_to_favorites()?;
            println!("Added favorite {} ({})", entry.id, entry.name);
            return Ok(());
        }
        Command::Favorites(FavoritesCommand::Play { id }) => controller.play_favorite(*id).await?,
        Command::Search { query, play } => {
            let results = controller.search(query).await?;
            match play {
                None => {
                    if args.json {
                        println!("{}", serde_json::to_string_pretty(&results)?);
                    } else {
                        println!("{}", output::stations(&results));
                    }
                    return Ok(());
                }
                Some(n) => {
                    let station = n
                        .checked_sub(1)
                        .and_then(|i| results.get(i))
                        .with_context(|| format!("No result #{n} ({} found)", results.len()))?;
                    controller.play_station(station).await?;
                }
            }
        }
        Command::Play {
            source,
            location,
            name,
        } => {
            controller
                .select_and_play(&ContentItem::new(source, location, name))
                .await?
        }
    }

    // Let the follow-up now-playing polls land before reporting.
    controller.wait_for_pending_polls().await;
    print_status(args, controller)
}

fn print_status(args: &Args, controller: &DeviceController) -> Result<()> {
    let snapshot = controller.session().snapshot();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", output::status(&snapshot));
    }
    Ok(())
}

fn print_favorites(args: &Args, controller: &DeviceController) -> Result<()> {
    let favorites = controller.session().favorites();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&favorites)?);
    } else {
        println!("{}", output::favorites(&favorites));
    }
    Ok(())
}
