//! tv-remote: entry point.
//!
//! Finds smart TVs on the local network, lets the user pick one, performs the
//! on-screen approval handshake, and then sends remote-control key presses
//! chosen from a menu until the user quits.  On a terminal the menus are
//! arrow-key lists; with redirected input they fall back to numbered prompts.
//!
//! # Usage
//!
//! ```text
//! tv-remote [OPTIONS]
//!
//! Options:
//!   -p, --port <PORT>                 TV control port [default: 8002]
//!       --search-target <ST>          SSDP search target
//!                                     [default: urn:schemas-upnp-org:device:MediaRenderer:1]
//!       --discovery-timeout <SECS>    Discovery window [default: 5]
//!       --http-timeout <SECS>         Descriptor fetch timeout [default: 5]
//!       --app-id <ID>                 Control channel application id
//!                                     [default: samsung.remote.control]
//!       --config <PATH>               TOML config file
//!       --print-config                Print the effective config and exit
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                      | Description                 |
//! |-------------------------------|-----------------------------|
//! | `TV_REMOTE_PORT`              | TV control port             |
//! | `TV_REMOTE_SEARCH_TARGET`     | SSDP search target          |
//! | `TV_REMOTE_DISCOVERY_TIMEOUT` | Discovery window (secs)     |
//! | `TV_REMOTE_CONFIG`            | Config file path            |
//! | `RUST_LOG`                    | Log filter (logs go to stderr) |
//!
//! CLI args take precedence over environment variables, which take
//! precedence over the config file, which takes precedence over the
//! built-in defaults.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tv_remote::application::discover::{DescriptorFetcher, DeviceDiscoverer, SsdpSearch};
use tv_remote::application::dispatch::CommandError;
use tv_remote::application::select::{SelectError, Selection, Selector};
use tv_remote::application::session::{ListenerState, Session};
use tv_remote::infrastructure::network::descriptor::HttpDescriptorFetcher;
use tv_remote::infrastructure::network::ssdp::UdpSsdpSearch;
use tv_remote::infrastructure::network::websocket;
use tv_remote::infrastructure::prompt::PromptSelector;
use tv_remote::infrastructure::storage::config::{
    load_config, load_default_config, to_toml_string, RemoteConfig,
};
use tv_remote::infrastructure::terminal::TerminalSelector;
use tv_remote_core::protocol::messages::control_endpoint;
use tv_remote_core::DeviceInfo;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Control a smart TV over the local network.
#[derive(Debug, Parser)]
#[command(name = "tv-remote", about = "Control your TV via WebSocket", version)]
struct Cli {
    /// TCP port of the TV's control endpoint.
    #[arg(short, long, env = "TV_REMOTE_PORT")]
    port: Option<u16>,

    /// SSDP search target (`ST` header) used for discovery.
    #[arg(long, env = "TV_REMOTE_SEARCH_TARGET")]
    search_target: Option<String>,

    /// Number of seconds to wait for device discovery.
    #[arg(long, env = "TV_REMOTE_DISCOVERY_TIMEOUT")]
    discovery_timeout: Option<u64>,

    /// Timeout in seconds for each device descriptor request.
    #[arg(long)]
    http_timeout: Option<u64>,

    /// Application id used in the control endpoint path.
    #[arg(long)]
    app_id: Option<String>,

    /// Path to a TOML config file.  Defaults to the platform config file if
    /// it exists.
    #[arg(long, env = "TV_REMOTE_CONFIG")]
    config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    /// Loads the config file and overlays the CLI/env values on top.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named config file cannot be read or
    /// parsed, or the platform default file exists but is invalid.
    fn resolve_config(&self) -> anyhow::Result<RemoteConfig> {
        let base = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("loading config file {}", path.display()))?,
            None => load_default_config().context("loading default config file")?,
        };
        Ok(self.overlay(base))
    }

    fn overlay(&self, mut config: RemoteConfig) -> RemoteConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(st) = &self.search_target {
            config.search_target = st.clone();
        }
        if let Some(secs) = self.discovery_timeout {
            config.discovery_timeout = secs;
        }
        if let Some(secs) = self.http_timeout {
            config.http_timeout = secs;
        }
        if let Some(app_id) = &self.app_id {
            config.app_id = app_id.clone();
        }
        config
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Errors are reported on one line; the process exits non-zero.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.resolve_config()?;

    if cli.print_config {
        print!("{}", to_toml_string(&config)?);
        return Ok(());
    }

    // Logs go to stderr so they never interleave with the menus on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(io::stderr)
        .init();
    debug!(?config, "effective configuration");

    let mut selector = interactive_selector();
    let mut out = io::stdout();

    // ── Discovery ─────────────────────────────────────────────────────────────
    let fetcher = HttpDescriptorFetcher::new(Duration::from_secs(config.http_timeout))
        .context("building HTTP client")?;
    let discoverer = DeviceDiscoverer::new(
        UdpSsdpSearch::new(),
        fetcher,
        config.search_target.clone(),
        Duration::from_secs(config.discovery_timeout),
    );

    println!("Searching for devices...");
    let Some(device) = choose_device(&discoverer, selector.as_mut(), &mut out).await? else {
        return Ok(());
    };

    // ── Connect + handshake ───────────────────────────────────────────────────
    let url = control_endpoint(&device.address, config.port, &config.app_id);
    info!("connecting to {device} at {url}");
    let transport = websocket::connect(&url)
        .await
        .context("connecting to the TV")?;

    println!(
        "Attempting to connect to the TV. Please approve the connection request on your TV screen..."
    );
    let mut session = Session::handshake(transport)
        .await
        .context("TV authentication failed")?;
    println!("Connected to {device}");

    // ── Command loop ──────────────────────────────────────────────────────────
    let looped = command_loop(&mut session, selector.as_mut(), &mut out).await;
    session.close().await;
    looped.context("writing to stdout")
}

/// Arrow-key picker on a terminal, numbered prompt otherwise (pipes, CI).
fn interactive_selector() -> Box<dyn Selector> {
    if io::stdin().is_terminal() && io::stdout().is_terminal() {
        Box::new(TerminalSelector::new())
    } else {
        Box::new(PromptSelector::stdio())
    }
}

/// Runs discovery and asks the user to pick a device.
///
/// Returns `None` when nothing was found or the user quit.
///
/// # Errors
///
/// A failed search (socket bind, send, or receive) is a setup failure and is
/// returned, never reported as "no TVs".
async fn choose_device<S: SsdpSearch, F: DescriptorFetcher>(
    discoverer: &DeviceDiscoverer<S, F>,
    selector: &mut dyn Selector,
    out: &mut impl Write,
) -> anyhow::Result<Option<DeviceInfo>> {
    let devices = discoverer
        .discover()
        .await
        .context("discovering devices")?;
    if devices.is_empty() {
        writeln!(out, "No TVs found on the network")?;
        return Ok(None);
    }

    let labels: Vec<String> = devices.iter().map(ToString::to_string).collect();
    let chosen = loop {
        match tokio::task::block_in_place(|| selector.select("Discovered TVs:", &labels)) {
            Ok(Selection::Chosen(idx)) => break Some(idx),
            Ok(Selection::Cancelled) => break None,
            Err(SelectError::InvalidSelection(_)) => writeln!(out, "Invalid selection")?,
            Err(e) => return Err(e.into()),
        }
    };

    Ok(chosen.and_then(|idx| devices.into_iter().nth(idx)))
}

/// Prompts for commands and sends them until the user quits or the session
/// ends.  The end reason is printed once, after the loop.
async fn command_loop(
    session: &mut Session,
    selector: &mut dyn Selector,
    out: &mut impl Write,
) -> io::Result<()> {
    let commands: Vec<String> = session
        .available_commands()
        .into_iter()
        .map(str::to_string)
        .collect();

    while session.is_alive() {
        let name = match tokio::task::block_in_place(|| {
            selector.select("Available commands:", &commands)
        }) {
            Ok(Selection::Chosen(idx)) => &commands[idx],
            Ok(Selection::Cancelled) => break,
            Err(SelectError::InvalidSelection(_)) => {
                writeln!(out, "Invalid selection")?;
                continue;
            }
            Err(e) => {
                writeln!(out, "{e}")?;
                break;
            }
        };

        match session.execute(name).await {
            Ok(()) => writeln!(out, "Command sent successfully")?,
            // The listener stopped while the user was choosing.
            Err(CommandError::SessionEnded(_)) => break,
            Err(e) => writeln!(out, "{e}")?,
        }
    }

    if let ListenerState::Ended(end) = session.state() {
        writeln!(out, "Session ended: {end}")?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
