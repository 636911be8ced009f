// SPDX-License-Identifier: GPL-3.0-only
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};

use panel_control::config::Config;
use panel_control::devices;
use panel_control::display::{DisplayEvent, InputSource};
use panel_control::protocols::DisplayProtocol;
use panel_control::protocols::planar::codec::percent_to_level;

#[macro_use]
extern crate tracing;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "panel-control", version, about = "Control a networked flat-panel display")]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/panel-control/config.kdl)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Display declared in the config file
    #[arg(long, short, global = true, conflicts_with = "address")]
    display: Option<String>,

    /// Display address, bypassing the config file
    #[arg(long, global = true)]
    address: Option<String>,

    /// Device type used with --address
    #[arg(long, global = true, default_value_t = devices::planar::ultrares::DEVICE_TYPE)]
    device_type: u16,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List supported device types
    ListTypes,
    /// Connect, print notifications and accept commands on stdin
    Watch,
    /// Send a single command and print the feedback that follows
    Send {
        #[command(subcommand)]
        action: Action,

        /// Seconds to wait for feedback
        #[arg(long, default_value_t = 2)]
        wait: u64,
    },
}

#[derive(Subcommand, Debug, Clone)]
enum Action {
    Power { state: Toggle },
    Volume {
        level: u16,
        /// Treat LEVEL as 0-100 instead of 0-65535
        #[arg(long)]
        percent: bool,
    },
    Input { source: InputSource },
    Quad { state: Toggle },
    /// Print the believed state
    Status,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Toggle {
    On,
    Off,
}

impl From<Toggle> for bool {
    fn from(toggle: Toggle) -> Self {
        matches!(toggle, Toggle::On)
    }
}

/// One line typed at the `watch` prompt
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct ConsoleLine {
    #[command(subcommand)]
    action: Action,
}

fn setup_logs(config_filter: Option<&str>) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let default_filter = config_filter
        .map(str::to_string)
        .unwrap_or_else(|| format!("warn,{}=info", env!("CARGO_CRATE_NAME")));
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    #[cfg(feature = "journald")]
    if let Ok(journal_layer) = tracing_journald::layer() {
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .with(journal_layer)
            .init();
        return;
    }

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

fn describe(event: &DisplayEvent) -> String {
    match event {
        DisplayEvent::PowerChanged(on) => format!("power {}", if *on { "on" } else { "off" }),
        DisplayEvent::VolumeChanged(level) => format!("volume {}", level),
        DisplayEvent::InputChanged(input) => format!("input {}", input),
        DisplayEvent::QuadViewChanged(quad) => format!("quad {}", if *quad { "on" } else { "off" }),
        DisplayEvent::Connected => "connected".to_string(),
        DisplayEvent::Disconnected => "disconnected".to_string(),
    }
}

fn print_status(display: &dyn DisplayProtocol) {
    let state = display.state();
    println!("{} ({})", display.name(), state.address);
    println!("  power:  {}", if state.power { "on" } else { "off" });
    println!("  volume: {}", state.volume);
    println!("  input:  {}", state.input);
    if state.supports_quad() {
        println!("  quad:   {}", if state.quad_display { "on" } else { "off" });
    }
}

fn apply(display: &dyn DisplayProtocol, action: &Action) -> panel_control::error::Result<()> {
    match action {
        Action::Power { state } => display.set_power((*state).into()),
        Action::Volume { level, percent } => {
            let level = if *percent { percent_to_level(*level) } else { *level };
            display.set_volume(level)
        }
        Action::Input { source } => display.set_input(*source),
        Action::Quad { state } => display.set_quad_display((*state).into()),
        Action::Status => {
            print_status(display);
            Ok(())
        }
    }
}

/// Pick the device type and address from the flags or the config file
fn resolve_target(cli: &Cli, config: &Config) -> Result<(u16, String)> {
    if let Some(address) = &cli.address {
        return Ok((cli.device_type, address.clone()));
    }

    let display = match &cli.display {
        Some(name) => config
            .display(name)
            .ok_or_else(|| anyhow!("display '{}' is not in the config file", name))?,
        None => match config.displays.as_slice() {
            [only] => only,
            [] => bail!("no display configured; pass --address or add one to the config file"),
            _ => bail!("several displays configured; pick one with --display"),
        },
    };

    Ok((display.device_type, display.address.clone()))
}

async fn wait_connected(
    events: &mut tokio::sync::mpsc::UnboundedReceiver<DisplayEvent>,
) -> Result<()> {
    let connected = tokio::time::timeout(CONNECT_TIMEOUT, async {
        while let Some(event) = events.recv().await {
            match event {
                DisplayEvent::Connected => return Ok(()),
                DisplayEvent::Disconnected => bail!("connection failed"),
                _ => {}
            }
        }
        Err(anyhow!("driver dropped"))
    })
    .await;

    connected.unwrap_or_else(|_| Err(anyhow!("timed out connecting")))
}

async fn watch(
    display: &dyn DisplayProtocol,
    events: &mut tokio::sync::mpsc::UnboundedReceiver<DisplayEvent>,
) -> Result<()> {
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Some(DisplayEvent::Disconnected) | None => {
                    println!("disconnected");
                    return Ok(());
                }
                Some(event) => println!("{}", describe(&event)),
            },
            line = stdin.next_line(), if stdin_open => match line? {
                Some(line) if line.trim().is_empty() => {}
                Some(line) => match ConsoleLine::try_parse_from(line.split_whitespace()) {
                    Ok(parsed) => {
                        if let Err(e) = apply(display, &parsed.action) {
                            eprintln!("{}", e);
                        }
                    }
                    Err(e) => eprintln!("{}", e),
                },
                None => stdin_open = false,
            },
        }
    }

    display.disconnect();
    Ok(())
}

async fn send(
    display: &dyn DisplayProtocol,
    events: &mut tokio::sync::mpsc::UnboundedReceiver<DisplayEvent>,
    action: &Action,
    wait: u64,
) -> Result<()> {
    apply(display, action)?;

    let deadline = tokio::time::sleep(Duration::from_secs(wait));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            event = events.recv() => match event {
                Some(DisplayEvent::Disconnected) | None => break,
                Some(event) => println!("{}", describe(&event)),
            },
        }
    }

    display.disconnect();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config.clone().or_else(Config::default_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    setup_logs(config.log_filter.as_deref());

    if let Command::ListTypes = cli.command {
        for spec in devices::SUPPORTED {
            println!(
                "{:>5}  {} (port {}, quad view: {})",
                spec.device_type,
                spec.name,
                spec.port,
                if spec.supports_quad { "yes" } else { "no" }
            );
        }
        return Ok(());
    }

    let (device_type, address) = resolve_target(&cli, &config)?;
    let display = devices::create_display(device_type, &address)?;
    let (_subscription, mut events) = display.events();

    display.connect()?;
    wait_connected(&mut events).await?;
    let display_id = display.id();
    info!("Connected to {}", display_id);

    match &cli.command {
        Command::Watch => watch(display.as_ref(), &mut events).await,
        Command::Send { action, wait } => send(display.as_ref(), &mut events, action, *wait).await,
        Command::ListTypes => Ok(()),
    }
}
