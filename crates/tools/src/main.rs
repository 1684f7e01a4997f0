use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use foundation::math::{LatLon, MAX_DECIMALS, format_float, ground_resolution};
use inspector::{InMemoryMap, Inspector, InspectorOptions, RecordingCursor};
use layers::fixture::{FixtureLayer, StaticBackend, registry_from_layers};
use runtime::Interaction;
use serde::Deserialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Replays map clicks against fixture layers and prints the inspector trees.
#[derive(Debug, Parser)]
#[command(name = "geoinspect", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run every click of a scenario file through the inspector
    Inspect {
        #[arg(long)]
        scenario: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Override the scenario's decimal places
        #[arg(long)]
        decimals: Option<u32>,
        /// Inspect hidden layers too
        #[arg(long)]
        all_layers: bool,
    },
    /// Print the approximate ground scale at a latitude and zoom
    Scale {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long)]
        zoom: u8,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Scenario {
    map: MapView,
    #[serde(default)]
    options: InspectorOptions,
    #[serde(default)]
    layers: Vec<FixtureLayer>,
    #[serde(default)]
    clicks: Vec<ClickAt>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MapView {
    /// `[lat, lon]`
    center: [f64; 2],
    zoom: u8,
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClickAt {
    lat: f64,
    lon: f64,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    match Cli::parse().command {
        Command::Inspect {
            scenario,
            format,
            decimals,
            all_layers,
        } => cmd_inspect(scenario, format, decimals, all_layers),
        Command::Scale { lat, zoom } => {
            println!("{}", format_float(ground_resolution(lat, zoom)));
            Ok(())
        }
    }
}

fn cmd_inspect(
    path: PathBuf,
    format: Format,
    decimals: Option<u32>,
    all_layers: bool,
) -> Result<(), String> {
    let text = fs::read_to_string(&path).map_err(|e| format!("read {}: {e}", path.display()))?;
    let scenario: Scenario =
        serde_json::from_str(&text).map_err(|e| format!("parse {}: {e}", path.display()))?;
    debug!(
        layers = scenario.layers.len(),
        clicks = scenario.clicks.len(),
        "scenario loaded"
    );

    let mut options = scenario.options;
    if let Some(d) = decimals {
        if d > MAX_DECIMALS {
            return Err(format!("--decimals must be at most {MAX_DECIMALS}"));
        }
        options.decimals = d;
    }
    if all_layers {
        options.visible_only = false;
    }
    // Scenario clicks only make sense against an open inspector.
    options.opened = true;

    let layers = registry_from_layers(scenario.layers).map_err(|e| e.to_string())?;
    let [lat, lon] = scenario.map.center;
    let map = InMemoryMap::new(LatLon::new(lat, lon), scenario.map.zoom, layers);

    let mut inspector = Inspector::builder()
        .host_map(map)
        .backend(StaticBackend)
        .cursor(RecordingCursor::new())
        .options(options)
        .build()
        .map_err(|e| e.to_string())?;

    let mut rendered = Vec::new();
    for click in &scenario.clicks {
        let interaction = Interaction::click(LatLon::new(click.lat, click.lon));
        for _ in inspector.host_map_mut().dispatch(interaction) {
            let Some(tree) = inspector.on_interaction(interaction) else {
                continue;
            };
            match format {
                Format::Text => {
                    println!("# click lat={} lon={}", click.lat, click.lon);
                    print!("{tree}");
                }
                Format::Json => rendered.push(serde_json::json!({
                    "click": {"lat": click.lat, "lon": click.lon},
                    "tree": tree.to_json(),
                })),
            }
        }
    }
    inspector.close();

    if format == Format::Json {
        let out = serde_json::to_string_pretty(&rendered).map_err(|e| e.to_string())?;
        println!("{out}");
    }
    Ok(())
}
