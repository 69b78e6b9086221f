use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use fire_propagation_controller::{ControllerConfig, DEFAULT_SEED};
use fire_propagation_core::{
    CellCoord, GridSize, PropagationInterval, WallDensity, DEFAULT_GRID_SIZE,
    DEFAULT_INTERVAL_MS, DEFAULT_WALL_DENSITY,
};
use serde::Deserialize;

/// Command-line arguments accepted by the simulator.
#[derive(Debug, Default, Parser)]
#[command(
    name = "fire-propagation",
    about = "Simulates fire spreading across a grid of walls and open ground"
)]
pub(crate) struct Args {
    /// TOML file providing defaults for every other option.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
    /// Side length of the square grid.
    #[arg(long, value_name = "N")]
    pub(crate) size: Option<u32>,
    /// Milliseconds between two generations (0..=1000).
    #[arg(long, value_name = "MS")]
    pub(crate) interval_ms: Option<u32>,
    /// Probability that a cell becomes a wall when walls are randomized.
    #[arg(long, value_name = "F")]
    pub(crate) wall_density: Option<f64>,
    /// Seed for random ignition and wall placement.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Scatters random walls before the fire starts.
    #[arg(long)]
    pub(crate) random_walls: bool,
    /// Cell to ignite, written as ROW,COL. A random cell burns otherwise.
    #[arg(long, value_name = "ROW,COL", value_parser = parse_cell)]
    pub(crate) ignite: Option<CellCoord>,
    /// Stops after this many generations even if the fire still spreads.
    #[arg(long, value_name = "N")]
    pub(crate) max_generations: Option<u64>,
    /// Advances simulated time without sleeping between generations.
    #[arg(long)]
    pub(crate) no_delay: bool,
}

/// Optional values read from a TOML configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    size: Option<u32>,
    interval_ms: Option<u32>,
    wall_density: Option<f64>,
    seed: Option<u64>,
    random_walls: Option<bool>,
    ignite: Option<CellCoord>,
    max_generations: Option<u64>,
}

/// Validated run parameters with flags layered over the file values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) config: ControllerConfig,
    pub(crate) random_walls: bool,
    pub(crate) ignite: Option<CellCoord>,
    pub(crate) max_generations: Option<u64>,
    pub(crate) delay: bool,
}

impl Settings {
    /// Loads the optional config file and merges the flags on top of it.
    pub(crate) fn from_args(args: &Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                parse_file(&contents)
                    .with_context(|| format!("failed to parse config {}", path.display()))?
            }
            None => FileSettings::default(),
        };
        Self::merge(args, file)
    }

    fn merge(args: &Args, file: FileSettings) -> Result<Self> {
        let size = args.size.or(file.size).unwrap_or(DEFAULT_GRID_SIZE);
        let size = GridSize::new(size).context("invalid --size")?;
        let interval = args
            .interval_ms
            .or(file.interval_ms)
            .unwrap_or(DEFAULT_INTERVAL_MS);
        let interval = PropagationInterval::from_millis(interval).context("invalid --interval-ms")?;
        let density = args
            .wall_density
            .or(file.wall_density)
            .unwrap_or(DEFAULT_WALL_DENSITY);
        let wall_density = WallDensity::new(density).context("invalid --wall-density")?;

        let ignite = args.ignite.or(file.ignite);
        if let Some(cell) = ignite {
            if !size.contains(cell) {
                bail!("ignition point {cell} lies outside the {size} grid");
            }
        }

        Ok(Self {
            config: ControllerConfig {
                size,
                interval,
                wall_density,
                seed: args.seed.or(file.seed).unwrap_or(DEFAULT_SEED),
            },
            random_walls: args.random_walls || file.random_walls.unwrap_or(false),
            ignite,
            max_generations: args.max_generations.or(file.max_generations),
            delay: !args.no_delay,
        })
    }
}

fn parse_file(contents: &str) -> Result<FileSettings> {
    toml::from_str(contents).context("invalid TOML")
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (row, column) = value
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL but found `{value}`"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|error| format!("invalid row `{row}`: {error}"))?;
    let column = column
        .trim()
        .parse()
        .map_err(|error| format!("invalid column `{column}`: {error}"))?;
    Ok(CellCoord::new(row, column))
}
