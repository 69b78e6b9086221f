#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that renders a fire propagation run as ASCII frames.

mod render;
mod settings;

use std::{
    io::{self, Write},
    thread,
    time::Instant,
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use fire_propagation_controller::Controller;
use fire_propagation_core::{RejectionReason, TITLE};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::settings::{Args, Settings};

/// Entry point for the fire propagation command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let settings = Settings::from_args(&args)?;
    let stdout = io::stdout();
    run(settings, &mut stdout.lock())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Runs one simulation to completion, writing a frame per generation.
fn run(settings: Settings, out: &mut impl Write) -> Result<()> {
    let mut controller = Controller::new(settings.config);
    simulate(&mut controller, &settings, out)
}

fn simulate(controller: &mut Controller, settings: &Settings, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{TITLE} ({})", settings.config.size)?;

    if settings.random_walls {
        controller
            .randomize_walls()
            .map_err(|reason| rejected("randomize walls", reason))?;
    }
    match settings.ignite {
        Some(cell) => controller
            .ignite(cell)
            .map_err(|reason| rejected("ignite", reason))?,
        None => controller
            .start()
            .map_err(|reason| rejected("start", reason))?,
    }
    log_events(controller);
    write_current(out, controller)?;

    while let Some(remaining) = controller.until_next_step() {
        if settings
            .max_generations
            .is_some_and(|limit| controller.generation() >= limit)
        {
            break;
        }

        let previous = controller.generation();
        if settings.delay {
            let started = Instant::now();
            thread::sleep(remaining);
            controller.advance(started.elapsed());
        } else {
            controller.advance(remaining);
        }
        log_events(controller);

        if controller.generation() != previous {
            write_current(out, controller)?;
        }
    }

    let census = controller.census();
    info!(
        generation = controller.generation(),
        burning = census.burning,
        "simulation finished"
    );
    writeln!(
        out,
        "finished after {} generations with {} of {} cells burning",
        controller.generation(),
        census.burning,
        settings.config.size.cell_count()
    )?;
    out.flush().context("failed to flush output")
}

fn write_current(out: &mut impl Write, controller: &Controller) -> Result<()> {
    render::write_frame(
        out,
        controller.grid(),
        controller.generation(),
        controller.state(),
    )
    .context("failed to write frame")
}

fn log_events(controller: &mut Controller) {
    for event in controller.drain_events() {
        debug!(?event, "simulation event");
    }
}

fn rejected(action: &str, reason: RejectionReason) -> anyhow::Error {
    anyhow!("simulation refused to {action}: {reason:?}")
}
