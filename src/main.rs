use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;

use lsp_ctrl::{config, logging, sink, Cli, CommandQueue, Console, Dispatcher, ProgramLibrary, Waveform};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config file first, then command line overrides
    let options = config::load_config(&cli.configdir)?;
    let options = cli.merge_into_options(options)?;

    logging::init(
        options.log_level,
        options.log_file.as_deref().map(std::path::Path::new),
    )
    .context("Failed to open log file")?;

    let timing = options.timing().context("Invalid line timing")?;
    log::info!(
        "Line: {} Hz, {} baud, {} samples/bit, carrier {:.0} Hz",
        timing.sample_rate(),
        timing.baud_rate(),
        timing.samples_per_bit(),
        timing.carrier_frequency()
    );
    log::info!("Programs: {}", options.program_dir.display());

    let queue = CommandQueue::new();
    let sink_kind = options.sink.clone();
    let handle = Dispatcher::spawn(
        queue.clone(),
        Waveform::new(timing),
        options.settle_delay(),
        move |timing| sink::open(&sink_kind, timing),
    )?;

    let console = Console::new(queue, ProgramLibrary::new(&options.program_dir), handle.view());

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read request")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let reply = console.handle_line(trimmed);
        writeln!(stdout, "{}", reply.to_json())?;
        stdout.flush()?;

        if !handle.is_running() {
            anyhow::bail!("Dispatcher stopped unexpectedly");
        }
    }

    log::info!("Input closed, waiting for the line to drain");
    handle
        .wait_idle()
        .context("Queued commands were not transmitted")?;
    log::info!("Exiting");
    Ok(())
}
