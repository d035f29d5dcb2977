#![warn(rust_2018_idioms)]

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use flexi_logger::{LogSpecBuilder, LoggerHandle};
use log::{info, warn, LevelFilter};
use tokio::sync::{mpsc, watch};

use codeswap_client::console::{self, Console};
use codeswap_client::{run, settings};

fn main() -> anyhow::Result<()> {
    let mut settings = settings::load()?;
    if let Some(room) = env::args().nth(1) {
        settings.session.room = room;
    }
    let _logger = setup_logger(&settings.logging)?;
    let room = settings
        .session
        .room_code()
        .context("no room code; pass one as the first argument")?;
    let shutdown_rx = setup_signal()?;
    let runtime = setup_runtime(&settings.runtime)?;

    let stats = runtime.block_on(async {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        console::spawn_stdin(input_tx);
        let mut console = Console::default();
        run(&settings, room, &mut console, input_rx, shutdown_rx).await
    })?;
    info!(
        "{} polls, {} requests, visited {}",
        stats.polls,
        stats.requests,
        stats
            .trail
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    // The stdin reader sits in a blocking read nobody will finish.
    runtime.shutdown_timeout(Duration::from_millis(100));
    info!("good-bye, world!");
    Ok(())
}

fn setup_logger(l: &settings::Logging) -> anyhow::Result<LoggerHandle> {
    let mut spec_builder = LogSpecBuilder::new();
    spec_builder.default(LevelFilter::from_str(&l.level)?);
    let spec = spec_builder.build();
    let handle = flexi_logger::Logger::with(spec)
        .format(flexi_logger::default_format)
        .start()?;
    Ok(handle)
}

fn setup_signal() -> anyhow::Result<watch::Receiver<bool>> {
    let (signal_tx, signal_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        info!("received interrupt signal");
        signal_tx.send(true).ok();
    })?;
    Ok(signal_rx)
}

fn setup_runtime(r: &settings::Runtime) -> anyhow::Result<tokio::runtime::Runtime> {
    let mut builder = if r.threaded {
        let worker_threads = if r.worker_threads == 0 {
            warn!("worker_threads must be positive; adjusting to 1");
            1
        } else {
            r.worker_threads
        };
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        builder.worker_threads(worker_threads);
        builder
    } else {
        tokio::runtime::Builder::new_current_thread()
    };
    builder.enable_all().thread_name(&r.thread_name);
    Ok(builder.build()?)
}
