mod cli;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use crossbeam_channel::unbounded;

use hotpadd::{
    logging, print_error, print_info, HotkeyService, Retrigger, ServiceConfig,
};

fn main() {
    let cli = cli::Cli::parse();
    logging::setup(cli.log_level(), cli.no_color);

    // Handle Ctrl+C to exit cleanly
    let (stop_tx, stop_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })
    .expect("failed to set Ctrl+C handler");

    let config = ServiceConfig {
        mapping_path: cli.mappings,
        community_db_path: cli.database,
        enable_vibration: !cli.no_vibration,
        poll_interval: Duration::from_millis(cli.interval_ms),
        retrigger: if cli.every_tick {
            Retrigger::EveryTick
        } else {
            Retrigger::RisingEdge
        },
        ..ServiceConfig::default()
    };

    let combos = Arc::new(AtomicU64::new(0));
    let callback = {
        let combos = combos.clone();
        Arc::new(move || {
            let n = combos.fetch_add(1, Ordering::Relaxed) + 1;
            print_info!("hotkey combo pressed (#{n})");
        })
    };

    let service = match HotkeyService::initialize(config, callback) {
        Ok(service) => service,
        Err(e) => {
            print_error!("failed to start input service: {e}");
            return;
        }
    };
    if let Err(e) = service.start_polling() {
        print_error!("failed to start polling: {e}");
        return;
    }
    print_info!("hotpadd started. Press the mapped combo on any controller.");

    let _ = stop_rx.recv();
    print_info!("shutting down");
    service.shutdown();
}
