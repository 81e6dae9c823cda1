use std::sync::mpsc::Sender as ReadySender;
use std::sync::Arc;

use colored::Colorize;
use crossbeam_channel::{select, tick, Receiver};

use hotpad_gamepad::InputContext;
use hotpad_mappings::CommunityDb;

use crate::registry::Registry;
use crate::service::{Command, HotkeyCallback, ServiceConfig, Shared};
use crate::{print_info, print_warning};

/// Body of the dedicated poll thread. All SDL state is created and dropped
/// here; the init result is reported back over `ready_tx` before the loop
/// starts.
pub(crate) fn run(
    config: ServiceConfig,
    shared: Arc<Shared>,
    cmd_rx: Receiver<Command>,
    ready_tx: ReadySender<Result<(), String>>,
    callback: HotkeyCallback,
) {
    let mut ctx = match InputContext::init() {
        Ok(ctx) => {
            let _ = ready_tx.send(Ok(()));
            ctx
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e.to_string()));
            return;
        }
    };

    let community = match config.community_db_path.as_deref() {
        Some(path) => match CommunityDb::load(path) {
            Ok(db) => db,
            Err(e) => {
                print_warning!("community database unavailable: {e}");
                CommunityDb::default()
            }
        },
        None => CommunityDb::default(),
    };

    let mut registry =
        Registry::new(config.mapping_path.clone(), community, shared);
    ctx.pump();
    registry.scan(&ctx);

    let poll = tick(config.poll_interval);
    let cleanup = tick(config.cleanup_interval);
    let mut polling = false;

    loop {
        select! {
            recv(cmd_rx) -> cmd => match cmd {
                Ok(Command::Start) => {
                    polling = true;
                    print_info!("polling started");
                }
                Ok(Command::Stop) => {
                    polling = false;
                    registry.reset_combo_state();
                    print_info!("polling stopped");
                }
                Ok(Command::Shutdown) | Err(_) => break,
            },
            recv(poll) -> _ => {
                if polling {
                    ctx.pump();
                    registry.scan(&ctx);
                    registry.poll_tick(
                        &callback,
                        config.retrigger,
                        config.enable_vibration,
                    );
                }
            }
            recv(cleanup) -> _ => {
                // Attached flags only move during event pumping; the poll
                // branch does not pump while polling is stopped.
                ctx.pump();
                registry.cleanup();
            }
        }
    }

    registry.close_all();
}
