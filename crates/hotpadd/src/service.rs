use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;

use ahash::AHashMap;
use crossbeam_channel::{unbounded, Sender};

use hotpad_gamepad::InstanceId;
use hotpad_mappings::DeviceIdentity;

use crate::detector::Retrigger;
use crate::error::ServiceError;
use crate::poller;

/// Invoked from the poll thread on every detected combo. The host is
/// responsible for any thread marshaling it requires.
pub type HotkeyCallback = Arc<dyn Fn() + Send + Sync>;

/// Configuration consumed at service initialization.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Path of the persisted per-device mapping file (JSON).
    pub mapping_path: PathBuf,
    /// Optional community mapping database used for auto-assignment.
    pub community_db_path: Option<PathBuf>,
    /// Whether a detected combo triggers rumble feedback.
    pub enable_vibration: bool,
    pub poll_interval: Duration,
    pub cleanup_interval: Duration,
    pub retrigger: Retrigger,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            mapping_path: PathBuf::from("controllers.json"),
            community_db_path: None,
            enable_vibration: true,
            poll_interval: Duration::from_millis(100),
            cleanup_interval: Duration::from_secs(30),
            retrigger: Retrigger::default(),
        }
    }
}

/// State shared between the poll thread and caller-facing accessors.
#[derive(Default)]
pub(crate) struct Shared {
    pub devices: RwLock<AHashMap<InstanceId, DeviceIdentity>>,
}

/// Commands sent to the poll thread.
pub(crate) enum Command {
    Start,
    Stop,
    Shutdown,
}

/// Facade over the background hotkey detection loop.
///
/// All native state lives on a dedicated thread that this handle talks to
/// over a command channel; the stop signal is observed within one poll
/// interval, in-flight device reads complete naturally.
pub struct HotkeyService {
    shared: Arc<Shared>,
    cmd_tx: Sender<Command>,
    thread: Option<JoinHandle<()>>,
}

impl HotkeyService {
    /// Spawns the poll thread and waits for native initialization to
    /// complete. A backend init failure is the one error that reaches the
    /// caller.
    pub fn initialize(
        config: ServiceConfig,
        callback: HotkeyCallback,
    ) -> Result<Self, ServiceError> {
        let shared = Arc::new(Shared::default());
        let (cmd_tx, cmd_rx) = unbounded::<Command>();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();

        let thread = std::thread::Builder::new()
            .name("hotpad-poll".into())
            .spawn({
                let shared = shared.clone();
                move || poller::run(config, shared, cmd_rx, ready_tx, callback)
            })
            .map_err(|e| ServiceError::NativeInit(e.to_string()))?;

        match ready_rx.recv_timeout(Duration::from_secs(5)) {
            Ok(Ok(())) => Ok(Self {
                shared,
                cmd_tx,
                thread: Some(thread),
            }),
            Ok(Err(message)) => {
                let _ = thread.join();
                Err(ServiceError::NativeInit(message))
            }
            Err(_) => Err(ServiceError::NativeInit(
                "poll thread did not report readiness".into(),
            )),
        }
    }

    pub fn start_polling(&self) -> Result<(), ServiceError> {
        self.send(Command::Start)
    }

    pub fn stop_polling(&self) -> Result<(), ServiceError> {
        self.send(Command::Stop)
    }

    /// Snapshot of currently connected device identities.
    pub fn devices(&self) -> Vec<DeviceIdentity> {
        self.shared
            .devices
            .read()
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Stops the loop, closes all devices and joins the poll thread.
    pub fn shutdown(mut self) {
        let _ = self.cmd_tx.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    fn send(&self, command: Command) -> Result<(), ServiceError> {
        self.cmd_tx
            .send(command)
            .map_err(|_| ServiceError::NotRunning)
    }
}

impl Drop for HotkeyService {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
