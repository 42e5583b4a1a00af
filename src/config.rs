use crate::export::ExportOptions;
use crate::fringes::{FringeBound, FringeSelection, FringeState};
use crate::io::DptDatasetSource;
use crate::preview::{FringePreview, ProcessedPreview};
use crate::ratio::{AbsorbanceFloor, TRANSMITTANCE_LIMIT};
use crossbeam_channel::{Receiver, Sender};
use preferences::{AppInfo, Preferences};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

pub const APP_INFO: AppInfo = AppInfo {
    name: "FTIR Fringe Removal",
    author: "Linus Leo Stöckli",
};

pub const PREFS_KEY: &str = "config/processing";

/// Commands handled by the worker thread.
#[derive(Clone, Debug)]
pub enum ConfigCommand {
    OpenDataset(DptDatasetSource),
    AddFringe(FringeBound),
    SetFringeState(FringeBound, FringeState),
    RemoveFringe(FringeBound),
    SetZeroFillFactor(usize),
    SetPointReduction(usize),
    SetTransmittanceLimit(f64),
    SetAbsorbanceFloor(AbsorbanceFloor),
    SetOutputDir(PathBuf),
    UpdatePreview,
    Export(PathBuf),
    SaveConfig,
    Quit,
}

/// Processing parameters and the user's fringe selection, persisted between sessions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigContainer {
    pub zero_fill_factor: usize,
    pub point_reduction: usize,
    pub transmittance_limit: f64,
    pub absorbance_floor: AbsorbanceFloor,
    pub output_dir: PathBuf,
    pub fringes: FringeSelection,
}

impl Default for ConfigContainer {
    fn default() -> Self {
        ConfigContainer {
            zero_fill_factor: 1,
            point_reduction: 1,
            transmittance_limit: TRANSMITTANCE_LIMIT,
            absorbance_floor: AbsorbanceFloor::default(),
            output_dir: home::home_dir().unwrap_or_default(),
            fringes: FringeSelection::new(),
        }
    }
}

impl ConfigContainer {
    /// Loads the stored configuration, saving the defaults if there is none yet.
    pub fn load_or_default() -> Self {
        match ConfigContainer::load(&APP_INFO, PREFS_KEY) {
            Ok(config) => config,
            Err(err) => {
                log::info!("no stored configuration ({err}), using defaults");
                let config = ConfigContainer::default();
                if let Err(err) = config.save(&APP_INFO, PREFS_KEY) {
                    log::error!("error in saving the default configuration: {err:?}");
                }
                config
            }
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            zero_fill_factor: self.zero_fill_factor,
            transmittance_limit: self.transmittance_limit,
            absorbance_floor: self.absorbance_floor,
        }
    }
}

/// Channels and shared results between the caller and the worker thread.
#[derive(Clone)]
pub struct ThreadCommunication {
    pub config_tx: Sender<ConfigCommand>,
    pub config_rx: Receiver<ConfigCommand>,
    pub abort_flag: Arc<AtomicBool>,
    pub config: ConfigContainer,
    pub fringe_previews_lock: Arc<RwLock<Vec<FringePreview>>>,
    pub processed_lock: Arc<RwLock<Option<ProcessedPreview>>>,
    pub exported_lock: Arc<RwLock<Vec<PathBuf>>>,
    pub last_error_lock: Arc<RwLock<Option<String>>>,
}

impl ThreadCommunication {
    pub fn new(config: ConfigContainer) -> Self {
        let (config_tx, config_rx) = crossbeam_channel::unbounded();
        ThreadCommunication {
            config_tx,
            config_rx,
            abort_flag: Arc::new(AtomicBool::new(false)),
            config,
            fringe_previews_lock: Arc::new(RwLock::new(Vec::new())),
            processed_lock: Arc::new(RwLock::new(None)),
            exported_lock: Arc::new(RwLock::new(Vec::new())),
            last_error_lock: Arc::new(RwLock::new(None)),
        }
    }
}

/// Aborts a running preview computation and queues `command`.
///
/// Every command sent this way supersedes the preview work of the ones before it. The worker
/// clears the flag when it picks the command up.
pub fn send_latest_config(thread_communication: &ThreadCommunication, command: ConfigCommand) {
    thread_communication.abort_flag.store(true, Ordering::Relaxed);
    if let Err(err) = thread_communication.config_tx.send(command) {
        log::error!("failed sending command to the worker: {err:?}");
    }
}
