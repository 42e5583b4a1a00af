use crate::cancellable_loops::par_map_cancellable;
use crate::config::{ConfigCommand, ConfigContainer, ThreadCommunication, APP_INFO, PREFS_KEY};
use crate::error::DatasetRole;
use crate::export::export_with;
use crate::fringes::FringeBound;
use crate::io::{write_processed, DatasetSource};
use crate::preview::{preview_fringe, preview_processed, FringePreview};
use crate::series::Dataset;
use preferences::Preferences;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Instant;

#[derive(Default)]
struct LoadedData {
    sample: Option<Dataset>,
    background: Option<Dataset>,
}

impl LoadedData {
    fn pair(&self) -> Option<(&Dataset, &Dataset)> {
        match (&self.sample, &self.background) {
            (Some(s), Some(b)) => Some((s, b)),
            _ => None,
        }
    }
}

fn report_error(thread_communication: &ThreadCommunication, message: String) {
    log::error!("{message}");
    if let Ok(mut last_error) = thread_communication.last_error_lock.write() {
        *last_error = Some(message);
    }
}

/// Recomputes the preview of every known fringe and the cleaned single beams.
///
/// A preview that is aborted halfway leaves the previous results in place.
fn update_previews(
    data: &LoadedData,
    config: &ConfigContainer,
    thread_communication: &ThreadCommunication,
) {
    let Some((sample, background)) = data.pair() else {
        log::debug!("preview skipped, sample and background are not both loaded");
        return;
    };
    let start = Instant::now();
    let bounds: Vec<FringeBound> = config.fringes.iter().map(|(b, _)| *b).collect();
    let reduction = config.point_reduction;

    let Some(previews) = par_map_cancellable(&bounds, &thread_communication.abort_flag, |bound| {
        preview_fringe(sample, background, bound, reduction)
    }) else {
        log::info!("preview aborted");
        return;
    };
    let previews = match previews.into_iter().collect::<Result<Vec<FringePreview>, _>>() {
        Ok(previews) => previews,
        Err(err) => {
            report_error(thread_communication, format!("fringe preview failed: {err}"));
            return;
        }
    };
    if let Ok(mut lock) = thread_communication.fringe_previews_lock.write() {
        *lock = previews;
    }

    if thread_communication.abort_flag.swap(false, Ordering::Relaxed) {
        log::info!("preview aborted");
        return;
    }
    match preview_processed(sample, background, &config.fringes, reduction) {
        Ok(processed) => {
            if let Ok(mut lock) = thread_communication.processed_lock.write() {
                *lock = Some(processed);
            }
        }
        Err(err) => report_error(thread_communication, format!("processing failed: {err}")),
    }
    log::debug!("updated previews. This took {:?}", start.elapsed());
}

fn export_to(
    data: &LoadedData,
    config: &ConfigContainer,
    base_path: PathBuf,
    thread_communication: &ThreadCommunication,
) {
    let Some((sample, background)) = data.pair() else {
        report_error(
            thread_communication,
            "export needs a sample and a background dataset".to_string(),
        );
        return;
    };
    let base_path = if base_path.is_absolute() {
        base_path
    } else {
        config.output_dir.join(base_path)
    };
    let result = match export_with(sample, background, &config.fringes, &config.export_options()) {
        Ok(result) => result,
        Err(err) => {
            report_error(thread_communication, format!("export failed: {err}"));
            return;
        }
    };
    match write_processed(&result, &base_path) {
        Ok(written) => {
            if let Ok(mut lock) = thread_communication.exported_lock.write() {
                *lock = written;
            }
        }
        Err(err) => report_error(
            thread_communication,
            format!("failed writing export to {base_path:?}: {err}"),
        ),
    }
}

/// Worker loop: applies commands to its own copy of the configuration until `Quit`.
pub fn main_thread(thread_communication: ThreadCommunication) {
    let mut config = thread_communication.config.clone();
    let mut data = LoadedData::default();

    while let Ok(command) = thread_communication.config_rx.recv() {
        // a raised flag belonged to the command that was just received
        thread_communication.abort_flag.store(false, Ordering::Relaxed);
        match command {
            ConfigCommand::OpenDataset(source) => match source.load() {
                Ok(dataset) => {
                    log::info!("opened {} dataset {:?}", source.role, source.interferogram);
                    match dataset.role() {
                        DatasetRole::Sample => data.sample = Some(dataset),
                        DatasetRole::Background => data.background = Some(dataset),
                    }
                    update_previews(&data, &config, &thread_communication);
                }
                Err(err) => report_error(
                    &thread_communication,
                    format!("failed opening {:?}: {err}", source.interferogram),
                ),
            },
            ConfigCommand::AddFringe(bound) => {
                config.fringes.include(bound);
                update_previews(&data, &config, &thread_communication);
            }
            ConfigCommand::SetFringeState(bound, state) => {
                config.fringes.set_state(bound, state);
                update_previews(&data, &config, &thread_communication);
            }
            ConfigCommand::RemoveFringe(bound) => {
                if !config.fringes.remove(&bound) {
                    log::warn!("fringe {bound} is not in the selection");
                }
                update_previews(&data, &config, &thread_communication);
            }
            ConfigCommand::SetZeroFillFactor(factor) => {
                config.zero_fill_factor = factor;
            }
            ConfigCommand::SetPointReduction(factor) => {
                config.point_reduction = factor;
                update_previews(&data, &config, &thread_communication);
            }
            ConfigCommand::SetTransmittanceLimit(limit) => {
                config.transmittance_limit = limit;
            }
            ConfigCommand::SetAbsorbanceFloor(floor) => {
                config.absorbance_floor = floor;
            }
            ConfigCommand::SetOutputDir(dir) => {
                config.output_dir = dir;
            }
            ConfigCommand::UpdatePreview => {
                update_previews(&data, &config, &thread_communication);
            }
            ConfigCommand::Export(base_path) => {
                export_to(&data, &config, base_path, &thread_communication);
            }
            ConfigCommand::SaveConfig => {
                if let Err(err) = config.save(&APP_INFO, PREFS_KEY) {
                    report_error(
                        &thread_communication,
                        format!("error in saving the configuration: {err:?}"),
                    );
                }
            }
            ConfigCommand::Quit => {
                log::debug!("worker thread stopped");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{write_table, DptDatasetSource};
    use crate::synthetic::{centerburst, dataset, inject_fringe};
    use std::path::Path;
    use std::thread;

    fn source(dir: &Path, role: DatasetRole, values: Vec<f64>) -> DptDatasetSource {
        let d = dataset(role, values);
        let interferogram = dir.join(format!("{role}_ifg.dpt"));
        let single_beam = dir.join(format!("{role}_sb.dpt"));
        write_table(&interferogram, d.interferogram().series()).unwrap();
        write_table(&single_beam, d.single_beam().series()).unwrap();
        DptDatasetSource {
            role,
            interferogram,
            single_beam,
            parameters: None,
        }
    }

    #[test]
    fn test_worker_previews_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let mut contaminated = centerburst(256);
        inject_fringe(&mut contaminated, 120, 140, 0.2);

        let mut config = ConfigContainer::default();
        config.output_dir = dir.path().to_path_buf();
        config.point_reduction = 2;
        let comm = ThreadCommunication::new(config);
        let worker = {
            let comm = comm.clone();
            thread::spawn(move || main_thread(comm))
        };

        let tx = &comm.config_tx;
        tx.send(ConfigCommand::OpenDataset(source(
            dir.path(),
            DatasetRole::Sample,
            contaminated,
        )))
        .unwrap();
        tx.send(ConfigCommand::OpenDataset(source(
            dir.path(),
            DatasetRole::Background,
            centerburst(256),
        )))
        .unwrap();
        tx.send(ConfigCommand::AddFringe(FringeBound::new(120.0, 140.0).unwrap()))
            .unwrap();
        tx.send(ConfigCommand::SetZeroFillFactor(2)).unwrap();
        tx.send(ConfigCommand::Export(PathBuf::from("worker.dpt")))
            .unwrap();
        tx.send(ConfigCommand::Quit).unwrap();
        worker.join().unwrap();

        assert!(comm.last_error_lock.read().unwrap().is_none());
        let previews = comm.fringe_previews_lock.read().unwrap();
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].sample_component.len(), 128);
        let processed = comm.processed_lock.read().unwrap();
        assert_eq!(processed.as_ref().unwrap().transmittance.len(), 128);
        let exported = comm.exported_lock.read().unwrap();
        assert_eq!(exported.len(), 5);
        assert!(exported[0].starts_with(dir.path()));
        assert!(exported.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_export_without_data_reports_an_error() {
        let comm = ThreadCommunication::new(ConfigContainer::default());
        comm.config_tx
            .send(ConfigCommand::Export(PathBuf::from("nothing.dpt")))
            .unwrap();
        comm.config_tx.send(ConfigCommand::Quit).unwrap();
        main_thread(comm.clone());
        assert!(comm.last_error_lock.read().unwrap().is_some());
        assert!(comm.exported_lock.read().unwrap().is_empty());
    }
}
