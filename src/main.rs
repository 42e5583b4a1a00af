use clap::{Args, Parser, Subcommand};
use fringe_removal::config::{
    send_latest_config, ConfigCommand, ConfigContainer, ThreadCommunication,
};
use fringe_removal::data_thread::main_thread;
use fringe_removal::io::{read_fringes, DptDatasetSource};
use fringe_removal::{DatasetRole, FringeBound, InstrumentParameters};
use std::error::Error;
use std::path::PathBuf;
use std::thread;

#[derive(Parser, Debug)]
#[command(name = "fringe-removal")]
#[command(author = "Linus Leo Stöckli")]
#[command(version, long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
#[command(about = "Remove interference fringes from FTIR spectra", long_about = None)]
struct Cli {
    #[command(flatten)]
    inputs: Inputs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Inputs {
    /// Sample interferogram table
    #[arg(long)]
    sample_ifg: PathBuf,

    /// Sample single-beam spectrum table
    #[arg(long)]
    sample_sb: PathBuf,

    /// Background interferogram table
    #[arg(long)]
    background_ifg: PathBuf,

    /// Background single-beam spectrum table
    #[arg(long)]
    background_sb: PathBuf,

    /// Laser wavenumber of the interferometer (LWN), needs --ssp
    #[arg(long, requires = "ssp")]
    lwn: Option<f64>,

    /// Sample spacing in laser fringes (SSP), needs --lwn
    #[arg(long, requires = "lwn")]
    ssp: Option<f64>,

    /// Fringe to remove as `start,end` on the interferogram axis, may be repeated
    #[arg(short, long = "fringe", value_parser = parse_bound)]
    fringes: Vec<FringeBound>,

    /// Table with one `start,end` row per fringe
    #[arg(long)]
    fringes_file: Option<PathBuf>,

    /// Zero-fill factor, overrides the stored configuration
    #[arg(short, long)]
    zff: Option<usize>,

    /// Keep only every k-th point of previews
    #[arg(short, long)]
    point_reduction: Option<usize>,

    /// Store the resulting configuration for the next run
    #[arg(long)]
    save_config: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of every fringe and of the cleaned spectra
    Preview,
    /// Write the cleaned single beams, transmittance, absorbance and fringe list
    Export {
        /// Base path of the output files, relative paths land in the output directory
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn parse_bound(s: &str) -> Result<FringeBound, String> {
    let (start, end) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `start,end`, got `{s}`"))?;
    let parse = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("`{v}`: {e}"));
    FringeBound::new(parse(start)?, parse(end)?).map_err(|e| e.to_string())
}

fn sources(inputs: &Inputs) -> Result<[DptDatasetSource; 2], Box<dyn Error>> {
    let parameters = match (inputs.lwn, inputs.ssp) {
        (Some(lwn), Some(ssp)) => Some(InstrumentParameters::new(lwn, ssp)?),
        _ => None,
    };
    Ok([
        DptDatasetSource {
            role: DatasetRole::Sample,
            interferogram: inputs.sample_ifg.clone(),
            single_beam: inputs.sample_sb.clone(),
            parameters,
        },
        DptDatasetSource {
            role: DatasetRole::Background,
            interferogram: inputs.background_ifg.clone(),
            single_beam: inputs.background_sb.clone(),
            parameters,
        },
    ])
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = ConfigContainer::load_or_default();
    if let Some(zff) = cli.inputs.zff {
        config.zero_fill_factor = zff;
    }
    if let Some(reduction) = cli.inputs.point_reduction {
        config.point_reduction = reduction;
    }
    if let Some(path) = &cli.inputs.fringes_file {
        for (bound, _) in read_fringes(path)?.iter() {
            config.fringes.include(*bound);
        }
    }
    for bound in &cli.inputs.fringes {
        config.fringes.include(*bound);
    }
    log::info!(
        "{} fringes selected, {} included",
        config.fringes.len(),
        config.fringes.included().count()
    );

    let thread_communication = ThreadCommunication::new(config);
    let worker = {
        let state = thread_communication.clone();
        thread::spawn(move || {
            main_thread(state);
        })
    };

    for source in sources(&cli.inputs)? {
        send_latest_config(&thread_communication, ConfigCommand::OpenDataset(source));
    }
    let tx = &thread_communication.config_tx;
    // queued without the abort flag, so the last preview runs to completion
    match &cli.command {
        Command::Preview => tx.send(ConfigCommand::UpdatePreview)?,
        Command::Export { output } => {
            send_latest_config(&thread_communication, ConfigCommand::Export(output.clone()))
        }
    }
    if cli.inputs.save_config {
        tx.send(ConfigCommand::SaveConfig)?;
    }
    tx.send(ConfigCommand::Quit)?;
    worker.join().map_err(|_| "worker thread panicked")?;

    if let Ok(last_error) = thread_communication.last_error_lock.read() {
        if let Some(err) = last_error.as_ref() {
            return Err(err.clone().into());
        }
    }

    match cli.command {
        Command::Preview => {
            if let Ok(previews) = thread_communication.fringe_previews_lock.read() {
                println!("fringe\tsample peak\tbackground peak\tmax |component|");
                for preview in previews.iter() {
                    let max = preview
                        .sample_component
                        .y()
                        .iter()
                        .fold(0.0f64, |m, v| m.max(v.abs()));
                    println!(
                        "{}\t{:.4}\t{:.4}\t{:.4}",
                        preview.bound,
                        preview.sample_peak.unwrap_or(f64::NAN),
                        preview.background_peak.unwrap_or(f64::NAN),
                        max
                    );
                }
            }
            if let Ok(processed) = thread_communication.processed_lock.read() {
                if let Some(processed) = processed.as_ref() {
                    println!(
                        "cleaned spectra: {} points from {:.2} to {:.2}",
                        processed.transmittance.len(),
                        processed.transmittance.first_x(),
                        processed.transmittance.last_x()
                    );
                }
            }
        }
        Command::Export { .. } => {
            if let Ok(written) = thread_communication.exported_lock.read() {
                for path in written.iter() {
                    println!("{}", path.display());
                }
            }
        }
    }
    Ok(())
}
