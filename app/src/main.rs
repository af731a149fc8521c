mod cli;
mod modes;

use clap::Parser;
use cli::{Args, Mode};
use std::process::ExitCode;
use tracing::{error, warn};
use vpiano_infra_storage_fs::FsStorage;
use vpiano_ports::storage::{SettingsDto, StoragePort};

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_target(false)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), modes::CliError> {
    let storage = match &args.config_dir {
        Some(dir) => FsStorage::new(dir.clone()),
        None => FsStorage::default(),
    };
    let mut settings = storage.load_settings().unwrap_or_else(|err| {
        warn!(%err, "could not read settings, using defaults");
        SettingsDto::default()
    });
    args.apply(&mut settings);
    if args.save_settings {
        storage.save_settings(&settings)?;
    }

    match args.mode {
        Mode::Play {
            frames,
            device,
            list_devices,
            screen,
            diagnostics,
        } => {
            if list_devices {
                return modes::list_devices();
            }
            modes::play(settings, storage, &frames, device, &screen, diagnostics)
        }
        Mode::Render {
            frames,
            output,
            screen,
        } => modes::render(settings, &frames, &output, &screen),
        Mode::Bank { output } => modes::export_bank(&settings, &output),
    }
}
