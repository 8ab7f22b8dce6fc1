//! sfm - Serial NOR flash model
//!
//! Command line front end for `sfm-core`. It emulates a SPI NOR flash chip in
//! memory, feeds it raw SPI packets and moves its content in and out of
//! `.dif` images, so firmware test vectors can be replayed without hardware.

mod cli;
mod commands;
mod error;

use clap::Parser;
use cli::{Cli, Commands};
use error::CliError;
use sfm_core::chip::ChipDatabase;
use std::path::{Path, PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    // Load chip database
    let db = match load_chip_database(cli.chip_db.as_deref()) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to load chip database: {}", e);
            std::process::exit(1);
        }
    };

    log::debug!("{} chip definitions available", db.len());

    let mut stdout = std::io::stdout().lock();
    let verbose = cli.verbose;

    let result = match cli.command {
        Commands::Exec {
            chip,
            packets,
            image,
        } => {
            let mut model = commands::open_model(&db, &chip, verbose)?;
            commands::run_exec(&mut stdout, &mut model, &packets, &image)
        }
        Commands::Dump {
            chip,
            load,
            start,
            stop,
        } => {
            let mut model = commands::open_model(&db, &chip, verbose)?;
            commands::run_dump(&mut stdout, &mut model, load.as_deref(), start, stop)
        }
        Commands::Compare {
            chip,
            load,
            against,
        } => {
            let mut model = commands::open_model(&db, &chip, verbose)?;
            commands::run_compare(&mut stdout, &mut model, &load, &against)
        }
        Commands::Info { chip } => match db.find_by_name(&chip) {
            Some(desc) => commands::print_chip_info(&mut stdout, desc),
            None => Err(CliError::UnknownChip(chip)),
        },
        Commands::ListChips => commands::list_chips(&mut stdout, &db),
    };

    result.map_err(Into::into)
}

/// Load the chip database from the specified path or default locations
///
/// The built-in chips are always present; RON definitions with the same
/// name override them.
fn load_chip_database(path: Option<&Path>) -> error::Result<ChipDatabase> {
    let mut db = ChipDatabase::with_builtin();

    if let Some(path) = path {
        // User specified a path
        if path.is_dir() {
            db.load_dir(path)?;
        } else if path.is_file() {
            db.load_file(path)?;
        } else {
            return Err(CliError::InvalidArgument(format!(
                "Chip database path not found: {}",
                path.display()
            )));
        }
    } else {
        // Try default locations
        let default_paths = [
            PathBuf::from("chips/vendors"),
            PathBuf::from("/usr/share/sfm/chips"),
            PathBuf::from("/usr/local/share/sfm/chips"),
        ];

        for dir in &default_paths {
            if dir.is_dir() {
                match db.load_dir(dir) {
                    Ok(count) => {
                        log::debug!("Loaded {} chips from {}", count, dir.display());
                    }
                    Err(e) => {
                        log::warn!("Failed to load chips from {}: {}", dir.display(), e);
                    }
                }
            }
        }
    }

    Ok(db)
}
