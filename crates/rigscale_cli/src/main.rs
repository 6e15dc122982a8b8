use std::env;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use rigscale_core::{pipeline, RenameTable, RunOptions};

/// Read the rename table, falling back to an empty one on failure.
fn load_rename_table(path: &Path) -> RenameTable {
    let table: Result<RenameTable> = RenameTable::from_file(path)
        .with_context(|| format!("Failed to read rename file {}", path.display()));

    table.unwrap_or_else(|e| {
        log::warn!("{:#}; continuing without renames", e);
        RenameTable::new()
    })
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let program = env::args().next().unwrap_or_else(|| "rigscale".to_string());
    let options = match RunOptions::from_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", RunOptions::usage(&program));
            return ExitCode::from(1);
        }
    };

    log::info!(
        "Rescaling {} -> {} (scale {})",
        options.source.display(),
        options.destination.display(),
        options.scale_factor
    );

    let table = load_rename_table(&options.rename_file);

    match pipeline::run(&options, &table) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
