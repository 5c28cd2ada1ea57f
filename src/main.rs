use anyhow::{bail, Context, Result};
use clap::Parser;
use dialoguer::Confirm;
use specimen_intake::cli::{Cli, Commands};
use specimen_intake::config::Config;
use specimen_intake::db::CollectionDb;
use specimen_intake::pipeline::Pipeline;
use specimen_intake::sheets::{StagingQueue, XlsxAuditLog, XlsxStagingSheet};
use specimen_intake::{intake, logging, scanner};
use std::path::Path;

fn setup(cli: &Cli) -> Result<Config> {
    let config = Config::load(cli.config.as_deref())?;
    logging::init(cli.verbose, config.log_file.as_deref())
        .context("could not open log file")?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Run { yes } => {
            let config = setup(&cli)?;
            println!("📁 specimen-intake - run\n");
            println!("  staging: {}", config.folders.staging_folder.display());
            println!("  destination: {}\n", config.folders.base_folder.display());

            if !config.folders.staging_folder.is_dir() {
                bail!("staging folder not found: {}", config.folders.staging_folder.display());
            }

            if !*yes {
                let proceed = Confirm::new()
                    .with_prompt("Move every staged folder listed in the staging sheet?")
                    .default(false)
                    .interact()?;
                if !proceed {
                    println!("Cancelled");
                    return Ok(());
                }
            }

            // 1. Connect
            println!("[1/2] Connecting...");
            let db = CollectionDb::open(&config.database.path, config.database.collection_id)?;
            let mut staging =
                XlsxStagingSheet::open(&config.staging_sheet.workbook, config.staging_sheet_name())?;
            let mut audit = XlsxAuditLog::new(
                &config.tracking_sheet.workbook,
                config.tracking_sheet_name(),
                config.tracking_paths.clone(),
            );
            println!("✔ Connected\n");

            // 2. Process
            println!("[2/2] Processing staging rows...");
            let pipeline = Pipeline::new(&mut audit, &mut staging, config.thumbnail_width);
            let mut run = intake::Intake::new(
                &db,
                &config.folders.base_folder,
                &config.folders.staging_folder,
                pipeline,
            );
            let summary = run.run()?;

            println!("\n✅ Done: {} moved, {} errors", summary.moved, summary.errors);
        }

        Commands::Preview { output } => {
            let config = setup(&cli)?;
            let db = CollectionDb::open(&config.database.path, config.database.collection_id)?;
            let mut staging =
                XlsxStagingSheet::open(&config.staging_sheet.workbook, config.staging_sheet_name())?;

            let plan = intake::preview(
                &db,
                &config.folders.base_folder,
                &config.folders.staging_folder,
                staging.fetch_rows()?,
            );

            match output {
                Some(path) => {
                    std::fs::write(path, serde_json::to_string_pretty(&plan)?)?;
                    println!("✔ Plan saved: {}", path.display());
                }
                None => {
                    for entry in &plan {
                        let name = entry.folder_name.as_deref().unwrap_or("<unnamed>");
                        match (&entry.placement, &entry.error) {
                            (Some(placement), _) => {
                                println!("  row {:>3}  {} -> {}", entry.row, name, placement.destination)
                            }
                            (None, Some(error)) => println!("  row {:>3}  {} ✗ {}", entry.row, name, error),
                            (None, None) => {}
                        }
                    }
                }
            }

            let ready = plan.iter().filter(|e| e.placement.is_some()).count();
            println!("\n{} of {} rows ready", ready, plan.len());
        }

        Commands::Status => {
            let config = setup(&cli)?;
            let mut staging =
                XlsxStagingSheet::open(&config.staging_sheet.workbook, config.staging_sheet_name())?;
            println!("Status:");
            println!("  Rows in staging sheet: {}", staging.remaining_rows()?);
            println!(
                "  Folders in staging directory: {}",
                scanner::count_subfolders(&config.folders.staging_folder)?
            );
        }

        Commands::Config { init, show } => {
            let path = match &cli.config {
                Some(p) => p.clone(),
                None => Config::config_path()?,
            };

            if *init {
                if path.exists() {
                    bail!("config already exists: {}", path.display());
                }
                Config::template().save(&path)?;
                println!("✔ Template written: {}", path.display());
            }

            if *show || !*init {
                let config = Config::load(Some(Path::new(&path)))?;
                println!("Config: {}", path.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}
