// diskinfo/src/main.rs
// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

mod cli;

use std::path::Path;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use diskinfo::config::Config;
use diskinfo::defs::CONFIG_FILE_DEFAULT;
use diskinfo::probe::{self, MediaDirs, SysRoot};
use diskinfo::{export, utils};

fn load_config(cli: &Cli) -> Result<Config> {
    if let Some(config_path) = &cli.config {
        return Config::from_file(config_path);
    }
    match Config::load_default() {
        Ok(config) => Ok(config),
        Err(e) => {
            if Path::new(CONFIG_FILE_DEFAULT).exists() {
                eprintln!("Error loading config: {e:#}");
            }
            Ok(Config::default())
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(command) = &cli.command {
        match command {
            Commands::GenConfig { output } => {
                Config::default().save_to_file(output)?;
                return Ok(());
            }
            Commands::ShowConfig => {
                let config = load_config(&cli)?;
                println!("{}", serde_json::to_string(&config)?);
                return Ok(());
            }
            _ => {}
        }
    }

    let mut config = load_config(&cli)?;
    config.merge_with_cli(cli.verbose, cli.debug_log, cli.df_timeout_ms);
    utils::init_logging(config.verbose)?;

    if let Some(Commands::Import { input }) = &cli.command {
        let outcome = export::import_partitions(input);
        println!("{}", serde_json::to_string_pretty(&outcome.record)?);
        if !outcome.record.success {
            std::process::exit(1);
        }
        print_table(&outcome.partitions);
        return Ok(());
    }

    log::info!("Starting partition discovery");
    let root = SysRoot::default();
    let volumes = MediaDirs::new(config.media_dirs.clone());
    let discovery = probe::discover(&root, &volumes, config.df_timeout());
    log::info!("Discovered {} partitions", discovery.partitions.len());

    if config.dump_debug_log && !discovery.diag.is_empty() {
        eprintln!("{}", discovery.diag);
    }

    match &cli.command {
        Some(Commands::Json) => {
            println!("{}", serde_json::to_string_pretty(&discovery.partitions)?);
        }
        Some(Commands::Export { output }) => {
            let path = output
                .clone()
                .unwrap_or_else(|| export::default_export_file_name().into());
            let record = export::export_partitions(&discovery.partitions, &path);
            println!("{}", serde_json::to_string_pretty(&record)?);
            if !record.success {
                std::process::exit(1);
            }
        }
        _ => print_table(&discovery.partitions),
    }
    Ok(())
}

fn print_table(partitions: &[diskinfo::model::PartitionRecord]) {
    println!(
        "{:<20} {:<24} {:>10} {:<8} {:<5} {:>6} {}",
        "NAME", "DEVICE", "SIZE", "FS", "RO", "USE%", "MOUNT"
    );
    for p in partitions {
        println!(
            "{:<20} {:<24} {:>10} {:<8} {:<5} {:>5}% {}",
            p.name,
            p.device_path,
            utils::format_bytes(p.size),
            if p.file_system_type.is_empty() { "-" } else { &p.file_system_type },
            if p.is_read_only { "ro" } else { "rw" },
            p.usage_percentage,
            if p.mount_point.is_empty() { "-" } else { &p.mount_point },
        );
    }
}

fn main() {
    if let Err(e) = run() {
        log::error!("Fatal Error: {e:#}");
        eprintln!("Fatal Error: {e:#}");
        std::process::exit(1);
    }
}
