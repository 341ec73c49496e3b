// diskinfo/src/cli.rs
// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use diskinfo::defs::CONFIG_FILE_DEFAULT;

#[derive(Parser, Debug)]
#[command(name = "diskinfo", version, about = "Block partition discovery and reporting")]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
    /// Print per-device diagnostic notes after the run
    #[arg(long = "debug-log")]
    pub debug_log: bool,
    /// Upper bound for each df subprocess, in milliseconds
    #[arg(long = "df-timeout-ms")]
    pub df_timeout_ms: Option<u64>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Output the partition list in JSON format
    Json,
    /// Write a partition snapshot file
    Export {
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Read a partition snapshot file and print it
    Import { input: PathBuf },
    GenConfig {
        #[arg(short = 'o', long = "output", default_value = CONFIG_FILE_DEFAULT)]
        output: PathBuf,
    },
    ShowConfig,
}
