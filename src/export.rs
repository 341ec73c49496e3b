// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::defs;
use crate::model::PartitionRecord;
use crate::probe::classify;

/// Envelope metadata written alongside the partition list. The envelope
/// keys are snake_case while the embedded records stay camelCase, matching
/// the files already in circulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportInfo {
    pub export_time: String,
    pub total_partitions: usize,
}

/// On-disk export format. Each partition is stored as an individually
/// JSON-encoded string so consumers can skip entries they fail to parse
/// without losing the rest of the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEnvelope {
    pub export_info: ExportInfo,
    pub partitions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    Import,
    Export,
}

/// Outcome of a single import or export attempt, suitable for history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    pub kind: TransferKind,
    pub file_name: String,
    pub file_path: String,
    pub timestamp: String,
    pub success: bool,
    pub message: String,
}

impl TransferRecord {
    fn new(kind: TransferKind, path: &Path, success: bool, message: impl Into<String>) -> Self {
        Self {
            kind,
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            file_path: path.to_string_lossy().into_owned(),
            timestamp: Local::now().format(defs::EXPORT_TIME_FORMAT).to_string(),
            success,
            message: message.into(),
        }
    }
}

pub fn default_export_file_name() -> String {
    format!(
        "{}_{}.json",
        defs::EXPORT_FILE_PREFIX,
        Local::now().format("%Y%m%d_%H%M%S")
    )
}

/// Write the current partition list to `path`. Failure is reported in the
/// returned record rather than as an error so callers can log a history
/// entry either way.
pub fn export_partitions(partitions: &[PartitionRecord], path: &Path) -> TransferRecord {
    match write_export(partitions, path) {
        Ok(()) => TransferRecord::new(
            TransferKind::Export,
            path,
            true,
            format!("exported {} partitions", partitions.len()),
        ),
        Err(e) => {
            log::error!("export to {} failed: {e:#}", path.display());
            TransferRecord::new(TransferKind::Export, path, false, format!("{e:#}"))
        }
    }
}

fn write_export(partitions: &[PartitionRecord], path: &Path) -> Result<()> {
    let encoded: Result<Vec<String>> = partitions
        .iter()
        .map(|p| serde_json::to_string(p).context("encoding partition record"))
        .collect();
    let envelope = ExportEnvelope {
        export_info: ExportInfo {
            export_time: Local::now().format(defs::EXPORT_TIME_FORMAT).to_string(),
            total_partitions: partitions.len(),
        },
        partitions: encoded?,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(&envelope)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[derive(Debug)]
pub struct ImportOutcome {
    pub partitions: Vec<PartitionRecord>,
    pub export_time: String,
    pub record: TransferRecord,
}

/// Read a previously exported file back in. Partition types are recomputed
/// from the stored names so a hand-edited file cannot carry a stale tag.
pub fn import_partitions(path: &Path) -> ImportOutcome {
    match read_import(path) {
        Ok((partitions, export_time)) => {
            let record = TransferRecord::new(
                TransferKind::Import,
                path,
                true,
                format!("imported {} partitions", partitions.len()),
            );
            ImportOutcome { partitions, export_time, record }
        }
        Err(e) => {
            log::error!("import from {} failed: {e:#}", path.display());
            ImportOutcome {
                partitions: Vec::new(),
                export_time: String::new(),
                record: TransferRecord::new(TransferKind::Import, path, false, format!("{e:#}")),
            }
        }
    }
}

fn read_import(path: &Path) -> Result<(Vec<PartitionRecord>, String)> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_export_json(&content)
}

fn parse_export_json(content: &str) -> Result<(Vec<PartitionRecord>, String)> {
    let envelope: ExportEnvelope =
        serde_json::from_str(content).context("parsing export envelope")?;

    let mut partitions = Vec::with_capacity(envelope.partitions.len());
    for encoded in &envelope.partitions {
        let record: PartitionRecord =
            serde_json::from_str(encoded).context("parsing partition entry")?;
        partitions.push(classify::assign(record));
    }
    if partitions.is_empty() {
        bail!("export file contains no partitions");
    }
    Ok((partitions, envelope.export_info.export_time))
}
