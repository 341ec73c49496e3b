// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use serde::{Deserialize, Serialize};

/// Coarse partition classification. LOOP takes precedence over SUPER.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartitionType {
    Loop,
    Super,
    #[default]
    Default,
}

/// One discovered partition. Field names follow the interchange format
/// consumed by the import/export side, hence the camelCase serialization.
///
/// The raw kernel device name is kept for joining the discovery sources but
/// never serialized; `device_path` carries the identity outward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionRecord {
    #[serde(skip)]
    pub raw_name: String,
    pub name: String,
    pub device_path: String,
    pub size: u64,
    pub file_system_size: u64,
    pub file_system_offset: u64,
    pub file_system_type: String,
    pub mount_point: String,
    pub is_mounted: bool,
    pub is_read_only: bool,
    pub used_space: u64,
    pub available_space: u64,
    pub usage_percentage: u8,
    #[serde(default)]
    pub partition_type: PartitionType,
}

impl PartitionRecord {
    pub fn total_space(&self) -> u64 {
        self.used_space.saturating_add(self.available_space)
    }
}

/// One parsed /proc/mounts line, keyed elsewhere by resolved raw device name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    pub device: String,
    pub mount_point: String,
    pub file_system: String,
    pub is_read_only: bool,
}

/// A vold-managed volume correlated back to its raw block device.
/// Lives only for the duration of one discovery pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoldDeviceInfo {
    /// Identifier as exposed by vold, e.g. `public:179:65` or `public:179,65`.
    pub vold_device: String,
    pub major: u32,
    pub minor: u32,
    /// Raw block device name the major:minor pair resolved to.
    pub block_device: String,
}
