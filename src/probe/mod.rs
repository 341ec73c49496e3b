// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::defs;
use crate::model::{MountInfo, PartitionRecord, VoldDeviceInfo};

pub mod classify;
pub mod diag;
pub mod mounts;
pub mod names;
pub mod order;
pub mod size;
pub mod space;
pub mod validate;
pub mod vold;
pub mod volumes;

pub use diag::DiagLog;
pub use volumes::{MediaDirs, VolumePathSource};

/// Filesystem entry points the discovery pass reads from. Production code
/// uses the kernel defaults; tests point every field into a scratch tree.
#[derive(Debug, Clone)]
pub struct SysRoot {
    pub proc_partitions: PathBuf,
    pub proc_mounts: PathBuf,
    pub sys_block: PathBuf,
    pub sys_dev_block: PathBuf,
    pub dev_block: PathBuf,
    pub storage: PathBuf,
}

impl Default for SysRoot {
    fn default() -> Self {
        Self {
            proc_partitions: PathBuf::from(defs::PROC_PARTITIONS),
            proc_mounts: PathBuf::from(defs::PROC_MOUNTS),
            sys_block: PathBuf::from(defs::SYS_BLOCK),
            sys_dev_block: PathBuf::from(defs::SYS_DEV_BLOCK),
            dev_block: PathBuf::from(defs::DEV_BLOCK),
            storage: PathBuf::from(defs::STORAGE_DIR),
        }
    }
}

impl SysRoot {
    pub fn under(root: &Path) -> Self {
        Self {
            proc_partitions: root.join("proc/partitions"),
            proc_mounts: root.join("proc/mounts"),
            sys_block: root.join("sys/block"),
            sys_dev_block: root.join("sys/dev/block"),
            dev_block: root.join("dev/block"),
            storage: root.join("storage"),
        }
    }
}

/// Result of one discovery pass.
#[derive(Debug, Default)]
pub struct Discovery {
    pub partitions: Vec<PartitionRecord>,
    pub diag: DiagLog,
}

/// Run one full discovery pass over the block layer.
///
/// Discovery must never take the caller down with it. A panic anywhere in
/// the pass yields an empty list, and a panic while assembling a single
/// record drops only that record.
pub fn discover(
    root: &SysRoot,
    volumes: &dyn VolumePathSource,
    df_timeout: Duration,
) -> Discovery {
    match panic::catch_unwind(AssertUnwindSafe(|| run_pass(root, volumes, df_timeout))) {
        Ok(discovery) => discovery,
        Err(_) => {
            log::error!("discovery pass panicked, returning no partitions");
            Discovery::default()
        }
    }
}

fn run_pass(root: &SysRoot, volumes: &dyn VolumePathSource, df_timeout: Duration) -> Discovery {
    let mut diag = DiagLog::default();

    let name_map = names::partition_names(root, &mut diag);
    let devices = order::ordered_devices(root, &name_map, &mut diag);
    let mount_map = mounts::mount_info(root, &mut diag);
    let vold_map = vold::vold_devices(root, &mut diag);

    log::debug!(
        "discovery inputs: {} devices, {} labels, {} mounts, {} vold volumes",
        devices.len(),
        name_map.len(),
        mount_map.len(),
        vold_map.len()
    );

    let mut partitions = Vec::with_capacity(devices.len());
    for dev in &devices {
        let built = panic::catch_unwind(AssertUnwindSafe(|| {
            build_record(root, volumes, dev, &name_map, &mount_map, &vold_map, df_timeout, &mut diag)
        }));
        match built {
            Ok(record) => partitions.push(record),
            Err(_) => {
                log::warn!("skipping {dev}: record assembly panicked");
                diag.device(dev, "record assembly panicked, device omitted");
            }
        }
    }

    // Vold volumes whose raw device never made it into the main list, e.g.
    // a card the kernel table no longer shows after an unclean eject.
    for (raw, info) in &vold_map {
        if devices.iter().any(|d| d == raw) {
            continue;
        }
        diag.device(raw, "vold volume absent from device table, appended");
        partitions.push(build_vold_only(root, volumes, info, &name_map, df_timeout, &mut diag));
    }

    let mut seen = std::collections::HashSet::new();
    partitions.retain(|p| seen.insert(p.device_path.clone()));

    Discovery { partitions, diag }
}

#[allow(clippy::too_many_arguments)]
fn build_record(
    root: &SysRoot,
    volumes: &dyn VolumePathSource,
    dev: &str,
    name_map: &HashMap<String, String>,
    mount_map: &HashMap<String, MountInfo>,
    vold_map: &std::collections::BTreeMap<String, VoldDeviceInfo>,
    df_timeout: Duration,
    diag: &mut DiagLog,
) -> PartitionRecord {
    let size = size::device_size(root, dev);
    let name = name_map.get(dev).cloned().unwrap_or_else(|| dev.to_string());
    let mount = mount_map.get(dev);
    let vold = vold_map.get(dev);

    let mut mount_point = mount.map(|m| m.mount_point.clone()).unwrap_or_default();
    let (used_space, available_space) = if mount.is_some() && !mount_point.is_empty() {
        space::space_info(&mount_point, df_timeout)
    } else if let Some(info) = vold {
        vold::vold_space_info(root, volumes, info, &mount_point, df_timeout, diag)
    } else {
        (0, 0)
    };

    let mut file_system_type = mount
        .map(|m| m.file_system.clone())
        .unwrap_or_else(|| "unknown".to_string());
    if let Some(info) = vold {
        if file_system_type == "unknown" {
            file_system_type = vold::vold_file_system_type(root, &info.vold_device)
                .unwrap_or_else(|| "vold_managed".to_string());
        }
        if mount_point.is_empty() {
            mount_point = vold::find_vold_mount_point(root, &info.vold_device).unwrap_or_default();
        }
    }

    let record = PartitionRecord {
        raw_name: dev.to_string(),
        name,
        device_path: format!("/dev/block/{dev}"),
        size,
        // Reported filesystem size tracks the device size, not the usage sum.
        file_system_size: size,
        file_system_offset: 0,
        file_system_type,
        mount_point,
        // A vold-managed device counts as mounted even before its mount
        // point becomes discoverable.
        is_mounted: mount.is_some() || vold.is_some(),
        is_read_only: mount.map(|m| m.is_read_only).unwrap_or(false),
        used_space,
        available_space,
        usage_percentage: usage_percentage(used_space, available_space),
        partition_type: Default::default(),
    };
    classify::assign(record)
}

fn build_vold_only(
    root: &SysRoot,
    volumes: &dyn VolumePathSource,
    info: &VoldDeviceInfo,
    name_map: &HashMap<String, String>,
    df_timeout: Duration,
    diag: &mut DiagLog,
) -> PartitionRecord {
    let dev = &info.block_device;
    let mount_point = vold::find_vold_mount_point(root, &info.vold_device).unwrap_or_default();
    let file_system_type = vold::vold_file_system_type(root, &info.vold_device)
        .unwrap_or_else(|| "vold_managed".to_string());
    let (used_space, available_space) =
        vold::vold_space_info(root, volumes, info, &mount_point, df_timeout, diag);
    let size = size::device_size(root, dev);

    let record = PartitionRecord {
        raw_name: dev.clone(),
        name: name_map.get(dev).cloned().unwrap_or_else(|| vold_display_name(dev)),
        device_path: format!("/dev/block/{dev}"),
        size,
        file_system_size: size,
        file_system_offset: 0,
        file_system_type,
        is_mounted: !mount_point.is_empty(),
        mount_point,
        is_read_only: false,
        used_space,
        available_space,
        usage_percentage: usage_percentage(used_space, available_space),
        partition_type: Default::default(),
    };
    classify::assign(record)
}

/// Removable cards rarely carry a by-name label. Fall back to a friendly
/// name derived from the partition number, "mmcblk1p1" becomes "SD Card 1".
fn vold_display_name(block_device: &str) -> String {
    match block_device.rfind('p') {
        Some(idx) if idx + 1 < block_device.len() => {
            format!("SD Card {}", &block_device[idx + 1..])
        }
        _ => "SD Card".to_string(),
    }
}

fn usage_percentage(used: u64, available: u64) -> u8 {
    let total = used.saturating_add(available);
    if total == 0 {
        return 0;
    }
    let pct = (used as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}
