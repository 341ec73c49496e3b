// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::defs;
use crate::model::MountInfo;
use crate::probe::SysRoot;
use crate::probe::diag::DiagLog;

/// Parse /proc/mounts into a map keyed by resolved raw device name.
///
/// Vold-managed mounts are deliberately absent here: they carry no stable
/// device path and are correlated by major:minor in the vold pass instead.
pub fn mount_info(root: &SysRoot, diag: &mut DiagLog) -> HashMap<String, MountInfo> {
    let mut mounts = HashMap::new();

    let content = match fs::read_to_string(&root.proc_mounts) {
        Ok(content) => content,
        Err(e) => {
            diag.push(format!("cannot read {}: {e}", root.proc_mounts.display()));
            return mounts;
        }
    };

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }
        let (device, mount_point, file_system, options) = (parts[0], parts[1], parts[2], parts[3]);

        let Some(raw_name) = resolve_device_name(device) else {
            diag.push(format!("deferring vold mount to vold pass: {device}"));
            continue;
        };
        if raw_name.is_empty() {
            continue;
        }

        mounts.insert(
            raw_name,
            MountInfo {
                device: device.to_string(),
                mount_point: strip_magisk_mirror(mount_point).to_string(),
                file_system: file_system.to_string(),
                is_read_only: read_only_from_options(options, device, mount_point),
            },
        );
    }

    mounts
}

/// A mount under the magisk mirror is really a mount of the path below it;
/// the overlay prefix must not leak into displayed mount points.
fn strip_magisk_mirror(mount_point: &str) -> &str {
    match mount_point.strip_prefix(defs::MAGISK_MIRROR_PREFIX) {
        Some(real) if !real.is_empty() => real,
        _ => mount_point,
    }
}

/// `rw` wins over `ro`, absence means writable. Some vendor kernels report
/// /data as `ro` while it is demonstrably written to, so the userdata
/// partition is always treated as read-write.
fn read_only_from_options(options: &str, device: &str, mount_point: &str) -> bool {
    if mount_point == "/data" || device.contains("userdata") {
        return false;
    }

    let mut read_only = false;
    for option in options.split(',') {
        match option {
            "rw" => return false,
            "ro" => read_only = true,
            _ => {}
        }
    }
    read_only
}

/// Raw device name for a mount-line device path. `None` marks a vold entry
/// that must stay out of the mount map.
fn resolve_device_name(device: &str) -> Option<String> {
    if device.contains("vold/public:") {
        return None;
    }

    let path = Path::new(device);
    let basename = || {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    // by-name, mapper, platform and bootdevice paths are symlinks to the
    // real node; everything else already names the device directly.
    let symlinked = path.iter().any(|component| {
        component == defs::BY_NAME_DIR_NAME
            || component == defs::MAPPER_DIR_NAME
            || component == defs::PLATFORM_DIR_NAME
            || component == "bootdevice"
    });

    if symlinked {
        if let Ok(target) = fs::canonicalize(path) {
            if let Some(name) = target.file_name() {
                return Some(name.to_string_lossy().into_owned());
            }
        }
        return Some(basename());
    }

    Some(basename())
}
