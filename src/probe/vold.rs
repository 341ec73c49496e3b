// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use regex_lite::Regex;

use crate::defs;
use crate::model::VoldDeviceInfo;
use crate::probe::diag::DiagLog;
use crate::probe::volumes::VolumePathSource;
use crate::probe::{SysRoot, space, validate};

static STORAGE_UUID_RE: OnceLock<Regex> = OnceLock::new();

fn storage_uuid_re() -> &'static Regex {
    STORAGE_UUID_RE
        .get_or_init(|| Regex::new(r"^[0-9A-F]{4}-[0-9A-F]{4}$").expect("Invalid Regex pattern"))
}

/// Discover vold-managed volumes, keyed by resolved raw block device name.
///
/// Two passes are unioned: the /dev/block/vold directory listing and the
/// vold lines of /proc/mounts. An identifier that resolves to no physical
/// block device is dropped so no phantom partition can surface.
pub fn vold_devices(root: &SysRoot, diag: &mut DiagLog) -> BTreeMap<String, VoldDeviceInfo> {
    let mut devices = BTreeMap::new();
    scan_vold_dir(root, &mut devices, diag);
    scan_vold_mounts(root, &mut devices, diag);
    devices
}

fn scan_vold_dir(
    root: &SysRoot,
    devices: &mut BTreeMap<String, VoldDeviceInfo>,
    diag: &mut DiagLog,
) {
    let vold_dir = root.dev_block.join(defs::VOLD_DIR_NAME);
    let entries = match fs::read_dir(&vold_dir) {
        Ok(entries) => entries,
        Err(_) => {
            diag.push(format!("vold directory does not exist: {}", vold_dir.display()));
            return;
        }
    };

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(defs::VOLD_PUBLIC_PREFIX) {
            continue;
        }
        insert_resolved(root, &name, devices, diag);
    }
}

fn scan_vold_mounts(
    root: &SysRoot,
    devices: &mut BTreeMap<String, VoldDeviceInfo>,
    diag: &mut DiagLog,
) {
    let Ok(content) = fs::read_to_string(&root.proc_mounts) else {
        return;
    };

    for line in content.lines() {
        if !line.contains("/dev/block/vold/public:") {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }
        let vold_name = parts[0].rsplit('/').next().unwrap_or_default().to_string();
        if vold_name.starts_with(defs::VOLD_PUBLIC_PREFIX) {
            insert_resolved(root, &vold_name, devices, diag);
        }
    }
}

fn insert_resolved(
    root: &SysRoot,
    vold_name: &str,
    devices: &mut BTreeMap<String, VoldDeviceInfo>,
    diag: &mut DiagLog,
) {
    let Some((major, minor)) = parse_public_id(vold_name) else {
        diag.push(format!("malformed vold identifier: {vold_name}"));
        return;
    };

    match block_device_for(root, major, minor) {
        Some(block_device) => {
            diag.device(&block_device, format!("resolved vold identifier {vold_name}"));
            devices.insert(
                block_device.clone(),
                VoldDeviceInfo {
                    vold_device: vold_name.to_string(),
                    major,
                    minor,
                    block_device,
                },
            );
        }
        None => {
            log::warn!("vold entry {vold_name} has no backing block device ({major}:{minor})");
            diag.push(format!(
                "vold entry {vold_name} has no backing block device (major={major}, minor={minor})"
            ));
        }
    }
}

/// Parse `public:MAJOR:MINOR` or `public:MAJOR,MINOR`.
pub(crate) fn parse_public_id(name: &str) -> Option<(u32, u32)> {
    let rest = name.strip_prefix(defs::VOLD_PUBLIC_PREFIX)?;
    let mut fields = rest.split([':', ',']);
    let major = fields.next()?.parse().ok()?;
    let minor = fields.next()?.parse().ok()?;
    Some((major, minor))
}

/// Raw block device for a major:minor pair: first matching /proc/partitions
/// row wins, /sys/dev/block is the fallback for devices the table misses.
fn block_device_for(root: &SysRoot, major: u32, minor: u32) -> Option<String> {
    if let Ok(content) = fs::read_to_string(&root.proc_partitions) {
        for line in content.lines() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 {
                continue;
            }
            let row_major: u32 = match parts[0].parse() {
                Ok(m) => m,
                Err(_) => continue,
            };
            let row_minor: u32 = match parts[1].parse() {
                Ok(m) => m,
                Err(_) => continue,
            };
            if row_major == major && row_minor == minor && validate::is_valid_device_name(parts[3])
            {
                return Some(parts[3].to_string());
            }
        }
    }

    sys_dev_block_lookup(root, major, minor)
}

fn sys_dev_block_lookup(root: &SysRoot, major: u32, minor: u32) -> Option<String> {
    let numbered = root.sys_dev_block.join(format!("{major}:{minor}"));
    if !numbered.exists() {
        return None;
    }

    // The numbered entry is itself a symlink into the device tree; its
    // canonical basename is the device name once the subsystem checks out.
    if let Ok(subsystem) = fs::canonicalize(numbered.join("subsystem")) {
        if subsystem.file_name().is_some_and(|n| n == "block") {
            if let Ok(device_dir) = fs::canonicalize(&numbered) {
                if let Some(name) = device_dir.file_name() {
                    let name = name.to_string_lossy();
                    if name != format!("{major}:{minor}") {
                        return Some(name.into_owned());
                    }
                }
            }
        }
    }

    let uevent = fs::read_to_string(numbered.join("uevent")).ok()?;
    uevent
        .lines()
        .find_map(|line| line.strip_prefix("DEVNAME="))
        .map(|name| name.trim().to_string())
}

/// Mount point of a vold volume, looked up by identifier substring.
pub fn find_vold_mount_point(root: &SysRoot, vold_device: &str) -> Option<String> {
    vold_mount_field(root, vold_device, 1)
}

/// Filesystem type of a vold volume, looked up by identifier substring.
pub fn vold_file_system_type(root: &SysRoot, vold_device: &str) -> Option<String> {
    vold_mount_field(root, vold_device, 2)
}

fn vold_mount_field(root: &SysRoot, vold_device: &str, field: usize) -> Option<String> {
    let content = fs::read_to_string(&root.proc_mounts).ok()?;
    for line in content.lines() {
        if !line.contains(vold_device) {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() > field {
            return Some(parts[field].to_string());
        }
    }
    None
}

/// Space usage for a vold volume.
///
/// Raw mount points of removable media are frequently unreadable for a
/// non-system caller, while the accessible volume directories almost always
/// work, so those are tried first and `df` is the last resort.
pub fn vold_space_info(
    root: &SysRoot,
    volumes: &dyn VolumePathSource,
    info: &VoldDeviceInfo,
    existing_mount_point: &str,
    df_timeout: Duration,
    diag: &mut DiagLog,
) -> (u64, u64) {
    for dir in volumes.removable_volume_paths() {
        if !dir.is_dir() {
            continue;
        }
        if let Some(pair) = nonzero(space::space_info(&dir.to_string_lossy(), df_timeout)) {
            diag.device(
                &info.block_device,
                format!("space via removable volume dir {}", dir.display()),
            );
            return pair;
        }
    }

    if let Some(storage) = user_accessible_storage_path(root) {
        if let Some(pair) = nonzero(space::space_info(&storage.to_string_lossy(), df_timeout)) {
            diag.device(
                &info.block_device,
                format!("space via storage dir {}", storage.display()),
            );
            return pair;
        }
    }

    if !existing_mount_point.is_empty() {
        if let Some(pair) = nonzero(space::space_info(existing_mount_point, df_timeout)) {
            return pair;
        }
    }

    if let Some(mount_point) = find_vold_mount_point(root, &info.vold_device) {
        if let Some(pair) = nonzero(space::space_info(&mount_point, df_timeout)) {
            return pair;
        }
        if let Some(pair) = space::df_space(&mount_point, df_timeout).and_then(nonzero) {
            diag.device(&info.block_device, format!("space via df for {mount_point}"));
            return pair;
        }
    }

    diag.device(&info.block_device, "no accessible space info found");
    (0, 0)
}

/// First /storage/XXXX-XXXX directory that reports usable space.
fn user_accessible_storage_path(root: &SysRoot) -> Option<PathBuf> {
    let entries = fs::read_dir(&root.storage).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !storage_uuid_re().is_match(&name) {
            continue;
        }
        if let Some((total, usable)) = space::probe_total_usable(&path.to_string_lossy()) {
            if total > 0 && usable > 0 {
                return Some(path);
            }
        }
    }
    None
}

fn nonzero(pair: (u64, u64)) -> Option<(u64, u64)> {
    if pair.0 > 0 || pair.1 > 0 { Some(pair) } else { None }
}
