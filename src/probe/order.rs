// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::{HashMap, HashSet};
use std::fs;

use crate::probe::diag::DiagLog;
use crate::probe::{SysRoot, validate};

/// Raw block device names in kernel enumeration order.
///
/// /proc/partitions file order reflects probe/attach order and is what keeps
/// the displayed list stable, so it is preserved verbatim. Labelled devices
/// the table misses are appended afterwards, but only when they verifiably
/// exist: a by-name symlink with no backing device is not a partition.
pub fn ordered_devices(
    root: &SysRoot,
    name_map: &HashMap<String, String>,
    diag: &mut DiagLog,
) -> Vec<String> {
    let mut devices = Vec::new();

    if let Ok(content) = fs::read_to_string(&root.proc_partitions) {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("major") {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 {
                continue;
            }
            let name = parts[3];
            if validate::is_valid_device_name(name) {
                devices.push(name.to_string());
            } else {
                diag.device(name, "skipped invalid or ram entry");
            }
        }
    }

    if devices.is_empty() {
        sys_block_fallback(root, &mut devices, diag);
    }

    let listed: HashSet<String> = devices.iter().cloned().collect();
    let mut residual: Vec<&String> =
        name_map.keys().filter(|name| !listed.contains(*name)).collect();
    residual.sort();

    for name in residual {
        if validate::is_valid_device_name(name) && validate::device_exists(root, name) {
            diag.device(name, "labelled but missing from /proc/partitions, verified on disk");
            devices.push(name.clone());
        } else {
            diag.device(name, "label with no backing device, dropped");
        }
    }

    let mut seen = HashSet::new();
    devices.retain(|name| seen.insert(name.clone()));
    devices
}

/// Some locked-down kernels hide /proc/partitions; walk /sys/block instead.
/// Partition directories are always prefixed with their parent's name.
fn sys_block_fallback(root: &SysRoot, devices: &mut Vec<String>, diag: &mut DiagLog) {
    let Ok(entries) = fs::read_dir(&root.sys_block) else {
        return;
    };

    let mut disks: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| validate::is_valid_device_name(name))
        .collect();
    disks.sort();

    for disk in disks {
        diag.device(&disk, "enumerating partitions from /sys/block");
        let Ok(children) = fs::read_dir(root.sys_block.join(&disk)) else {
            continue;
        };
        let mut partitions: Vec<String> = children
            .flatten()
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(&disk) && validate::is_valid_device_name(name))
            .collect();
        partitions.sort();
        devices.extend(partitions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &std::path::Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn preserves_proc_partitions_order_and_filters_ram() {
        let tmp = tempfile::tempdir().unwrap();
        let root = SysRoot::under(tmp.path());
        write(
            &root.proc_partitions,
            "major minor  #blocks  name\n\n\
               1        0       8192 ram0\n\
             179        0   61071360 mmcblk0\n\
             179        1       4096 mmcblk0p1\n\
             254        0    2097152 dm-0\n",
        );

        let mut diag = DiagLog::default();
        let devices = ordered_devices(&root, &HashMap::new(), &mut diag);
        assert_eq!(devices, vec!["mmcblk0", "mmcblk0p1", "dm-0"]);
        assert!(devices.iter().all(|d| !d.starts_with("ram")));
    }

    #[test]
    fn residual_labels_need_a_physical_device() {
        let tmp = tempfile::tempdir().unwrap();
        let root = SysRoot::under(tmp.path());
        write(
            &root.proc_partitions,
            "major minor  #blocks  name\n\n 179        0   61071360 mmcblk0\n",
        );
        fs::create_dir_all(&root.dev_block).unwrap();
        fs::write(root.dev_block.join("sdh1"), b"").unwrap();

        let mut names = HashMap::new();
        names.insert("sdh1".to_string(), "usb_part".to_string());
        names.insert("sdq9".to_string(), "phantom".to_string());
        names.insert("mmcblk0".to_string(), "whole_disk".to_string());

        let mut diag = DiagLog::default();
        let devices = ordered_devices(&root, &names, &mut diag);
        assert_eq!(devices, vec!["mmcblk0", "sdh1"]);
        assert!(diag.entries().iter().any(|e| e.contains("no backing device")));
    }

    #[test]
    fn empty_proc_partitions_falls_back_to_sys_block() {
        let tmp = tempfile::tempdir().unwrap();
        let root = SysRoot::under(tmp.path());
        write(&root.proc_partitions, "major minor  #blocks  name\n");

        let disk = root.sys_block.join("mmcblk0");
        fs::create_dir_all(disk.join("mmcblk0p2")).unwrap();
        fs::create_dir_all(disk.join("mmcblk0p1")).unwrap();
        fs::create_dir_all(disk.join("queue")).unwrap();
        fs::write(disk.join("size"), "119224320\n").unwrap();

        let mut diag = DiagLog::default();
        let devices = ordered_devices(&root, &HashMap::new(), &mut diag);
        assert_eq!(devices, vec!["mmcblk0p1", "mmcblk0p2"]);
    }

    #[test]
    fn first_occurrence_wins_on_duplicates() {
        let tmp = tempfile::tempdir().unwrap();
        let root = SysRoot::under(tmp.path());
        write(
            &root.proc_partitions,
            "major minor  #blocks  name\n\n\
             179        1       4096 mmcblk0p1\n\
             179        1       4096 mmcblk0p1\n",
        );

        let mut diag = DiagLog::default();
        let devices = ordered_devices(&root, &HashMap::new(), &mut diag);
        assert_eq!(devices, vec!["mmcblk0p1"]);
    }
}
