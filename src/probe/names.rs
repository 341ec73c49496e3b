// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::defs;
use crate::probe::SysRoot;
use crate::probe::diag::DiagLog;

/// Map from raw kernel device name to its human label, built from the
/// vendor by-name symlink trees.
///
/// Vendors scatter these trees: some ship a `platform/bootdevice/by-name`
/// alias, some only the per-controller `platform/**/by-name` dirs, most a
/// generic `by-name`, and dynamic partitions live under `mapper`. Later
/// layers overwrite earlier ones for the same raw device.
pub fn partition_names(root: &SysRoot, diag: &mut DiagLog) -> HashMap<String, String> {
    let mut names = HashMap::new();

    let bootdevice = root
        .dev_block
        .join(defs::PLATFORM_DIR_NAME)
        .join("bootdevice")
        .join(defs::BY_NAME_DIR_NAME);
    if bootdevice.is_dir() {
        diag.push("found bootdevice by-name directory");
        collect_links(&bootdevice, &mut names, diag);
    } else {
        let platform = root.dev_block.join(defs::PLATFORM_DIR_NAME);
        if platform.is_dir() {
            let dirs = by_name_dirs(&platform);
            diag.push(format!("found {} platform by-name directories", dirs.len()));
            for dir in dirs {
                collect_links(&dir, &mut names, diag);
            }
        }
    }

    let generic = root.dev_block.join(defs::BY_NAME_DIR_NAME);
    if generic.is_dir() {
        collect_links(&generic, &mut names, diag);
    } else {
        diag.push("generic by-name directory not found");
    }

    let mapper = root.dev_block.join(defs::MAPPER_DIR_NAME);
    if mapper.is_dir() {
        collect_links(&mapper, &mut names, diag);
    }

    names
}

/// Resolve every symlink in `dir` and record canonical-target-basename ->
/// link-basename. One broken link never aborts its siblings.
fn collect_links(dir: &Path, names: &mut HashMap<String, String>, diag: &mut DiagLog) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            diag.push(format!("cannot list {}: {e}", dir.display()));
            return;
        }
    };

    for entry in entries.flatten() {
        let link = entry.path();
        match fs::canonicalize(&link) {
            Ok(target) => {
                let raw = target.file_name().map(|n| n.to_string_lossy().into_owned());
                let label = link.file_name().map(|n| n.to_string_lossy().into_owned());
                if let (Some(raw), Some(label)) = (raw, label) {
                    names.insert(raw, label);
                }
            }
            Err(e) => {
                diag.push(format!("unresolvable symlink {}: {e}", link.display()));
            }
        }
    }
}

/// All `by-name` directories below the platform tree, skipping subtrees
/// that can only hold noise (mapper, vold, ram, loop, dm-).
fn by_name_dirs(platform: &Path) -> Vec<PathBuf> {
    WalkDir::new(platform)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            entry.depth() == 0
                || !defs::PLATFORM_SKIP_PATTERNS.iter().any(|p| name.contains(p))
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_dir() && entry.file_name() == defs::BY_NAME_DIR_NAME
        })
        .map(|entry| entry.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::symlink;

    use super::*;

    fn link(dir: &Path, label: &str, target: &Path) {
        fs::create_dir_all(dir).unwrap();
        symlink(target, dir.join(label)).unwrap();
    }

    #[test]
    fn resolves_generic_by_name_links() {
        let tmp = tempfile::tempdir().unwrap();
        let root = SysRoot::under(tmp.path());
        fs::create_dir_all(&root.dev_block).unwrap();
        fs::write(root.dev_block.join("mmcblk0p41"), b"").unwrap();
        link(
            &root.dev_block.join("by-name"),
            "system_a",
            &root.dev_block.join("mmcblk0p41"),
        );

        let mut diag = DiagLog::default();
        let names = partition_names(&root, &mut diag);
        assert_eq!(names.get("mmcblk0p41").map(String::as_str), Some("system_a"));
    }

    #[test]
    fn broken_symlink_is_skipped_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let root = SysRoot::under(tmp.path());
        fs::create_dir_all(&root.dev_block).unwrap();
        fs::write(root.dev_block.join("sda1"), b"").unwrap();

        let by_name = root.dev_block.join("by-name");
        link(&by_name, "dangling", &root.dev_block.join("no-such-node"));
        link(&by_name, "modem", &root.dev_block.join("sda1"));

        let mut diag = DiagLog::default();
        let names = partition_names(&root, &mut diag);
        assert_eq!(names.get("sda1").map(String::as_str), Some("modem"));
        assert!(!names.values().any(|v| v == "dangling"));
        assert!(diag.entries().iter().any(|e| e.contains("unresolvable symlink")));
    }

    #[test]
    fn mapper_layer_overwrites_earlier_labels() {
        let tmp = tempfile::tempdir().unwrap();
        let root = SysRoot::under(tmp.path());
        fs::create_dir_all(&root.dev_block).unwrap();
        fs::write(root.dev_block.join("dm-4"), b"").unwrap();

        link(&root.dev_block.join("by-name"), "old_label", &root.dev_block.join("dm-4"));
        link(&root.dev_block.join("mapper"), "system_a", &root.dev_block.join("dm-4"));

        let mut diag = DiagLog::default();
        let names = partition_names(&root, &mut diag);
        assert_eq!(names.get("dm-4").map(String::as_str), Some("system_a"));
    }

    #[test]
    fn platform_tree_is_searched_when_bootdevice_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let root = SysRoot::under(tmp.path());
        fs::create_dir_all(&root.dev_block).unwrap();
        fs::write(root.dev_block.join("mmcblk0p7"), b"").unwrap();

        let by_name = root
            .dev_block
            .join("platform")
            .join("soc")
            .join("11230000.ufs")
            .join("by-name");
        link(&by_name, "boot_a", &root.dev_block.join("mmcblk0p7"));
        // A skipped subtree must not be descended into.
        let skipped = root.dev_block.join("platform").join("vold-cache").join("by-name");
        link(&skipped, "bogus", &root.dev_block.join("mmcblk0p7"));

        let mut diag = DiagLog::default();
        let names = partition_names(&root, &mut diag);
        assert_eq!(names.get("mmcblk0p7").map(String::as_str), Some("boot_a"));
    }

    #[test]
    fn bootdevice_takes_precedence_over_platform_search() {
        let tmp = tempfile::tempdir().unwrap();
        let root = SysRoot::under(tmp.path());
        fs::create_dir_all(&root.dev_block).unwrap();
        fs::write(root.dev_block.join("sda3"), b"").unwrap();

        let bootdevice = root.dev_block.join("platform").join("bootdevice").join("by-name");
        link(&bootdevice, "vendor_b", &root.dev_block.join("sda3"));

        let mut diag = DiagLog::default();
        let names = partition_names(&root, &mut diag);
        assert_eq!(names.get("sda3").map(String::as_str), Some("vendor_b"));
        assert!(diag.entries().iter().any(|e| e.contains("bootdevice")));
    }
}
