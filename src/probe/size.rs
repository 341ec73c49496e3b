// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::probe::SysRoot;
use crate::utils;

static MMC_PART_SUFFIX_RE: OnceLock<Regex> = OnceLock::new();
static TRAILING_DIGITS_RE: OnceLock<Regex> = OnceLock::new();

fn mmc_part_suffix_re() -> &'static Regex {
    MMC_PART_SUFFIX_RE.get_or_init(|| Regex::new(r"p\d+$").expect("Invalid Regex pattern"))
}

fn trailing_digits_re() -> &'static Regex {
    TRAILING_DIGITS_RE.get_or_init(|| Regex::new(r"^[a-z]+\d+$").expect("Invalid Regex pattern"))
}

/// Parent disk for a partition name: `mmcblk0p12` -> `mmcblk0`, `sda3` -> `sda`.
/// Names without a partition suffix come back unchanged.
pub fn block_parent(name: &str) -> String {
    if name.starts_with("mmcblk") {
        if let Some(m) = mmc_part_suffix_re().find(name) {
            return name[..m.start()].to_string();
        }
        return name.to_string();
    }
    if trailing_digits_re().is_match(name) {
        return name.trim_end_matches(|c: char| c.is_ascii_digit()).to_string();
    }
    name.to_string()
}

/// Device size in bytes, best effort, never failing.
///
/// Sysfs reports 512-byte sectors whatever the physical block size is and
/// /proc/partitions reports 1 KiB units, so both constants are fixed. The
/// raw node length is unreliable and only a last resort.
pub fn device_size(root: &SysRoot, name: &str) -> u64 {
    if let Some(size) = size_from_sys_block(root, name) {
        return size;
    }
    if let Some(size) = size_from_proc_partitions(root, name) {
        return size;
    }
    size_from_device_node(root, name)
}

fn size_from_sys_block(root: &SysRoot, name: &str) -> Option<u64> {
    let path = root.sys_block.join(block_parent(name)).join(name).join("size");
    let sectors: u64 = utils::read_trimmed(&path)?.parse().ok()?;
    let size = sectors.checked_mul(512)?;
    if size == 0 {
        return None;
    }
    log::debug!("{name}: {sectors} sectors from sysfs = {size} bytes");
    Some(size)
}

fn size_from_proc_partitions(root: &SysRoot, name: &str) -> Option<u64> {
    let content = fs::read_to_string(&root.proc_partitions).ok()?;
    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= 4 && parts[3] == name {
            let blocks: u64 = parts[2].parse().ok()?;
            let size = blocks.checked_mul(1024)?;
            if size == 0 {
                return None;
            }
            log::debug!("{name}: {blocks} KiB blocks from /proc/partitions = {size} bytes");
            return Some(size);
        }
    }
    None
}

fn size_from_device_node(root: &SysRoot, name: &str) -> u64 {
    match fs::metadata(root.dev_block.join(name)) {
        Ok(meta) => meta.len(),
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_stripping() {
        assert_eq!(block_parent("mmcblk0p12"), "mmcblk0");
        assert_eq!(block_parent("mmcblk1p1"), "mmcblk1");
        assert_eq!(block_parent("mmcblk0"), "mmcblk0");
        assert_eq!(block_parent("sda3"), "sda");
        assert_eq!(block_parent("sda"), "sda");
        assert_eq!(block_parent("dm-3"), "dm-3");
        assert_eq!(block_parent("loop0"), "loop");
    }

    #[test]
    fn sysfs_size_is_in_sectors() {
        let dir = tempfile::tempdir().unwrap();
        let root = SysRoot::under(dir.path());
        let size_dir = root.sys_block.join("mmcblk0").join("mmcblk0p2");
        fs::create_dir_all(&size_dir).unwrap();
        fs::write(size_dir.join("size"), "2048\n").unwrap();

        assert_eq!(device_size(&root, "mmcblk0p2"), 2048 * 512);
    }

    #[test]
    fn proc_partitions_size_is_in_kib() {
        let dir = tempfile::tempdir().unwrap();
        let root = SysRoot::under(dir.path());
        fs::create_dir_all(root.proc_partitions.parent().unwrap()).unwrap();
        fs::write(
            &root.proc_partitions,
            "major minor  #blocks  name\n\n   8       17    4096 sdb1\n",
        )
        .unwrap();

        assert_eq!(device_size(&root, "sdb1"), 4096 * 1024);
    }

    #[test]
    fn node_length_as_last_resort() {
        let dir = tempfile::tempdir().unwrap();
        let root = SysRoot::under(dir.path());
        fs::create_dir_all(&root.dev_block).unwrap();
        fs::write(root.dev_block.join("sdc1"), vec![0u8; 77]).unwrap();

        assert_eq!(device_size(&root, "sdc1"), 77);
    }

    #[test]
    fn unknown_device_is_zero() {
        let dir = tempfile::tempdir().unwrap();
        let root = SysRoot::under(dir.path());
        assert_eq!(device_size(&root, "sdz9"), 0);
    }
}
