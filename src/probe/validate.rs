// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::defs;
use crate::probe::{SysRoot, size};

static GENERIC_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn generic_name_re() -> &'static Regex {
    GENERIC_NAME_RE.get_or_init(|| Regex::new(r"^[a-z]+\d*$").expect("Invalid Regex pattern"))
}

/// Structural check for a raw block device name.
///
/// Rejects the directory-like tokens that show up when listing /dev/block,
/// every `ram*` pseudo-device, and anything that is obviously a path or a
/// filename rather than a kernel device name.
pub fn is_valid_device_name(name: &str) -> bool {
    if defs::PSEUDO_DIR_NAMES.contains(&name) {
        return false;
    }
    if name.starts_with("ram") {
        return false;
    }
    if name.contains('/') || name.contains('.') {
        return false;
    }

    name.starts_with("mmcblk")
        || name.starts_with("sd")
        || name.starts_with("dm-")
        || name.starts_with("loop")
        || generic_name_re().is_match(name)
}

/// Whether a device physically exists, probed in cheapest-first order:
/// its /dev/block node, its sysfs entry, and finally a nonzero size.
/// Labels without a backing device must never surface as partitions.
pub fn device_exists(root: &SysRoot, name: &str) -> bool {
    if name.starts_with("ram") {
        return false;
    }

    let node = root.dev_block.join(name);
    if node.exists() && !node.is_dir() {
        return true;
    }

    let sys_entry = root.sys_block.join(size::block_parent(name)).join(name);
    if sys_entry.exists() {
        return true;
    }

    size::device_size(root, name) > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_device_shapes() {
        for name in ["mmcblk0", "mmcblk0p41", "sda", "sdh3", "dm-3", "loop12", "vda1", "zram0"] {
            assert!(is_valid_device_name(name), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_ram_devices() {
        assert!(!is_valid_device_name("ram0"));
        assert!(!is_valid_device_name("ram15"));
    }

    #[test]
    fn rejects_directory_tokens() {
        for name in ["vold", "bootdevice", "by-name", "platform", "mapper"] {
            assert!(!is_valid_device_name(name), "{name} should be rejected");
        }
    }

    #[test]
    fn rejects_paths_and_filenames() {
        assert!(!is_valid_device_name("vold/public:179:65"));
        assert!(!is_valid_device_name("modules.img"));
    }

    #[test]
    fn existence_via_dev_node() {
        let dir = tempfile::tempdir().unwrap();
        let root = SysRoot::under(dir.path());
        std::fs::create_dir_all(&root.dev_block).unwrap();
        std::fs::write(root.dev_block.join("mmcblk1p1"), b"").unwrap();

        assert!(device_exists(&root, "mmcblk1p1"));
        assert!(!device_exists(&root, "mmcblk1p2"));
    }

    #[test]
    fn existence_via_sysfs_entry() {
        let dir = tempfile::tempdir().unwrap();
        let root = SysRoot::under(dir.path());
        std::fs::create_dir_all(root.sys_block.join("sda").join("sda2")).unwrap();

        assert!(device_exists(&root, "sda2"));
    }
}
