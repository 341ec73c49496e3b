// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

pub const PROC_PARTITIONS: &str = "/proc/partitions";
pub const PROC_MOUNTS: &str = "/proc/mounts";
pub const SYS_BLOCK: &str = "/sys/block";
pub const SYS_DEV_BLOCK: &str = "/sys/dev/block";
pub const DEV_BLOCK: &str = "/dev/block";
pub const STORAGE_DIR: &str = "/storage";
pub const MEDIA_RW_DIR: &str = "/mnt/media_rw";

pub const VOLD_DIR_NAME: &str = "vold";
pub const VOLD_PUBLIC_PREFIX: &str = "public:";
pub const PLATFORM_DIR_NAME: &str = "platform";
pub const BY_NAME_DIR_NAME: &str = "by-name";
pub const MAPPER_DIR_NAME: &str = "mapper";

// Root-management overlays remount real partitions under this prefix.
pub const MAGISK_MIRROR_PREFIX: &str = "/sbin/.magisk/mirror";

/// Entries under /dev/block that are directories, never device nodes.
pub const PSEUDO_DIR_NAMES: &[&str] = &["vold", "bootdevice", "by-name", "platform", "mapper"];

/// Subtrees not worth descending into while hunting platform by-name dirs.
pub const PLATFORM_SKIP_PATTERNS: &[&str] = &["mapper", "vold", "ram", "loop", "dm-"];

pub const CONFIG_FILE_DEFAULT: &str = "/data/adb/diskinfo/config.toml";

pub const EXPORT_FILE_PREFIX: &str = "diskinfo";
pub const EXPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
