// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::path::Path;

use anyhow::Result;

pub fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    #[cfg(target_os = "android")]
    {
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(level)
                .with_tag("diskinfo"),
        );
    }

    #[cfg(not(target_os = "android"))]
    {
        use std::io::Write;

        let mut builder = env_logger::Builder::new();
        builder.format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        });
        builder.filter_level(level).init();
    }
    Ok(())
}

/// Read a small kernel-exposed file and trim the trailing newline.
pub fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

/// Human-readable size, base 1024. The GB tier gets two decimals, every
/// other tier one; sizes above TB clamp to TB.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut group = 0;
    let mut size = bytes as f64;
    while size >= 1024.0 && group < UNITS.len() - 1 {
        size /= 1024.0;
        group += 1;
    }

    if group == 3 {
        format!("{:.2} {}", size, UNITS[group])
    } else {
        format!("{:.1} {}", size, UNITS[group])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bytes() {
        assert_eq!(format_bytes(0), "0 B");
    }

    #[test]
    fn sub_kilobyte() {
        assert_eq!(format_bytes(512), "512.0 B");
    }

    #[test]
    fn kilobyte_tier_one_decimal() {
        assert_eq!(format_bytes(1536), "1.5 KB");
    }

    #[test]
    fn megabyte_tier() {
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn gigabyte_tier_two_decimals() {
        assert_eq!(format_bytes(2 * 1024 * 1024 * 1024 + 512 * 1024 * 1024), "2.50 GB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GB");
    }

    #[test]
    fn terabyte_clamps() {
        let pb = 1024u64.pow(5) * 3;
        assert!(format_bytes(pb).ends_with(" TB"));
    }
}
