// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::path::PathBuf;

/// Where to find the accessible directories of removable storage volumes.
///
/// On Android the authoritative answer comes from the platform storage
/// service, whose accessible-path API changed shape across releases; the
/// probing side only needs "candidate directories to stat", so that whole
/// concern is folded behind this trait and tests can inject a fake.
pub trait VolumePathSource {
    fn removable_volume_paths(&self) -> Vec<PathBuf>;
}

/// Production source: every directory below the media_rw bases (plus any
/// configured extras), which is where vold exposes mounted public volumes.
pub struct MediaDirs {
    bases: Vec<PathBuf>,
}

impl MediaDirs {
    pub fn new(bases: Vec<PathBuf>) -> Self {
        Self { bases }
    }
}

impl VolumePathSource for MediaDirs {
    fn removable_volume_paths(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for base in &self.bases {
            let Ok(entries) = fs::read_dir(base) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    paths.push(path);
                }
            }
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_volume_directories_under_each_base() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("media_rw");
        fs::create_dir_all(base.join("9A58-0A02")).unwrap();
        fs::create_dir_all(base.join("ED27-E605")).unwrap();
        fs::write(base.join("stray-file"), b"").unwrap();

        let source = MediaDirs::new(vec![base.clone(), tmp.path().join("missing")]);
        let mut paths = source.removable_volume_paths();
        paths.sort();
        assert_eq!(paths, vec![base.join("9A58-0A02"), base.join("ED27-E605")]);
    }
}
