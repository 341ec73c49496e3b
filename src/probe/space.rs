// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Used and available bytes for a mount point. statfs first; `df` when the
/// kernel hands back nothing usable; `(0, 0)` when everything fails.
pub fn space_info(mount_point: &str, df_timeout: Duration) -> (u64, u64) {
    if let Some(pair) = statvfs_space(mount_point) {
        return pair;
    }
    df_space(mount_point, df_timeout).unwrap_or((0, 0))
}

/// Total and usable bytes for an accessible directory, statfs only.
pub fn probe_total_usable(path: &str) -> Option<(u64, u64)> {
    let stat = rustix::fs::statvfs(path).ok()?;
    if stat.f_blocks == 0 {
        return None;
    }
    let total = stat.f_blocks.checked_mul(stat.f_frsize)?;
    let usable = stat.f_bavail.checked_mul(stat.f_frsize)?;
    Some((total, usable))
}

/// Exotic filesystems have been observed reporting zero or inverted block
/// counts; such answers are rejected so the caller falls through to `df`.
fn statvfs_space(mount_point: &str) -> Option<(u64, u64)> {
    let stat = rustix::fs::statvfs(mount_point).ok()?;
    if stat.f_blocks == 0 {
        return None;
    }

    let block_size = stat.f_frsize;
    let total = stat.f_blocks.checked_mul(block_size)?;
    let available = stat.f_bavail.checked_mul(block_size)?;
    let used = total.checked_sub(available)?;
    Some((used, available))
}

/// `df -k <mount_point>`: skip the header, take the row whose mount-point
/// column matches, convert the 1K-block columns to bytes.
pub(crate) fn df_space(mount_point: &str, timeout: Duration) -> Option<(u64, u64)> {
    let mut command = Command::new("df");
    command.arg("-k").arg(mount_point);
    let output = run_with_timeout(command, timeout)?;
    parse_df_output(&output, mount_point)
}

pub(crate) fn parse_df_output(output: &str, mount_point: &str) -> Option<(u64, u64)> {
    for line in output.lines().skip(1) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= 6 && parts[5] == mount_point {
            let used = parts[2].parse::<u64>().ok()?.checked_mul(1024)?;
            let available = parts[3].parse::<u64>().ok()?.checked_mul(1024)?;
            return Some((used, available));
        }
    }
    None
}

/// Run a command, reading stdout on a helper thread so a wedged subprocess
/// cannot hang the discovery pass; on timeout the child is killed.
pub(crate) fn run_with_timeout(mut command: Command, timeout: Duration) -> Option<String> {
    command.stdout(Stdio::piped()).stderr(Stdio::null());
    let mut child = command.spawn().ok()?;
    let mut stdout = child.stdout.take()?;

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buffer = String::new();
        let _ = stdout.read_to_string(&mut buffer);
        let _ = tx.send(buffer);
    });

    match rx.recv_timeout(timeout) {
        Ok(output) => {
            let _ = child.wait();
            Some(output)
        }
        Err(_) => {
            log::warn!("subprocess exceeded {timeout:?}, killing it");
            let _ = child.kill();
            let _ = child.wait();
            None
        }
    }
}
