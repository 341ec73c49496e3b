// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt;

/// Diagnostic trail for one discovery pass.
///
/// Each pass owns its own log and hands it back with the result; nothing is
/// accumulated process-wide, so concurrent or abandoned passes cannot bleed
/// into each other.
#[derive(Debug, Default)]
pub struct DiagLog {
    entries: Vec<String>,
}

impl DiagLog {
    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push(message.into());
    }

    pub fn device(&mut self, device: &str, message: impl AsRef<str>) {
        self.entries.push(format!("[{device}] {}", message.as_ref()));
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for DiagLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_entries_are_tagged() {
        let mut diag = DiagLog::default();
        diag.push("pass started");
        diag.device("mmcblk0p1", "size 4096 bytes");
        assert_eq!(diag.entries().len(), 2);
        assert_eq!(diag.entries()[1], "[mmcblk0p1] size 4096 bytes");
        assert_eq!(diag.to_string(), "pass started\n[mmcblk0p1] size 4096 bytes\n");
    }
}
