// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::model::{PartitionRecord, PartitionType};

/// Classify a partition record by name/path heuristics.
///
/// LOOP is checked before SUPER on purpose: a loop-backed device-mapper
/// volume counts as a loop device.
pub fn classify(record: &PartitionRecord) -> PartitionType {
    let name = record.name.to_ascii_lowercase();
    let path = record.device_path.to_ascii_lowercase();

    if name.contains("loop") || path.contains("loop") {
        return PartitionType::Loop;
    }
    if name.contains("super")
        || path.contains("super")
        || record.name.starts_with("dm-")
        || record.device_path.contains("dm-")
    {
        return PartitionType::Super;
    }
    PartitionType::Default
}

/// Stamp the record with its classification.
pub fn assign(mut record: PartitionRecord) -> PartitionRecord {
    record.partition_type = classify(&record);
    record
}
