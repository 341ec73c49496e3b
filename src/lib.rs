// Copyright 2026 DiskInfo Developers
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod config;
pub mod defs;
pub mod export;
pub mod model;
pub mod probe;
pub mod utils;
