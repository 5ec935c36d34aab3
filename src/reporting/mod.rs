// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod output;
pub mod statistics;

pub use output::OutputWriter;
pub use statistics::{format_duration, render_statistics};
