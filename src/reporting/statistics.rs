// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::Duration;

use crate::discovery::Statistics;

/// Render per-source counters as an aligned table followed by the list of
/// sources that never ran
pub fn render_statistics(stats: &BTreeMap<&str, Statistics>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, " {:<16} {:>10} {:>9} {:>7}", "Source", "Duration", "Results", "Errors");
    let _ = writeln!(out, "{}", "─".repeat(46));

    let mut skipped = Vec::new();
    for (name, stat) in stats {
        if stat.skipped {
            skipped.push(*name);
            continue;
        }
        let _ = writeln!(
            out,
            " {:<16} {:>10} {:>9} {:>7}",
            name,
            format_duration(stat.time_taken),
            stat.results,
            stat.errors
        );
    }

    if !skipped.is_empty() {
        let _ = writeln!(out, "\n The following sources were included but skipped...\n");
        for name in skipped {
            let _ = writeln!(out, " {}", name);
        }
    }
    out
}

/// `1m5.250s`, `850ms`
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        return format!("{}ms", millis);
    }
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.3}s", secs)
    } else {
        let minutes = (secs / 60.0).floor();
        format!("{}m{:.3}s", minutes as u64, secs - minutes * 60.0)
    }
}
