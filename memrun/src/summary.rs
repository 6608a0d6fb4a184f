use std::path::PathBuf;

use memrun_core::runner::RunRecord;

/// End-of-session results table, one row per run. Memory columns are MB.
pub fn print(records: &[RunRecord]) {
    if records.is_empty() {
        return;
    }

    println!();
    println!(
        "{:<20} {:>4} {:>10} {:>12} {:>10} {:>11} {:>10} {:>9} {:>11} {:>13} {:>12} {:>11}  {}",
        "Target",
        "Iter",
        "Load90 ms",
        "LoadDone ms",
        "Peak Res",
        "Peak Alloc",
        "Peak Mngd",
        "Peak Sys",
        "Steady Res",
        "Steady Alloc",
        "Steady Mngd",
        "Steady Sys",
        "Graph",
    );

    for r in records {
        println!(
            "{:<20} {:>4} {:>10} {:>12} {:>10} {:>11} {:>10} {:>9} {:>11} {:>13} {:>12} {:>11}  {}",
            r.target,
            r.iteration,
            fmt_opt(r.load_threshold_ms),
            fmt(r.load_complete_ms),
            fmt(r.peaks.reserved_mb),
            fmt(r.peaks.allocated_mb),
            fmt(r.peaks.managed_mb),
            fmt(r.peaks.system_mb),
            fmt(r.steady.reserved_mb),
            fmt(r.steady.allocated_mb),
            fmt(r.steady.managed_mb),
            fmt(r.steady.system_mb),
            file_name(r.image_path.as_ref()),
        );
    }
}

fn fmt(v: f64) -> String {
    if v.is_nan() || v.is_infinite() {
        "-".to_string()
    } else {
        format!("{v:.1}")
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), fmt)
}

fn file_name(path: Option<&PathBuf>) -> String {
    path.and_then(|p| p.file_name())
        .map_or_else(|| "-".to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting_substitutes_dashes_for_missing_values() {
        assert_eq!(fmt(12.34), "12.3");
        assert_eq!(fmt(f64::NAN), "-");
        assert_eq!(fmt_opt(None), "-");
        assert_eq!(fmt_opt(Some(40.0)), "40.0");
        assert_eq!(file_name(None), "-");
        assert_eq!(
            file_name(Some(&PathBuf::from("/x/Graphs/a_iter01.png"))),
            "a_iter01.png"
        );
    }
}
