use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use super::report::MetricsCsv;

/// Per-session results directory layout:
/// `<root>/BenchmarkResults/<timestamp>/metrics.csv` plus `Graphs/` for the
/// per-run chart images.
#[derive(Debug)]
pub struct Session {
    run_dir: PathBuf,
    graphs_dir: PathBuf,
}

impl Session {
    pub fn create(results_root: &Path) -> io::Result<Self> {
        let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        let run_dir = results_root
            .join("BenchmarkResults")
            .join(stamp.to_string());
        let graphs_dir = run_dir.join("Graphs");
        fs::create_dir_all(&graphs_dir)?;

        Ok(Self {
            run_dir,
            graphs_dir,
        })
    }

    #[must_use]
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    #[must_use]
    pub fn metrics_path(&self) -> PathBuf {
        self.run_dir.join("metrics.csv")
    }

    pub fn open_metrics(&self) -> io::Result<MetricsCsv<BufWriter<File>>> {
        let file = File::create(self.metrics_path())?;
        MetricsCsv::new(BufWriter::new(file))
    }

    #[must_use]
    pub fn graph_path(&self, target: &str, iteration: u32) -> PathBuf {
        self.graphs_dir.join(format!("{target}_iter{iteration:02}.png"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_builds_the_session_tree() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(err) => panic!("tempdir failed: {err}"),
        };

        let session = match Session::create(dir.path()) {
            Ok(s) => s,
            Err(err) => panic!("session create failed: {err}"),
        };

        assert!(session.run_dir().starts_with(dir.path().join("BenchmarkResults")));
        assert!(session.run_dir().join("Graphs").is_dir());

        let graph = session.graph_path("CityScene", 3);
        assert!(graph.ends_with("Graphs/CityScene_iter03.png"));
    }
}
