use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::io::AsyncReadExt;

use memrun_metrics::{CounterReadings, bytes_to_mb};

use crate::load::LoadHandle;
use crate::platform::{Platform, heap};
use crate::source::{CounterSource, ReadError};

const LOAD_CHUNK: usize = 256 * 1024;

/// Real-host platform: process and system memory counters via sysinfo, load
/// targets are files read into retained in-process buffers.
///
/// Loaded assets stay retained until cleanup so steady-state readings include
/// them, the way a loaded scene stays resident after activation.
#[derive(Debug)]
pub struct SystemPlatform {
    results_root: PathBuf,
    assets: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl SystemPlatform {
    #[must_use]
    pub fn new(results_root: impl Into<PathBuf>) -> Self {
        Self {
            results_root: results_root.into(),
            assets: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Platform for SystemPlatform {
    fn results_root(&self) -> PathBuf {
        self.results_root.clone()
    }

    fn create_source(&self) -> Box<dyn CounterSource> {
        Box::new(SystemSource {
            sys: System::new(),
            pid: sysinfo::get_current_pid().ok(),
        })
    }

    fn begin_load(&self, target: &str) -> Box<dyn LoadHandle> {
        let path = PathBuf::from(target);
        let total = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

        let bytes_read = Arc::new(AtomicU64::new(0));
        let done = Arc::new(AtomicBool::new(false));

        let assets = Arc::clone(&self.assets);
        let task_bytes = Arc::clone(&bytes_read);
        let task_done = Arc::clone(&done);
        tokio::spawn(async move {
            match load_file(&path, &task_bytes).await {
                Ok(data) => {
                    let mut assets = assets.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                    assets.push(data);
                }
                Err(err) => tracing::warn!("load failed for {}: {err}", path.display()),
            }
            task_done.store(true, Ordering::Release);
        });

        Box::new(FileLoadHandle {
            bytes_read,
            total,
            done,
        })
    }

    fn cleanup(
        &self,
        force_reclaim: bool,
        unload_unused: bool,
    ) -> impl std::future::Future<Output = ()> + Send {
        let assets = Arc::clone(&self.assets);
        async move {
            {
                let mut assets = assets.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                if unload_unused {
                    assets.clear();
                }
                if force_reclaim {
                    assets.shrink_to_fit();
                }
            }

            // Give the allocator a step to settle before the next run samples.
            tokio::task::yield_now().await;
        }
    }
}

/// Reads the file in chunks, yielding between chunks so progress is visible
/// one scheduling step at a time.
async fn load_file(path: &Path, bytes_read: &AtomicU64) -> std::io::Result<Vec<u8>> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut data = Vec::new();
    let mut chunk = vec![0u8; LOAD_CHUNK];

    loop {
        let n = file.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
        bytes_read.fetch_add(n as u64, Ordering::Relaxed);
        tokio::task::yield_now().await;
    }

    Ok(data)
}

struct FileLoadHandle {
    bytes_read: Arc<AtomicU64>,
    /// Zero when the target's size could not be determined up front; progress
    /// then stays at zero and only completion is observable.
    total: u64,
    done: Arc<AtomicBool>,
}

impl LoadHandle for FileLoadHandle {
    fn progress(&mut self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.bytes_read.load(Ordering::Relaxed) as f64 / self.total as f64).clamp(0.0, 1.0)
    }

    fn is_done(&mut self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}

struct SystemSource {
    sys: System,
    pid: Option<Pid>,
}

impl CounterSource for SystemSource {
    fn start(&mut self) {
        self.sys.refresh_memory();
        if let Some(pid) = self.pid {
            self.sys
                .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        }
    }

    fn read(&mut self) -> Result<CounterReadings, ReadError> {
        let pid = self
            .pid
            .ok_or_else(|| ReadError("current pid unavailable".to_string()))?;

        self.sys
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        self.sys.refresh_memory();

        let process = self
            .sys
            .process(pid)
            .ok_or_else(|| ReadError("own process missing from snapshot".to_string()))?;

        Ok(CounterReadings {
            allocated_mb: bytes_to_mb(process.memory()),
            reserved_mb: bytes_to_mb(process.virtual_memory()),
            managed_mb: bytes_to_mb(heap::live_heap_bytes()),
            system_mb: bytes_to_mb(self.sys.used_memory()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_load_reaches_done_with_full_progress() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(err) => panic!("tempdir failed: {err}"),
        };
        let path = dir.path().join("asset.bin");
        if let Err(err) = std::fs::write(&path, vec![7u8; 3 * LOAD_CHUNK / 2]) {
            panic!("write failed: {err}");
        }

        let platform = SystemPlatform::new(dir.path());
        let mut handle = platform.begin_load(&path.display().to_string());

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !handle.is_done() {
            assert!(std::time::Instant::now() < deadline, "load never completed");
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
        assert!((handle.progress() - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn missing_file_still_completes() {
        let platform = SystemPlatform::new(".");
        let mut handle = platform.begin_load("definitely/not/a/real/file.bin");

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !handle.is_done() {
            assert!(std::time::Instant::now() < deadline, "load never completed");
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
        assert_eq!(handle.progress(), 0.0);
    }

    #[tokio::test]
    async fn cleanup_drops_retained_assets() {
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(err) => panic!("tempdir failed: {err}"),
        };
        let path = dir.path().join("asset.bin");
        if let Err(err) = std::fs::write(&path, vec![1u8; 1024]) {
            panic!("write failed: {err}");
        }

        let platform = SystemPlatform::new(dir.path());
        let mut handle = platform.begin_load(&path.display().to_string());
        while !handle.is_done() {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }

        {
            let assets = platform
                .assets
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            assert_eq!(assets.len(), 1);
        }

        platform.cleanup(true, true).await;

        let assets = platform
            .assets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        assert!(assets.is_empty());
    }

    #[test]
    fn system_source_reads_current_process() {
        let mut source = SystemSource {
            sys: System::new(),
            pid: sysinfo::get_current_pid().ok(),
        };
        source.start();

        match source.read() {
            Ok(readings) => {
                assert!(readings.allocated_mb > 0.0);
                assert!(readings.reserved_mb >= readings.allocated_mb);
            }
            // Best-effort: some sandboxes hide /proc.
            Err(_) => {}
        }
    }
}
