use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::scanner::engine::FileScanner;
use crate::scanner::report::Finding;

/// Bound on files in flight, limiting open handles and CPU contention.
const MAX_CONCURRENT_SCANS: usize = 10;

/// Fans the scanner out over a file list under bounded concurrency and
/// aggregates per-file results in completion order.
pub struct ScanCoordinator {
    scanner: Arc<FileScanner>,
    // Skip decisions memoized per path, scoped to this batch run.
    skip_memo: Mutex<HashMap<PathBuf, bool>>,
}

impl ScanCoordinator {
    pub fn new(scanner: Arc<FileScanner>) -> Self {
        Self {
            scanner,
            skip_memo: Mutex::new(HashMap::new()),
        }
    }

    fn should_skip(&self, path: &Path) -> bool {
        if let Some(&skip) = self.skip_memo.lock().unwrap().get(path) {
            return skip;
        }
        let skip = self.scanner.should_skip(path);
        self.skip_memo
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), skip);
        skip
    }

    /// Scans every file, returning the concatenation of per-file finding
    /// lists in completion order (concurrent files finish out of order).
    /// A single file's failure never fails the batch.
    pub async fn scan_files(&self, files: &[PathBuf], root: &Path) -> Vec<Finding> {
        let progress = ProgressBar::new(files.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{spinner} Scanning files... {bar:40} {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_SCANS));
        let mut tasks: JoinSet<Vec<Finding>> = JoinSet::new();

        for path in files {
            if self.should_skip(path) {
                progress.inc(1);
                continue;
            }
            let scanner = Arc::clone(&self.scanner);
            let semaphore = Arc::clone(&semaphore);
            let path = path.clone();
            let root = root.to_path_buf();
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return Vec::new(),
                };
                scanner.scan_path(&path, &root).await
            });
        }

        let mut findings = Vec::new();
        while let Some(result) = tasks.join_next().await {
            if let Ok(file_findings) = result {
                findings.extend(file_findings);
            }
            progress.inc(1);
        }
        progress.finish_and_clear();
        findings
    }
}
