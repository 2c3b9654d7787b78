use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use walkdir::WalkDir;

use crate::args::Args;
use crate::convert::{convert_to_webp, ConvertError};

/// Extensions eligible for conversion, matched case-insensitively
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff"];

pub struct Processor {
    source_dir: PathBuf,
    old_dir: PathBuf,
    webp_dir: PathBuf,
    quality: i32,
    stats: ProcessingStats,
}

#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub total_files: usize,
    pub converted: usize,
    pub failed: usize,
}

/// Result sent back from worker threads
#[derive(Debug)]
struct WorkerResult {
    original_path: PathBuf,
    result: Result<PathBuf, ConvertError>,
}

impl Processor {
    /// Create a processor for the directory in `args`, ensuring the archive
    /// and output directories exist. This runs before the confirmation gate,
    /// so a declined run still leaves the two empty directories behind.
    pub fn new(args: &Args) -> Result<Self> {
        let old_dir = args.directory.join(&args.old_output_folder);
        fs::create_dir_all(&old_dir).with_context(|| {
            format!("Failed to create archive directory: {}", old_dir.display())
        })?;

        let webp_dir = args.directory.join(&args.output_folder);
        fs::create_dir_all(&webp_dir).with_context(|| {
            format!("Failed to create output directory: {}", webp_dir.display())
        })?;

        Ok(Processor {
            source_dir: args.directory.clone(),
            old_dir,
            webp_dir,
            quality: args.quality,
            stats: ProcessingStats::default(),
        })
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    /// Convert every candidate file in the source directory, archiving each
    /// original after its own conversion succeeds. A file that fails is left
    /// in place and the batch continues.
    pub fn process(&mut self) -> Result<()> {
        println!("Scanning directory: {}", self.source_dir.display());

        let candidates = self.collect_candidates();
        self.stats.total_files = candidates.len();
        println!("Found {} files to convert", candidates.len());
        println!();

        if candidates.is_empty() {
            self.print_summary();
            return Ok(());
        }

        self.convert_files_parallel(candidates);

        self.print_summary();
        Ok(())
    }

    /// Single non-recursive snapshot of the source directory
    fn collect_candidates(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry_result in WalkDir::new(&self.source_dir)
            .max_depth(1)
            .min_depth(1)
            .into_iter()
        {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    if let Some(path) = err.path() {
                        eprintln!("Warning: Failed to access {}: {}", path.display(), err);
                    } else {
                        eprintln!("Warning: Failed to read directory entry: {}", err);
                    }
                    continue;
                }
            };

            let path = entry.path();

            // Subdirectories, including the archive and output directories
            // created above, are never candidates
            if !path.is_file() {
                continue;
            }

            if !has_supported_extension(path) {
                continue;
            }

            files.push(path.to_path_buf());
        }

        files
    }

    fn convert_files_parallel(&mut self, files: Vec<PathBuf>) {
        let num_workers = (num_cpus::get() / 2).max(1);
        println!("Starting {} worker threads", num_workers);

        let (work_sender, work_receiver) = bounded::<PathBuf>(num_workers * 2);
        let (result_sender, result_receiver) = bounded::<WorkerResult>(num_workers * 2);

        // Spawn worker threads
        let mut worker_handles = Vec::new();
        for _ in 0..num_workers {
            let work_rx = work_receiver.clone();
            let result_tx = result_sender.clone();
            let webp_dir = self.webp_dir.clone();
            let quality = self.quality;

            let handle = thread::spawn(move || {
                worker_thread(work_rx, result_tx, webp_dir, quality);
            });

            worker_handles.push(handle);
        }

        // Drop our copies of the channels
        drop(work_receiver);
        drop(result_sender);

        // Send all work items to workers
        thread::spawn(move || {
            for file in files {
                if work_sender.send(file).is_err() {
                    break; // Workers have shut down
                }
            }
            // Channel closes when work_sender is dropped
        });

        // Moves happen here, on the receiving side, only for files whose own
        // conversion succeeded
        for worker_result in result_receiver {
            self.handle_worker_result(worker_result);
        }

        // Wait for all workers to finish
        for handle in worker_handles {
            let _ = handle.join();
        }
    }

    fn handle_worker_result(&mut self, worker_result: WorkerResult) {
        let WorkerResult {
            original_path,
            result,
        } = worker_result;

        match result {
            Ok(webp_path) => {
                println!(
                    "✓ Converted: {} -> {} (quality {})",
                    original_path.display(),
                    webp_path.display(),
                    self.quality
                );
                self.archive_original(&original_path);
            }
            Err(e) => {
                self.stats.failed += 1;
                eprintln!("✗ Failed to convert {}: {}", original_path.display(), e);
            }
        }
    }

    /// Move a successfully converted original into the archive directory
    fn archive_original(&mut self, original_path: &Path) {
        let file_name = match original_path.file_name() {
            Some(name) => name,
            None => {
                self.stats.failed += 1;
                eprintln!(
                    "✗ Cannot determine file name for {}",
                    original_path.display()
                );
                return;
            }
        };

        let archived_path = self.old_dir.join(file_name);
        match fs::rename(original_path, &archived_path) {
            Ok(()) => {
                self.stats.converted += 1;
                println!(
                    "✓ Moved: {} -> {}",
                    original_path.display(),
                    archived_path.display()
                );
            }
            Err(e) => {
                // The original stays where the failed rename left it
                self.stats.failed += 1;
                eprintln!("✗ Failed to move {}: {}", original_path.display(), e);
            }
        }
    }

    fn print_summary(&self) {
        println!();
        println!("=== PROCESSING COMPLETE ===");
        println!("Total files scanned: {}", self.stats.total_files);
        println!("Converted: {}", self.stats.converted);
        println!("Failed: {}", self.stats.failed);
    }
}

/// Worker thread function
fn worker_thread(
    work_receiver: Receiver<PathBuf>,
    result_sender: Sender<WorkerResult>,
    webp_dir: PathBuf,
    quality: i32,
) {
    for file_path in work_receiver {
        let result = convert_to_webp(&file_path, &webp_dir, quality);

        let worker_result = WorkerResult {
            original_path: file_path,
            result,
        };

        if result_sender.send(worker_result).is_err() {
            break; // Main thread has shut down
        }
    }
}

fn has_supported_extension(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => SUPPORTED_EXTENSIONS
            .iter()
            .any(|supported| ext.eq_ignore_ascii_case(supported)),
        None => false,
    }
}
