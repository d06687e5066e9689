//! Pipeline orchestration
//!
//! Coordinates file discovery, parallel analysis, and export.

use super::analyzer::TrackAnalyzer;
use crate::analysis::metadata;
use crate::audio;
use crate::cancel::CancelToken;
use crate::config::Settings;
use crate::discovery::{self, DiscoveredFile};
use crate::error::{ErrorContext, MixmapError, Result};
use crate::export;
use crate::types::AnalyzedTrack;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// JSON analysis file name inside the output directory
pub const JSON_FILE_NAME: &str = "mixmap.json";

/// Rekordbox collection file name inside the output directory
pub const XML_FILE_NAME: &str = "rekordbox.xml";

/// Minimum audio duration in seconds for a meaningful analysis
///
/// Shorter clips give a single segment sample and too few frames for the
/// one-second smoothing window.
const MIN_AUDIO_DURATION_SECS: f64 = 3.0;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Pipeline result summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineResult {
    pub total_files: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl PipelineResult {
    fn empty(total_files: usize, skipped: usize) -> Self {
        Self {
            total_files,
            successful: 0,
            failed: 0,
            skipped,
        }
    }
}

/// Run the full analysis pipeline
pub fn run(settings: &Settings) -> Result<PipelineResult> {
    let pipeline_start = Instant::now();

    settings
        .analysis
        .validate()
        .map_err(MixmapError::ConfigError)?;
    configure_thread_pool(settings.analysis_threads)?;

    // Phase 1: Discovery
    info!("Scanning for audio files...");
    let files = discovery::scan(&settings.input, settings.recursive)?;
    if files.is_empty() {
        return Ok(PipelineResult::empty(0, 0));
    }
    info!(
        "Found {} audio files in {:.2}s",
        files.len(),
        pipeline_start.elapsed().as_secs_f64()
    );

    if settings.dry_run {
        return Ok(run_dry_run(&files, settings));
    }

    let json_path = settings.output.join(JSON_FILE_NAME);
    let existing_paths = if settings.force {
        debug!("Force mode enabled, will re-analyze all files");
        HashSet::new()
    } else {
        export::read_existing_analysis(&json_path)
    };

    let (files_to_analyze, already_done): (Vec<_>, Vec<_>) = files
        .into_iter()
        .partition(|f| !existing_paths.contains(&f.path.to_string_lossy().to_string()));

    let skipped_existing = already_done.len();
    if skipped_existing > 0 {
        info!(
            "Skipping {} already-analyzed files (use --force to re-analyze)",
            skipped_existing
        );
    }

    let total_files = files_to_analyze.len() + skipped_existing;
    if files_to_analyze.is_empty() {
        info!("All files already analyzed, nothing to do");
        return Ok(PipelineResult::empty(total_files, skipped_existing));
    }

    // Phase 2: Analysis
    info!("Analyzing {} files", files_to_analyze.len());
    let analysis_start = Instant::now();
    let (tracks, stats) = analyze_files(&files_to_analyze, settings);
    let elapsed = analysis_start.elapsed().as_secs_f64();
    info!(
        "Analysis completed in {:.2}s ({:.1} tracks/sec)",
        elapsed,
        if elapsed > 0.0 {
            files_to_analyze.len() as f64 / elapsed
        } else {
            0.0
        }
    );

    // Phase 3: Export
    if !tracks.is_empty() {
        let export_start = Instant::now();
        export_results(&tracks, settings)?;
        info!(
            "Export completed in {:.2}s",
            export_start.elapsed().as_secs_f64()
        );
    }

    info!(
        "Total pipeline time: {:.2}s",
        pipeline_start.elapsed().as_secs_f64()
    );

    Ok(PipelineResult {
        total_files,
        successful: stats.successful,
        failed: stats.failed,
        skipped: stats.skipped + skipped_existing,
    })
}

/// List what would be analyzed without decoding anything
fn run_dry_run(files: &[DiscoveredFile], settings: &Settings) -> PipelineResult {
    let mut by_directory: BTreeMap<PathBuf, Vec<&DiscoveredFile>> = BTreeMap::new();
    for file in files {
        let dir = file.path.parent().unwrap_or(&file.path).to_path_buf();
        by_directory.entry(dir).or_default().push(file);
    }

    println!();
    println!("=== DRY RUN ===");
    println!();
    for (dir, dir_files) in &by_directory {
        println!("{}/ ({} files)", dir.display(), dir_files.len());
        for file in dir_files {
            println!(
                "  {} ({:.1} MB)",
                file.path.file_name().unwrap_or_default().to_string_lossy(),
                file.size_bytes as f64 / (1024.0 * 1024.0)
            );
        }
        println!();
    }

    let mut by_format: BTreeMap<String, usize> = BTreeMap::new();
    for file in files {
        *by_format.entry(format!("{:?}", file.format).to_uppercase()).or_default() += 1;
    }

    println!("Would analyze {} files:", files.len());
    for (format, count) in &by_format {
        println!("  {} {}", count, format);
    }
    println!();
    println!("Would create:");
    println!("  {}", settings.output.join(XML_FILE_NAME).display());
    if settings.output_json {
        println!("  {}", settings.output.join(JSON_FILE_NAME).display());
    }
    println!();

    PipelineResult::empty(files.len(), files.len())
}

/// Configure the global rayon pool; an existing pool is reused
fn configure_thread_pool(num_threads: usize) -> Result<()> {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        Ok(()) => debug!("Configured thread pool with {} threads", num_threads),
        Err(e) if e.to_string().contains("already been initialized") => {
            debug!("Thread pool already initialized, using existing pool");
        }
        Err(e) => {
            return Err(MixmapError::ConfigError(format!(
                "Failed to configure thread pool: {}",
                e
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Default)]
struct AnalysisStats {
    successful: usize,
    failed: usize,
    skipped: usize,
}

fn analyze_files(
    files: &[DiscoveredFile],
    settings: &Settings,
) -> (Vec<AnalyzedTrack>, AnalysisStats) {
    let analyzer = TrackAnalyzer::new(&settings.analysis);

    let progress_bar = settings.show_progress.then(|| {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(PROGRESS_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb
    });

    let successful = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);

    let mut tracks: Vec<AnalyzedTrack> = files
        .par_iter()
        .filter_map(|file| {
            let result = analyze_single_file(file, &analyzer, settings);
            if let Some(ref pb) = progress_bar {
                pb.inc(1);
                let name = file.path.file_name().unwrap_or_default();
                pb.set_message(name.to_string_lossy().into_owned());
            }

            match result {
                Ok(track) => {
                    successful.fetch_add(1, Ordering::Relaxed);
                    Some(track)
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping {}: {}", file.path.display(), e);
                    skipped.fetch_add(1, Ordering::Relaxed);
                    None
                }
                Err(e) => {
                    error!("Failed {}: {}", file.path.display(), e);
                    failed.fetch_add(1, Ordering::Relaxed);
                    None
                }
            }
        })
        .collect();

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Analysis complete");
    }

    tracks.sort_by(|a, b| a.path.cmp(&b.path));

    let stats = AnalysisStats {
        successful: successful.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
        skipped: skipped.load(Ordering::Relaxed),
    };
    (tracks, stats)
}

fn analyze_single_file(
    file: &DiscoveredFile,
    analyzer: &TrackAnalyzer,
    settings: &Settings,
) -> Result<AnalyzedTrack> {
    debug!("Analyzing: {}", file.path.display());

    let cancel = match settings.track_timeout {
        Some(timeout) => CancelToken::with_timeout(timeout),
        None => CancelToken::new(),
    };

    let buffer = audio::decode(&file.path, &cancel)?;
    if buffer.duration < MIN_AUDIO_DURATION_SECS {
        return Err(MixmapError::AnalysisError {
            path: file.path.clone(),
            reason: format!(
                "Audio too short ({:.1}s). Minimum {:.0}s required for analysis.",
                buffer.duration, MIN_AUDIO_DURATION_SECS
            ),
        });
    }

    let (key, structure) = analyzer
        .analyze(&buffer, &cancel)
        .with_file_context(&file.path)?;

    let track = AnalyzedTrack {
        track_id: discovery::generate_track_id(&file.path),
        path: file.path.clone(),
        metadata: metadata::extract_metadata(&file.path),
        key,
        structure,
        duration_seconds: buffer.duration,
        sample_rate: buffer.sample_rate,
        analyzed_at: chrono::Utc::now(),
    };

    debug!(
        "Analyzed {}: key={} ({}), {} mix points",
        file.path.file_name().unwrap_or_default().to_string_lossy(),
        track.key.label,
        track.key.camelot,
        track.structure.mix_points.len()
    );

    Ok(track)
}

fn export_results(tracks: &[AnalyzedTrack], settings: &Settings) -> Result<()> {
    std::fs::create_dir_all(&settings.output)
        .map_err(|e| MixmapError::output_error(&settings.output, e))?;

    // Read before the JSON rewrite so earlier runs stay in the collection
    let json_path = settings.output.join(JSON_FILE_NAME);
    let carried = export::read_carried_tracks(&json_path, tracks);
    if !carried.is_empty() {
        debug!("Keeping {} previously analyzed tracks in the collection", carried.len());
    }
    let mut collection: Vec<AnalyzedTrack> = tracks.iter().cloned().chain(carried).collect();
    collection.sort_by(|a, b| a.path.cmp(&b.path));

    let xml_path = settings.output.join(XML_FILE_NAME);
    export::write_rekordbox_xml(&collection, &xml_path)?;

    if settings.output_json {
        export::write_json(tracks, &json_path)?;
    }

    if settings.show_progress {
        print_import_instructions(&xml_path, collection.len());
    }
    Ok(())
}

fn print_import_instructions(xml_path: &Path, track_count: usize) {
    println!();
    println!("Wrote {} tracks to {}", track_count, xml_path.display());
    println!();
    println!("Rekordbox import:");
    println!("  1. File > Import Collection, select {}", XML_FILE_NAME);
    println!("  2. In the tree view, open the \"mixmap_import_*\" playlist");
    println!("  3. Right-click the playlist > \"Import Playlist\"");
    println!();
    println!("Mix points appear as memory cues named after the section they start.");
    println!();
}
