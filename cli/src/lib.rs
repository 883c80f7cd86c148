use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use strum::Display;
use symmetry::{
    Analysis, AsymmetryConfig, CandidateRanking, ChainApproximation, MirrorAxis, PadMode,
    Pipeline, SymmetryError, ThresholdMethod,
};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Header line of the results table
pub const RESULTS_HEADER: &str = "# filename asymmetry_score flag";

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Cannot create output directory {}: {source}", .path.display())]
    OutputDir { path: PathBuf, source: io::Error },
    #[error("Cannot read input directory {}: {source}", .path.display())]
    ReadDir { path: PathBuf, source: io::Error },
    #[error("Cannot write results table {}: {source}", .path.display())]
    Results { path: PathBuf, source: io::Error },
    #[error("{}: {source}", .file.display())]
    Image {
        file: PathBuf,
        source: SymmetryError,
    },
    #[error("Cannot save {}: {source}", .file.display())]
    Save {
        file: PathBuf,
        source: image::ImageError,
    },
    #[error("Worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Driver-level quality gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum QualityFlag {
    #[strum(to_string = "OK")]
    Passed,
    #[strum(to_string = "suspicious")]
    Suspicious,
}

/// Flag crops smaller than a sixth of the source along either axis, and
/// sentinel or larger scores.
pub fn classify(crop: (u32, u32), source: (u32, u32), score: f64) -> QualityFlag {
    let (crop_w, crop_h) = crop;
    let (source_w, source_h) = source;
    let too_small = crop_h as u64 * 6 < source_h as u64 || crop_w as u64 * 6 < source_w as u64;

    if too_small || score >= 1.0 {
        QualityFlag::Suspicious
    } else {
        QualityFlag::Passed
    }
}

/// One row of the results table
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub file_name: String,
    pub score: f64,
    pub flag: QualityFlag,
}

impl ImageRecord {
    pub fn from_analysis(file_name: String, analysis: &Analysis) -> Self {
        Self {
            flag: classify(analysis.crop_dimensions(), analysis.source_dimensions, analysis.score),
            score: analysis.score,
            file_name,
        }
    }

    /// Row for an image whose object could not be extracted
    pub fn failed(file_name: String) -> Self {
        Self {
            file_name,
            score: 1.0,
            flag: QualityFlag::Suspicious,
        }
    }
}

/// Render the whitespace-delimited results table
pub fn render_results(records: &[ImageRecord]) -> String {
    let mut table = String::from(RESULTS_HEADER);
    table.push('\n');
    for record in records {
        table.push_str(&format!("{} {} {}\n", record.file_name, record.score, record.flag));
    }
    table
}

/// `<out_dir>/<stem>_<suffix>.<ext>` for an input file
pub fn output_path(out_dir: &Path, input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{}_{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}_{}", stem, suffix),
    };
    out_dir.join(name)
}

/// Default results file name: `ascheck_results_<directory name>.txt`
pub fn default_results_path(read_dir: &Path) -> PathBuf {
    let dir_name = read_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            read_dir
                .canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| "images".to_string());
    PathBuf::from(format!("ascheck_results_{}.txt", dir_name))
}

/// Files directly inside `dir` with extension `ext`, sorted by name
pub fn collect_images(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, BatchError> {
    let wanted = ext.trim().trim_start_matches('.');
    let read_err = |source: io::Error| BatchError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(wanted));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Command-line overrides layered on top of a configuration file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub threshold_method: Option<String>,
    pub morph_iterations: Option<u8>,
    pub pad_width: Option<u32>,
    pub pad_mode: Option<String>,
    pub chain_approximation: Option<String>,
    pub ranking: Option<String>,
    pub mirror_axis: Option<String>,
    pub no_diagnostics: bool,
}

impl ConfigOverrides {
    pub fn apply(self, mut config: AsymmetryConfig) -> AsymmetryConfig {
        if let Some(method) = self.threshold_method {
            config.threshold_method = ThresholdMethod::from(method);
        }
        if let Some(iterations) = self.morph_iterations {
            config.morph_iterations = iterations;
        }
        if let Some(width) = self.pad_width {
            config.pad_width = width;
        }
        if let Some(mode) = self.pad_mode {
            config.pad_mode = PadMode::from(mode);
        }
        if let Some(approximation) = self.chain_approximation {
            config.chain_approximation = ChainApproximation::from(approximation);
        }
        if let Some(ranking) = self.ranking {
            config.ranking = CandidateRanking::from(ranking);
        }
        if let Some(axis) = self.mirror_axis {
            config.mirror_axis = MirrorAxis::from(axis);
        }
        if self.no_diagnostics {
            config.produce_diagnostics = false;
        }
        config
    }
}

/// Everything a batch run needs
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub read_dir: PathBuf,
    pub ext: String,
    /// Defaults to `<read_dir>/bw`
    pub output_dir: Option<PathBuf>,
    /// Defaults to [`default_results_path`]
    pub results_path: Option<PathBuf>,
    pub jobs: usize,
    pub limit: Option<usize>,
    pub config: AsymmetryConfig,
}

impl BatchOptions {
    pub fn new(read_dir: impl Into<PathBuf>, ext: impl Into<String>) -> Self {
        Self {
            read_dir: read_dir.into(),
            ext: ext.into(),
            output_dir: None,
            results_path: None,
            jobs: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            limit: None,
            config: AsymmetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchSummary {
    /// One row per decoded image, sorted by file name
    pub records: Vec<ImageRecord>,
    /// Files that could not be decoded
    pub skipped: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub results_path: PathBuf,
}

impl BatchSummary {
    pub fn suspicious(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.flag == QualityFlag::Suspicious)
            .count()
    }
}

fn save_outputs(analysis: &Analysis, input: &Path, out_dir: &Path) -> Result<(), BatchError> {
    let save_err =
        |file: PathBuf| move |source: image::ImageError| BatchError::Save { file, source };

    let bw_path = output_path(out_dir, input, "bw");
    analysis.silhouette.save(&bw_path).map_err(save_err(bw_path.clone()))?;

    if let Some(diff_mask) = &analysis.diff_mask {
        let asym_path = output_path(out_dir, input, "asym");
        diff_mask.save(&asym_path).map_err(save_err(asym_path.clone()))?;
    }
    if let Some(overlay) = &analysis.contour_overlay {
        let contour_path = output_path(out_dir, input, "contour");
        overlay.save(&contour_path).map_err(save_err(contour_path.clone()))?;
    }
    Ok(())
}

/// Run one image start to finish; `None` when the file cannot be decoded
pub fn process_file(path: &Path, pipeline: &Pipeline, out_dir: &Path) -> Option<ImageRecord> {
    let image = match image::open(path) {
        Ok(image) => image,
        Err(err) => {
            warn!("Skipping {}: {}", path.display(), err);
            return None;
        }
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match pipeline.process_dynamic(&image) {
        Ok(analysis) => {
            if let Err(err) = save_outputs(&analysis, path, out_dir) {
                warn!("{}", err);
            }
            let record = ImageRecord::from_analysis(file_name, &analysis);
            if analysis.degenerate {
                warn!("{} has an empty silhouette", path.display());
            }
            info!("{}: asymmetry {:.4} ({})", record.file_name, record.score, record.flag);
            Some(record)
        }
        Err(source) => {
            let err = BatchError::Image {
                file: path.to_path_buf(),
                source,
            };
            warn!("{}; recording as suspicious", err);
            Some(ImageRecord::failed(file_name))
        }
    }
}

/// Score every matching image in a directory and write the results table.
///
/// Images are processed on blocking worker threads, at most `jobs` at a time.
pub async fn run_batch(options: BatchOptions) -> Result<BatchSummary, BatchError> {
    let mut files = collect_images(&options.read_dir, &options.ext)?;
    if let Some(limit) = options.limit {
        files.truncate(limit);
    }

    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| options.read_dir.join("bw"));
    fs::create_dir_all(&output_dir).map_err(|source| BatchError::OutputDir {
        path: output_dir.clone(),
        source,
    })?;

    let pipeline = Arc::new(Pipeline::from_config(&options.config));
    info!("{}", pipeline.info());
    info!(
        "Processing {} file(s) from {}",
        files.len(),
        options.read_dir.display()
    );

    let jobs = options.jobs.max(1);
    let mut tasks = JoinSet::new();
    let mut outcomes = Vec::with_capacity(files.len());

    for path in files {
        if tasks.len() >= jobs {
            if let Some(outcome) = tasks.join_next().await {
                outcomes.push(outcome?);
            }
        }

        let pipeline = Arc::clone(&pipeline);
        let out_dir = output_dir.clone();
        tasks.spawn_blocking(move || {
            let record = process_file(&path, &pipeline, &out_dir);
            (path, record)
        });
    }
    while let Some(outcome) = tasks.join_next().await {
        outcomes.push(outcome?);
    }

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    for (path, record) in outcomes {
        match record {
            Some(record) => records.push(record),
            None => skipped.push(path),
        }
    }
    records.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    skipped.sort();

    let results_path = options
        .results_path
        .clone()
        .unwrap_or_else(|| default_results_path(&options.read_dir));
    fs::write(&results_path, render_results(&records)).map_err(|source| BatchError::Results {
        path: results_path.clone(),
        source,
    })?;
    info!("Saving results to {}", results_path.display());

    Ok(BatchSummary {
        records,
        skipped,
        output_dir,
        results_path,
    })
}
