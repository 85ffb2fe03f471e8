use anyhow::{anyhow, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::{FileManager, FileType};
use crate::formats::Layout;
use crate::providers::ChatProvider;
use crate::segmentation::Segmentor;
use crate::subtitle_processor::CueSequence;
use crate::translation::{ProgressCallback, TranslationOutcome, TranslationService};

// @module: Application controller for the cue pipeline

/// File tag used when cues are only segmented, not translated
pub const UNTRANSLATED_TAG: &str = "cues";

/// Name of the per-directory file listing cues that kept their original text
pub const ISSUES_LOG_NAME: &str = "cuesmith.issues.log";

/// Drives load -> segment -> translate -> save for files and folders
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Provider override, mostly for tests
    provider: Option<Arc<ChatProvider>>,

    // @field: Set from outside to stop translating between batches
    cancel: Arc<AtomicBool>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            provider: None,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Create a controller that translates through `provider` instead of the configured endpoint
    pub fn with_provider(config: Config, provider: Arc<ChatProvider>) -> Result<Self> {
        let mut controller = Self::with_config(config)?;
        controller.provider = Some(provider);
        Ok(controller)
    }

    /// Flag checked between batches; set it to stop translating early
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // @returns: Tag inserted in output file names
    fn output_tag(&self) -> &str {
        if self.config.translation.need_translate {
            &self.config.target_language
        } else {
            UNTRANSLATED_TAG
        }
    }

    fn layout(&self) -> Layout {
        if self.config.translation.need_translate {
            self.config.output.layout
        } else {
            Layout::OriginalOnly
        }
    }

    /// Output paths for `input_file`, one per configured format
    pub fn output_paths(&self, input_file: &Path, output_dir: Option<&Path>) -> Vec<PathBuf> {
        self.config
            .output
            .formats
            .iter()
            .map(|format| FileManager::generate_output_path(input_file, output_dir, self.output_tag(), format.extension()))
            .collect()
    }

    fn build_service(&self) -> Result<TranslationService> {
        let translation = self.config.translation.clone();
        let source = &self.config.source_language;
        let target = &self.config.target_language;
        match &self.provider {
            Some(provider) => TranslationService::with_provider(translation, source, target, Arc::clone(provider)),
            None => TranslationService::new(translation, source, target),
        }
    }

    /// Process one input file; returns the files written
    pub async fn run(&self, input_file: PathBuf, output_dir: Option<PathBuf>, force_overwrite: bool) -> Result<Vec<PathBuf>> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(&input_file, output_dir.as_deref(), &multi_progress, force_overwrite)
            .await
    }

    async fn run_with_progress(
        &self,
        input_file: &Path,
        output_dir: Option<&Path>,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<Vec<PathBuf>> {
        let start_time = Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        if FileManager::detect_file_type(input_file)? == FileType::Unknown {
            return Err(anyhow!("Unsupported input file: {:?}", input_file));
        }
        if let Some(dir) = output_dir {
            FileManager::ensure_dir(dir)?;
        }

        let outputs = self.output_paths(input_file, output_dir);
        if !force_overwrite && outputs.iter().all(|path| path.exists()) {
            warn!("Skipping {}, output already exists (use -f to force overwrite)", input_file.display());
            return Ok(Vec::new());
        }

        let units = CueSequence::load(input_file)?;
        info!("Loaded {} units from {}", units.len(), input_file.display());

        let segmentor = Segmentor::new(&self.config.segmentation);
        let mut cues = segmentor.segment(units);
        info!("Segmented into {} cues", cues.len());

        let mut translation_elapsed = Duration::ZERO;
        if self.config.translation.need_translate && !cues.is_empty() {
            let translation_start = Instant::now();
            let outcome = self.translate_with_progress(&mut cues, multi_progress).await?;
            translation_elapsed = translation_start.elapsed();

            if !outcome.degraded.is_empty() {
                let log_dir = output_dir.or_else(|| input_file.parent()).unwrap_or_else(|| Path::new("."));
                if let Err(e) = self.write_issues_log(&log_dir.join(ISSUES_LOG_NAME), input_file, &cues, &outcome) {
                    warn!("Failed to write issues log: {}", e);
                }
            }
        }

        let written = self.save_cues(&cues, &pending_outputs(outputs, force_overwrite))?;

        info!(
            "Done in {} (translation: {})",
            Self::format_duration(start_time.elapsed()),
            Self::format_duration(translation_elapsed)
        );
        Ok(written)
    }

    async fn translate_with_progress(&self, cues: &mut CueSequence, multi_progress: &MultiProgress) -> Result<TranslationOutcome> {
        let service = self.build_service()?;
        service.test_connection().await?;

        let progress_bar = multi_progress.add(ProgressBar::new(0));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");

        info!(
            "{} - {} ({})",
            self.config.translation.provider.display_name(),
            self.config.translation.get_model(),
            self.config.translation.mode.display_name()
        );

        let pb = progress_bar.clone();
        let progress: ProgressCallback = Arc::new(move |done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        });

        let outcome = service
            .translate_cues(cues, Some(progress), Some(self.cancel_flag()))
            .await;

        // only the folder bar stays visible between files
        progress_bar.finish_and_clear();
        outcome
    }

    /// Save `cues` to each path; the format comes from the extension
    fn save_cues(&self, cues: &CueSequence, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let layout = self.layout();
        let mut written = Vec::with_capacity(paths.len());
        for path in paths {
            cues.save(path, layout, &self.config.output.ass_style)?;
            info!("Success: {}", path.display());
            written.push(path.clone());
        }
        Ok(written)
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Process every `.srt`/`.json` input under `input_dir`, skipping this tool's own outputs
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let tag = self.output_tag();
        let inputs: Vec<PathBuf> = FileManager::find_input_files(&input_dir)?
            .into_iter()
            .filter(|path| !FileManager::is_generated_output(path, tag))
            .filter(|path| Self::is_cue_input(path))
            .collect();

        if inputs.is_empty() {
            return Err(anyhow!("No .srt or .json files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(inputs.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        let mut success_count = 0;
        let mut error_count = 0;
        let mut skip_count = 0;

        for input in &inputs {
            let file_name = input
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self.run_with_progress(input, None, &multi_progress, force_overwrite).await {
                Ok(written) if written.is_empty() => skip_count += 1,
                Ok(_) => success_count += 1,
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    error_count += 1;
                }
            }
            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed in {}: {} processed, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            success_count,
            skip_count,
            error_count
        );
        Ok(())
    }

    /// Whether a folder entry holds cues; JSON files such as configs are
    /// skipped unless they parse as units or a cue export
    fn is_cue_input(path: &Path) -> bool {
        if FileManager::detect_file_type(path).ok() != Some(FileType::Transcript) {
            return true;
        }

        match FileManager::read_to_string(path) {
            Ok(content) => match CueSequence::from_json_str(&content) {
                Ok(_) => true,
                Err(e) => {
                    debug!("Skipping {:?}, not a transcript: {}", path, e);
                    false
                }
            },
            Err(_) => true,
        }
    }

    /// Append the cues that kept their original text to `log_path`
    fn write_issues_log(&self, log_path: &Path, input_file: &Path, cues: &CueSequence, outcome: &TranslationOutcome) -> Result<()> {
        let mut log_content = if log_path.exists() {
            FileManager::read_to_string(log_path)?
        } else {
            String::new()
        };

        log_content.push_str(&format!(
            "Translation Log - {}\nContext: {} - {} ({}), {}\n\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.config.translation.provider.display_name(),
            self.config.translation.get_model(),
            self.config.translation.mode.display_name(),
            input_file.display()
        ));
        for index in &outcome.degraded {
            let original = cues
                .segments()
                .get(index.saturating_sub(1))
                .map(|segment| segment.split_text().0)
                .unwrap_or_default();
            log_content.push_str(&format!("[WARN] cue {} kept original text: {}\n", index, original));
        }
        log_content.push('\n');

        FileManager::write_to_file(log_path, &log_content)?;
        info!("Logs written to {}", log_path.display());
        Ok(())
    }
}

// with force, every path is rewritten; otherwise only the missing ones
fn pending_outputs(paths: Vec<PathBuf>, force_overwrite: bool) -> Vec<PathBuf> {
    if force_overwrite {
        paths
    } else {
        paths.into_iter().filter(|path| !path.exists()).collect()
    }
}
