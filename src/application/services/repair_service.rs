//! Batch repair of harvested record files.
//!
//! Re-resolves the URL lists of every record in a directory of newline-delimited
//! record files and writes the corrected records to a parallel output directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::StreamExt;
use regex::Regex;
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

use super::resolver_service::RedirectResolver;
use crate::domain::entities::{ExtractedRecord, FieldSet};
use crate::error::{PipelineError, ResolveError};
use crate::infrastructure::network::{ConnectivityProbe, HttpFetcher};
use crate::utils::url_normalizer::extract_domain;

/// Default naming convention for record files.
pub const DEFAULT_FILE_PATTERN: &str = r"^\w+\.json$";

/// Tunables for a repair pass.
#[derive(Debug, Clone)]
pub struct RepairOptions {
    /// Input files whose name does not match are ignored.
    pub file_pattern: Regex,
    /// Records of one file resolved at the same time.
    pub concurrency: usize,
    /// Also repair `userFields.urls` / `userFields.domains`.
    pub repair_user_urls: bool,
}

impl RepairOptions {
    /// # Errors
    ///
    /// Returns [`PipelineError::Pattern`] if `file_pattern` is not a valid regex.
    pub fn new(
        file_pattern: &str,
        concurrency: usize,
        repair_user_urls: bool,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            file_pattern: Regex::new(file_pattern)?,
            concurrency: concurrency.max(1),
            repair_user_urls,
        })
    }
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            file_pattern: Regex::new(DEFAULT_FILE_PATTERN).expect("default file pattern is valid"),
            concurrency: 4,
            repair_user_urls: false,
        }
    }
}

/// Counters for one [`RepairService::process`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairSummary {
    pub files_processed: usize,
    /// Files already present in the output directory.
    pub files_skipped: usize,
    /// Records whose URL lists were re-resolved.
    pub records_fixed: usize,
    /// Records without URLs, written back unchanged.
    pub records_passed_through: usize,
    /// Undecodable records, dropped.
    pub records_malformed: usize,
}

impl RepairSummary {
    fn absorb(&mut self, file: &RepairSummary) {
        self.records_fixed += file.records_fixed;
        self.records_passed_through += file.records_passed_through;
        self.records_malformed += file.records_malformed;
    }
}

enum LineOutcome {
    Fixed(String),
    PassedThrough(String),
    Malformed,
}

/// Directory-level repair pipeline.
///
/// # Resumability
///
/// A file counts as repaired once a file of the same name exists in the output
/// directory. Output is written under a hidden `.<name>.partial` name and renamed
/// into place only when the whole input file is done, so an interrupted run
/// leaves no marker and the file is redone from scratch on the next pass.
///
/// # Failure policy
///
/// - Malformed records are logged and dropped; the file continues.
/// - [`ResolveError`] (lost connectivity, unreachable cache) aborts the whole
///   pass immediately.
pub struct RepairService<F: HttpFetcher, P: ConnectivityProbe> {
    resolver: Arc<RedirectResolver<F, P>>,
    options: RepairOptions,
}

impl<F: HttpFetcher, P: ConnectivityProbe> RepairService<F, P> {
    pub fn new(resolver: Arc<RedirectResolver<F, P>>, options: RepairOptions) -> Self {
        Self { resolver, options }
    }

    /// Repairs every pending record file of `input_dir` into `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] on filesystem failures and
    /// [`PipelineError::Resolve`] when resolution hits a fatal condition.
    pub async fn process(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<RepairSummary, PipelineError> {
        fs::create_dir_all(output_dir)
            .await
            .map_err(|e| PipelineError::io(output_dir, e))?;

        let done = list_file_names(output_dir).await?;
        let mut candidates: Vec<String> = list_file_names(input_dir)
            .await?
            .into_iter()
            .filter(|name| self.options.file_pattern.is_match(name))
            .collect();
        candidates.sort();

        let (skipped, pending): (Vec<String>, Vec<String>) =
            candidates.into_iter().partition(|name| done.contains(name));

        let mut summary = RepairSummary {
            files_skipped: skipped.len(),
            ..RepairSummary::default()
        };
        for name in &skipped {
            debug!("Skipping {}, already repaired", name);
        }

        let total = pending.len();
        for (idx, name) in pending.iter().enumerate() {
            info!("Repairing {} ({} of {})", name, idx + 1, total);

            let file_summary = self.repair_file(input_dir, output_dir, name).await?;
            info!(
                "Repaired {}: {} fixed, {} unchanged, {} malformed",
                name,
                file_summary.records_fixed,
                file_summary.records_passed_through,
                file_summary.records_malformed
            );

            summary.absorb(&file_summary);
            summary.files_processed += 1;
        }

        Ok(summary)
    }

    async fn repair_file(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        name: &str,
    ) -> Result<RepairSummary, PipelineError> {
        let input_path = input_dir.join(name);
        let partial_path = output_dir.join(format!(".{}.partial", name));
        let final_path = output_dir.join(name);

        let content = fs::read(&input_path)
            .await
            .map_err(|e| PipelineError::io(&input_path, e))?;

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&partial_path)
            .await
            .map_err(|e| PipelineError::io(&partial_path, e))?;
        let mut writer = BufWriter::new(file);

        let mut summary = RepairSummary::default();
        let lines = content
            .split(|b| *b == b'\n')
            .enumerate()
            .filter(|(_, line)| !line.trim_ascii().is_empty());

        let mut outcomes = futures::stream::iter(lines)
            .map(|(idx, raw)| self.repair_line(name, idx + 1, raw))
            .buffered(self.options.concurrency);

        while let Some(outcome) = outcomes.next().await {
            let line = match outcome? {
                LineOutcome::Fixed(line) => {
                    summary.records_fixed += 1;
                    line
                }
                LineOutcome::PassedThrough(line) => {
                    summary.records_passed_through += 1;
                    line
                }
                LineOutcome::Malformed => {
                    summary.records_malformed += 1;
                    continue;
                }
            };

            write_line(&mut writer, &line)
                .await
                .map_err(|e| PipelineError::io(&partial_path, e))?;
        }

        writer
            .flush()
            .await
            .map_err(|e| PipelineError::io(&partial_path, e))?;
        drop(writer);

        fs::rename(&partial_path, &final_path)
            .await
            .map_err(|e| PipelineError::io(&final_path, e))?;

        Ok(summary)
    }

    fn field_sets(&self) -> &'static [FieldSet] {
        if self.options.repair_user_urls {
            &[FieldSet::Tweet, FieldSet::User]
        } else {
            &[FieldSet::Tweet]
        }
    }

    async fn repair_line(
        &self,
        file: &str,
        line_no: usize,
        raw: &[u8],
    ) -> Result<LineOutcome, ResolveError> {
        let line = match std::str::from_utf8(raw) {
            Ok(line) => line,
            Err(e) => {
                warn!("Skipping line {} of {}: not valid UTF-8 ({})", line_no, file, e);
                return Ok(LineOutcome::Malformed);
            }
        };

        let mut record = match ExtractedRecord::parse(line) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping line {} of {}: {}", line_no, file, e);
                return Ok(LineOutcome::Malformed);
            }
        };

        let mut changed = false;
        for &set in self.field_sets() {
            let raw_urls = match record.raw_urls(set) {
                Ok(Some(raw_urls)) => raw_urls,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Skipping line {} of {}: {}", line_no, file, e);
                    return Ok(LineOutcome::Malformed);
                }
            };

            let (urls, domains) = self.resolve_all(&raw_urls).await?;
            record.replace_urls(set, urls, domains);
            changed = true;
        }

        if !changed {
            return Ok(LineOutcome::PassedThrough(line.trim_end().to_string()));
        }

        match record.to_line() {
            Ok(fixed) => {
                info!("Fixed record {} (line {} of {})", record.id(), line_no, file);
                Ok(LineOutcome::Fixed(fixed))
            }
            Err(e) => {
                warn!("Could not re-encode line {} of {}: {}", line_no, file, e);
                Ok(LineOutcome::Malformed)
            }
        }
    }

    async fn resolve_all(
        &self,
        raw_urls: &[String],
    ) -> Result<(Vec<String>, Vec<Option<String>>), ResolveError> {
        let mut urls = Vec::with_capacity(raw_urls.len());
        let mut domains = Vec::with_capacity(raw_urls.len());

        for raw_url in raw_urls {
            let resolved = self.resolver.resolve(raw_url).await?;
            domains.push(extract_domain(&resolved));
            urls.push(resolved);
        }

        Ok((urls, domains))
    }
}

async fn write_line<W: AsyncWriteExt + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await
}

/// Names of the regular files directly inside `dir`.
async fn list_file_names(dir: &Path) -> Result<HashSet<String>, PipelineError> {
    let io_err = |e| PipelineError::io(PathBuf::from(dir), e);

    let mut entries = fs::read_dir(dir).await.map_err(io_err)?;
    let mut names = HashSet::new();

    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        if !entry.file_type().await.map_err(io_err)?.is_file() {
            continue;
        }
        if let Ok(name) = entry.file_name().into_string() {
            names.insert(name);
        }
    }

    Ok(names)
}
