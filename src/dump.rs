//! The dump run: list candidates, read, parse, and append symbol lines.
//!
//! The report is written to `<output>.tmp` and renamed over `<output>` only
//! after every candidate has been handled, so a failed run never leaves a
//! partial report behind and a successful run always replaces the old one.

use memmap2::Mmap;
use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::classfile::parse_class;
use crate::cli::ReportFormat;
use crate::error::DumpError;
use crate::filter::PathFilter;
use crate::scan::{ArchiveSource, ClassSource, DirectorySource, RootKind, detect_root};
use crate::symbol::{SymbolLine, symbol_lines, write_lines};

const BATCH_SIZE: usize = 64;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The first unreadable or malformed file aborts the run.
    #[default]
    FailFast,
    /// Failing files are logged, listed in the summary and left out of the report.
    SkipAndContinue,
}

#[derive(Debug, Clone)]
pub struct DumpConfig {
    pub root: PathBuf,
    pub output: PathBuf,
    pub filter: PathFilter,
    pub format: ReportFormat,
    pub policy: FailurePolicy,
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedEntry {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DumpSummary {
    pub root: String,
    pub output: String,
    pub format: ReportFormat,
    pub policy: FailurePolicy,
    pub candidates: usize,
    pub classes: usize,
    pub methods: usize,
    pub fields: usize,
    pub failed: Vec<FailedEntry>,
    pub report_sha256: String,
    pub duration_ms: u64,
}

pub fn dump_tree(config: &DumpConfig) -> Result<DumpSummary, DumpError> {
    let start = Instant::now();
    info!(
        root = %config.root.display(),
        output = %config.output.display(),
        prefixes = ?config.filter.prefixes(),
        "dumping class and member names"
    );

    let mut summary = match detect_root(&config.root)? {
        RootKind::Directory => {
            let mut source = DirectorySource::new(&config.root);
            dump_source(&mut source, config)?
        }
        RootKind::Archive => {
            let file = File::open(&config.root)
                .map_err(|e| DumpError::read(config.root.display().to_string(), e))?;
            // SAFETY: The file is opened read-only and outlives the map, which is
            // dropped at the end of this arm.
            let mmap = unsafe { Mmap::map(&file) }
                .map_err(|e| DumpError::read(config.root.display().to_string(), e))?;
            let mut source = ArchiveSource::new(&config.root, &mmap[..])?;
            dump_source(&mut source, config)?
        }
    };

    summary.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        output = %config.output.display(),
        classes = summary.classes,
        failed = summary.failed.len(),
        "finished; dumped class and member names"
    );
    Ok(summary)
}

/// Runs the dump against an already opened source.
pub fn dump_source<S: ClassSource>(
    source: &mut S,
    config: &DumpConfig,
) -> Result<DumpSummary, DumpError> {
    let candidates = source.list(&config.filter)?;
    debug!(candidates = candidates.len(), "listed candidate class files");

    let output = &config.output;
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| DumpError::write(parent, e))?;
    }

    let tmp = tmp_path(output);
    let file = File::create(&tmp).map_err(|e| DumpError::write(&tmp, e))?;
    let mut writer = DigestWriter::new(BufWriter::new(file));

    let result = write_entries(source, &candidates, config, &mut writer).and_then(|tally| {
        let digest = writer.finish().map_err(|e| DumpError::write(&tmp, e))?;
        Ok((tally, digest))
    });
    let (tally, digest) = match result {
        Ok(done) => done,
        Err(err) => {
            let _ = std::fs::remove_file(&tmp);
            return Err(err);
        }
    };

    publish(&tmp, output)?;

    Ok(DumpSummary {
        root: config.root.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        format: config.format,
        policy: config.policy,
        candidates: candidates.len(),
        classes: tally.classes,
        methods: tally.methods,
        fields: tally.fields,
        failed: tally.failed,
        report_sha256: digest,
        duration_ms: 0,
    })
}

/// Parses a single class file into its symbol lines.
pub fn inspect_file(path: &Path) -> Result<Vec<SymbolLine>, DumpError> {
    let display = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|e| DumpError::read(display.as_str(), e))?;
    parse_entry(&display, &bytes)
}

fn parse_entry(relative: &str, bytes: &[u8]) -> Result<Vec<SymbolLine>, DumpError> {
    let class = parse_class(bytes).map_err(|source| DumpError::Parse {
        path: relative.to_string(),
        source,
    })?;
    Ok(symbol_lines(&class))
}

fn write_entries<S: ClassSource, W: Write>(
    source: &mut S,
    candidates: &[String],
    config: &DumpConfig,
    out: &mut W,
) -> Result<Tally, DumpError> {
    let mut tally = Tally::default();

    for chunk in candidates.chunks(BATCH_SIZE) {
        let mut pending = Vec::with_capacity(chunk.len());
        for relative in chunk {
            let read = source.read(relative);
            let stop = read.is_err() && config.policy == FailurePolicy::FailFast;
            pending.push((relative.as_str(), read));
            if stop {
                break;
            }
        }

        let parsed: Vec<_> = if config.parallel {
            pending.into_par_iter().map(parse_pending).collect()
        } else {
            pending.into_iter().map(parse_pending).collect()
        };

        for (relative, result) in parsed {
            match result {
                Ok(lines) => {
                    write_lines(out, &lines, config.format)
                        .map_err(|e| DumpError::write(&config.output, e))?;
                    debug!(path = relative, lines = lines.len(), "dumped class");
                    tally.record(&lines);
                }
                Err(err) => tally.fail(err, config.policy)?,
            }
        }
    }

    Ok(tally)
}

type Pending<'a> = (&'a str, Result<Vec<u8>, DumpError>);

fn parse_pending((relative, read): Pending<'_>) -> (&str, Result<Vec<SymbolLine>, DumpError>) {
    (relative, read.and_then(|bytes| parse_entry(relative, &bytes)))
}

#[derive(Debug, Default)]
struct Tally {
    classes: usize,
    methods: usize,
    fields: usize,
    failed: Vec<FailedEntry>,
}

impl Tally {
    fn record(&mut self, lines: &[SymbolLine]) {
        for line in lines {
            match line {
                SymbolLine::Class { .. } => self.classes += 1,
                SymbolLine::Method { .. } => self.methods += 1,
                SymbolLine::Field { .. } => self.fields += 1,
            }
        }
    }

    fn fail(&mut self, err: DumpError, policy: FailurePolicy) -> Result<(), DumpError> {
        match policy {
            FailurePolicy::FailFast => Err(err),
            FailurePolicy::SkipAndContinue => {
                warn!(path = %err.path(), error = %err, "skipping class file");
                self.failed.push(FailedEntry {
                    path: err.path(),
                    error: err.to_string(),
                });
                Ok(())
            }
        }
    }
}

/// Hashes everything that passes through, so the summary can carry the
/// report digest without reading the file back.
struct DigestWriter<W: Write> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> DigestWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    fn finish(mut self) -> std::io::Result<String> {
        self.inner.flush()?;
        Ok(hex::encode(self.hasher.finalize()))
    }
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

fn tmp_path(output: &Path) -> PathBuf {
    let mut os = output.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

/// Moves the finished report into place. `rename` replaces an existing file
/// atomically on Unix; Windows refuses to rename over one, so it is removed first.
fn publish(tmp: &Path, output: &Path) -> Result<(), DumpError> {
    if cfg!(windows)
        && let Err(e) = std::fs::remove_file(output)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        return Err(DumpError::write(output, e));
    }
    std::fs::rename(tmp, output).map_err(|e| DumpError::write(output, e))
}
