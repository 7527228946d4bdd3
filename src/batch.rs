use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::{ConfigOverlay, Language, ScanConfig};
use crate::dispatch::{Action, Dispatch, Rewrite};
use crate::error::{ConfigError, DbgcError};
use crate::scanner::{scan_disabled, scan_lines, Classification, SourceLine};

/// Result of scanning one file.
#[derive(Debug, Clone)]
pub struct FileScan {
    pub path: PathBuf,
    pub language: Option<Language>,
    /// Every classification of active code, in file order.
    pub classifications: Vec<Classification>,
    /// Debug statements found inside line-commented code.
    pub disabled: Vec<Classification>,
}

impl FileScan {
    pub fn debug_statements(&self) -> impl Iterator<Item = &Classification> {
        self.classifications.iter().filter(|c| c.is_debug)
    }

    pub fn debug_count(&self) -> usize {
        self.debug_statements().count()
    }
}

/// A file that could not be scanned; its siblings are unaffected.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: DbgcError,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub scanned: Vec<FileScan>,
    pub failed: Vec<FileFailure>,
}

/// One statement an action can be applied to.
#[derive(Debug, Clone, Copy)]
pub struct Target<'r> {
    pub scan: &'r FileScan,
    pub classification: &'r Classification,
}

impl BatchReport {
    pub fn debug_count(&self) -> usize {
        self.scanned.iter().map(FileScan::debug_count).sum()
    }

    pub fn disabled_count(&self) -> usize {
        self.scanned.iter().map(|f| f.disabled.len()).sum()
    }

    /// Statements `action` applies to, file by file: active debug statements
    /// to comment out, disabled ones to uncomment, both to delete.
    pub fn targets(&self, action: Action) -> Vec<Target<'_>> {
        let active = matches!(action, Action::CommentOut | Action::Delete);
        let disabled = matches!(action, Action::Uncomment | Action::Delete);

        let mut targets = Vec::new();
        for scan in &self.scanned {
            if active {
                targets.extend(scan.debug_statements().map(|classification| Target { scan, classification }));
            }
            if disabled {
                targets.extend(scan.disabled.iter().map(|classification| Target { scan, classification }));
            }
        }
        targets
    }
}

/// Scans many files, each with an independent engine.
#[derive(Debug, Clone)]
pub struct Batch {
    configs: BTreeMap<Language, ScanConfig>,
    forced: Option<ScanConfig>,
    include_disabled: bool,
}

impl Batch {
    /// Per-language presets with `overlay` applied. An overlay that names a
    /// language forces that preset for every file.
    pub fn new(overlay: &ConfigOverlay) -> Result<Self, ConfigError> {
        if let Some(language) = overlay.language()? {
            return Self::forced(overlay.apply(language.config()));
        }

        let mut configs = BTreeMap::new();
        for language in Language::ALL {
            let config = overlay.apply(language.config());
            config.validate()?;
            configs.insert(language, config);
        }
        Ok(Self {
            configs,
            forced: None,
            include_disabled: false,
        })
    }

    /// One configuration for every file, whatever its extension.
    pub fn forced(config: ScanConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            configs: BTreeMap::new(),
            forced: Some(config),
            include_disabled: false,
        })
    }

    pub fn with_disabled(mut self, include: bool) -> Self {
        self.include_disabled = include;
        self
    }

    pub fn config_for(&self, path: &Path) -> Option<&ScanConfig> {
        match &self.forced {
            Some(config) => Some(config),
            None => Language::from_path(path).and_then(|lang| self.configs.get(&lang)),
        }
    }

    /// One rewrite per file for the chosen `targets`.
    pub fn plan(&self, targets: &[Target<'_>], action: Action) -> Vec<(PathBuf, Rewrite)> {
        let mut plans: BTreeMap<PathBuf, Rewrite> = BTreeMap::new();
        for target in targets {
            let path = &target.scan.path;
            let Some(config) = self.config_for(path) else {
                continue;
            };
            plans
                .entry(path.clone())
                .or_insert_with(|| Rewrite::new(action, &config.syntax.comment))
                .dispatch(target.classification);
        }
        plans.into_iter().filter(|(_, r)| !r.is_empty()).collect()
    }

    /// Files under `root` this batch knows how to scan, sorted.
    pub fn collect_files(&self, root: &Path) -> Vec<PathBuf> {
        if root.is_file() {
            return vec![root.to_path_buf()];
        }

        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| self.config_for(p).is_some())
            .collect();
        files.sort();
        files
    }

    pub fn scan_file(&self, path: &Path) -> Result<FileScan, DbgcError> {
        let config = self.config_for(path).ok_or_else(|| {
            DbgcError::Config(ConfigError::UnknownLanguage(path.display().to_string()))
        })?;

        let content = fs::read_to_string(path).map_err(|source| DbgcError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let lines = SourceLine::split(&content);

        let classifications = scan_lines(&lines, config).map_err(|source| DbgcError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        let disabled = if self.include_disabled {
            scan_disabled(&lines, config)
                .into_iter()
                .filter(|c| c.is_debug)
                .collect()
        } else {
            Vec::new()
        };

        Ok(FileScan {
            path: path.to_path_buf(),
            language: Language::from_path(path),
            classifications,
            disabled,
        })
    }

    /// Scan `paths` in parallel. Failures are collected per file.
    pub fn scan_files(&self, paths: &[PathBuf]) -> BatchReport {
        let results: Vec<(PathBuf, Result<FileScan, DbgcError>)> = paths
            .par_iter()
            .map(|path| (path.clone(), self.scan_file(path)))
            .collect();

        let mut report = BatchReport::default();
        for (path, result) in results {
            match result {
                Ok(scan) => {
                    debug!(
                        path = %path.display(),
                        statements = scan.classifications.len(),
                        debug = scan.debug_count(),
                        "scanned file"
                    );
                    report.scanned.push(scan);
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "file failed");
                    report.failed.push(FileFailure { path, error });
                }
            }
        }
        report
    }

    pub fn scan_path(&self, root: &Path) -> BatchReport {
        let files = self.collect_files(root);
        debug!(root = %root.display(), files = files.len(), "collected files");
        self.scan_files(&files)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}
