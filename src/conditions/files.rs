// src/conditions/files.rs

//! Filesystem-backed conditions.
//!
//! Paths that may legitimately appear later (a file being waited for) are
//! never an error: the probe just reports `false`. A directory that must
//! exist up front is validated on the first pull and reported as
//! [`WatchpointError::TargetMissing`], or [`WatchpointError::NotADirectory`]
//! when something else sits at that path.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use tracing::debug;

use crate::cancel::CancelToken;
use crate::condition::{Condition, Evaluation};
use crate::errors::WatchpointError;
use crate::fs::{self, FileSystem};

use super::hash::hash_if_file;
use super::{DEFAULT_POLL_INTERVAL, PollingStream, Probe};

// ---------------------------------------------------------------------------
// FileExists

/// Holds while `path` exists.
#[derive(Debug, Clone)]
pub struct FileExists {
    path: PathBuf,
    interval: Duration,
    fs: Arc<dyn FileSystem>,
}

#[derive(Debug)]
pub struct ExistsProbe {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl Probe for ExistsProbe {
    fn check(&mut self) -> Result<bool> {
        Ok(self.fs.exists(&self.path))
    }
}

impl FileExists {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            interval: DEFAULT_POLL_INTERVAL,
            fs: fs::real(),
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stream(&self, cancel: &CancelToken) -> PollingStream<ExistsProbe> {
        let probe = ExistsProbe {
            path: self.path.clone(),
            fs: Arc::clone(&self.fs),
        };
        PollingStream::new(probe, cancel.clone(), self.interval)
    }
}

impl Condition for FileExists {
    fn evaluate(&mut self, cancel: &CancelToken) -> Result<Evaluation> {
        Ok(Evaluation::Stream(Box::new(self.stream(cancel))))
    }
}

// ---------------------------------------------------------------------------
// NewFileInDirectory

/// Holds when entries show up in `dir` that were not there on the previous
/// check. The first check compares against the listing taken when the
/// stream is first pulled.
#[derive(Debug, Clone)]
pub struct NewFileInDirectory {
    dir: PathBuf,
    interval: Duration,
    filter: Option<GlobMatcher>,
    fs: Arc<dyn FileSystem>,
}

#[derive(Debug)]
pub struct NewEntriesProbe {
    dir: PathBuf,
    filter: Option<GlobMatcher>,
    fs: Arc<dyn FileSystem>,
    known: HashSet<PathBuf>,
}

impl NewEntriesProbe {
    fn listing(&self) -> Result<HashSet<PathBuf>> {
        let entries = self.fs.read_dir(&self.dir)?;
        Ok(entries
            .into_iter()
            .filter(|path| self.accepts(path))
            .collect())
    }

    fn accepts(&self, path: &Path) -> bool {
        match (&self.filter, path.file_name()) {
            (None, _) => true,
            (Some(matcher), Some(name)) => matcher.is_match(name),
            (Some(_), None) => false,
        }
    }
}

impl Probe for NewEntriesProbe {
    fn prepare(&mut self) -> Result<()> {
        if !self.fs.exists(&self.dir) {
            return Err(WatchpointError::TargetMissing(self.dir.clone()).into());
        }
        if !self.fs.is_dir(&self.dir) {
            return Err(WatchpointError::NotADirectory(self.dir.clone()).into());
        }
        self.known = self.listing()?;
        debug!(dir = ?self.dir, entries = self.known.len(), "directory baseline taken");
        Ok(())
    }

    fn check(&mut self) -> Result<bool> {
        let current = self.listing()?;
        let fresh: Vec<&PathBuf> = current.difference(&self.known).collect();
        if !fresh.is_empty() {
            debug!(dir = ?self.dir, new = ?fresh, "new directory entries");
        }
        let found = !fresh.is_empty();
        self.known = current;
        Ok(found)
    }
}

impl NewFileInDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            interval: DEFAULT_POLL_INTERVAL,
            filter: None,
            fs: fs::real(),
        }
    }

    /// Only count entries whose file name matches the glob `pattern`.
    pub fn matching(mut self, pattern: &str) -> Result<Self> {
        let glob = Glob::new(pattern)
            .with_context(|| format!("invalid file pattern '{}'", pattern))?;
        self.filter = Some(glob.compile_matcher());
        Ok(self)
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn stream(&self, cancel: &CancelToken) -> PollingStream<NewEntriesProbe> {
        let probe = NewEntriesProbe {
            dir: self.dir.clone(),
            filter: self.filter.clone(),
            fs: Arc::clone(&self.fs),
            known: HashSet::new(),
        };
        PollingStream::new(probe, cancel.clone(), self.interval)
    }
}

impl Condition for NewFileInDirectory {
    fn evaluate(&mut self, cancel: &CancelToken) -> Result<Evaluation> {
        Ok(Evaluation::Stream(Box::new(self.stream(cancel))))
    }
}

// ---------------------------------------------------------------------------
// FileNotModifiedFor

/// Holds when `path` is a file whose modification time is at least
/// `duration` in the past. A missing file does not hold.
#[derive(Debug, Clone)]
pub struct FileNotModifiedFor {
    path: PathBuf,
    duration: Duration,
    interval: Duration,
    fs: Arc<dyn FileSystem>,
}

#[derive(Debug)]
pub struct InactivityProbe {
    path: PathBuf,
    duration: Duration,
    fs: Arc<dyn FileSystem>,
}

impl Probe for InactivityProbe {
    fn check(&mut self) -> Result<bool> {
        // Only regular files go idle; a directory's mtime tracks its entries.
        if !self.fs.is_file(&self.path) {
            return Ok(false);
        }
        let modified = match self.fs.modified(&self.path) {
            Ok(modified) => modified,
            Err(_) if !self.fs.exists(&self.path) => return Ok(false),
            Err(err) => return Err(err),
        };
        // An mtime in the future counts as just modified.
        let idle = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        Ok(idle >= self.duration)
    }
}

impl FileNotModifiedFor {
    pub fn new(path: impl Into<PathBuf>, duration: Duration) -> Self {
        Self {
            path: path.into(),
            duration,
            interval: DEFAULT_POLL_INTERVAL,
            fs: fs::real(),
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn stream(&self, cancel: &CancelToken) -> PollingStream<InactivityProbe> {
        let probe = InactivityProbe {
            path: self.path.clone(),
            duration: self.duration,
            fs: Arc::clone(&self.fs),
        };
        PollingStream::new(probe, cancel.clone(), self.interval)
    }
}

impl Condition for FileNotModifiedFor {
    fn evaluate(&mut self, cancel: &CancelToken) -> Result<Evaluation> {
        Ok(Evaluation::Stream(Box::new(self.stream(cancel))))
    }
}

// ---------------------------------------------------------------------------
// FileContentChanged

/// Holds when the content hash of `path` differs from the one seen on the
/// previous check. The file appearing or disappearing counts as a change.
#[derive(Debug, Clone)]
pub struct FileContentChanged {
    path: PathBuf,
    interval: Duration,
    fs: Arc<dyn FileSystem>,
}

#[derive(Debug)]
pub struct ContentProbe {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    last: Option<String>,
}

impl Probe for ContentProbe {
    fn prepare(&mut self) -> Result<()> {
        self.last = hash_if_file(self.fs.as_ref(), &self.path)?;
        Ok(())
    }

    fn check(&mut self) -> Result<bool> {
        let current = hash_if_file(self.fs.as_ref(), &self.path)?;
        let changed = current != self.last;
        if changed {
            debug!(path = ?self.path, hash = ?current, "content changed");
        }
        self.last = current;
        Ok(changed)
    }
}

impl FileContentChanged {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            interval: DEFAULT_POLL_INTERVAL,
            fs: fs::real(),
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn stream(&self, cancel: &CancelToken) -> PollingStream<ContentProbe> {
        let probe = ContentProbe {
            path: self.path.clone(),
            fs: Arc::clone(&self.fs),
            last: None,
        };
        PollingStream::new(probe, cancel.clone(), self.interval)
    }
}

impl Condition for FileContentChanged {
    fn evaluate(&mut self, cancel: &CancelToken) -> Result<Evaluation> {
        Ok(Evaluation::Stream(Box::new(self.stream(cancel))))
    }
}
