//! HTML target discovery.
//!
//! Scans the project tree once for `.html` entry points and maps keywords
//! (`default`, `project`, `build`, `app`, and literal file names) to files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into.
pub const EXCLUDED_DIRS: &[&str] = &[".git", "node_modules", "venv", "__pycache__", ".venv"];

/// File names preferred for the `default` target, highest priority first.
const DEFAULT_PRIORITY: &[&str] = &["index.html", "main.html", "gold_webpage.html"];

/// Keywords that always resolve to the `default` target.
pub const ALIASES: &[&str] = &["project", "build", "app"];

pub const DEFAULT_KEYWORD: &str = "default";

/// Keyword → file mapping for one project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMap {
    root: PathBuf,
    files: Vec<PathBuf>,
    entries: BTreeMap<String, PathBuf>,
}

impl TargetMap {
    /// Build the mapping from discovered files. `None` when `files` is empty.
    pub fn from_files(root: &Path, mut files: Vec<PathBuf>) -> Option<Self> {
        if files.is_empty() {
            return None;
        }
        files.sort();

        let default = DEFAULT_PRIORITY
            .iter()
            .find_map(|name| {
                files
                    .iter()
                    .find(|f| f.file_name().is_some_and(|n| n == *name))
            })
            .unwrap_or(&files[0])
            .clone();

        let mut entries = BTreeMap::new();
        for file in &files {
            if let Some(name) = file.file_name().and_then(|n| n.to_str()) {
                entries
                    .entry(name.to_string())
                    .or_insert_with(|| file.clone());
            }
        }
        for alias in ALIASES {
            entries.insert((*alias).to_string(), default.clone());
        }
        entries.insert(DEFAULT_KEYWORD.to_string(), default);

        Some(Self {
            root: root.to_path_buf(),
            files,
            entries,
        })
    }

    /// Look up a keyword, falling back to `default` for unknown keywords.
    pub fn get(&self, keyword: &str) -> &Path {
        self.entries
            .get(keyword)
            .map(PathBuf::as_path)
            .unwrap_or_else(|| self.default_target())
    }

    pub fn default_target(&self) -> &Path {
        // Always inserted by `from_files`.
        &self.entries[DEFAULT_KEYWORD]
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every discovered file, sorted.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn keywords(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    /// Path of `file` relative to the root, forward-slash separated.
    pub fn url_path(&self, file: &Path) -> String {
        let rel = file.strip_prefix(&self.root).unwrap_or(file);
        rel.to_string_lossy().replace('\\', "/")
    }
}

/// Caching resolver for one project root.
///
/// A non-empty mapping is kept for the process lifetime; file-system
/// changes after that are not observed. An empty scan is not cached.
pub struct TargetResolver {
    root: PathBuf,
    cache: Mutex<Option<Arc<TargetMap>>>,
}

impl TargetResolver {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            cache: Mutex::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The cached mapping, if a scan has succeeded. Never scans.
    pub fn cached(&self) -> Option<Arc<TargetMap>> {
        match self.cache.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The cached mapping, scanning on first use.
    pub fn resolve(&self) -> Option<Arc<TargetMap>> {
        let mut cache = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(map) = cache.as_ref() {
            return Some(Arc::clone(map));
        }

        info!("scanning {} for HTML files", self.root.display());
        let files = scan_html_files(&self.root);
        let Some(map) = TargetMap::from_files(&self.root, files) else {
            warn!("no HTML files found in {}", self.root.display());
            return None;
        };
        info!(
            "found {} HTML files, default target {}",
            map.files().len(),
            map.default_target().display()
        );
        let map = Arc::new(map);
        *cache = Some(Arc::clone(&map));
        Some(map)
    }
}

fn is_excluded(entry: &DirEntry, root: &Path) -> bool {
    entry
        .path()
        .strip_prefix(root)
        .unwrap_or(entry.path())
        .components()
        .any(|c| {
            c.as_os_str()
                .to_str()
                .is_some_and(|name| EXCLUDED_DIRS.contains(&name))
        })
}

/// Recursively list `*.html` files under `root`, skipping excluded directories.
pub fn scan_html_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_excluded(e, root))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "html")
        {
            files.push(entry.into_path());
        }
    }
    files
}
