//! Resolves user-supplied paths into [`Document`]s.
//!
//! Missing paths and files without a recognized extension are skipped
//! silently. Directories are walked recursively, honoring the configured
//! exclude globs. A recognized file that can't be read fails the load.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::LoaderConfig;
use crate::error::ChatError;
use crate::models::Document;

const DEFAULT_EXCLUDES: [&str; 3] = ["**/.git/**", "**/target/**", "**/node_modules/**"];

pub fn load_documents<P: AsRef<Path>>(
    paths: &[P],
    config: &LoaderConfig,
) -> Result<Vec<Document>, ChatError> {
    let excludes = build_excludes(&config.exclude_globs);
    let mut docs = Vec::new();

    for path in paths {
        let path = path.as_ref();
        if path.is_file() {
            if has_recognized_extension(path, &config.extensions) {
                docs.push(read_document(path)?);
            } else {
                debug!(path = %path.display(), "skipping file with unrecognized extension");
            }
        } else if path.is_dir() {
            for file in walk_dir(path, config, &excludes) {
                docs.push(read_document(&file)?);
            }
        } else {
            debug!(path = %path.display(), "skipping missing path");
        }
    }

    Ok(docs)
}

fn walk_dir(root: &Path, config: &LoaderConfig, excludes: &GlobSet) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(config.follow_symlinks)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            let relative = path.strip_prefix(root).unwrap_or(path);
            !excludes.is_match(relative)
        })
        .filter(|path| has_recognized_extension(path, &config.extensions))
        .collect();

    // Sort for deterministic ordering
    files.sort();
    files
}

fn read_document(path: &Path) -> Result<Document, ChatError> {
    info!(path = %path.display(), "loading file");
    let body = std::fs::read_to_string(path).map_err(|source| ChatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Document {
        source: path.to_path_buf(),
        body,
    })
}

fn has_recognized_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

fn build_excludes(extra: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    let patterns = DEFAULT_EXCLUDES
        .iter()
        .map(|p| p.to_string())
        .chain(extra.iter().cloned());
    for pattern in patterns {
        match Glob::new(&pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => debug!(pattern = %pattern, error = %e, "ignoring invalid exclude glob"),
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}
