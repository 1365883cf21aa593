//! Grammar source provider: literal paths or glob patterns, read in order and
//! joined into the single text blob the generator consumes.
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::LoadError;

pub fn load_all<I>(patterns: I) -> Result<String, LoadError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut text = String::new();
    for path in resolve_file_path_patterns(patterns)? {
        text.push_str(&load(&path)?);
        text.push('\n');
    }
    Ok(text)
}

pub fn load(path: &Path) -> Result<String, LoadError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            info!(path = %path.display(), bytes = content.len(), "loaded grammar source");
            Ok(content)
        }
        Err(error) => {
            debug!(?error);
            match error.kind() {
                std::io::ErrorKind::NotFound => Err(LoadError::NotFound { path: path.to_path_buf() }),
                _ => Err(LoadError::Unreadable {
                    path: path.to_path_buf(),
                    reason: error.to_string(),
                }),
            }
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, LoadError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let entries = glob::glob(pattern).map_err(|e| LoadError::BadPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
            let mut matched_any = false;
            for entry in entries {
                match entry {
                    Ok(p) => {
                        matched_any = true;
                        out.push(p);
                    }
                    Err(e) => {
                        return Err(LoadError::Unreadable {
                            path: e.path().to_path_buf(),
                            reason: e.error().to_string(),
                        });
                    }
                }
            }
            if !matched_any {
                return Err(LoadError::NoMatch { pattern: pattern.to_string() });
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
