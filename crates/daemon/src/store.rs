// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rooted filesystem access for the served directory tree.
//!
//! Every client-supplied path is normalized into a root-relative key before
//! it touches the disk, so requests can never reach outside the root the
//! daemon was started with.

use std::fs::{self, FileTimes, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::ServiceError;

/// Outcome of a mutation, fed into update callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub content: Vec<u8>,
    pub mtime_ms: i64,
}

/// All file access, confined to one root directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalize a client path into a root-relative key.
    pub fn relative(&self, path: &str) -> Result<String, ServiceError> {
        rfs_core::paths::normalize(path).ok_or_else(|| {
            ServiceError::bad_request(format!("path escapes the served root: {path}"))
        })
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, ServiceError> {
        Ok(self.root.join(self.relative(path)?))
    }

    fn regular_file(&self, path: &str) -> Result<PathBuf, ServiceError> {
        let resolved = self.resolve(path)?;
        match fs::metadata(&resolved) {
            Ok(meta) if meta.is_file() => Ok(resolved),
            Ok(_) => Err(ServiceError::bad_request(format!("not a regular file: {path}"))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(ServiceError::not_found(format!("file not found: {path}")))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn read(&self, path: &str) -> Result<Vec<u8>, ServiceError> {
        let file = self.regular_file(path)?;
        Ok(fs::read(file)?)
    }

    /// Insert `data` into the file at `offset`, shifting the tail right.
    /// The offset must land inside the current content, end inclusive.
    pub fn splice(&self, path: &str, offset: i32, data: &[u8]) -> Result<Mutation, ServiceError> {
        let file = self.regular_file(path)?;
        let mut content = fs::read(&file)?;
        let len = content.len();
        let at = usize::try_from(offset).ok().filter(|at| *at <= len).ok_or_else(|| {
            ServiceError::bad_request(format!(
                "offset out of range: {offset} (file is {len} bytes)"
            ))
        })?;
        content.splice(at..at, data.iter().copied());
        fs::write(&file, &content)?;
        Ok(Mutation { mtime_ms: self.mtime_of(&file)?, content })
    }

    pub fn append(&self, path: &str, data: &[u8]) -> Result<Mutation, ServiceError> {
        let file = self.regular_file(path)?;
        let mut content = fs::read(&file)?;
        content.extend_from_slice(data);
        fs::write(&file, &content)?;
        Ok(Mutation { mtime_ms: self.mtime_of(&file)?, content })
    }

    /// Create the file if missing and stamp both timestamps with `now_ms`.
    /// Existing content is left alone.
    pub fn touch(&self, path: &str, now_ms: u64) -> Result<i64, ServiceError> {
        let resolved = self.resolve(path)?;
        if fs::metadata(&resolved).map(|meta| meta.is_dir()).unwrap_or(false) {
            return Err(ServiceError::bad_request(format!("not a regular file: {path}")));
        }
        let file = OpenOptions::new().append(true).create(true).open(&resolved).map_err(|err| {
            match err.kind() {
                io::ErrorKind::NotFound => {
                    ServiceError::not_found(format!("file not found: {path}"))
                }
                _ => err.into(),
            }
        })?;
        let stamp = UNIX_EPOCH + Duration::from_millis(now_ms);
        file.set_times(FileTimes::new().set_accessed(stamp).set_modified(stamp))?;
        Ok(i64::try_from(now_ms).unwrap_or(i64::MAX))
    }

    /// Modification and access times in epoch milliseconds.
    pub fn attrs(&self, path: &str) -> Result<(i64, i64), ServiceError> {
        let resolved = self.resolve(path)?;
        let meta = fs::metadata(&resolved).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ServiceError::not_found(format!("file not found: {path}")),
            _ => err.into(),
        })?;
        Ok((time_ms(meta.modified()?), time_ms(meta.accessed()?)))
    }

    /// Sorted entry names; directories carry a trailing slash.
    pub fn list(&self, path: &str) -> Result<Vec<String>, ServiceError> {
        let resolved = self.resolve(path)?;
        let meta = fs::metadata(&resolved).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => {
                ServiceError::not_found(format!("directory not found: {path}"))
            }
            _ => err.into(),
        })?;
        if !meta.is_dir() {
            return Err(ServiceError::bad_request(format!("not a directory: {path}")));
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&resolved)? {
            let entry = entry?;
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_dir() {
                name.push('/');
            }
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    /// Confirm a regular file exists and hand back its root-relative key.
    pub fn expect_file(&self, path: &str) -> Result<String, ServiceError> {
        let rel = self.relative(path)?;
        self.regular_file(path)?;
        Ok(rel)
    }

    fn mtime_of(&self, file: &Path) -> Result<i64, ServiceError> {
        Ok(time_ms(fs::metadata(file)?.modified()?))
    }
}

fn time_ms(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH).map(|d| d.as_millis() as i64).unwrap_or_default()
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
