//! Static file mount.
//!
//! The first capture of the mount's route is taken as a path below the
//! static root. Resolution walks it one segment at a time and then checks
//! that the canonical result is still inside the canonical root, so neither
//! `..` segments nor symlinks can escape the mount.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::handler::context::{Captures, HandlerContext};
use crate::handler::reply::Reply;
use crate::handler::{Handler, HandlerFactory, Verb, factory};
use crate::http::HttpMethod;
use crate::http::response::ChunkStream;

const FORBIDDEN: &str = "Access is forbidden.";

/// Where a static mount reads from and how it is routed.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    pub root: PathBuf,
    pub route: String,
    pub chunk_size: usize,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>, route: impl Into<String>, chunk_size: usize) -> Self {
        Self {
            root: root.into(),
            route: route.into(),
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn factory(&self) -> HandlerFactory {
        let root = self.root.clone();
        let chunk_size = self.chunk_size;
        factory(move || StaticFileHandler {
            root: root.clone(),
            chunk_size,
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Resolution {
    File(PathBuf),
    NotFound,
    Forbidden,
}

pub struct StaticFileHandler {
    root: PathBuf,
    chunk_size: usize,
}

impl StaticFileHandler {
    fn resolve(&self, sub_path: &str) -> Resolution {
        let mut path = self.root.clone();
        for segment in sub_path.split('/').map(str::trim).filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." || segment.contains('\\') {
                return Resolution::NotFound;
            }
            path.push(segment);
            if !path.exists() {
                return Resolution::NotFound;
            }
        }

        let (Ok(root), Ok(resolved)) = (fs::canonicalize(&self.root), fs::canonicalize(&path))
        else {
            return Resolution::NotFound;
        };
        if !resolved.starts_with(&root) {
            debug!(path = %resolved.display(), "static path escapes the root");
            return Resolution::Forbidden;
        }
        if !resolved.is_file() {
            return Resolution::Forbidden;
        }
        Resolution::File(resolved)
    }
}

impl Handler for StaticFileHandler {
    fn verbs(&self) -> &'static [Verb] {
        &[HttpMethod::Get]
    }

    fn get(&mut self, ctx: &mut HandlerContext<'_>, args: &Captures) -> Result<Reply> {
        let path = match self.resolve(args.get_or(0, "")) {
            Resolution::File(path) => path,
            Resolution::NotFound => return Ok(ctx.error(404, None)),
            Resolution::Forbidden => return Ok(ctx.error(403, Some(FORBIDDEN))),
        };

        // Unreadable files are reported like directories.
        let (file, size) = match File::open(&path).and_then(|f| Ok((f.metadata()?.len(), f))) {
            Ok((size, file)) => (file, size),
            Err(err) => {
                debug!(path = %path.display(), %err, "cannot open static file");
                return Ok(ctx.error(403, Some(FORBIDDEN)));
            }
        };

        debug!(path = %path.display(), size, "serving static file");
        ctx.set_header("content-type", guess_mime(&path));
        ctx.set_header("content-length", size);
        Ok(Reply::Stream(FileChunks::new(file, self.chunk_size).into_stream()))
    }
}

fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Reads a file in fixed-size chunks. The handle is closed as soon as the
/// end is reached or a read fails, and on drop if the reader is abandoned.
pub struct FileChunks {
    file: Option<File>,
    chunk_size: usize,
}

impl FileChunks {
    pub fn new(file: File, chunk_size: usize) -> Self {
        Self {
            file: Some(file),
            chunk_size,
        }
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn into_stream(self) -> ChunkStream {
        ChunkStream::new(self)
    }
}

impl Iterator for FileChunks {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let file = self.file.as_mut()?;
        let mut chunk = vec![0; self.chunk_size];
        loop {
            match file.read(&mut chunk) {
                Ok(0) => {
                    self.file = None;
                    return None;
                }
                Ok(n) => {
                    chunk.truncate(n);
                    return Some(Ok(chunk));
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.file = None;
                    return Some(Err(err));
                }
            }
        }
    }
}
