//! Artifact output.
//!
//! Stages hand finished graphs to a [`GraphSink`]. The production sink,
//! [`ArtifactWriter`], renders to the configured format and writes through a
//! temporary sibling that is renamed into place, so an interrupted run never
//! leaves a truncated artifact under its final name.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{CubeError, Result};
use crate::model::Graph;
use crate::serializer::Format;

/// Consumer of finished graphs.
pub trait GraphSink {
    /// Stores `graph` under the logical name `name` (e.g. `0`, `dep`) and
    /// returns the file name it was stored as.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph cannot be stored.
    fn accept(&mut self, name: &str, graph: &Graph) -> Result<String>;
}

/// Writes graphs as `<stem>-<name>.<ext>` files in one directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
    stem: String,
    format: Format,
}

impl ArtifactWriter {
    /// Creates the output directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: &Path, stem: impl Into<String>, format: Format) -> Result<Self> {
        fs::create_dir_all(dir)
            .map_err(|e| CubeError::io(format!("cannot create {}", dir.display()), e))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            stem: stem.into(),
            format,
        })
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Output format.
    #[must_use]
    pub fn format(&self) -> Format {
        self.format
    }

    /// File name used for the logical artifact `name`.
    #[must_use]
    pub fn file_name(&self, name: &str) -> String {
        format!("{}-{}.{}", self.stem, name, self.format.extension())
    }
}

impl GraphSink for ArtifactWriter {
    fn accept(&mut self, name: &str, graph: &Graph) -> Result<String> {
        let file_name = self.file_name(name);
        let path = self.dir.join(&file_name);
        write_atomic(&path, self.format.render(graph).as_bytes())?;
        info!(path = %path.display(), statements = graph.len(), "written");
        Ok(file_name)
    }
}

/// Writes `content` to `path` via a temporary sibling and a rename.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be written or renamed.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let write = || -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(content)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    };
    write().map_err(|e| {
        let _ = fs::remove_file(&tmp);
        CubeError::io(format!("cannot write {}", path.display()), e)
    })
}
