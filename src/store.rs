use std::fs;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::AssemblyFile;
use crate::error::AssemblyError;

/// Local output layout rooted at `--out_dir`:
/// `<root>/<basename>/<basename>.<suffix>.gz` plus the decompressed sibling.
#[derive(Debug, Clone)]
pub struct Store {
    root: Utf8PathBuf,
}

impl Store {
    pub fn new(out_dir: &Path) -> Result<Self, AssemblyError> {
        let root = Utf8PathBuf::from_path_buf(out_dir.to_path_buf()).map_err(|path| {
            AssemblyError::Filesystem(format!("non-utf8 output path: {}", path.display()))
        })?;
        Ok(Self { root })
    }

    pub fn new_with_root(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn assembly_dir(&self, basename: &str) -> Utf8PathBuf {
        self.root.join(basename)
    }

    pub fn compressed_path(&self, basename: &str, file: AssemblyFile) -> Utf8PathBuf {
        self.assembly_dir(basename)
            .join(format!("{basename}.{}.gz", file.suffix()))
    }

    pub fn decompressed_path(&self, basename: &str, file: AssemblyFile) -> Utf8PathBuf {
        self.assembly_dir(basename)
            .join(format!("{basename}.{}", file.suffix()))
    }

    pub fn ensure_root(&self) -> Result<(), AssemblyError> {
        fs::create_dir_all(self.root.as_std_path())
            .map_err(|err| AssemblyError::Filesystem(format!("create {}: {err}", self.root)))
    }

    pub fn ensure_assembly_dir(&self, basename: &str) -> Result<Utf8PathBuf, AssemblyError> {
        let dir = self.assembly_dir(basename);
        fs::create_dir_all(dir.as_std_path())
            .map_err(|err| AssemblyError::Filesystem(format!("create {dir}: {err}")))?;
        Ok(dir)
    }

    pub fn exists(&self, path: &Utf8Path) -> bool {
        path.as_std_path().exists()
    }
}
