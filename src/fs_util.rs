use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use flate2::read::MultiGzDecoder;

use crate::error::AssemblyError;

/// `foo.fna.gz` -> `foo.fna`; `None` when the path has no `.gz` suffix.
pub fn gunzip_target(gz_path: &Utf8Path) -> Option<Utf8PathBuf> {
    gz_path
        .as_str()
        .strip_suffix(".gz")
        .filter(|stem| !stem.is_empty())
        .map(Utf8PathBuf::from)
}

/// Decompress `gz_path` next to itself with `.gz` stripped, replacing any
/// earlier output. The compressed file is kept.
pub fn gunzip(gz_path: &Utf8Path) -> Result<Utf8PathBuf, AssemblyError> {
    if !gz_path.as_std_path().exists() {
        return Err(AssemblyError::MissingFile(gz_path.to_string()));
    }
    let target =
        gunzip_target(gz_path).ok_or_else(|| AssemblyError::NotGzip(gz_path.to_string()))?;
    let decompress_err = |message: String| AssemblyError::Decompress {
        path: gz_path.to_string(),
        message,
    };

    let parent = target
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or(Utf8Path::new("."));
    let source = fs::File::open(gz_path.as_std_path())
        .map_err(|err| decompress_err(format!("open: {err}")))?;
    let mut decoder = MultiGzDecoder::new(io::BufReader::new(source));
    let mut temp = tempfile::Builder::new()
        .prefix(".kira-af-gunzip")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| AssemblyError::Filesystem(err.to_string()))?;
    io::copy(&mut decoder, temp.as_file_mut()).map_err(|err| decompress_err(err.to_string()))?;
    temp.persist(target.as_std_path())
        .map_err(|err| AssemblyError::Filesystem(err.error.to_string()))?;
    Ok(target)
}
