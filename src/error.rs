use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum AssemblyError {
    #[error("invalid assembly identifier {id}: {reason}")]
    InvalidAssemblyId { id: String, reason: String },

    #[error("failed to read assembly list at {path}: {message}")]
    #[diagnostic(help("pass a readable file with `--assembly_list`"))]
    ManifestRead { path: PathBuf, message: String },

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config value: {0}")]
    InvalidConfig(String),

    #[error("NCBI request failed: {0}")]
    NcbiHttp(String),

    #[error("NCBI returned status {status}: {message}")]
    NcbiStatus { status: u16, message: String },

    #[error("file does not exist: {0}")]
    MissingFile(String),

    #[error("not a gzip file: {0}")]
    NotGzip(String),

    #[error("failed to decompress {path}: {message}")]
    Decompress { path: String, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
