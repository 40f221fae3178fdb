use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::AssemblyError;

/// One usable line of the assembly list: `<assembly_id> <basename> [status]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub line: usize,
    pub assembly_id: String,
    pub basename: String,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    pub line: usize,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
    pub skipped: Vec<SkippedLine>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, AssemblyError> {
        let content = fs::read_to_string(path).map_err(|err| AssemblyError::ManifestRead {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let mut manifest = Manifest::default();
        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let line_number = index + 1;
            let columns: Vec<&str> = line.split_whitespace().collect();
            if columns.len() < 2 {
                tracing::warn!(
                    line = line_number,
                    content = line,
                    "Skipping line with insufficient columns"
                );
                manifest.skipped.push(SkippedLine {
                    line: line_number,
                    content: line.to_string(),
                });
                continue;
            }
            manifest.entries.push(ManifestEntry {
                line: line_number,
                assembly_id: columns[0].to_string(),
                basename: columns[1].to_string(),
                status: columns.get(2).map(|value| value.to_string()),
            });
        }
        manifest
    }
}
