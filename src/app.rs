use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use serde::Serialize;

use crate::config::Settings;
use crate::domain::{AssemblyFile, AssemblyId};
use crate::error::AssemblyError;
use crate::manifest::{Manifest, ManifestEntry, SkippedLine};
use crate::ncbi::{NcbiClient, file_url};
use crate::store::Store;

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    pub started_at: String,
    pub finished_at: String,
    pub out_dir: String,
    pub dry_run: bool,
    pub assemblies: Vec<AssemblyResult>,
    pub skipped_lines: Vec<SkippedLine>,
}

impl FetchResult {
    pub fn files(&self) -> impl Iterator<Item = &FileResult> {
        self.assemblies.iter().flat_map(|assembly| assembly.files.iter())
    }

    pub fn count_downloads(&self, action: DownloadAction) -> usize {
        self.files().filter(|file| file.download == action).count()
    }

    pub fn count_decompressions(&self, action: DecompressAction) -> usize {
        self.files().filter(|file| file.decompress == action).count()
    }

    pub fn count_assemblies(&self, outcome: AssemblyOutcome) -> usize {
        self.assemblies
            .iter()
            .filter(|assembly| assembly.outcome == outcome)
            .count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssemblyResult {
    pub line: usize,
    pub assembly_id: String,
    pub basename: String,
    /// Third manifest column, carried through untouched.
    pub status: Option<String>,
    pub outcome: AssemblyOutcome,
    pub directory: Option<String>,
    pub files: Vec<FileResult>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyOutcome {
    Processed,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: AssemblyFile,
    pub url: String,
    pub compressed_path: String,
    pub decompressed_path: String,
    pub download: DownloadAction,
    pub decompress: DecompressAction,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadAction {
    Planned,
    Present,
    Downloaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecompressAction {
    Planned,
    Decompressed,
    Missing,
    NotGzip,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

impl ProgressEvent {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            elapsed: None,
        }
    }
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct App<N: NcbiClient> {
    store: Store,
    ncbi: N,
    settings: Settings,
}

impl<N: NcbiClient> App<N> {
    pub fn new(store: Store, ncbi: N, settings: Settings) -> Self {
        Self {
            store,
            ncbi,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Process every manifest entry in order. Only a failure to create the
    /// output root is returned as an error; per-record and per-file failures
    /// are logged and reported in the result.
    pub fn fetch(
        &self,
        manifest: &Manifest,
        options: FetchOptions,
        sink: &dyn ProgressSink,
    ) -> Result<FetchResult, AssemblyError> {
        let started_at = iso_timestamp();
        if !options.dry_run {
            self.store.ensure_root()?;
        }

        let assemblies = manifest
            .entries
            .iter()
            .map(|entry| self.fetch_assembly(entry, options, sink))
            .collect();

        Ok(FetchResult {
            started_at,
            finished_at: iso_timestamp(),
            out_dir: self.store.root().to_string(),
            dry_run: options.dry_run,
            assemblies,
            skipped_lines: manifest.skipped.clone(),
        })
    }

    fn fetch_assembly(
        &self,
        entry: &ManifestEntry,
        options: FetchOptions,
        sink: &dyn ProgressSink,
    ) -> AssemblyResult {
        sink.event(ProgressEvent::message(format!(
            "Processing assembly: {} (renamed as {})",
            entry.assembly_id, entry.basename
        )));
        let mut result = AssemblyResult {
            line: entry.line,
            assembly_id: entry.assembly_id.clone(),
            basename: entry.basename.clone(),
            status: entry.status.clone(),
            outcome: AssemblyOutcome::Processed,
            directory: None,
            files: Vec::new(),
            error: None,
        };

        let id = match entry.assembly_id.parse::<AssemblyId>() {
            Ok(id) => id,
            Err(err) => {
                tracing::error!(
                    assembly = %entry.assembly_id,
                    error = %err,
                    "Failed to construct archive path"
                );
                tracing::warn!(
                    assembly = %entry.assembly_id,
                    line = entry.line,
                    "Skipping assembly"
                );
                result.outcome = AssemblyOutcome::Skipped;
                result.error = Some(err.to_string());
                return result;
            }
        };

        result.files = self
            .settings
            .include
            .iter()
            .map(|&file| self.plan_file(&id, &entry.basename, file))
            .collect();
        result.directory = Some(self.store.assembly_dir(&entry.basename).to_string());
        if options.dry_run {
            return result;
        }

        if let Err(err) = self.store.ensure_assembly_dir(&entry.basename) {
            tracing::error!(assembly = %id, error = %err, "Failed to create assembly directory");
            result.outcome = AssemblyOutcome::Failed;
            result.error = Some(err.to_string());
            return result;
        }

        for file in &mut result.files {
            self.download_file(file, sink);
        }
        for file in &mut result.files {
            self.decompress_file(file, sink);
        }
        result
    }

    fn plan_file(&self, id: &AssemblyId, basename: &str, file: AssemblyFile) -> FileResult {
        FileResult {
            file,
            url: file_url(&self.settings.base_url, id, file),
            compressed_path: self.store.compressed_path(basename, file).to_string(),
            decompressed_path: self.store.decompressed_path(basename, file).to_string(),
            download: DownloadAction::Planned,
            decompress: DecompressAction::Planned,
            errors: Vec::new(),
        }
    }

    fn download_file(&self, file: &mut FileResult, sink: &dyn ProgressSink) {
        let destination = Utf8PathBuf::from(&file.compressed_path);
        if self.store.exists(&destination) {
            sink.event(ProgressEvent::message(format!(
                "File already exists: {destination} (skipping)"
            )));
            file.download = DownloadAction::Present;
            return;
        }

        sink.event(ProgressEvent::message(format!(
            "Downloading:\n  {}\n  -> {destination}",
            file.url
        )));
        let start = Instant::now();
        match self.ncbi.download(&file.url, destination.as_std_path()) {
            Ok(()) => {
                sink.event(ProgressEvent {
                    message: format!("Downloaded {destination}"),
                    elapsed: Some(start.elapsed()),
                });
                file.download = DownloadAction::Downloaded;
            }
            Err(err) => {
                tracing::error!(url = %file.url, error = %err, "Could not download");
                file.download = DownloadAction::Failed;
                file.errors.push(err.to_string());
            }
        }
    }

    fn decompress_file(&self, file: &mut FileResult, sink: &dyn ProgressSink) {
        let gz_path = Utf8PathBuf::from(&file.compressed_path);
        if self.store.exists(&gz_path) {
            sink.event(ProgressEvent::message(format!(
                "Unzipping {gz_path} to {}",
                file.decompressed_path
            )));
        }
        match crate::fs_util::gunzip(&gz_path) {
            Ok(_) => file.decompress = DecompressAction::Decompressed,
            Err(AssemblyError::MissingFile(path)) => {
                tracing::warn!(path = %path, "File does not exist, skipping unzip");
                file.decompress = DecompressAction::Missing;
            }
            Err(AssemblyError::NotGzip(path)) => {
                tracing::warn!(path = %path, "File is not a gzip file, skipping unzip");
                file.decompress = DecompressAction::NotGzip;
            }
            Err(err) => {
                tracing::error!(path = %gz_path, error = %err, "Failed to unzip");
                file.decompress = DecompressAction::Failed;
                file.errors.push(err.to_string());
            }
        }
    }
}

fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use super::*;
    use crate::output::JsonOutput;

    #[derive(Default)]
    struct MockNcbi {
        calls: Mutex<Vec<String>>,
    }

    impl NcbiClient for MockNcbi {
        fn download(&self, url: &str, _destination: &Path) -> Result<(), AssemblyError> {
            self.calls.lock().unwrap().push(url.to_string());
            Err(AssemblyError::NcbiHttp("offline".to_string()))
        }
    }

    #[test]
    fn dry_run_plans_without_touching_disk() {
        let temp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().join("out")).unwrap();
        let app = App::new(
            Store::new_with_root(root.clone()),
            MockNcbi::default(),
            Settings::default(),
        );
        let manifest = Manifest::parse("GCF_000001405.39_GRCh38.p13 human\n");

        let result = app
            .fetch(&manifest, FetchOptions { dry_run: true }, &JsonOutput)
            .unwrap();

        assert!(!root.as_std_path().exists());
        assert!(app.ncbi.calls.lock().unwrap().is_empty());
        assert_eq!(result.assemblies[0].files.len(), 4);
        assert_eq!(result.count_downloads(DownloadAction::Planned), 4);
        assert_eq!(
            result.assemblies[0].files[0].url,
            "https://ftp.ncbi.nih.gov/genomes/all/GCF/000/001/405/GCF_000001405.39_GRCh38.p13/GCF_000001405.39_GRCh38.p13_protein.faa.gz"
        );
    }
}
