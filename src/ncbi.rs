use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::domain::{AssemblyFile, AssemblyId};
use crate::error::AssemblyError;

pub const DEFAULT_BASE_URL: &str = "https://ftp.ncbi.nih.gov";

pub trait NcbiClient: Send + Sync {
    /// Fetch `url` into `destination`. On error `destination` is left absent.
    fn download(&self, url: &str, destination: &Path) -> Result<(), AssemblyError>;
}

#[derive(Clone)]
pub struct NcbiHttpClient {
    client: Client,
}

impl NcbiHttpClient {
    /// `timeout` of `None` disables the whole-request deadline; genome FASTA
    /// transfers routinely run for minutes.
    pub fn new(timeout: Option<Duration>) -> Result<Self, AssemblyError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("kira-af/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| AssemblyError::NcbiHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| AssemblyError::NcbiHttp(err.to_string()))?;
        Ok(Self { client })
    }
}

impl NcbiClient for NcbiHttpClient {
    fn download(&self, url: &str, destination: &Path) -> Result<(), AssemblyError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|err| AssemblyError::NcbiHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status();
            return Err(AssemblyError::NcbiStatus {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("NCBI request failed")
                    .to_string(),
            });
        }

        let parent = destination
            .parent()
            .ok_or_else(|| AssemblyError::Filesystem("invalid destination path".to_string()))?;
        let mut temp = tempfile::Builder::new()
            .prefix(".kira-af-download")
            .tempfile_in(parent)
            .map_err(|err| AssemblyError::Filesystem(err.to_string()))?;
        std::io::copy(&mut response, temp.as_file_mut())
            .map_err(|err| AssemblyError::NcbiHttp(err.to_string()))?;
        temp.persist(destination)
            .map_err(|err| AssemblyError::Filesystem(err.error.to_string()))?;
        Ok(())
    }
}

/// `<base>/genomes/all/GCF/000/001/405/<assembly_id>`
pub fn assembly_dir_url(base_url: &str, id: &AssemblyId) -> String {
    format!(
        "{}/genomes/all/{}/{}",
        base_url.trim_end_matches('/'),
        id.archive_dir(),
        id.as_str()
    )
}

pub fn file_url(base_url: &str, id: &AssemblyId, file: AssemblyFile) -> String {
    format!(
        "{}/{}_{}.gz",
        assembly_dir_url(base_url, id),
        id.as_str(),
        file.suffix()
    )
}
