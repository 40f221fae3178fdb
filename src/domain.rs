use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AssemblyError;

const ACCESSION_DIGITS: usize = 9;

/// Assembly identifier as named in the NCBI archive, for example
/// `GCF_000001405.39_GRCh38.p13`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssemblyId {
    id: String,
    prefix: String,
    digits: String,
}

impl AssemblyId {
    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// `GCF`, `GCA`, ...
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The nine accession digits without the version.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn digit_groups(&self) -> [&str; 3] {
        [&self.digits[0..3], &self.digits[3..6], &self.digits[6..9]]
    }

    /// Partitioned archive directory, e.g. `GCF/000/001/405`.
    pub fn archive_dir(&self) -> String {
        let [d1, d2, d3] = self.digit_groups();
        format!("{}/{d1}/{d2}/{d3}", self.prefix)
    }
}

impl fmt::Display for AssemblyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl FromStr for AssemblyId {
    type Err = AssemblyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        let invalid = |reason: &str| AssemblyError::InvalidAssemblyId {
            id: value.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = normalized.split('_');
        let prefix = parts.next().unwrap_or_default();
        let Some(accession) = parts.next() else {
            return Err(invalid("expected <PREFIX>_<accession>"));
        };
        if prefix.is_empty() || !prefix.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(invalid("prefix must be alphanumeric"));
        }

        let digits = accession.split('.').next().unwrap_or_default();
        if digits.len() != ACCESSION_DIGITS || !digits.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(invalid("expected nine digits in assembly number"));
        }

        Ok(Self {
            id: normalized.to_string(),
            prefix: prefix.to_string(),
            digits: digits.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AssemblyFile {
    Protein,
    Genomic,
    Cds,
    Gtf,
}

impl AssemblyFile {
    pub const ALL: [AssemblyFile; 4] = [
        AssemblyFile::Protein,
        AssemblyFile::Genomic,
        AssemblyFile::Cds,
        AssemblyFile::Gtf,
    ];

    /// Suffix shared by the remote name (`<id>_<suffix>.gz`) and the local
    /// name (`<basename>.<suffix>.gz`).
    pub fn suffix(self) -> &'static str {
        match self {
            AssemblyFile::Protein => "protein.faa",
            AssemblyFile::Genomic => "genomic.fna",
            AssemblyFile::Cds => "cds_from_genomic.fna",
            AssemblyFile::Gtf => "genomic.gtf",
        }
    }
}

impl fmt::Display for AssemblyFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyFile::Protein => write!(f, "protein"),
            AssemblyFile::Genomic => write!(f, "genomic"),
            AssemblyFile::Cds => write!(f, "cds"),
            AssemblyFile::Gtf => write!(f, "gtf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_assembly_id_valid() {
        let id: AssemblyId = "GCF_000001405.39_GRCh38.p13".parse().unwrap();
        assert_eq!(id.as_str(), "GCF_000001405.39_GRCh38.p13");
        assert_eq!(id.prefix(), "GCF");
        assert_eq!(id.digits(), "000001405");
        assert_eq!(id.archive_dir(), "GCF/000/001/405");
    }

    #[test]
    fn parse_assembly_id_without_version_or_name() {
        let id: AssemblyId = "GCA_900496995".parse().unwrap();
        assert_eq!(id.archive_dir(), "GCA/900/496/995");
    }

    #[test]
    fn parse_assembly_id_short_accession() {
        let err = "GCF_00001405.39_GRCh38".parse::<AssemblyId>().unwrap_err();
        assert_matches!(err, AssemblyError::InvalidAssemblyId { .. });
    }

    #[test]
    fn parse_assembly_id_missing_underscore() {
        let err = "GCF000001405".parse::<AssemblyId>().unwrap_err();
        assert_matches!(err, AssemblyError::InvalidAssemblyId { .. });
    }

    #[test]
    fn parse_assembly_id_non_digit_accession() {
        let err = "GCF_00000140X.1".parse::<AssemblyId>().unwrap_err();
        assert_matches!(err, AssemblyError::InvalidAssemblyId { .. });
    }

    #[test]
    fn file_suffixes() {
        let suffixes: Vec<_> = AssemblyFile::ALL.iter().map(|f| f.suffix()).collect();
        assert_eq!(
            suffixes,
            vec![
                "protein.faa",
                "genomic.fna",
                "cds_from_genomic.fna",
                "genomic.gtf"
            ]
        );
    }
}
