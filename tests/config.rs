use std::fs;
use std::time::Duration;

use assert_matches::assert_matches;

use kira_assembly_fetch::config::{ConfigLoader, Settings, SettingsOverrides};
use kira_assembly_fetch::domain::AssemblyFile;
use kira_assembly_fetch::error::AssemblyError;

#[test]
fn load_config_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("kira-af.json");
    fs::write(
        &path,
        r#"{ "base_url": "http://mirror.local/ncbi/", "timeout_secs": 600, "include": ["gtf", "protein"] }"#,
    )
    .unwrap();

    let settings = ConfigLoader::resolve(Some(path.as_path())).unwrap();
    assert_eq!(settings.schema_version, 1);
    assert_eq!(settings.base_url, "http://mirror.local/ncbi");
    assert_eq!(settings.timeout, Some(Duration::from_secs(600)));
    assert_eq!(
        settings.include,
        vec![AssemblyFile::Protein, AssemblyFile::Gtf]
    );
}

#[test]
fn cli_overrides_win() {
    let settings = Settings::default()
        .with_overrides(SettingsOverrides {
            base_url: Some("https://example.org".to_string()),
            include: Some(vec![AssemblyFile::Genomic]),
        })
        .unwrap();
    assert_eq!(settings.base_url, "https://example.org");
    assert_eq!(settings.include, vec![AssemblyFile::Genomic]);
}

#[test]
fn explicit_missing_config_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let err = ConfigLoader::resolve(Some(temp.path().join("absent.json").as_path())).unwrap_err();
    assert_matches!(err, AssemblyError::ConfigRead(_));
}

#[test]
fn unknown_keys_are_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("bad.json");
    fs::write(&path, r#"{ "base_ur": "https://typo" }"#).unwrap();
    let err = ConfigLoader::resolve(Some(path.as_path())).unwrap_err();
    assert_matches!(err, AssemblyError::ConfigParse(_));
}

#[test]
fn non_http_base_url_is_rejected() {
    let err = Settings::default()
        .with_overrides(SettingsOverrides {
            base_url: Some("ftp://ftp.ncbi.nih.gov".to_string()),
            include: None,
        })
        .unwrap_err();
    assert_matches!(err, AssemblyError::InvalidConfig(_));
}
