use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kira_assembly_fetch::app::{
    App, AssemblyOutcome, DecompressAction, DownloadAction, FetchOptions, FetchResult,
};
use kira_assembly_fetch::config::{ConfigLoader, SettingsOverrides};
use kira_assembly_fetch::domain::AssemblyFile;
use kira_assembly_fetch::error::AssemblyError;
use kira_assembly_fetch::manifest::Manifest;
use kira_assembly_fetch::ncbi::NcbiHttpClient;
use kira_assembly_fetch::output::{ConsoleOutput, JsonOutput, OutputMode};
use kira_assembly_fetch::store::Store;

#[derive(Parser)]
#[command(name = "kira-af")]
#[command(
    about = "Download NCBI assembly proteome, genomic FASTA, CDS FASTA and GTF files from an assembly list, and unzip them"
)]
#[command(version, author)]
struct Cli {
    /// File with columns: <AssemblyID> <RenamedBasename> [GroupStatus]
    #[arg(long = "assembly_list", alias = "assembly-list")]
    assembly_list: PathBuf,

    /// Output directory for downloads
    #[arg(long = "out_dir", alias = "out-dir")]
    out_dir: PathBuf,

    /// JSON config file (defaults to ./kira-af.json when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Archive host, e.g. a local mirror
    #[arg(long = "base_url", alias = "base-url")]
    base_url: Option<String>,

    /// Files to fetch per assembly
    #[arg(long, value_enum, value_delimiter = ',')]
    include: Option<Vec<AssemblyFile>>,

    /// Print planned URLs and paths without downloading
    #[arg(long = "dry_run", alias = "dry-run")]
    dry_run: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<AssemblyError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &AssemblyError) -> u8 {
    match error {
        AssemblyError::ManifestRead { .. }
        | AssemblyError::ConfigRead(_)
        | AssemblyError::ConfigParse(_)
        | AssemblyError::InvalidConfig(_) => 2,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Console
    };

    let settings = ConfigLoader::resolve(cli.config.as_deref())?.with_overrides(
        SettingsOverrides {
            base_url: cli.base_url,
            include: cli.include,
        },
    )?;
    let manifest = Manifest::load(&cli.assembly_list)?;
    let store = Store::new(&cli.out_dir)?;
    let ncbi = NcbiHttpClient::new(settings.timeout)?;
    let app = App::new(store, ncbi, settings);
    let options = FetchOptions {
        dry_run: cli.dry_run,
    };

    match output_mode {
        OutputMode::Json => {
            let result = app.fetch(&manifest, options, &JsonOutput)?;
            JsonOutput::print_fetch(&result).into_diagnostic()?;
        }
        OutputMode::Console => {
            let result = app.fetch(&manifest, options, &ConsoleOutput)?;
            print_fetch_summary(&result);
        }
    }
    Ok(())
}

fn print_fetch_summary(result: &FetchResult) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let red = "\x1b[31m";
    let reset = "\x1b[0m";

    println!();
    println!("{cyan}KIRA-AF summary ({}){reset}", result.out_dir);
    if result.dry_run {
        println!("{yellow}dry run: nothing was downloaded{reset}");
    }
    println!(
        "{green}assemblies processed: {}{reset}",
        result.count_assemblies(AssemblyOutcome::Processed)
    );
    println!(
        "{green}files downloaded: {}, already present: {}, decompressed: {}{reset}",
        result.count_downloads(DownloadAction::Downloaded),
        result.count_downloads(DownloadAction::Present),
        result.count_decompressions(DecompressAction::Decompressed),
    );

    let skipped = result.count_assemblies(AssemblyOutcome::Skipped);
    let failed_assemblies = result.count_assemblies(AssemblyOutcome::Failed);
    let failed_downloads = result.count_downloads(DownloadAction::Failed);
    let failed_unzips = result.count_decompressions(DecompressAction::Failed);
    if !result.skipped_lines.is_empty() || skipped > 0 {
        println!(
            "{yellow}skipped lines: {}, skipped assemblies: {skipped}{reset}",
            result.skipped_lines.len()
        );
    }
    if failed_assemblies + failed_downloads + failed_unzips > 0 {
        println!(
            "{red}failed assemblies: {failed_assemblies}, failed downloads: {failed_downloads}, failed unzips: {failed_unzips}{reset}"
        );
    }
}
