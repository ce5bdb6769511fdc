//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{ColumnNames, CsvTradeAdapter};
use crate::adapters::csv_report_adapter::{self, CsvReportAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::typst_report::TypstReportAdapter;
use crate::domain::aggregate::{aggregate, Granularity};
use crate::domain::analysis::{run_analysis, AnalysisConfig, LevelOutcome, OutputFormat};
use crate::domain::config_validation::{self, parse_digit_list, validate_analysis_config};
use crate::domain::error::IitiError;
use crate::domain::index::IndexReport;
use crate::domain::trade_record::{Flow, YearRange};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::TradeDataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_OUTPUT_DIR: &str = "results";
pub const DEFAULT_NAME_PREFIX: &str = "HS";

#[derive(Parser, Debug)]
#[command(name = "iiti", about = "Intra-industry trade index analysis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute IITI, WIITI and MIITI at every configured digit level
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        export: Option<PathBuf>,
        #[arg(long)]
        import: Option<PathBuf>,
        /// Comma-separated digit levels, e.g. 2,4
        #[arg(long)]
        digits: Option<String>,
        #[arg(long)]
        top_n: Option<usize>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// csv, typst or both
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Aggregate one flow to a digit level and write it as CSV
    Aggregate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        flow: Flow,
        #[arg(long)]
        digits: u32,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show year range and record count of each flow
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            config,
            export,
            import,
            digits,
            top_n,
            output,
            format,
            dry_run,
        } => {
            let overrides = Overrides {
                export,
                import,
                digits,
                top_n,
                output,
                format,
            };
            if dry_run {
                run_dry_run(&config, &overrides)
            } else {
                run_analyze(&config, &overrides)
            }
        }
        Command::Aggregate {
            config,
            flow,
            digits,
            output,
        } => run_aggregate(&config, flow, digits, output.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config } => run_info(&config),
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub export: Option<PathBuf>,
    pub import: Option<PathBuf>,
    pub digits: Option<String>,
    pub top_n: Option<usize>,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
}

fn report_error(err: &IitiError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| report_error(&e))
}

/// Build the analysis parameters from `[analysis]`, `[input]` and `[output]`.
/// Input file paths are resolved separately by the data adapter.
pub fn build_analysis_config(adapter: &dyn ConfigPort) -> Result<AnalysisConfig, IitiError> {
    Ok(AnalysisConfig {
        digit_levels: config_validation::digit_levels(adapter)?,
        code_width: config_validation::code_width(adapter)?,
        top_n: config_validation::top_n(adapter)?,
        value_field: config_validation::value_field(adapter)?,
        years: config_validation::year_range(adapter)?,
        output_dir: adapter
            .get_string("output", "dir")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        name_prefix: adapter
            .get_string("output", "name_prefix")
            .unwrap_or_else(|| DEFAULT_NAME_PREFIX.to_string()),
        format: config_validation::output_format(adapter)?,
    })
}

pub fn apply_overrides(config: &mut AnalysisConfig, overrides: &Overrides) -> Result<(), IitiError> {
    if let Some(raw) = &overrides.digits {
        let levels = parse_digit_list(raw).map_err(|reason| IitiError::ConfigInvalid {
            section: "analysis".into(),
            key: "digits".into(),
            reason,
        })?;
        for &digits in &levels {
            Granularity::new(digits, config.code_width)?;
        }
        config.digit_levels = levels;
    }
    if let Some(top_n) = overrides.top_n {
        if top_n == 0 {
            return Err(IitiError::InvalidTopN { top_n });
        }
        config.top_n = top_n;
    }
    if let Some(dir) = &overrides.output {
        config.output_dir = dir.clone();
    }
    if let Some(format) = &overrides.format {
        config.format = format.parse().map_err(|reason| IitiError::ConfigInvalid {
            section: "output".into(),
            key: "format".into(),
            reason,
        })?;
    }
    Ok(())
}

/// CSV data adapter with command-line paths taking precedence over `[input]`.
pub fn build_data_adapter(
    adapter: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<CsvTradeAdapter, IitiError> {
    let resolve = |cli: &Option<PathBuf>, key: &str| {
        cli.clone()
            .or_else(|| {
                adapter
                    .get_string("input", key)
                    .filter(|s| !s.trim().is_empty())
                    .map(PathBuf::from)
            })
            .ok_or_else(|| IitiError::ConfigMissing {
                section: "input".into(),
                key: key.into(),
            })
    };
    let export = resolve(&overrides.export, "export")?;
    let import = resolve(&overrides.import, "import")?;
    Ok(CsvTradeAdapter::new(export, import)
        .with_columns(ColumnNames::from_config(adapter))
        .with_code_width(config_validation::code_width(adapter)?))
}

/// Typst adapter for formats that include a report; the template is only
/// read when one is wanted.
pub fn build_typst_adapter(
    adapter: &dyn ConfigPort,
    format: OutputFormat,
) -> Result<Option<TypstReportAdapter>, IitiError> {
    if !format.wants_typst() {
        return Ok(None);
    }
    TypstReportAdapter::from_config(adapter).map(Some)
}

fn prepare(
    config_path: &Path,
    overrides: &Overrides,
) -> Result<(FileConfigAdapter, AnalysisConfig, CsvTradeAdapter), ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;

    let mut analysis = build_analysis_config(&adapter).map_err(|e| report_error(&e))?;
    apply_overrides(&mut analysis, overrides).map_err(|e| report_error(&e))?;
    let data = build_data_adapter(&adapter, overrides).map_err(|e| report_error(&e))?;
    Ok((adapter, analysis, data))
}

fn run_analyze(config_path: &Path, overrides: &Overrides) -> ExitCode {
    let (adapter, analysis, data) = match prepare(config_path, overrides) {
        Ok(parts) => parts,
        Err(code) => return code,
    };

    let csv_port = CsvReportAdapter;
    let typst_port = match build_typst_adapter(&adapter, analysis.format) {
        Ok(p) => p,
        Err(e) => return report_error(&e),
    };
    let mut ports: Vec<&dyn ReportPort> = Vec::new();
    if analysis.format.wants_csv() {
        ports.push(&csv_port);
    }
    if let Some(port) = &typst_port {
        ports.push(port);
    }

    run_analysis_pipeline(&data, &ports, &analysis)
}

pub fn run_analysis_pipeline(
    data_port: &dyn TradeDataPort,
    report_ports: &[&dyn ReportPort],
    analysis: &AnalysisConfig,
) -> ExitCode {
    let levels: Vec<String> = analysis
        .digit_levels
        .iter()
        .map(|d| analysis.run_name(*d))
        .collect();
    eprintln!(
        "Running analysis: {} (top {}, output {})",
        levels.join(", "),
        analysis.top_n,
        analysis.output_dir.display()
    );

    let outcomes = match run_analysis(data_port, report_ports, analysis) {
        Ok(o) => o,
        Err(e) => return report_error(&e),
    };

    for outcome in &outcomes {
        print_outcome(outcome);
    }

    eprintln!("\nIITI analysis results saved in {}", analysis.output_dir.display());
    ExitCode::SUCCESS
}

fn print_outcome(outcome: &LevelOutcome) {
    eprintln!("\n=== {} ===", outcome.name);
    print_year_table(&outcome.report);
    for path in &outcome.written {
        eprintln!("  wrote {}", path.display());
    }
}

fn print_year_table(report: &IndexReport) {
    if report.summaries.is_empty() {
        eprintln!("  no trade rows");
        return;
    }
    eprintln!("  {:>6}  {:>6}  {:>8}  {:>8}  {:>8}", "Year", "Codes", "IITI", "WIITI", "MIITI");
    for s in &report.summaries {
        eprintln!(
            "  {:>6}  {:>6}  {:>8.4}  {:>8.4}  {:>8.4}",
            s.year, s.codes, s.mean_iiti, s.total_wiiti, s.mean_miiti
        );
    }
}

fn describe_years(years: &YearRange) -> String {
    match (years.start, years.end) {
        (None, None) => "all".to_string(),
        (Some(s), None) => format!("{s} onwards"),
        (None, Some(e)) => format!("up to {e}"),
        (Some(s), Some(e)) => format!("{s} to {e}"),
    }
}

pub fn run_dry_run(config_path: &Path, overrides: &Overrides) -> ExitCode {
    let (_adapter, analysis, data) = match prepare(config_path, overrides) {
        Ok(parts) => parts,
        Err(code) => return code,
    };

    eprintln!("Config validated successfully");
    eprintln!("\nInputs:");
    eprintln!("  export: {}", data.path(Flow::Export).display());
    eprintln!("  import: {}", data.path(Flow::Import).display());
    eprintln!("  years:  {}", describe_years(&analysis.years));
    eprintln!("\nAnalysis:");
    for d in &analysis.digit_levels {
        eprintln!("  {} ({} of {} digits)", analysis.run_name(*d), d, analysis.code_width);
    }
    eprintln!("  top_n:  {}", analysis.top_n);
    eprintln!("  value:  {:?}", analysis.value_field);
    eprintln!("\nOutput:");
    eprintln!("  dir:    {}", analysis.output_dir.display());
    eprintln!("  format: {}", analysis.format);

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_aggregate(config_path: &Path, flow: Flow, digits: u32, output: Option<&Path>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let prepared = config_validation::code_width(&adapter)
        .and_then(|width| Granularity::new(digits, width))
        .and_then(|granularity| {
            let years = config_validation::year_range(&adapter)?;
            let data = build_data_adapter(&adapter, &Overrides::default())?;
            Ok((granularity, years, data))
        });
    let (granularity, years, data) = match prepared {
        Ok(parts) => parts,
        Err(e) => return report_error(&e),
    };

    let records = match data.fetch_records(flow, years) {
        Ok(r) => r,
        Err(e) => return report_error(&e),
    };
    let table = aggregate(&records, granularity);
    eprintln!(
        "Aggregated {} {} records into {} rows at {} digits",
        records.len(),
        flow,
        table.len(),
        digits
    );

    let written = match output {
        Some(path) => std::fs::File::create(path)
            .map_err(|e| IitiError::Output {
                reason: format!("failed to write {}: {}", path.display(), e),
            })
            .and_then(|file| csv_report_adapter::write_aggregated(&table, file)),
        None => csv_report_adapter::write_aggregated(&table, io::stdout().lock()),
    };
    match written {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_error(&e),
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_analysis_config(&adapter) {
        return report_error(&e);
    }
    let analysis = match build_analysis_config(&adapter) {
        Ok(a) => a,
        Err(e) => return report_error(&e),
    };

    eprintln!(
        "  digit levels: {}",
        analysis
            .digit_levels
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    eprintln!("  top_n:        {}", analysis.top_n);
    eprintln!("  format:       {}", analysis.format);
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_info(config_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let data = match build_data_adapter(&adapter, &Overrides::default()) {
        Ok(d) => d,
        Err(e) => return report_error(&e),
    };

    for flow in [Flow::Export, Flow::Import] {
        match data.get_data_range(flow) {
            Ok(Some((first, last, count))) => {
                println!("{}: {} records, {} to {}", flow, count, first, last);
            }
            Ok(None) => {
                eprintln!("{}: no data found", flow);
            }
            Err(e) => return report_error(&e),
        }
    }
    ExitCode::SUCCESS
}
