//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::scan_output;
use crate::domain::config_validation::{
    setup_rule_keys, validate_workflow, validate_workflow_config, workflow_list,
    SETUP_SECTION_PREFIX, WORKFLOW_SECTION,
};
use crate::domain::error::ScanError;
use crate::domain::registry::Registry;
use crate::domain::result_filter::{Membership, ResultFilter};
use crate::domain::rule::RuleNode;
use crate::domain::rule_parser::parse_text_rule;
use crate::domain::scanner::{scan_batch, ScanContext, ScanRecord, ScanSummary, Signal};
use crate::domain::setup::{LogicExpr, Setup, SetupLibrary};
use crate::domain::symbols::parse_symbols;
use crate::domain::workflow::{parse_timeframes, SetupMode, Workflow};
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "tidescan", about = "Multi-timeframe technical-analysis scanner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan symbols and print signals
    Scan {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory holding <SYMBOL>_<interval>.csv files
        #[arg(short, long)]
        data_dir: PathBuf,
        /// Comma separated symbols
        #[arg(short, long)]
        symbols: Option<String>,
        /// File with one symbol per line (or comma separated)
        #[arg(long)]
        symbols_file: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Scan one symbol at a time
        #[arg(long)]
        sequential: bool,
        /// Only show results with this signal (BUY, SELL or NEUTRAL)
        #[arg(long)]
        signal: Option<Signal>,
        /// Only show results with any pattern, none, or the named pattern
        #[arg(long)]
        pattern: Option<Membership>,
        /// Only show results with any setup, none, or the named setup
        #[arg(long)]
        setup: Option<Membership>,
    },
    /// Validate a workflow configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List indicators, patterns and setups
    List {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Parse a text rule and print it as JSON
    ParseRule { rule: String },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Scan {
            config,
            data_dir,
            symbols,
            symbols_file,
            format,
            output,
            sequential,
            signal,
            pattern,
            setup,
        } => run_scan(
            config.as_ref(),
            &data_dir,
            symbols.as_deref(),
            symbols_file.as_ref(),
            format,
            output.as_ref(),
            sequential,
            &ResultFilter {
                signal,
                pattern,
                setup,
            },
        ),
        Command::Validate { config } => run_validate(&config),
        Command::List { config } => run_list(config.as_ref()),
        Command::ParseRule { rule } => run_parse_rule(&rule),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = ScanError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Workflow from `[workflow]`; unset keys keep the default workflow's values.
pub fn build_workflow(config: &dyn ConfigPort) -> Result<Workflow, ScanError> {
    let defaults = Workflow::default();

    let timeframes = match config.get_string(WORKFLOW_SECTION, "timeframes") {
        Some(s) => parse_timeframes(&s)?,
        None => defaults.timeframes,
    };
    let setup_mode = match config.get_string(WORKFLOW_SECTION, "setup_mode") {
        Some(s) => s
            .parse::<SetupMode>()
            .map_err(|reason| ScanError::ConfigInvalid {
                section: WORKFLOW_SECTION.into(),
                key: "setup_mode".into(),
                reason,
            })?,
        None => defaults.setup_mode,
    };

    Ok(Workflow {
        name: config
            .get_string(WORKFLOW_SECTION, "name")
            .map(|s| s.trim().to_string())
            .unwrap_or(defaults.name),
        indicators: workflow_list(config, "indicators").unwrap_or(defaults.indicators),
        patterns: workflow_list(config, "patterns").unwrap_or(defaults.patterns),
        setups: workflow_list(config, "setups").unwrap_or(defaults.setups),
        timeframes,
        setup_mode,
    })
}

/// Batch execution settings from `[workflow]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    pub parallel: bool,
    /// Worker threads; 0 uses rayon's default pool.
    pub max_workers: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            parallel: true,
            max_workers: 0,
        }
    }
}

pub fn build_scan_settings(config: &dyn ConfigPort) -> ScanSettings {
    ScanSettings {
        parallel: config.get_bool(WORKFLOW_SECTION, "parallel", true),
        max_workers: config.get_int(WORKFLOW_SECTION, "max_workers", 0).max(0) as usize,
    }
}

/// Preset setups plus every `[setup:Name]` section, which replaces a preset
/// of the same name.
pub fn build_setups(config: &dyn ConfigPort) -> Result<SetupLibrary, ExitCode> {
    let mut library = SetupLibrary::with_presets();

    for section in config.sections() {
        let Some(name) = section.strip_prefix(SETUP_SECTION_PREFIX) else {
            continue;
        };
        let name = name.trim();

        let mut timeframes: Vec<(String, Vec<RuleNode>)> = Vec::new();
        for label in setup_rule_keys(config, &section) {
            let text = config.get_string(&section, &label).unwrap_or_default();
            let node = match parse_text_rule(&text) {
                Ok(n) => n,
                Err(e) => {
                    eprintln!(
                        "error: failed to parse [{}] {}:\n{}",
                        section,
                        label,
                        e.display_with_context(&text)
                    );
                    return Err(ExitCode::from(4));
                }
            };
            timeframes.push((label, vec![node]));
        }

        let logic_text = config.get_string(&section, "logic").unwrap_or_default();
        let logic = match LogicExpr::parse(&logic_text) {
            Ok(l) => l,
            Err(e) => {
                eprintln!(
                    "error: failed to parse [{}] logic:\n{}",
                    section,
                    e.display_with_context(&logic_text)
                );
                return Err(ExitCode::from(4));
            }
        };

        library.insert(Setup {
            name: name.to_string(),
            description: config
                .get_string(&section, "description")
                .unwrap_or_default(),
            timeframes,
            logic,
        });
    }

    Ok(library)
}

/// Symbols from `--symbols`, else `--symbols-file`, else every symbol that has
/// a file for the workflow's primary interval in the data directory.
pub fn resolve_symbols(
    symbols: Option<&str>,
    symbols_file: Option<&PathBuf>,
    data: &CsvAdapter,
    workflow: &Workflow,
) -> Result<Vec<String>, ExitCode> {
    let input = match (symbols, symbols_file) {
        (Some(s), _) => s.to_string(),
        (None, Some(path)) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("error: failed to read {}: {}", path.display(), e);
                return Err(ExitCode::from(1));
            }
        },
        (None, None) => {
            let interval = workflow
                .interval_for("Tide")
                .or_else(|| workflow.timeframes.first().map(|t| t.interval.as_str()))
                .unwrap_or("1d");
            match data.list_symbols(interval) {
                Ok(list) => list.join(","),
                Err(e) => {
                    eprintln!("error: {e}");
                    return Err((&e).into());
                }
            }
        }
    };

    match parse_symbols(&input) {
        Ok(list) => {
            if !list.rejected.is_empty() {
                eprintln!(
                    "warning: ignoring invalid symbols: {}",
                    list.rejected.join(", ")
                );
            }
            Ok(list.symbols)
        }
        Err(e) => {
            eprintln!("error: {e}");
            Err(ExitCode::from(2))
        }
    }
}

/// Config, setups and workflow, all validated. Without a path the default
/// workflow and presets are used.
fn prepare(
    config_path: Option<&PathBuf>,
) -> Result<(Workflow, SetupLibrary, ScanSettings), ExitCode> {
    let (workflow, setups, settings) = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            let adapter = load_config(path)?;
            if let Err(e) = validate_workflow_config(&adapter) {
                eprintln!("error: {e}");
                return Err((&e).into());
            }
            let setups = build_setups(&adapter)?;
            let workflow = build_workflow(&adapter).map_err(|e| {
                eprintln!("error: {e}");
                ExitCode::from(&e)
            })?;
            (workflow, setups, build_scan_settings(&adapter))
        }
        None => (
            Workflow::default(),
            SetupLibrary::with_presets(),
            ScanSettings::default(),
        ),
    };

    if let Err(e) = validate_workflow(&workflow, &Registry::with_builtins(), &setups) {
        eprintln!("error: {e}");
        return Err((&e).into());
    }
    Ok((workflow, setups, settings))
}

fn render(
    format: OutputFormat,
    workflow: &Workflow,
    summary: &ScanSummary,
    records: &[ScanRecord],
) -> Result<String, ScanError> {
    match format {
        OutputFormat::Table => Ok(scan_output::render_table(records)),
        OutputFormat::Csv => scan_output::render_csv(records),
        OutputFormat::Json => scan_output::render_json(&workflow.name, summary, records),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_scan(
    config_path: Option<&PathBuf>,
    data_dir: &PathBuf,
    symbols: Option<&str>,
    symbols_file: Option<&PathBuf>,
    format: OutputFormat,
    output_path: Option<&PathBuf>,
    sequential: bool,
    filter: &ResultFilter,
) -> ExitCode {
    // Stage 1: Load and validate workflow
    let (workflow, setups, settings) = match prepare(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };
    eprintln!("Workflow: {}", workflow.name);

    // Stage 2: Resolve symbols
    let data = CsvAdapter::new(data_dir.clone());
    let symbols = match resolve_symbols(symbols, symbols_file, &data, &workflow) {
        Ok(s) => s,
        Err(code) => return code,
    };

    // Stage 3: Scan
    let timeframes: Vec<String> = workflow
        .timeframes
        .iter()
        .map(|t| format!("{}={}", t.label, t.interval))
        .collect();
    eprintln!(
        "Scanning {} symbols over {}...",
        symbols.len(),
        timeframes.join(", ")
    );

    let registry = Registry::with_builtins();
    let ctx = ScanContext::new(&workflow, &data, &registry, &setups);
    let progress = |done: usize, total: usize, symbol: &str| {
        eprintln!("  [{}/{}] {}", done, total, symbol);
    };
    let parallel = settings.parallel && !sequential;
    let records = if parallel && settings.max_workers > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(settings.max_workers)
            .build()
        {
            Ok(pool) => pool.install(|| scan_batch(&ctx, &symbols, &progress, true)),
            Err(e) => {
                eprintln!("error: failed to start worker pool: {e}");
                return ExitCode::from(1);
            }
        }
    } else {
        scan_batch(&ctx, &symbols, &progress, parallel)
    };

    // Stage 4: Filter and write results
    let summary = ScanSummary::from_records(&records);
    let failure = match records.first() {
        Some(ScanRecord { result: Err(e), .. }) if summary.errors == summary.total => {
            Some(ExitCode::from(e))
        }
        _ => None,
    };
    let shown = filter.apply(records);
    if !filter.is_empty() {
        eprintln!("Showing {} of {} results", shown.len(), summary.total);
    }

    let rendered = match render(format, &workflow, &summary, &shown) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &rendered) {
                eprintln!("error: failed to write {}: {}", path.display(), e);
                return ExitCode::from(1);
            }
            eprintln!("\nResults written to: {}", path.display());
        }
        None => print!("{rendered}"),
    }

    eprintln!("\n{}", scan_output::render_summary(&summary));

    failure.unwrap_or(ExitCode::SUCCESS)
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let (workflow, setups, settings) = match prepare(Some(config_path)) {
        Ok(p) => p,
        Err(code) => return code,
    };

    eprintln!("\nWorkflow: {}", workflow.name);
    eprintln!("  indicators: {}", workflow.indicators.join(", "));
    eprintln!("  patterns:   {}", workflow.patterns.join(", "));
    eprintln!("  setup mode: {}", workflow.setup_mode);
    eprintln!(
        "  execution:  {}",
        match (settings.parallel, settings.max_workers) {
            (false, _) => "sequential".to_string(),
            (true, 0) => "parallel".to_string(),
            (true, n) => format!("parallel, {} workers", n),
        }
    );
    for tf in &workflow.timeframes {
        eprintln!("  timeframe:  {} = {}", tf.label, tf.interval);
    }
    for name in &workflow.setups {
        if let Some(setup) = setups.get(name) {
            eprintln!("\nSetup {}:", setup.name);
            for (label, rules) in &setup.timeframes {
                for rule in rules {
                    eprintln!("  {}: {}", label, rule);
                }
            }
            eprintln!("  logic: {}", setup.logic);
        }
    }

    eprintln!("\nWorkflow configuration is valid.");
    ExitCode::SUCCESS
}

fn run_list(config_path: Option<&PathBuf>) -> ExitCode {
    let setups = match config_path {
        Some(path) => {
            let adapter = match load_config(path) {
                Ok(a) => a,
                Err(code) => return code,
            };
            match build_setups(&adapter) {
                Ok(s) => s,
                Err(code) => return code,
            }
        }
        None => SetupLibrary::with_presets(),
    };
    let registry = Registry::with_builtins();

    let mut indicator_ids: Vec<&str> = registry.indicator_ids().collect();
    indicator_ids.sort();
    println!("Indicators:");
    for id in indicator_ids {
        let columns: Vec<String> = registry
            .indicator(id)
            .map(|i| i.outputs().into_iter().map(|c| c.name).collect())
            .unwrap_or_default();
        println!("  {:<14} {}", id, columns.join(", "));
    }

    let mut pattern_ids: Vec<&str> = registry.pattern_ids().collect();
    pattern_ids.sort();
    println!("\nPatterns:");
    for id in pattern_ids {
        println!("  {}", id);
    }

    println!("\nSetups:");
    for setup in setups.iter() {
        println!("  {:<14} {}", setup.name, setup.logic);
    }
    ExitCode::SUCCESS
}

fn run_parse_rule(rule: &str) -> ExitCode {
    let node = match parse_text_rule(rule) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("error: {}", e.display_with_context(rule));
            return (&ScanError::from(e)).into();
        }
    };
    match serde_json::to_string_pretty(&node) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(1)
        }
    }
}
