//! CLI integration tests for the scan command orchestration.
//!
//! Tests cover:
//! - Workflow and setup construction from INI (build_workflow, build_setups)
//! - Symbol resolution (resolve_symbols)
//! - `scan`, `validate`, `list` and `parse-rule` through `cli::run`
//!   with INI and CSV fixtures on disk
//! - Result filters on `scan` (signal, pattern, setup)

mod common;

use common::*;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tidescan::adapters::csv_adapter::CsvAdapter;
use tidescan::adapters::file_config_adapter::FileConfigAdapter;
use tidescan::cli::{self, Cli, Command, OutputFormat};
use tidescan::domain::error::ScanError;
use tidescan::domain::workflow::{SetupMode, Workflow};

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn same_code(actual: ExitCode, expected: u8) -> bool {
    format!("{actual:?}") == format!("{:?}", ExitCode::from(expected))
}

fn data_dir() -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().unwrap();
    fs::write(
        dir.path().join("BHP_1d.csv"),
        bars_to_csv(&bars_from_closes(&declining_then_jump())),
    )
    .unwrap();
    fs::write(
        dir.path().join("CBA_1d.csv"),
        bars_to_csv(&bars_from_closes(&rising_then_drop())),
    )
    .unwrap();
    dir
}

const VALID_INI: &str = r#"
[workflow]
name = Swing Scanner
indicators = Yoda, RSI, MACD
patterns = Double_Bottom, Flag
setups = Momentum_Long, Tide_Trend
timeframes = Wave:4h, Tide:1d
setup_mode = signal
max_workers = 2

[setup:Tide_Trend]
description = Daily trend with momentum
Tide = RSI > 50 AND Close > SMA
Wave = MACD > 0
logic = Tide AND Wave
"#;

mod config_loading {
    use super::*;

    #[test]
    fn build_workflow_from_ini() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let workflow = cli::build_workflow(&adapter).unwrap();

        assert_eq!(workflow.name, "Swing Scanner");
        assert_eq!(workflow.indicators, vec!["Yoda", "RSI", "MACD"]);
        assert_eq!(workflow.patterns, vec!["Double_Bottom", "Flag"]);
        assert_eq!(workflow.setups, vec!["Momentum_Long", "Tide_Trend"]);
        assert_eq!(workflow.interval_for("Wave"), Some("4h"));
        assert_eq!(workflow.interval_for("Tide"), Some("1d"));
        assert_eq!(workflow.interval_for("SuperTide"), None);
        assert_eq!(workflow.setup_mode, SetupMode::Signal);
    }

    #[test]
    fn build_workflow_uses_defaults() {
        let adapter = FileConfigAdapter::from_string("[workflow]\nsetup_mode = Full\n").unwrap();
        let workflow = cli::build_workflow(&adapter).unwrap();
        let defaults = Workflow::default();

        assert_eq!(workflow.name, defaults.name);
        assert_eq!(workflow.indicators, defaults.indicators);
        assert_eq!(workflow.timeframes, defaults.timeframes);
        assert_eq!(workflow.setup_mode, SetupMode::Full);
    }

    #[test]
    fn build_workflow_rejects_bad_timeframes() {
        let adapter =
            FileConfigAdapter::from_string("[workflow]\ntimeframes = Wave-4h\n").unwrap();
        assert!(matches!(
            cli::build_workflow(&adapter),
            Err(ScanError::ConfigInvalid { key, .. }) if key == "timeframes"
        ));
    }

    #[test]
    fn scan_settings_from_ini() {
        let adapter =
            FileConfigAdapter::from_string("[workflow]\nparallel = no\nmax_workers = 3\n")
                .unwrap();
        let settings = cli::build_scan_settings(&adapter);
        assert!(!settings.parallel);
        assert_eq!(settings.max_workers, 3);

        let adapter = FileConfigAdapter::from_string("[workflow]\nname = Plain\n").unwrap();
        assert_eq!(cli::build_scan_settings(&adapter), cli::ScanSettings::default());

        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        assert_eq!(cli::build_scan_settings(&adapter).max_workers, 2);
    }

    #[test]
    fn build_setups_adds_config_sections() {
        let adapter = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let setups = cli::build_setups(&adapter).unwrap();

        assert!(setups.contains("Momentum_Long"));
        let setup = setups.get("Tide_Trend").unwrap();
        assert_eq!(setup.description, "Daily trend with momentum");
        assert_eq!(setup.logic.to_string(), "Tide AND Wave");
        assert_eq!(setup.rules_for("Tide").unwrap().len(), 1);
        assert_eq!(setup.rules_for("Tide").unwrap()[0].to_string(), "(RSI > 50 AND Close > SMA)");
        assert!(setup.rules_for("Wave").is_some());
    }

    #[test]
    fn setup_timeframes_keep_declaration_order() {
        let ini = "[setup:Stacked]\nSuperTide = Close > SMA\nWave = RSI > 50\nTide = MACD > 0\nlogic = Wave AND Tide AND SuperTide\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        let setups = cli::build_setups(&adapter).unwrap();

        let labels: Vec<&str> = setups
            .get("Stacked")
            .unwrap()
            .timeframes
            .iter()
            .map(|(label, _)| label.as_str())
            .collect();
        assert_eq!(labels, vec!["SuperTide", "Wave", "Tide"]);
    }

    #[test]
    fn build_setups_reports_bad_rule() {
        let ini = "[setup:Broken]\nTide = RSI 50\nlogic = Tide\n";
        let adapter = FileConfigAdapter::from_string(ini).unwrap();
        match cli::build_setups(&adapter) {
            Err(code) => assert!(same_code(code, 4)),
            Ok(_) => panic!("expected rule parse failure"),
        }
    }
}

mod symbol_resolution {
    use super::*;

    #[test]
    fn explicit_symbols_win() {
        let dir = data_dir();
        let data = CsvAdapter::new(dir.path().to_path_buf());
        let symbols =
            cli::resolve_symbols(Some("bhp, cba\nbhp"), None, &data, &Workflow::default())
                .unwrap();
        assert_eq!(symbols, vec!["BHP", "CBA"]);
    }

    #[test]
    fn symbols_file_is_read() {
        let dir = data_dir();
        let data = CsvAdapter::new(dir.path().to_path_buf());
        let file = write_temp_ini("WBC\nNAB\nWAYTOOLONGSYMBOL\n");
        let path = PathBuf::from(file.path());
        let symbols =
            cli::resolve_symbols(None, Some(&path), &data, &Workflow::default()).unwrap();
        assert_eq!(symbols, vec!["WBC", "NAB"]);
    }

    #[test]
    fn falls_back_to_data_directory() {
        let dir = data_dir();
        let data = CsvAdapter::new(dir.path().to_path_buf());
        let symbols = cli::resolve_symbols(None, None, &data, &Workflow::default()).unwrap();
        assert_eq!(symbols, vec!["BHP", "CBA"]);
    }

    #[test]
    fn empty_symbol_list_fails() {
        let dir = data_dir();
        let data = CsvAdapter::new(dir.path().to_path_buf());
        match cli::resolve_symbols(Some(" , "), None, &data, &Workflow::default()) {
            Err(code) => assert!(same_code(code, 2)),
            Ok(s) => panic!("expected failure, got {s:?}"),
        }
    }
}

mod commands {
    use super::*;

    fn scan(
        config: Option<PathBuf>,
        data: &tempfile::TempDir,
        symbols: Option<&str>,
        format: OutputFormat,
        output: PathBuf,
        sequential: bool,
    ) -> ExitCode {
        scan_filtered(config, data, symbols, format, output, sequential, &[])
    }

    /// `filters` are (flag, value) pairs parsed the way the command line is.
    fn scan_filtered(
        config: Option<PathBuf>,
        data: &tempfile::TempDir,
        symbols: Option<&str>,
        format: OutputFormat,
        output: PathBuf,
        sequential: bool,
        filters: &[(&str, &str)],
    ) -> ExitCode {
        let value = |flag: &str| {
            filters
                .iter()
                .find(|(f, _)| *f == flag)
                .map(|(_, v)| v.to_string())
        };
        cli::run(Cli {
            command: Command::Scan {
                config,
                data_dir: data.path().to_path_buf(),
                symbols: symbols.map(str::to_string),
                symbols_file: None,
                format,
                output: Some(output),
                sequential,
                signal: value("signal").map(|v| v.parse().unwrap()),
                pattern: value("pattern").map(|v| v.parse().unwrap()),
                setup: value("setup").map(|v| v.parse().unwrap()),
            },
        })
    }

    fn json_symbols(value: &serde_json::Value) -> Vec<String> {
        value["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["symbol"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn scan_filters_by_signal_and_keeps_batch_summary() {
        let data = data_dir();
        let out = data.path().join("out.json");
        let code = scan_filtered(
            None,
            &data,
            Some("BHP,CBA,ZZZ"),
            OutputFormat::Json,
            out.clone(),
            true,
            &[("signal", "sell")],
        );
        assert!(same_code(code, 0));

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json_symbols(&value), vec!["CBA"]);
        assert_eq!(value["summary"]["total"], 3);
        assert_eq!(value["summary"]["buy"], 1);
        assert_eq!(value["summary"]["errors"], 1);
    }

    #[test]
    fn scan_filters_by_setup() {
        let data = data_dir();
        let out = data.path().join("out.json");
        let code = scan_filtered(
            None,
            &data,
            Some("BHP,CBA"),
            OutputFormat::Json,
            out.clone(),
            true,
            &[("setup", "Momentum_Long")],
        );
        assert!(same_code(code, 0));
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json_symbols(&value), vec!["BHP"]);

        let code = scan_filtered(
            None,
            &data,
            Some("BHP,CBA"),
            OutputFormat::Json,
            out.clone(),
            true,
            &[("setup", "none")],
        );
        assert!(same_code(code, 0));
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json_symbols(&value), vec!["CBA"]);
    }

    #[test]
    fn scan_filters_by_pattern() {
        let data = data_dir();
        let ini = write_temp_ini(VALID_INI);
        let out = data.path().join("out.csv");
        let code = scan_filtered(
            Some(PathBuf::from(ini.path())),
            &data,
            Some("BHP,CBA"),
            OutputFormat::Csv,
            out.clone(),
            true,
            &[("pattern", "none"), ("signal", "BUY")],
        );
        assert!(same_code(code, 0));

        let mut rdr = csv::Reader::from_path(&out).unwrap();
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(0), Some("BHP"));
        assert_eq!(rows[0].get(6), Some(""));
    }

    #[test]
    fn filtered_out_failures_still_set_exit_code() {
        let data = data_dir();
        let out = data.path().join("out.txt");
        let code = scan_filtered(
            None,
            &data,
            Some("NOPE"),
            OutputFormat::Table,
            out.clone(),
            true,
            &[("pattern", "any")],
        );
        assert!(same_code(code, 3));
        assert!(!fs::read_to_string(&out).unwrap().contains("ERROR"));
    }

    #[test]
    fn scan_writes_json() {
        let data = data_dir();
        let ini = write_temp_ini(VALID_INI);
        let out = data.path().join("out.json");
        let code = scan(
            Some(PathBuf::from(ini.path())),
            &data,
            Some("BHP,CBA,ZZZ"),
            OutputFormat::Json,
            out.clone(),
            false,
        );
        assert!(same_code(code, 0));

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["workflow"], "Swing Scanner");
        assert_eq!(value["summary"]["total"], 3);
        assert_eq!(value["summary"]["errors"], 1);
        assert_eq!(value["results"][0]["signal"], "BUY");
        assert_eq!(value["results"][0]["primary_timeframe"], "Tide");
        assert_eq!(value["results"][0]["setups"][0], "Momentum_Long");
        assert_eq!(value["results"][1]["signal"], "SELL");
        assert_eq!(value["results"][2]["symbol"], "ZZZ");
    }

    #[test]
    fn scan_writes_csv_with_default_workflow() {
        let data = data_dir();
        let out = data.path().join("out.csv");
        let code = scan(None, &data, None, OutputFormat::Csv, out.clone(), true);
        assert!(same_code(code, 0));

        let mut rdr = csv::Reader::from_path(&out).unwrap();
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(0), Some("BHP"));
        assert_eq!(rows[0].get(1), Some("BUY"));
        assert_eq!(rows[1].get(0), Some("CBA"));
        assert_eq!(rows[1].get(1), Some("SELL"));
    }

    #[test]
    fn scan_with_only_failures_returns_error_code() {
        let data = data_dir();
        let out = data.path().join("out.txt");
        let code = scan(None, &data, Some("NOPE"), OutputFormat::Table, out.clone(), true);
        assert!(same_code(code, 3));
        assert!(fs::read_to_string(&out).unwrap().contains("ERROR"));
    }

    #[test]
    fn scan_rejects_unknown_indicator() {
        let data = data_dir();
        let ini = write_temp_ini("[workflow]\nindicators = Yoda, Astrology\n");
        let out = data.path().join("out.txt");
        let code = scan(
            Some(PathBuf::from(ini.path())),
            &data,
            Some("BHP"),
            OutputFormat::Table,
            out.clone(),
            true,
        );
        assert!(same_code(code, 2));
        assert!(!out.exists());
    }

    #[test]
    fn validate_accepts_valid_config() {
        let ini = write_temp_ini(VALID_INI);
        let code = cli::run(Cli {
            command: Command::Validate {
                config: PathBuf::from(ini.path()),
            },
        });
        assert!(same_code(code, 0));
    }

    #[test]
    fn validate_rejects_unknown_setup() {
        let ini = write_temp_ini("[workflow]\nsetups = Moonshot\n");
        let code = cli::run(Cli {
            command: Command::Validate {
                config: PathBuf::from(ini.path()),
            },
        });
        assert!(same_code(code, 2));
    }

    #[test]
    fn validate_missing_file_fails() {
        let code = cli::run(Cli {
            command: Command::Validate {
                config: PathBuf::from("/nonexistent/path/workflow.ini"),
            },
        });
        assert!(same_code(code, 2));
    }

    #[test]
    fn list_succeeds() {
        let code = cli::run(Cli {
            command: Command::List { config: None },
        });
        assert!(same_code(code, 0));
    }

    #[test]
    fn parse_rule_exit_codes() {
        let ok = cli::run(Cli {
            command: Command::ParseRule {
                rule: "RSI > 50 AND Close > SMA".into(),
            },
        });
        assert!(same_code(ok, 0));

        let bad = cli::run(Cli {
            command: Command::ParseRule {
                rule: "RSI 50".into(),
            },
        });
        assert!(same_code(bad, 4));
    }
}
