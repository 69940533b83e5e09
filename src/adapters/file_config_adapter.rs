//! INI file configuration adapter.
//!
//! Section and key names are case-sensitive so that `[setup:Momentum_Long]`
//! keeps the setup name as written.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new_cs();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new_cs();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }

    fn sections(&self) -> Vec<String> {
        self.config.sections()
    }

    fn keys(&self, section: &str) -> Vec<String> {
        self.config
            .get_map_ref()
            .get(section)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const WORKFLOW: &str = r#"
[workflow]
name = Swing Scanner
indicators = Yoda, RSI, MACD
timeframes = Wave:4h, Tide:1d
max_workers = 4
parallel = yes

[setup:Tide_Only]
description = daily momentum
Tide = RSI > 50 AND Close > SMA
logic = Tide
"#;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_workflow() {
        let adapter = FileConfigAdapter::from_string(WORKFLOW).unwrap();
        assert_eq!(
            adapter.get_string("workflow", "name"),
            Some("Swing Scanner".to_string())
        );
        assert_eq!(
            adapter.get_string("workflow", "timeframes"),
            Some("Wave:4h, Tide:1d".to_string())
        );
    }

    #[test]
    fn section_names_keep_case() {
        let adapter = FileConfigAdapter::from_string(WORKFLOW).unwrap();
        let sections = adapter.sections();
        assert!(sections.contains(&"setup:Tide_Only".to_string()));
        assert_eq!(
            adapter.get_string("setup:Tide_Only", "logic"),
            Some("Tide".to_string())
        );
        assert_eq!(adapter.get_string("setup:tide_only", "logic"), None);
        assert_eq!(
            adapter.keys("setup:Tide_Only"),
            vec!["description", "Tide", "logic"]
        );
        assert!(adapter.keys("missing").is_empty());
    }

    #[test]
    fn sections_and_keys_follow_file_order() {
        let adapter = FileConfigAdapter::from_string(
            "[workflow]
name = x
[setup:B]
Wave = RSI > 50
Tide = RSI > 40
SuperTide = RSI > 30
[setup:A]
Tide = RSI > 50
",
        )
        .unwrap();
        assert_eq!(adapter.sections(), vec!["workflow", "setup:B", "setup:A"]);
        assert_eq!(adapter.keys("setup:B"), vec!["Wave", "Tide", "SuperTide"]);
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string(WORKFLOW).unwrap();
        assert_eq!(adapter.get_string("workflow", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_values() {
        let adapter = FileConfigAdapter::from_string(WORKFLOW).unwrap();
        assert_eq!(adapter.get_int("workflow", "max_workers", 0), 4);
        assert_eq!(adapter.get_int("workflow", "missing", 42), 42);
        assert_eq!(adapter.get_int("workflow", "name", 42), 42);
    }

    #[test]
    fn get_bool_values() {
        let adapter =
            FileConfigAdapter::from_string("[workflow]\na = true\nb = no\nc = maybe\n").unwrap();
        assert!(adapter.get_bool("workflow", "a", false));
        assert!(!adapter.get_bool("workflow", "b", true));
        assert!(adapter.get_bool("workflow", "c", true));
        assert!(!adapter.get_bool("workflow", "missing", false));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config(WORKFLOW);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("workflow", "indicators"),
            Some("Yoda, RSI, MACD".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/workflow.ini");
        assert!(result.is_err());
    }
}
