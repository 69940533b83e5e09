//! Configuration validation.
//!
//! [`validate_workflow_config`] checks the raw INI fields before anything is
//! built from them; [`validate_workflow`] checks a built workflow against the
//! indicator/pattern registry and the setup library.

use crate::domain::error::ScanError;
use crate::domain::registry::Registry;
use crate::domain::setup::SetupLibrary;
use crate::domain::workflow::{parse_list, parse_timeframes, SetupMode, Workflow};
use crate::ports::config_port::ConfigPort;

pub const WORKFLOW_SECTION: &str = "workflow";
pub const SETUP_SECTION_PREFIX: &str = "setup:";
pub const SETUP_RESERVED_KEYS: [&str; 2] = ["description", "logic"];

pub fn validate_workflow_config(config: &dyn ConfigPort) -> Result<(), ScanError> {
    validate_name(config)?;
    validate_timeframes(config)?;
    validate_setup_mode(config)?;
    validate_max_workers(config)?;
    validate_setup_sections(config)?;
    Ok(())
}

pub fn validate_workflow(
    workflow: &Workflow,
    registry: &Registry,
    setups: &SetupLibrary,
) -> Result<(), ScanError> {
    validate_indicator_ids(workflow, registry)?;
    validate_pattern_ids(workflow, registry)?;
    validate_setup_names(workflow, setups)?;
    Ok(())
}

fn validate_name(config: &dyn ConfigPort) -> Result<(), ScanError> {
    match config.get_string(WORKFLOW_SECTION, "name") {
        Some(s) if s.trim().is_empty() => Err(ScanError::ConfigInvalid {
            section: WORKFLOW_SECTION.to_string(),
            key: "name".to_string(),
            reason: "name must not be blank".to_string(),
        }),
        _ => Ok(()),
    }
}

fn validate_timeframes(config: &dyn ConfigPort) -> Result<(), ScanError> {
    match config.get_string(WORKFLOW_SECTION, "timeframes") {
        Some(s) => parse_timeframes(&s).map(|_| ()),
        None => Ok(()),
    }
}

fn validate_setup_mode(config: &dyn ConfigPort) -> Result<(), ScanError> {
    match config.get_string(WORKFLOW_SECTION, "setup_mode") {
        Some(s) => s
            .parse::<SetupMode>()
            .map(|_| ())
            .map_err(|reason| ScanError::ConfigInvalid {
                section: WORKFLOW_SECTION.to_string(),
                key: "setup_mode".to_string(),
                reason,
            }),
        None => Ok(()),
    }
}

fn validate_max_workers(config: &dyn ConfigPort) -> Result<(), ScanError> {
    match config.get_string(WORKFLOW_SECTION, "max_workers") {
        Some(s) if s.trim().parse::<usize>().is_err() => Err(ScanError::ConfigInvalid {
            section: WORKFLOW_SECTION.to_string(),
            key: "max_workers".to_string(),
            reason: format!("expected a non-negative integer, found '{}'", s.trim()),
        }),
        _ => Ok(()),
    }
}

fn validate_setup_sections(config: &dyn ConfigPort) -> Result<(), ScanError> {
    for section in config.sections() {
        let Some(name) = section.strip_prefix(SETUP_SECTION_PREFIX) else {
            continue;
        };
        if name.trim().is_empty() {
            return Err(ScanError::ConfigInvalid {
                section: section.clone(),
                key: "name".to_string(),
                reason: "setup section needs a name after 'setup:'".to_string(),
            });
        }
        match config.get_string(&section, "logic") {
            Some(s) if !s.trim().is_empty() => {}
            _ => {
                return Err(ScanError::ConfigInvalid {
                    section: section.clone(),
                    key: "logic".to_string(),
                    reason: "logic is required".to_string(),
                });
            }
        }
        if setup_rule_keys(config, &section).is_empty() {
            return Err(ScanError::ConfigInvalid {
                section: section.clone(),
                key: "rules".to_string(),
                reason: "at least one 'Label = rule' entry is required".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_indicator_ids(workflow: &Workflow, registry: &Registry) -> Result<(), ScanError> {
    match workflow
        .indicators
        .iter()
        .find(|id| registry.indicator(id).is_none())
    {
        Some(id) => Err(ScanError::ConfigInvalid {
            section: WORKFLOW_SECTION.to_string(),
            key: "indicators".to_string(),
            reason: format!("unknown indicator '{}'", id),
        }),
        None => Ok(()),
    }
}

fn validate_pattern_ids(workflow: &Workflow, registry: &Registry) -> Result<(), ScanError> {
    match workflow
        .patterns
        .iter()
        .find(|id| registry.pattern(id).is_none())
    {
        Some(id) => Err(ScanError::ConfigInvalid {
            section: WORKFLOW_SECTION.to_string(),
            key: "patterns".to_string(),
            reason: format!("unknown pattern '{}'", id),
        }),
        None => Ok(()),
    }
}

fn validate_setup_names(workflow: &Workflow, setups: &SetupLibrary) -> Result<(), ScanError> {
    for name in &workflow.setups {
        let Some(setup) = setups.get(name) else {
            return Err(ScanError::UnknownSetup { name: name.clone() });
        };
        if workflow.setup_mode != SetupMode::Full {
            continue;
        }
        if let Some(label) = setup
            .logic
            .labels()
            .into_iter()
            .find(|label| workflow.interval_for(label).is_none())
        {
            return Err(ScanError::ConfigInvalid {
                section: WORKFLOW_SECTION.to_string(),
                key: "setups".to_string(),
                reason: format!(
                    "setup '{}' uses timeframe '{}' which the workflow does not scan",
                    name, label
                ),
            });
        }
    }
    Ok(())
}

/// Keys of a `[setup:Name]` section that hold timeframe rules.
pub fn setup_rule_keys(config: &dyn ConfigPort, section: &str) -> Vec<String> {
    config
        .keys(section)
        .into_iter()
        .filter(|k| !SETUP_RESERVED_KEYS.contains(&k.as_str()))
        .collect()
}

/// Comma separated id list under `[workflow] key`, if set.
pub fn workflow_list(config: &dyn ConfigPort, key: &str) -> Option<Vec<String>> {
    config
        .get_string(WORKFLOW_SECTION, key)
        .map(|s| parse_list(&s))
}
