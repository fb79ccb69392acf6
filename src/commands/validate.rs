//! Validate personalization rules and the active configuration.

use anyhow::{Context, Result};
use colored::*;
use std::path::{Path, PathBuf};

use crate::config::LeadmapConfig;
use crate::personalization::{default_rules, validate_rules, PersonalizationRule};

pub struct ValidateConfig {
    pub rules: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub fn validate_setup(options: ValidateConfig) -> Result<()> {
    let config = match options.config.as_deref() {
        Some(path) => LeadmapConfig::from_path(path)
            .with_context(|| format!("configuration {} failed validation", path.display()))?,
        None => LeadmapConfig::load_or_default()?,
    };
    config.validate()?;
    println!("{} configuration valid", "ok".green().bold());
    println!(
        "  bucket caps: behavioral {}, demographic {}, engagement quality {}",
        config.behavioral.max_points,
        config.demographic.max_points,
        config.engagement_quality.max_points
    );

    let (rules, source): (Vec<PersonalizationRule>, &str) = match options.rules.as_deref() {
        Some(path) => (load_rules_file(path)?, "file"),
        None => (default_rules().to_vec(), "built-in"),
    };
    validate_rules(&rules)?;
    println!(
        "{} {} rule set valid ({} rules, {} active)",
        "ok".green().bold(),
        source,
        rules.len(),
        rules.iter().filter(|r| r.active).count()
    );

    Ok(())
}

fn load_rules_file(path: &Path) -> Result<Vec<PersonalizationRule>> {
    let content = crate::io::read_file(path)?;
    let rules: Vec<PersonalizationRule> = serde_json::from_str(&content)
        .with_context(|| format!("invalid rules file {}", path.display()))?;
    Ok(rules)
}
