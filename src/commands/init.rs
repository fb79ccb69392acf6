use crate::config::LeadmapConfig;
use crate::io;
use anyhow::Result;
use std::path::PathBuf;

pub fn init_config(force: bool) -> Result<()> {
    let config_path = PathBuf::from(".leadmap.toml");

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    let defaults = toml::to_string_pretty(&LeadmapConfig::default())?;
    let content = format!(
        "# Leadmap Configuration\n#\n\
         # Point tables, caps and thresholds for lead scoring. Every field is\n\
         # optional; omitted fields fall back to these defaults.\n\n{defaults}"
    );

    io::write_file(&config_path, &content)?;
    println!("Created .leadmap.toml configuration file");

    Ok(())
}
