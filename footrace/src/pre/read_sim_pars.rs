use crate::core::race::RaceConfig;
use anyhow::Context;
use std::fs::OpenOptions;
use std::path::Path;

/// read_sim_pars reads the JSON file and decodes it into the race configuration. Without a file,
/// the default configuration is returned.
pub fn read_sim_pars(filepath: Option<&Path>) -> anyhow::Result<RaceConfig> {
    let filepath = match filepath {
        Some(filepath) => filepath,
        None => return Ok(RaceConfig::default()),
    };

    // open file
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;

    // read and parse parameter file content
    let race_config = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;
    Ok(race_config)
}
