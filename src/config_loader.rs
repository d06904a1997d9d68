use std::fs::File;
use std::path::Path;

use color_eyre::Result;
use log::info;

use crate::oid_config::OidConfig;

/// Load and validate an identifier configuration file.
///
/// `.yaml`/`.yml` files are parsed as YAML, anything else as JSON.
pub fn load_oid_config(config_path: &Path) -> Result<OidConfig> {
    info!("Loading identifier configuration from: {:?}", config_path);

    let file = File::open(config_path)?;

    let is_yaml = config_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    let config: OidConfig = if is_yaml {
        serde_yaml::from_reader(file)?
    } else {
        serde_json::from_reader(file)?
    };

    config.validate()?;

    Ok(config)
}
