use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
};

use crate::{CONFIG_FILE, ConfigSubcommands};

const CONFIG_TEMPLATE: &str = include_str!("../../template/modforge.toml");

pub fn run_config_command(command: ConfigSubcommands) -> Result<(), Box<dyn Error>> {
    match command {
        ConfigSubcommands::Init { force } => {
            let config_path = write_config(Path::new("."), force)?;
            println!("Config file created at {}", config_path.display());
            Ok(())
        }
    }
}

/// Write the config template into `dir`
pub fn write_config(dir: &Path, force: bool) -> Result<PathBuf, Box<dyn Error>> {
    let config_path = dir.join(CONFIG_FILE);
    if config_path.exists() && !force {
        return Err(Box::new(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("A {CONFIG_FILE} file already exists, use --force to rewrite it"),
        )));
    }
    fs::write(&config_path, CONFIG_TEMPLATE).map_err(|e| modforge::Error::io(&config_path, e))?;
    Ok(config_path)
}
