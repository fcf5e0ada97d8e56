use serde::Deserialize;
use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
};

use modforge_codegen::Layout;

use crate::GenerateSubcommandsModule;

pub const CONFIG_FILE: &str = "modforge.toml";

pub fn parse_config<T: serde::de::DeserializeOwned + std::fmt::Debug>(
    config: &str,
) -> Result<T, Box<dyn Error>> {
    let content = fs::read_to_string(config)
        .map_err(|e| modforge::Error::io(config, e))?;
    let parsed_config: T = serde_json::from_str(&content)
        .map_err(|e| modforge::Error::Config(format!("{config}: {e}")))?;
    Ok(parsed_config)
}

/// Contents of `modforge.toml`
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub project: Project,
    pub templates: Templates,
    pub paths: Paths,
    pub generate: Generate,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Project {
    /// Relative to the config file
    pub root: Option<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Templates {
    pub directory: Option<String>,
}

/// Shared files, relative to the project root
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Paths {
    pub routes: Option<String>,
    pub permission_seeder: Option<String>,
    pub navigation: Option<String>,
    pub database_seeder: Option<String>,
    pub models: Option<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Generate {
    pub inference: Option<String>,
    pub view_mode: Option<String>,
}

/// A `modforge.toml` together with the directory it was found in
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoadedConfig {
    pub dir: PathBuf,
    pub config: ProjectConfig,
}

impl LoadedConfig {
    /// Shared file locations, defaults for whatever is not configured
    pub fn layout(&self) -> Layout {
        let paths = &self.config.paths;
        let mut layout = Layout::default();
        let overrides = [
            (&paths.routes, &mut layout.routes),
            (&paths.permission_seeder, &mut layout.permission_seeder),
            (&paths.navigation, &mut layout.navigation),
            (&paths.database_seeder, &mut layout.database_seeder),
            (&paths.models, &mut layout.models_dir),
        ];
        for (configured, target) in overrides {
            if let Some(path) = configured {
                *target = PathBuf::from(path);
            }
        }
        layout
    }

    /// Values acting as defaults of `generate module`, paths resolved
    /// against the directory of the config file
    pub fn generate_defaults(&self) -> GenerateSubcommandsModule {
        let resolve = |path: &String| self.dir.join(path).to_string_lossy().into_owned();
        GenerateSubcommandsModule {
            root: self.config.project.root.as_ref().map(resolve),
            stubs: self.config.templates.directory.as_ref().map(resolve),
            inference: self.config.generate.inference.clone(),
            view_mode: self.config.generate.view_mode.clone(),
            ..Default::default()
        }
    }
}

/// The config file is expected to be in `start` or its parent directory
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    std::iter::once(start)
        .chain(start.parent())
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|path| path.is_file())
}

/// Load the `modforge.toml` nearest to `start`, if there is one
pub fn load_project_config(start: &Path) -> Result<Option<LoadedConfig>, Box<dyn Error>> {
    let Some(config_path) = find_config_file(start) else {
        return Ok(None);
    };
    let file_content =
        fs::read_to_string(&config_path).map_err(|e| modforge::Error::io(&config_path, e))?;
    let config: ProjectConfig = toml::from_str(&file_content).map_err(|e| {
        modforge::Error::Config(format!("{}: {e}", config_path.display()))
    })?;
    let dir = config_path
        .parent()
        .unwrap_or(Path::new("."))
        .to_path_buf();
    Ok(Some(LoadedConfig { dir, config }))
}
