use merge::Merge;
use modforge::{GenerateOptions, InferenceMode, PlanBuilder, ViewMode};
use modforge_codegen::{
    Layout, MaterializeReport, Materializer, Renderer, SpliceStatus, TemplateSource,
    WarningReason,
};
use std::{env, error::Error, path::PathBuf};
use tracing::warn;
use tracing_subscriber::{EnvFilter, prelude::*};

use crate::{
    GenerateSubcommands, GenerateSubcommandsModule, LoadedConfig, load_project_config,
    parse_config,
};

/// Flags first, then the `--config` JSON, then `modforge.toml`, then defaults
fn merge_cli_config_generate_module(
    mut command: GenerateSubcommandsModule,
    project: Option<&LoadedConfig>,
) -> Result<GenerateSubcommandsModule, Box<dyn Error>> {
    let default_values = GenerateSubcommandsModule {
        name: None,
        fields: Some(String::new()),
        relationships: Some(String::new()),
        table_relationships: Some(String::new()),
        table_columns: Some(vec![]),
        searchable: Some(vec![]),
        filterable: Some(vec![]),
        icon: None,
        view_mode: None,
        package: None,
        system_setup: None,
        inference: Some(InferenceMode::default().to_string()),
        config: None,
        root: Some(".".to_owned()),
        stubs: None,
        dry_run: false,
    };

    if let Some(ref config_path) = command.config {
        let config_values = parse_config::<GenerateSubcommandsModule>(config_path)?;
        command.merge(config_values);
    }
    if let Some(project) = project {
        command.merge(project.generate_defaults());
    }
    command.merge(default_values);
    Ok(command)
}

fn generate_options(command: GenerateSubcommandsModule) -> Result<GenerateOptions, Box<dyn Error>> {
    let display_name = command
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or("Entity name is required, pass it as an argument or set `name` in the config")?;
    let view_mode = command
        .view_mode
        .map(|value| {
            value
                .parse::<ViewMode>()
                .map_err(|_| modforge::Error::InvalidOption {
                    option: "view-mode",
                    value,
                })
        })
        .transpose()?;
    let inference = match command.inference {
        Some(value) => value
            .parse::<InferenceMode>()
            .map_err(|_| modforge::Error::InvalidOption {
                option: "inference",
                value,
            })?,
        None => InferenceMode::default(),
    };

    Ok(GenerateOptions {
        display_name,
        fields: command.fields.unwrap_or_default(),
        relationships: command.relationships.unwrap_or_default(),
        table_relationships: command.table_relationships.unwrap_or_default(),
        table_columns: command.table_columns.unwrap_or_default(),
        searchable: command.searchable.unwrap_or_default(),
        filterable: command.filterable.unwrap_or_default(),
        icon: command.icon,
        view_mode,
        package: command.package,
        system_setup: command.system_setup,
        inference,
    })
}

fn init_tracing(verbose: bool) -> Result<(), Box<dyn Error>> {
    if verbose {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .try_init();
    } else {
        let filter_layer = EnvFilter::try_new("modforge=info,modforge_codegen=info")?;
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_level(false)
            .without_time();

        let _ = tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .try_init();
    }
    Ok(())
}

pub fn run_generate_command(
    command: GenerateSubcommands,
    verbose: bool,
) -> Result<(), Box<dyn Error>> {
    match command {
        GenerateSubcommands::Module(command) => {
            init_tracing(verbose)?;
            let project = load_project_config(&env::current_dir()?)?;
            let command = merge_cli_config_generate_module(command, project.as_ref())?;
            let layout = project
                .as_ref()
                .map(LoadedConfig::layout)
                .unwrap_or_default();
            let dry_run = command.dry_run;
            let report = generate_module(command, layout)?;
            print_report(&report, dry_run);
        }
    }
    Ok(())
}

/// Render the module described by a merged command and write it into the
/// project
///
/// Artifacts that fail to render are reported as an error once the others
/// have been written.
pub fn generate_module(
    command: GenerateSubcommandsModule,
    layout: Layout,
) -> Result<MaterializeReport, Box<dyn Error>> {
    let root = PathBuf::from(command.root.as_deref().unwrap_or("."));
    let templates = match &command.stubs {
        Some(dir) => {
            let dir = PathBuf::from(dir);
            if !dir.is_dir() {
                warn!("Stub directory `{}` not found, using built-in stubs", dir.display());
            }
            TemplateSource::Overlay(dir)
        }
        None => TemplateSource::Embedded,
    };
    let dry_run = command.dry_run;

    let options = generate_options(command)?;
    let plan = PlanBuilder::new(&options).build();
    let output = Renderer::new(templates).render(&plan);
    let report = Materializer::new(root)
        .with_layout(layout)
        .dry_run(dry_run)
        .materialize(&plan, &output)?;

    if !output.failures.is_empty() {
        let failures = output
            .failures
            .iter()
            .map(|failure| format!("{}: {}", failure.kind, failure.error))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(format!("Some files could not be generated ({failures})").into());
    }
    Ok(report)
}

fn print_report(report: &MaterializeReport, dry_run: bool) {
    let verb = if dry_run { "Would write" } else { "Writing" };
    for path in &report.written {
        println!("{verb} {}", path.display());
    }
    for splice in &report.splices {
        if splice.status == SpliceStatus::Inserted {
            println!("Registered {} in {}", splice.key, splice.file.display());
        }
    }
    for warning in &report.warnings {
        let reason = match warning.reason {
            WarningReason::AnchorNotFound => "no insertion point",
            WarningReason::FileNotFound => "file not found",
        };
        println!(
            "Skipped {} in {} ({reason}), register it by hand",
            warning.key,
            warning.file.display()
        );
    }
    println!("... Done.");
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::{fs, path::PathBuf};

    use super::*;
    use crate::{Cli, Commands, ProjectConfig, Templates};

    fn module_command(args: &[&str]) -> GenerateSubcommandsModule {
        let cli = Cli::parse_from(["modforge", "generate", "module"].iter().chain(args));
        match cli.command {
            Commands::Generate {
                command: GenerateSubcommands::Module(command),
            } => command,
            _ => unreachable!(),
        }
    }

    fn fixture(name: &str) -> String {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("src/config/tests")
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn test_generate_module_config() {
        let config = fixture("module.json");
        let command = module_command(&["--icon", "Users", "--searchable", "title", "--config", &config]);
        let command = merge_cli_config_generate_module(command, None).unwrap();
        assert_eq!(
            command,
            GenerateSubcommandsModule {
                name: Some("Job Opening".to_owned()),
                fields: Some("title:text:required,status:select::Open|Closed".to_owned()),
                relationships: Some("department:belongsTo:Department".to_owned()),
                table_relationships: Some("department.name".to_owned()),
                table_columns: Some(vec![]),
                searchable: Some(vec!["title".to_owned()]),
                filterable: Some(vec!["status".to_owned(), "department".to_owned()]),
                icon: Some("Users".to_owned()),
                view_mode: Some("modal".to_owned()),
                package: None,
                system_setup: None,
                inference: Some("containment".to_owned()),
                config: Some(config),
                root: Some(".".to_owned()),
                stubs: None,
                dry_run: false,
            }
        );
    }

    #[test]
    fn test_generate_module_project_defaults() {
        let project = LoadedConfig {
            dir: PathBuf::from("/srv/app"),
            config: ProjectConfig {
                templates: Templates {
                    directory: Some("stubs".to_owned()),
                },
                ..Default::default()
            },
        };
        let command = module_command(&["Ticket", "--stubs", "/tmp/stubs", "--inference", "explicit"]);
        let command = merge_cli_config_generate_module(command, Some(&project)).unwrap();
        assert_eq!(command.stubs.as_deref(), Some("/tmp/stubs"));
        assert_eq!(command.inference.as_deref(), Some("explicit"));
        assert_eq!(command.root.as_deref(), Some("."));

        let command = module_command(&["Ticket"]);
        let command = merge_cli_config_generate_module(command, Some(&project)).unwrap();
        assert_eq!(command.stubs.as_deref(), Some("/srv/app/stubs"));
    }

    #[test]
    fn test_generate_module_unknown_config_key() {
        let config = fixture("unknown_key.json");
        let command = module_command(&["Ticket", "--config", &config]);
        let error = merge_cli_config_generate_module(command, None).unwrap_err();
        assert!(error.to_string().contains("unknown field `colour`"));
    }

    #[test]
    fn test_generate_module_requires_a_name() {
        let command = merge_cli_config_generate_module(module_command(&[]), None).unwrap();
        let error = generate_options(command).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Entity name is required, pass it as an argument or set `name` in the config"
        );
    }

    #[test]
    fn test_generate_module_options() {
        let command = module_command(&[
            "Job Opening",
            "--fields",
            "title,status:select::Open|Closed",
            "--filterable",
            "status",
            "--view-mode",
            "page",
        ]);
        let command = merge_cli_config_generate_module(command, None).unwrap();
        let options = generate_options(command).unwrap();
        assert_eq!(options.display_name, "Job Opening");
        assert_eq!(options.filterable, vec!["status".to_owned()]);
        assert_eq!(options.view_mode, Some(ViewMode::Page));
        assert_eq!(options.inference, InferenceMode::Containment);
    }

    #[test]
    fn test_generate_module_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().into_owned();
        let command = module_command(&["Ticket", "--fields", "name", "--root", &root, "--dry-run"]);
        let command = merge_cli_config_generate_module(command, None).unwrap();
        let report = generate_module(command, Layout::default()).unwrap();
        assert_eq!(report.written.len(), 10);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_generate_module_stub_override() {
        let project = tempfile::tempdir().unwrap();
        let stubs = tempfile::tempdir().unwrap();
        fs::write(stubs.path().join("model.php.stub"), "<?php // %%modelName%%\n").unwrap();
        let command = GenerateSubcommandsModule {
            name: Some("Ticket".to_owned()),
            fields: Some("name".to_owned()),
            root: Some(project.path().to_string_lossy().into_owned()),
            stubs: Some(stubs.path().to_string_lossy().into_owned()),
            ..Default::default()
        };
        let report = generate_module(command, Layout::default()).unwrap();
        assert_eq!(report.written.len(), 10);
        assert_eq!(
            fs::read_to_string(project.path().join("app/Models/Ticket.php")).unwrap(),
            "<?php // Ticket\n"
        );
        // stubs missing from the override directory come from the built-in set
        let controller = project.path().join("app/Http/Controllers/TicketController.php");
        assert!(fs::read_to_string(controller).unwrap().contains("class TicketController"));
    }
}
