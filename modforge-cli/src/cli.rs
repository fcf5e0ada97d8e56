use clap::{Args, Parser, Subcommand};
use merge::Merge;
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Scaffold CRUD modules for a Laravel / Inertia project from a compact schema"
)]
pub struct Cli {
    #[arg(global = true, short, long, help = "Show debug messages")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, PartialEq, Eq, Debug)]
pub enum Commands {
    #[command(
        about = "Codegen related commands",
        arg_required_else_help = true,
        display_order = 10
    )]
    Generate {
        #[command(subcommand)]
        command: GenerateSubcommands,
    },
    #[command(about = "Project configuration", display_order = 20)]
    Config {
        #[command(subcommand)]
        command: ConfigSubcommands,
    },
}

#[derive(Subcommand, PartialEq, Eq, Debug)]
pub enum GenerateSubcommands {
    #[command(about = "Generate a CRUD module and register it in the project")]
    Module(GenerateSubcommandsModule),
}

#[derive(Subcommand, PartialEq, Eq, Debug)]
pub enum ConfigSubcommands {
    #[command(about = "Write a modforge.toml into the current directory")]
    Init {
        #[arg(long, help = "Overwrite an existing modforge.toml")]
        force: bool,
    },
}

/// Options of `generate module`, also accepted as a JSON file via `--config`
#[derive(Args, Clone, Debug, Default, PartialEq, Eq, Deserialize, Merge)]
#[serde(deny_unknown_fields)]
pub struct GenerateSubcommandsModule {
    #[arg(help = "Display name of the entity, e.g. \"Job Opening\"")]
    pub name: Option<String>,

    #[arg(
        short,
        long,
        long_help = "Comma separated fields, `name[:type[:validation[:options]]]`\n \
                    - validation is `|` separated, flags like `searchable` or `showPreview` are allowed\n \
                    - options are `A|B|C` or `@Model.displayField`"
    )]
    pub fields: Option<String>,

    #[arg(
        short,
        long,
        help = "Comma separated relationships, `name[^parent]:belongsTo:Model`"
    )]
    pub relationships: Option<String>,

    #[arg(long, help = "Comma separated `relation.field` columns shown in the list")]
    pub table_relationships: Option<String>,

    #[arg(
        long,
        value_delimiter = ',',
        help = "List columns in display order, all fields when omitted"
    )]
    pub table_columns: Option<Vec<String>>,

    #[arg(
        short,
        long,
        value_delimiter = ',',
        help = "Searchable fields, the first one names the search box"
    )]
    pub searchable: Option<Vec<String>>,

    #[arg(long, value_delimiter = ',', help = "Fields and relationships offered as filters")]
    pub filterable: Option<Vec<String>>,

    #[arg(long, help = "lucide-react icon of the navigation entry")]
    pub icon: Option<String>,

    #[arg(
        long,
        value_parser = ["modal", "page"],
        help = "Show single records in a modal or on a dedicated page"
    )]
    pub view_mode: Option<String>,

    #[arg(short, long, help = "Generate into packages/<name> instead of app/")]
    pub package: Option<String>,

    #[arg(
        long,
        value_name = "ICON",
        help = "Place the module in the system setup menu, with this icon"
    )]
    pub system_setup: Option<String>,

    #[arg(
        long,
        env = "MODFORGE_INFERENCE",
        value_parser = ["adjacent", "containment", "explicit"],
        help = "How cascading selects are inferred between relationships"
    )]
    pub inference: Option<String>,

    #[arg(short, long, help = "JSON file with the options above, flags take precedence")]
    #[serde(skip)]
    pub config: Option<String>,

    #[arg(long, env = "MODFORGE_ROOT", help = "Root of the Laravel project")]
    pub root: Option<String>,

    #[arg(long, env = "MODFORGE_STUBS", help = "Directory of stub overrides")]
    pub stubs: Option<String>,

    #[arg(long, help = "Report what would be written without touching any file")]
    #[serde(skip)]
    #[merge(skip)]
    pub dry_run: bool,
}
