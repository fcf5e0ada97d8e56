//! The build plan: everything the renderers and the materializer read.
//!
//! A [`BuildPlan`] is assembled once by [`PlanBuilder`] and never mutated
//! afterwards.

mod builder;

pub use builder::*;

use heck::{ToKebabCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{
    DependencyEdge, Diagnostics, FieldSpec, InferenceMode, Names, RelationType, RelationshipSpec,
    TableRelationshipSpec,
};

/// Column recording the creating user, always present and never mass assigned
pub const OWNERSHIP_COLUMN: &str = "created_by";

/// Suffixes of the permission keys seeded for every module
pub const PERMISSION_ACTIONS: [&str; 7] = [
    "manage",
    "manage-any",
    "manage-own",
    "view",
    "create",
    "edit",
    "delete",
];

pub const DEFAULT_ICON: &str = "LayoutGrid";

pub const DEFAULT_SETUP_ICON: &str = "Settings";

/// How a single record is displayed
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// A dialog opened from the list page
    Modal,
    /// A dedicated `show` page
    Page,
}

/// Raw options of one generation run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Free-form entity name, e.g. `Job Opening`
    pub display_name: String,
    /// Comma separated field tokens
    pub fields: String,
    /// Comma separated relationship tokens
    pub relationships: String,
    /// Comma separated `relation.field` projections
    pub table_relationships: String,
    /// Explicit list columns in display order, empty for all
    pub table_columns: Vec<String>,
    /// Searchable fields, the first one is the primary search key
    pub searchable: Vec<String>,
    pub filterable: Vec<String>,
    pub icon: Option<String>,
    pub view_mode: Option<ViewMode>,
    /// Package name, generated files go under `packages/<name>`
    pub package: Option<String>,
    /// Group the module under the system setup menu, with this icon
    pub system_setup: Option<String>,
    pub inference: InferenceMode,
}

/// Where generated files live and which namespace they use
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageScope {
    /// `job-board`
    pub name: String,
    /// `JobBoard`
    pub namespace: String,
}

impl PackageScope {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_kebab_case(),
            namespace: name.trim().to_upper_camel_case(),
        }
    }

    /// Directory under the project root, `packages/job-board`
    pub fn root(&self) -> String {
        format!("packages/{}", self.name)
    }
}

/// Navigation group for setup modules
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemSetup {
    pub icon: String,
}

/// One validation rule line of the request objects
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationRule {
    /// Request key, `tags` or `tags.*`
    pub key: String,
    pub rule: String,
}

impl ValidationRule {
    pub fn new(key: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            rule: rule.into(),
        }
    }
}

/// A list column of the index page
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableColumn {
    Field(FieldSpec),
    Relation(TableRelationshipSpec),
}

impl TableColumn {
    /// Accessor key of the row data
    pub fn key(&self) -> String {
        match self {
            Self::Field(field) => field.name().to_owned(),
            Self::Relation(projection) => projection.key(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Field(field) => field.label(),
            Self::Relation(projection) => projection.label(),
        }
    }
}

/// How a search term is matched against one column
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
    /// Partial match with `LIKE %term%`
    Like,
    /// Equality
    Exact,
    /// Membership in a JSON array column
    JsonContains,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchField {
    pub field: FieldSpec,
    pub mode: SearchMode,
}

/// A filter control offered on the list page
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterSpec {
    /// Enumerable field with a static option list
    Options(FieldSpec),
    /// Enumerable field whose options are records of another entity
    Records(FieldSpec),
    /// A belongs-to relationship, filtered by its foreign key
    Relation(RelationshipSpec),
}

impl FilterSpec {
    /// Query string key, the field name or foreign key
    pub fn key(&self) -> &str {
        match self {
            Self::Options(field) | Self::Records(field) => field.name(),
            Self::Relation(rel) => rel.foreign_key(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Options(field) | Self::Records(field) => field.label(),
            Self::Relation(rel) => rel.label(),
        }
    }

    /// Whether the filtered column holds a list of values
    pub fn is_multiple(&self) -> bool {
        match self {
            Self::Options(field) | Self::Records(field) => field.is_multi_choice(),
            Self::Relation(_) => false,
        }
    }
}

/// The immutable intermediate representation of one module
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildPlan {
    pub names: Names,
    pub fields: Vec<FieldSpec>,
    pub relationships: Vec<RelationshipSpec>,
    pub table_relationships: Vec<TableRelationshipSpec>,
    pub dependencies: Vec<DependencyEdge>,
    pub table_columns: Vec<TableColumn>,
    /// Mass assignable attributes, in declaration order
    pub fillable: Vec<String>,
    /// Attribute casts, `(column, cast)`
    pub casts: Vec<(String, String)>,
    pub rules: Vec<ValidationRule>,
    /// Search columns, the first one is the primary key of the search box
    pub searchable: Vec<SearchField>,
    pub filters: Vec<FilterSpec>,
    pub icon: String,
    pub view_mode: Option<ViewMode>,
    pub package: Option<PackageScope>,
    pub system_setup: Option<SystemSetup>,
    pub diagnostics: Diagnostics,
}

impl BuildPlan {
    /// Root PHP namespace, `App` or `Packages\JobBoard`
    pub fn namespace(&self) -> String {
        match &self.package {
            Some(package) => format!("Packages\\{}", package.namespace),
            None => "App".to_owned(),
        }
    }

    /// Directory that plays the role of `app/`
    pub fn source_root(&self) -> String {
        match &self.package {
            Some(package) => format!("{}/src", package.root()),
            None => "app".to_owned(),
        }
    }

    /// Directory holding `database/` and `resources/`
    pub fn project_root(&self) -> String {
        match &self.package {
            Some(package) => package.root(),
            None => String::new(),
        }
    }

    pub fn model_class(&self) -> String {
        format!("{}\\Models\\{}", self.namespace(), self.names.model)
    }

    pub fn controller_class(&self) -> String {
        format!(
            "{}\\Http\\Controllers\\{}Controller",
            self.namespace(),
            self.names.model
        )
    }

    pub fn permission_keys(&self) -> Vec<String> {
        PERMISSION_ACTIONS
            .iter()
            .map(|action| format!("{}.{action}", self.names.route))
            .collect()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Belongs-to relationships that own a foreign key column on this table
    pub fn foreign_keys(&self) -> impl Iterator<Item = &RelationshipSpec> {
        self.relationships.iter().filter(|rel| {
            rel.owns_foreign_key() && self.field(rel.foreign_key()).is_none()
        })
    }

    /// Relationships that get a reverse `hasMany` accessor on their target
    pub fn reverse_relations(&self) -> impl Iterator<Item = &RelationshipSpec> {
        self.relationships.iter().filter(|rel| {
            rel.rel_type() == RelationType::BelongsTo && !rel.is_self_reference(&self.names.model)
        })
    }

    /// Fields whose options are records of another entity
    pub fn dynamic_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|field| field.is_dynamic())
    }

    pub fn media_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|field| field.kind().is_media())
    }

    pub fn has_media(&self) -> bool {
        self.media_fields().next().is_some()
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn primary_search(&self) -> Option<&SearchField> {
        self.searchable.first()
    }
}
