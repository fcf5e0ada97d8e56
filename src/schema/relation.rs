use heck::ToSnakeCase;
use strum::{AsRefStr, Display, EnumString};

use crate::names::{label_for, pluralize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum RelationType {
    BelongsTo,
    HasOne,
    HasMany,
    BelongsToMany,
}

/// One declared edge from the generated entity to another entity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationshipSpec {
    pub(crate) name: String,
    pub(crate) rel_type: RelationType,
    pub(crate) target: String,
    pub(crate) foreign_key: String,
    pub(crate) target_table: String,
    pub(crate) depends_on: Option<String>,
}

/// A `relation.field` projection shown as a list column
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRelationshipSpec {
    pub(crate) relation: String,
    pub(crate) field: String,
}

impl RelationshipSpec {
    pub fn new(name: &str, rel_type: RelationType, target: &str) -> Self {
        Self {
            name: name.to_owned(),
            rel_type,
            target: target.to_owned(),
            foreign_key: format!("{}_id", name.to_snake_case()),
            target_table: pluralize(&target.to_snake_case()),
            depends_on: None,
        }
    }

    pub fn with_foreign_key(mut self, foreign_key: &str) -> Self {
        self.foreign_key = foreign_key.to_owned();
        self
    }

    pub fn with_depends_on(mut self, parent: &str) -> Self {
        self.depends_on = Some(parent.to_owned());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rel_type(&self) -> RelationType {
        self.rel_type
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn foreign_key(&self) -> &str {
        &self.foreign_key
    }

    pub fn target_table(&self) -> &str {
        &self.target_table
    }

    pub fn depends_on(&self) -> Option<&str> {
        self.depends_on.as_deref()
    }

    pub fn label(&self) -> String {
        label_for(&self.name.to_snake_case())
    }

    /// Whether the edge points back at the entity being generated
    pub fn is_self_reference(&self, model: &str) -> bool {
        self.target == model
    }

    /// Only `belongsTo` edges own a foreign key column on this table
    pub fn owns_foreign_key(&self) -> bool {
        self.rel_type == RelationType::BelongsTo
    }
}

impl TableRelationshipSpec {
    pub fn new(relation: &str, field: &str) -> Self {
        Self {
            relation: relation.to_owned(),
            field: field.to_owned(),
        }
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Column key used in list views, e.g. `department.name`
    pub fn key(&self) -> String {
        format!("{}.{}", self.relation, self.field)
    }

    pub fn label(&self) -> String {
        format!(
            "{} {}",
            label_for(&self.relation.to_snake_case()),
            label_for(&self.field)
        )
    }
}
