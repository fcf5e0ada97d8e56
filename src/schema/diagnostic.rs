use std::fmt;

use tracing::warn;

/// Why a schema token was degraded or dropped
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    EmptyToken,
    /// The field type is not in the catalog, plain text is used instead
    UnknownFieldType(String),
    DuplicateField,
    /// Fewer than three colon separated parts
    MalformedRelationship,
    /// Relationship type not recognised, `belongsTo` is assumed
    UnknownRelationType(String),
    DuplicateForeignKey(String),
    /// `relation.field` does not name a declared relationship
    UnresolvedTableRelationship,
    /// A requested table column is neither a field nor a projection
    UnknownTableColumn,
    /// A searchable or filterable entry names nothing declared
    UnknownField,
    /// A filterable entry is not enumerable and not a relationship
    NotFilterable,
    /// Media and range fields cannot be matched by a search term
    NotSearchable,
    /// `created_by` is managed by the module itself
    ReservedColumn,
    /// `^parent` names no declared relationship
    UnknownCascadeParent(String),
    /// Options were given to a kind that does not use them
    OptionsIgnored,
}

/// A recovered problem with one schema token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub token: String,
    pub kind: DiagnosticKind,
}

/// Diagnostics collected over one generation run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, token: impl Into<String>, kind: DiagnosticKind) {
        let diagnostic = Diagnostic {
            token: token.into(),
            kind,
        };
        warn!("{}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn contains(&self, kind: &DiagnosticKind) -> bool {
        self.items.iter().any(|d| &d.kind == kind)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = &self.token;
        match &self.kind {
            DiagnosticKind::EmptyToken => write!(f, "empty token skipped"),
            DiagnosticKind::UnknownFieldType(ty) => {
                write!(f, "`{token}`: unknown field type '{ty}', using text")
            }
            DiagnosticKind::DuplicateField => write!(f, "`{token}`: duplicate field skipped"),
            DiagnosticKind::MalformedRelationship => write!(
                f,
                "`{token}`: expected `name:type:Target[:foreignKey]`, relationship skipped"
            ),
            DiagnosticKind::UnknownRelationType(ty) => {
                write!(f, "`{token}`: unknown relationship type '{ty}', using belongsTo")
            }
            DiagnosticKind::DuplicateForeignKey(fk) => {
                write!(f, "`{token}`: foreign key '{fk}' already used, relationship skipped")
            }
            DiagnosticKind::UnresolvedTableRelationship => {
                write!(f, "`{token}`: no such relationship, projection skipped")
            }
            DiagnosticKind::UnknownTableColumn => {
                write!(f, "`{token}`: not a field or projection, column skipped")
            }
            DiagnosticKind::UnknownField => write!(f, "`{token}`: no such field, skipped"),
            DiagnosticKind::NotFilterable => {
                write!(f, "`{token}`: not enumerable or a relationship, filter skipped")
            }
            DiagnosticKind::NotSearchable => {
                write!(f, "`{token}`: this field type cannot be searched, skipped")
            }
            DiagnosticKind::ReservedColumn => {
                write!(f, "`{token}`: reserved ownership column, field skipped")
            }
            DiagnosticKind::UnknownCascadeParent(parent) => {
                write!(f, "`{token}`: cascade parent '{parent}' is not declared, ignored")
            }
            DiagnosticKind::OptionsIgnored => {
                write!(f, "`{token}`: this field type takes no options, ignored")
            }
        }
    }
}
