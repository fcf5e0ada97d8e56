use std::collections::HashSet;

use crate::{
    Diagnostics, DiagnosticKind, FieldFlags, FieldKind, FieldOptions, FieldSpec, RelationType,
    RelationshipSpec, TableRelationshipSpec,
};

/// Prefix of a dynamic option source, `@Model.field`
pub const REFERENCE_MARKER: char = '@';

/// Separator of an explicit cascade parent, `child^parent`
pub const CASCADE_MARKER: char = '^';

/// Rules taking a `:` parameter; a pipe list after one of these is part of
/// the validation text and not an option list.
const PARAMETERISED_RULES: [&str; 27] = [
    "after",
    "after_or_equal",
    "before",
    "before_or_equal",
    "between",
    "date_format",
    "decimal",
    "different",
    "digits",
    "digits_between",
    "dimensions",
    "exists",
    "gt",
    "gte",
    "in",
    "lt",
    "lte",
    "max",
    "max_digits",
    "mimes",
    "mimetypes",
    "min",
    "min_digits",
    "multiple_of",
    "not_in",
    "regex",
    "size",
];

const EMBEDDED_OPTIONS_RULE: &str = "array:";

/// Result of parsing the raw schema strings
#[derive(Clone, Debug, Default)]
pub struct ParsedSchema {
    pub fields: Vec<FieldSpec>,
    pub relationships: Vec<RelationshipSpec>,
    pub table_relationships: Vec<TableRelationshipSpec>,
    pub diagnostics: Diagnostics,
}

#[derive(Clone, Debug)]
pub struct SchemaParser;

impl SchemaParser {
    /// Parse all three schema strings of one entity
    pub fn parse(fields: &str, relationships: &str, table_relationships: &str) -> ParsedSchema {
        let mut diagnostics = Diagnostics::default();
        let fields = Self::parse_fields(fields, &mut diagnostics);
        let relationships = Self::parse_relationships(relationships, &mut diagnostics);
        let table_relationships =
            Self::parse_table_relationships(table_relationships, &relationships, &mut diagnostics);
        ParsedSchema {
            fields,
            relationships,
            table_relationships,
            diagnostics,
        }
    }

    pub fn parse_fields(input: &str, diagnostics: &mut Diagnostics) -> Vec<FieldSpec> {
        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        for token in split_tokens(input) {
            let Some(field) = Self::parse_field(token, diagnostics) else {
                continue;
            };
            if seen.insert(field.name.clone()) {
                fields.push(field);
            } else {
                diagnostics.push(&field.name, DiagnosticKind::DuplicateField);
            }
        }
        fields
    }

    /// Parse one `name[:type[:validation][:options]]` token
    pub fn parse_field(token: &str, diagnostics: &mut Diagnostics) -> Option<FieldSpec> {
        let token = token.trim();
        let (name, rest) = match token.split_once(':') {
            Some((name, rest)) => (name.trim(), Some(rest)),
            None => (token, None),
        };
        if name.is_empty() {
            diagnostics.push(token, DiagnosticKind::EmptyToken);
            return None;
        }

        let (declared_type, rest) = match rest {
            Some(rest) => match rest.split_once(':') {
                Some((ty, rest)) => (ty.trim(), Some(rest)),
                None => (rest.trim(), None),
            },
            None => ("", None),
        };
        let kind = if declared_type.is_empty() {
            FieldKind::Text
        } else {
            FieldKind::lookup(declared_type).unwrap_or_else(|| {
                diagnostics.push(
                    token,
                    DiagnosticKind::UnknownFieldType(declared_type.to_owned()),
                );
                FieldKind::Text
            })
        };

        let (validation, raw_options) = match rest {
            Some(rest) => split_validation_and_options(kind, rest),
            None => (None, None),
        };

        let mut flags = FieldFlags::default();
        let custom_validation = validation.and_then(|text| extract_flags(text, &mut flags));
        let nullable = custom_validation
            .as_deref()
            .is_some_and(|rules| rules.split('|').any(|rule| rule.trim() == "nullable"));

        let mut options = raw_options.map(parse_options).unwrap_or_default();
        if options != FieldOptions::None && !kind.is_enumerable() {
            diagnostics.push(token, DiagnosticKind::OptionsIgnored);
            options = FieldOptions::None;
        }

        Some(FieldSpec {
            name: name.to_owned(),
            kind,
            nullable,
            custom_validation,
            options,
            flags,
        })
    }

    pub fn parse_relationships(
        input: &str,
        diagnostics: &mut Diagnostics,
    ) -> Vec<RelationshipSpec> {
        let mut foreign_keys = HashSet::new();
        let mut relationships = Vec::new();
        for token in split_tokens(input) {
            let Some(rel) = Self::parse_relationship(token, diagnostics) else {
                continue;
            };
            if rel.owns_foreign_key() && !foreign_keys.insert(rel.foreign_key.clone()) {
                let foreign_key = rel.foreign_key.clone();
                diagnostics.push(&rel.name, DiagnosticKind::DuplicateForeignKey(foreign_key));
                continue;
            }
            relationships.push(rel);
        }

        let names: HashSet<String> = relationships.iter().map(|r| r.name.clone()).collect();
        relationships
            .into_iter()
            .map(|mut rel| {
                if let Some(parent) = rel.depends_on.take() {
                    if parent != rel.name && names.contains(&parent) {
                        rel.depends_on = Some(parent);
                    } else {
                        diagnostics.push(&rel.name, DiagnosticKind::UnknownCascadeParent(parent));
                    }
                }
                rel
            })
            .collect()
    }

    /// Parse one `name:type:Target[:foreignKey]` token
    pub fn parse_relationship(
        token: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<RelationshipSpec> {
        let token = token.trim();
        let parts: Vec<&str> = token.split(':').map(str::trim).collect();
        if parts.len() < 3 || parts[..3].iter().any(|part| part.is_empty()) {
            diagnostics.push(token, DiagnosticKind::MalformedRelationship);
            return None;
        }

        let (name, depends_on) = match parts[0].split_once(CASCADE_MARKER) {
            Some((name, parent)) => (name.trim(), Some(parent.trim())),
            None => (parts[0], None),
        };
        let rel_type = parts[1].parse().unwrap_or_else(|_| {
            diagnostics.push(
                token,
                DiagnosticKind::UnknownRelationType(parts[1].to_owned()),
            );
            RelationType::BelongsTo
        });

        let mut rel = RelationshipSpec::new(name, rel_type, parts[2]);
        if let Some(fk) = parts.get(3).filter(|fk| !fk.is_empty()) {
            rel = rel.with_foreign_key(fk);
        }
        if let Some(parent) = depends_on.filter(|parent| !parent.is_empty()) {
            rel = rel.with_depends_on(parent);
        }
        Some(rel)
    }

    pub fn parse_table_relationships(
        input: &str,
        relationships: &[RelationshipSpec],
        diagnostics: &mut Diagnostics,
    ) -> Vec<TableRelationshipSpec> {
        split_tokens(input)
            .filter_map(|token| {
                let resolved = token
                    .split_once('.')
                    .map(|(rel, field)| (rel.trim(), field.trim()))
                    .filter(|(rel, field)| {
                        !field.is_empty() && relationships.iter().any(|r| r.name == *rel)
                    });
                match resolved {
                    Some((rel, field)) => Some(TableRelationshipSpec::new(rel, field)),
                    None => {
                        diagnostics.push(token, DiagnosticKind::UnresolvedTableRelationship);
                        None
                    }
                }
            })
            .collect()
    }
}

/// Split a comma separated list, dropping blank entries
pub fn split_tokens(input: &str) -> impl Iterator<Item = &str> {
    input.split(',').map(str::trim).filter(|t| !t.is_empty())
}

/// Decide where validation ends and options begin in the text after the type
fn split_validation_and_options(kind: FieldKind, rest: &str) -> (Option<&str>, Option<&str>) {
    if kind == FieldKind::Select {
        if let Some(at) = find_rule(rest, EMBEDDED_OPTIONS_RULE) {
            let options = &rest[at + EMBEDDED_OPTIONS_RULE.len()..];
            let validation = rest[..at].trim_end_matches('|');
            let validation = Some(validation).filter(|v| !v.trim().is_empty());
            return (validation, Some(options));
        }
    }

    if let Some(at) = rest.rfind(':') {
        let (before, after) = (&rest[..at], rest[at + 1..].trim());
        if is_options_segment(before, after) {
            // an empty validation in front of options means "not given"
            let validation = Some(before).filter(|v| !v.trim().is_empty());
            return (validation, Some(after));
        }
    }
    (Some(rest), None)
}

fn is_options_segment(before: &str, after: &str) -> bool {
    if after.starts_with(REFERENCE_MARKER) {
        return true;
    }
    let preceding_rule = before.rsplit('|').next().unwrap_or_default().trim();
    after.contains('|') && !PARAMETERISED_RULES.contains(&preceding_rule)
}

/// Position of a rule that starts a pipe segment
fn find_rule(rules: &str, rule: &str) -> Option<usize> {
    rules
        .match_indices(rule)
        .map(|(at, _)| at)
        .find(|&at| at == 0 || rules[..at].ends_with('|'))
}

/// Remove the behaviour flags, returning the remaining rule string
fn extract_flags(validation: &str, flags: &mut FieldFlags) -> Option<String> {
    let mut found_flag = false;
    let rules: Vec<&str> = validation
        .split('|')
        .map(str::trim)
        .filter(|rule| {
            let flag = match *rule {
                FieldFlags::SHOW_PREVIEW => &mut flags.show_preview,
                FieldFlags::MULTIPLE => &mut flags.multiple,
                FieldFlags::SEARCHABLE => &mut flags.searchable,
                _ => return true,
            };
            *flag = true;
            found_flag = true;
            false
        })
        .filter(|rule| !rule.is_empty())
        .collect();

    if rules.is_empty() && found_flag {
        None
    } else {
        Some(rules.join("|"))
    }
}

fn parse_options(raw: &str) -> FieldOptions {
    let raw = raw.trim();
    if let Some(reference) = raw.strip_prefix(REFERENCE_MARKER) {
        let (model, display_field) = reference.split_once('.').unwrap_or((reference, "name"));
        let (model, display_field) = (model.trim(), display_field.trim());
        if model.is_empty() {
            return FieldOptions::None;
        }
        return FieldOptions::Dynamic {
            model: model.to_owned(),
            display_field: if display_field.is_empty() {
                "name".to_owned()
            } else {
                display_field.to_owned()
            },
        };
    }
    let labels: Vec<String> = raw
        .split('|')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_owned)
        .collect();
    if labels.is_empty() {
        FieldOptions::None
    } else {
        FieldOptions::Static(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_one(token: &str) -> (Option<FieldSpec>, Diagnostics) {
        let mut diagnostics = Diagnostics::default();
        (SchemaParser::parse_field(token, &mut diagnostics), diagnostics)
    }

    #[test]
    fn trailing_bound_is_not_an_option_list() {
        let (field, diagnostics) = parse_one("due_days:number:nullable|integer|max:100");
        let field = field.unwrap();
        assert_eq!(field.kind(), FieldKind::Number);
        assert!(field.nullable());
        assert_eq!(field.custom_validation(), Some("nullable|integer|max:100"));
        assert_eq!(field.options(), &FieldOptions::None);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn parameterised_rule_keeps_its_pipe_list() {
        let (field, _) = parse_one("code:text:in:a|b");
        let field = field.unwrap();
        assert_eq!(field.custom_validation(), Some("in:a|b"));
        assert_eq!(field.options(), &FieldOptions::None);
    }

    #[test]
    fn static_options_after_validation() {
        let (field, _) = parse_one("status:select:nullable:Open|Closed");
        let field = field.unwrap();
        assert!(field.nullable());
        assert_eq!(field.custom_validation(), Some("nullable"));
        assert_eq!(
            field.static_options(),
            Some(&["Open".to_owned(), "Closed".to_owned()][..])
        );
    }

    #[test]
    fn embedded_array_options() {
        let (field, _) = parse_one("priority:select:required|array:Low|Medium|High");
        let field = field.unwrap();
        assert_eq!(field.custom_validation(), Some("required"));
        assert_eq!(field.static_options().map(<[String]>::len), Some(3));

        let (field, _) = parse_one("priority:select:array:Low|High");
        assert_eq!(field.unwrap().custom_validation(), None);
    }

    #[test]
    fn dynamic_options_exclude_static_ones() {
        let (field, _) = parse_one("role:select:searchable|multiple:@Role.title");
        let field = field.unwrap();
        assert_eq!(field.dynamic_source(), Some(("Role", "title")));
        assert_eq!(field.static_options(), None);
        assert_eq!(field.custom_validation(), None);
        assert!(field.flags().searchable && field.flags().multiple);

        let (field, _) = parse_one("owner:select::@User");
        assert_eq!(field.unwrap().dynamic_source(), Some(("User", "name")));
    }

    #[test]
    fn flags_are_removed_by_segment() {
        let (field, _) = parse_one("photo:image:showPreview|nullable");
        let field = field.unwrap();
        assert!(field.flags().show_preview);
        assert_eq!(field.custom_validation(), Some("nullable"));

        let (field, _) = parse_one("step:number:multiple_of:5");
        let field = field.unwrap();
        assert!(!field.flags().multiple);
        assert_eq!(field.custom_validation(), Some("multiple_of:5"));
    }

    #[test]
    fn absent_and_empty_validation_differ() {
        assert_eq!(parse_one("title:text").0.unwrap().custom_validation(), None);
        assert_eq!(parse_one("title:text:").0.unwrap().custom_validation(), Some(""));
        assert_eq!(parse_one("title").0.unwrap().kind(), FieldKind::Text);
    }

    #[test]
    fn unknown_type_degrades_to_text() {
        let (field, diagnostics) = parse_one("blob:spreadsheet");
        assert_eq!(field.unwrap().kind(), FieldKind::Text);
        assert!(diagnostics.contains(&DiagnosticKind::UnknownFieldType("spreadsheet".into())));
    }

    #[test]
    fn options_on_plain_kinds_are_dropped() {
        let (field, diagnostics) = parse_one("title:text::A|B");
        assert_eq!(field.unwrap().options(), &FieldOptions::None);
        assert!(diagnostics.contains(&DiagnosticKind::OptionsIgnored));
    }

    #[test]
    fn duplicate_and_empty_fields() {
        let mut diagnostics = Diagnostics::default();
        let fields = SchemaParser::parse_fields("name, ,name:textarea,:text,email", &mut diagnostics);
        let names: Vec<_> = fields.iter().map(FieldSpec::name).collect();
        assert_eq!(names, vec!["name", "email"]);
        assert!(diagnostics.contains(&DiagnosticKind::DuplicateField));
        assert!(diagnostics.contains(&DiagnosticKind::EmptyToken));
    }

    #[test]
    fn relationships() {
        let parsed = SchemaParser::parse(
            "",
            "department:belongsTo:Department,bad:belongsTo,manager:ownedBy:User:manager_user_id,\
             team:belongsTo:Team:department_id,city^country:belongsTo:City,tasks:hasMany:Task",
            "department.name,ghost.name,department.",
        );
        let names: Vec<_> = parsed.relationships.iter().map(RelationshipSpec::name).collect();
        assert_eq!(names, vec!["department", "manager", "city", "tasks"]);
        assert_eq!(parsed.relationships[1].foreign_key(), "manager_user_id");
        assert_eq!(parsed.relationships[1].rel_type(), RelationType::BelongsTo);
        assert_eq!(parsed.relationships[2].depends_on(), None);
        assert_eq!(parsed.relationships[3].rel_type(), RelationType::HasMany);
        assert_eq!(
            parsed.table_relationships,
            vec![TableRelationshipSpec::new("department", "name")]
        );

        let kinds: Vec<_> = parsed.diagnostics.iter().map(|d| d.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::MalformedRelationship,
                DiagnosticKind::UnknownRelationType("ownedBy".into()),
                DiagnosticKind::DuplicateForeignKey("department_id".into()),
                DiagnosticKind::UnknownCascadeParent("country".into()),
                DiagnosticKind::UnresolvedTableRelationship,
                DiagnosticKind::UnresolvedTableRelationship,
            ]
        );
    }
}
