use std::collections::HashSet;

use heck::ToSnakeCase;
use itertools::Itertools;
use tracing::{debug, instrument};

use super::*;
use crate::{
    Choice, DiagnosticKind, FieldKind, FieldOptions, ParsedSchema, SchemaParser, infer_dependencies,
    names::pluralize,
};

/// Element bounds of a slider value
const SLIDER_ELEMENT_RULE: &str = "integer|min:0|max:100";

/// Per-file rule of multi-file media uploads
const MEDIA_ELEMENT_RULE: &str = "file|max:10240";

/// Turns [`GenerateOptions`] into a [`BuildPlan`]
///
/// Building never fails: every problem found along the way is recorded in
/// [`BuildPlan::diagnostics`] and the offending entry is dropped or
/// replaced by a default.
#[derive(Debug)]
pub struct PlanBuilder<'a> {
    options: &'a GenerateOptions,
    diagnostics: Diagnostics,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(options: &'a GenerateOptions) -> Self {
        Self {
            options,
            diagnostics: Diagnostics::default(),
        }
    }

    /// Parse the schema strings of the options and build the plan
    pub fn build(self) -> BuildPlan {
        let parsed = SchemaParser::parse(
            &self.options.fields,
            &self.options.relationships,
            &self.options.table_relationships,
        );
        self.build_from(parsed)
    }

    /// Build the plan from an already parsed schema
    #[instrument(skip_all, fields(entity = %self.options.display_name))]
    pub fn build_from(mut self, parsed: ParsedSchema) -> BuildPlan {
        let ParsedSchema {
            fields,
            relationships,
            table_relationships,
            diagnostics,
        } = parsed;
        self.diagnostics.extend(diagnostics);

        let names = Names::from_display_name(&self.options.display_name);
        let fields = self.drop_reserved(fields);
        let dependencies = infer_dependencies(
            &relationships,
            &names.model,
            &names.route,
            self.options.inference,
        );

        let fillable = fillable(&fields, &relationships, &names.model);
        let casts = casts(&fields);
        let rules = rules(&fields, &relationships, &names.model);
        let table_columns = self.table_columns(&fields, &table_relationships);
        let searchable = self.searchable(&fields);
        let filters = self.filters(&fields, &relationships);
        debug!(
            "{} fields, {} relationships, {} cascades, {} filters",
            fields.len(),
            relationships.len(),
            dependencies.len(),
            filters.len()
        );

        BuildPlan {
            names,
            fields,
            relationships,
            table_relationships,
            dependencies,
            table_columns,
            fillable,
            casts,
            rules,
            searchable,
            filters,
            icon: non_blank(self.options.icon.as_deref()).unwrap_or(DEFAULT_ICON).to_owned(),
            view_mode: self.options.view_mode,
            package: non_blank(self.options.package.as_deref()).map(PackageScope::new),
            system_setup: self.options.system_setup.as_deref().map(|icon| SystemSetup {
                icon: non_blank(Some(icon)).unwrap_or(DEFAULT_SETUP_ICON).to_owned(),
            }),
            diagnostics: self.diagnostics,
        }
    }

    fn drop_reserved(&mut self, fields: Vec<FieldSpec>) -> Vec<FieldSpec> {
        fields
            .into_iter()
            .filter(|field| {
                if field.name() == OWNERSHIP_COLUMN {
                    self.diagnostics
                        .push(field.name(), DiagnosticKind::ReservedColumn);
                    false
                } else {
                    true
                }
            })
            .collect()
    }

    fn table_columns(
        &mut self,
        fields: &[FieldSpec],
        projections: &[TableRelationshipSpec],
    ) -> Vec<TableColumn> {
        let requested: Vec<&str> = self
            .options
            .table_columns
            .iter()
            .map(|column| column.trim())
            .filter(|column| !column.is_empty())
            .unique()
            .collect();

        if requested.is_empty() {
            return fields
                .iter()
                .cloned()
                .map(TableColumn::Field)
                .chain(projections.iter().cloned().map(TableColumn::Relation))
                .collect();
        }

        let mut columns = Vec::new();
        for column in requested {
            if let Some(field) = fields.iter().find(|field| field.name() == column) {
                columns.push(TableColumn::Field(field.clone()));
            } else if let Some(projection) = projections.iter().find(|p| p.key() == column) {
                columns.push(TableColumn::Relation(projection.clone()));
            } else {
                self.diagnostics
                    .push(column, DiagnosticKind::UnknownTableColumn);
            }
        }
        columns
    }

    fn searchable(&mut self, fields: &[FieldSpec]) -> Vec<SearchField> {
        let flagged = fields
            .iter()
            .filter(|field| field.flags().searchable)
            .map(|field| field.name());
        let requested: Vec<&str> = self
            .options
            .searchable
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .chain(flagged)
            .unique()
            .collect();

        let mut searchable = Vec::new();
        for name in requested {
            let Some(field) = fields.iter().find(|field| field.name() == name) else {
                self.diagnostics.push(name, DiagnosticKind::UnknownField);
                continue;
            };
            match search_mode(field) {
                Some(mode) => searchable.push(SearchField {
                    field: field.clone(),
                    mode,
                }),
                None => self.diagnostics.push(name, DiagnosticKind::NotSearchable),
            }
        }
        searchable
    }

    fn filters(
        &mut self,
        fields: &[FieldSpec],
        relationships: &[RelationshipSpec],
    ) -> Vec<FilterSpec> {
        let mut seen = HashSet::new();
        let mut filters = Vec::new();
        for name in self.options.filterable.iter().map(|name| name.trim()) {
            if name.is_empty() {
                continue;
            }
            let filter = if let Some(field) = fields.iter().find(|field| field.name() == name) {
                match field.options() {
                    _ if !field.is_filterable() => {
                        self.diagnostics.push(name, DiagnosticKind::NotFilterable);
                        continue;
                    }
                    FieldOptions::Dynamic { .. } => FilterSpec::Records(field.clone()),
                    _ => FilterSpec::Options(field.clone()),
                }
            } else if let Some(rel) = relationships.iter().find(|rel| {
                rel.owns_foreign_key() && (rel.name() == name || rel.foreign_key() == name)
            }) {
                FilterSpec::Relation(rel.clone())
            } else {
                self.diagnostics.push(name, DiagnosticKind::NotFilterable);
                continue;
            };
            if seen.insert(filter.key().to_owned()) {
                filters.push(filter);
            }
        }
        filters
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn search_mode(field: &FieldSpec) -> Option<SearchMode> {
    let kind = field.kind();
    if kind.is_media() || kind.is_range() || kind == FieldKind::Slider {
        None
    } else if field.is_multi_choice() {
        Some(SearchMode::JsonContains)
    } else if kind.is_string_like() {
        Some(SearchMode::Like)
    } else {
        Some(SearchMode::Exact)
    }
}

/// Form writable fields then owned foreign keys, never the ownership column
fn fillable(fields: &[FieldSpec], relationships: &[RelationshipSpec], model: &str) -> Vec<String> {
    let columns = fields
        .iter()
        .filter(|field| field.def().form_writable)
        .map(|field| field.column().to_owned());
    let foreign_keys = relationships
        .iter()
        .filter(|rel| rel.owns_foreign_key() && !rel.is_self_reference(model))
        .map(|rel| rel.foreign_key().to_owned());
    columns
        .chain(foreign_keys)
        .filter(|column| column != OWNERSHIP_COLUMN)
        .unique()
        .collect()
}

fn casts(fields: &[FieldSpec]) -> Vec<(String, String)> {
    fields
        .iter()
        .filter_map(|field| {
            let cast = if field.is_dynamic() {
                match field.choice() {
                    Choice::Multiple => "array",
                    _ => "integer",
                }
            } else if field.is_multi_choice() {
                "array"
            } else {
                field.def().cast?
            };
            Some((field.column().to_owned(), cast.to_owned()))
        })
        .collect()
}

fn rules(
    fields: &[FieldSpec],
    relationships: &[RelationshipSpec],
    model: &str,
) -> Vec<ValidationRule> {
    let mut rules = Vec::new();
    for field in fields {
        field_rules(field, &mut rules);
    }
    for rel in relationships {
        let declared = fields.iter().any(|f| f.name() == rel.foreign_key());
        if rel.owns_foreign_key() && !rel.is_self_reference(model) && !declared {
            rules.push(ValidationRule::new(
                rel.foreign_key(),
                format!("nullable|integer|exists:{},id", rel.target_table()),
            ));
        }
    }
    rules
}

fn field_rules(field: &FieldSpec, rules: &mut Vec<ValidationRule>) {
    let name = field.name();
    if let Some(custom) = field.custom_validation() {
        let rule = if custom.trim().is_empty() {
            "nullable"
        } else {
            custom
        };
        rules.push(ValidationRule::new(name, rule));
        return;
    }

    let presence = if field.nullable() || field.kind().is_media() {
        "nullable"
    } else {
        "required"
    };

    if let Some((model, _)) = field.dynamic_source() {
        let exists = format!("exists:{},id", pluralize(&model.to_snake_case()));
        if field.is_multi_choice() {
            rules.push(ValidationRule::new(name, format!("{presence}|array")));
            rules.push(ValidationRule::new(
                format!("{name}.*"),
                format!("integer|{exists}"),
            ));
        } else {
            rules.push(ValidationRule::new(
                name,
                format!("{presence}|integer|{exists}"),
            ));
        }
        return;
    }

    if let Some(options) = field.static_options() {
        let allowed = (0..options.len()).join(",");
        if field.is_multi_choice() {
            rules.push(ValidationRule::new(name, format!("{presence}|array")));
            rules.push(ValidationRule::new(
                format!("{name}.*"),
                format!("integer|in:{allowed}"),
            ));
        } else {
            rules.push(ValidationRule::new(
                name,
                format!("{presence}|integer|in:{allowed}"),
            ));
        }
        return;
    }

    let def = field.def();
    let rule = if field.is_multi_choice() && def.choice == Choice::Single {
        "array"
    } else {
        def.rule
    };
    rules.push(ValidationRule::new(name, format!("{presence}|{rule}")));
    match field.kind() {
        FieldKind::Slider => rules.push(ValidationRule::new(
            format!("{name}.0"),
            SLIDER_ELEMENT_RULE,
        )),
        FieldKind::MediaMultiple => rules.push(ValidationRule::new(
            format!("{name}.*"),
            MEDIA_ELEMENT_RULE,
        )),
        FieldKind::Tags => rules.push(ValidationRule::new(format!("{name}.*"), "string|max:50")),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn options(fields: &str, relationships: &str) -> GenerateOptions {
        GenerateOptions {
            display_name: "Job Opening".into(),
            fields: fields.into(),
            relationships: relationships.into(),
            ..Default::default()
        }
    }

    fn rule<'p>(plan: &'p BuildPlan, key: &str) -> Option<&'p str> {
        plan.rules
            .iter()
            .find(|rule| rule.key == key)
            .map(|rule| rule.rule.as_str())
    }

    #[test]
    fn fillable_skips_media_and_ownership() {
        let plan = PlanBuilder::new(&options(
            "title,resume:file,created_by:number,salary:currency",
            "department:belongsTo:Department,parent:belongsTo:JobOpening",
        ))
        .build();
        assert_eq!(plan.fillable, vec!["title", "salary", "department_id"]);
        assert!(plan.field("created_by").is_none());
        assert!(plan.diagnostics.contains(&DiagnosticKind::ReservedColumn));
        assert_eq!(
            plan.foreign_keys().map(|rel| rel.foreign_key()).collect::<Vec<_>>(),
            vec!["department_id", "parent_id"]
        );
        assert_eq!(
            plan.reverse_relations().map(|rel| rel.name()).collect::<Vec<_>>(),
            vec!["department"]
        );
    }

    #[test]
    fn casts_follow_option_source() {
        let plan = PlanBuilder::new(&options(
            "owner:select::@User.name,reviewers:select:multiple:@User.email,closes_on:date,title",
            "",
        ))
        .build();
        assert_eq!(
            plan.casts,
            vec![
                ("owner".to_owned(), "integer".to_owned()),
                ("reviewers".to_owned(), "array".to_owned()),
                ("closes_on".to_owned(), "date:Y-m-d".to_owned()),
            ]
        );
    }

    #[test]
    fn validation_rules() {
        let plan = PlanBuilder::new(&options(
            "title,notes:textarea:,due_days:number:nullable|integer|max:100,\
             owner:select::@User.name,levels:slider,gallery:images,status:select:nullable:Open|Closed",
            "department:belongsTo:Department",
        ))
        .build();
        assert_eq!(rule(&plan, "title"), Some("required|string|max:255"));
        assert_eq!(rule(&plan, "notes"), Some("nullable"));
        assert_eq!(rule(&plan, "due_days"), Some("nullable|integer|max:100"));
        assert_eq!(rule(&plan, "owner"), Some("required|integer|exists:users,id"));
        assert_eq!(rule(&plan, "levels"), Some("required|array"));
        assert_eq!(rule(&plan, "levels.0"), Some("integer|min:0|max:100"));
        assert_eq!(rule(&plan, "gallery"), Some("nullable|array"));
        assert_eq!(rule(&plan, "gallery.*"), Some("file|max:10240"));
        assert_eq!(rule(&plan, "status"), Some("nullable"));
        assert_eq!(
            rule(&plan, "department_id"),
            Some("nullable|integer|exists:departments,id")
        );
    }

    #[test]
    fn explicit_table_columns_keep_requested_order() {
        let mut opts = options("title,status:select::Open|Closed,notes:textarea", "");
        opts.relationships = "department:belongsTo:Department".into();
        opts.table_relationships = "department.name".into();
        opts.table_columns = vec![
            "status".into(),
            "department.name".into(),
            "missing".into(),
            "title".into(),
        ];
        let plan = PlanBuilder::new(&opts).build();
        let keys: Vec<_> = plan.table_columns.iter().map(TableColumn::key).collect();
        assert_eq!(keys, vec!["status", "department.name", "title"]);
        assert!(plan.diagnostics.contains(&DiagnosticKind::UnknownTableColumn));

        opts.table_columns.clear();
        let plan = PlanBuilder::new(&opts).build();
        let keys: Vec<_> = plan.table_columns.iter().map(TableColumn::key).collect();
        assert_eq!(keys, vec!["title", "status", "notes", "department.name"]);
    }

    #[test]
    fn only_enumerable_or_relationship_filters_survive() {
        let mut opts = options(
            "name:textbox,status:select:nullable:Open|Closed,kind:select",
            "department:belongsTo:Department",
        );
        opts.filterable = vec!["name".into(), "kind".into()];
        let plan = PlanBuilder::new(&opts).build();
        assert!(!plan.has_filters());
        assert!(plan.diagnostics.contains(&DiagnosticKind::NotFilterable));

        opts.filterable = vec!["status".into(), "department".into(), "department_id".into()];
        let plan = PlanBuilder::new(&opts).build();
        let keys: Vec<_> = plan.filters.iter().map(FilterSpec::key).collect();
        assert_eq!(keys, vec!["status", "department_id"]);
    }

    #[test]
    fn search_modes() {
        let mut opts = options(
            "name:textbox,status:select::Open|Closed,skills:checkbox-group::A|B,photo:image,code:text:searchable",
            "",
        );
        opts.searchable = vec!["name".into(), "status".into(), "skills".into(), "photo".into()];
        let plan = PlanBuilder::new(&opts).build();
        let modes: Vec<_> = plan
            .searchable
            .iter()
            .map(|search| (search.field.name(), search.mode))
            .collect();
        assert_eq!(
            modes,
            vec![
                ("name", SearchMode::Like),
                ("status", SearchMode::Exact),
                ("skills", SearchMode::JsonContains),
                ("code", SearchMode::Like),
            ]
        );
        assert_eq!(plan.primary_search().map(|s| s.field.name()), Some("name"));
        assert!(plan.diagnostics.contains(&DiagnosticKind::NotSearchable));
    }

    #[test]
    fn package_scope_and_defaults() {
        let mut opts = options("title", "");
        let plan = PlanBuilder::new(&opts).build();
        assert_eq!(plan.namespace(), "App");
        assert_eq!(plan.icon, DEFAULT_ICON);
        assert_eq!(plan.model_class(), "App\\Models\\JobOpening");
        assert_eq!(plan.permission_keys()[1], "job-openings.manage-any");

        opts.package = Some("job board".into());
        opts.system_setup = Some(String::new());
        let plan = PlanBuilder::new(&opts).build();
        assert_eq!(plan.namespace(), "Packages\\JobBoard");
        assert_eq!(plan.source_root(), "packages/job-board/src");
        assert_eq!(
            plan.controller_class(),
            "Packages\\JobBoard\\Http\\Controllers\\JobOpeningController"
        );
        assert_eq!(
            plan.system_setup,
            Some(SystemSetup {
                icon: DEFAULT_SETUP_ICON.into()
            })
        );
    }
}
