//! The `types.ts` module and the imports pages take from it.

use heck::ToSnakeCase;
use itertools::Itertools;
use modforge::{BuildPlan, Choice, FieldKind, FieldSpec, FilterSpec, TableColumn};

use super::{form_relations, record_sources};
use crate::{
    ArtifactKind, RenderContext,
    util::{label_fn_name, options_name, quote},
};

pub(crate) const RECORD_OPTION: &str = "RecordOption";
pub(crate) const RECORD_LABEL: &str = "recordLabel";

fn has_static_options(plan: &BuildPlan) -> bool {
    plan.fields.iter().any(|field| field.static_options().is_some())
}

pub(crate) fn type_helpers(plan: &BuildPlan) -> String {
    let mut helpers = Vec::new();
    if !record_sources(plan).is_empty() {
        helpers.push(format!(
            "export interface {RECORD_OPTION} {{\n    id: number;\n    [key: string]: unknown;\n}}"
        ));
    }
    if has_static_options(plan) {
        helpers.push("export interface StaticOption {\n    value: number;\n    label: string;\n}".to_owned());
    }
    if plan.fields.iter().any(|field| field.kind().is_range()) {
        helpers.push(
            "export interface DateRangeValue {\n    start: string | null;\n    end: string | null;\n}"
                .to_owned(),
        );
    }
    if plan.has_media() {
        helpers.push(
            "export interface MediaItem {\n    id: number;\n    name: string;\n    url: string;\n}"
                .to_owned(),
        );
    }
    if plan.dynamic_fields().next().is_some() {
        helpers.push(format!(
            "export const {RECORD_LABEL} = (options: {RECORD_OPTION}[], id: number | null | undefined, field: string): string =>\n    \
             String(options.find((option) => option.id === id)?.[field] ?? '');"
        ));
    }
    helpers.join("\n\n")
}

/// TypeScript type of a field as the API returns it
pub(crate) fn ts_type(field: &FieldSpec) -> String {
    let base = match field.choice() {
        Choice::Multiple if field.kind() == FieldKind::Tags => "string[]",
        Choice::Multiple => "number[]",
        Choice::Single => "number",
        Choice::None => field.def().ts_type,
    };
    if field.nullable() && !base.ends_with("null") {
        format!("{base} | null")
    } else {
        base.to_owned()
    }
}

pub(crate) fn model_attributes(plan: &BuildPlan) -> String {
    let fields = plan
        .fields
        .iter()
        .map(|field| format!("{}: {};", field.column(), ts_type(field)));
    let foreign_keys = plan
        .foreign_keys()
        .map(|rel| format!("{}: number | null;", rel.foreign_key()));
    let projections = plan
        .table_relationships
        .iter()
        .chunk_by(|projection| projection.relation())
        .into_iter()
        .map(|(relation, projections)| {
            let attributes = projections
                .map(|projection| format!("{}: string | null", projection.field()))
                .unique()
                .join("; ");
            format!(
                "{}?: {{ id: number; {attributes} }} | null;",
                relation.to_snake_case()
            )
        })
        .collect::<Vec<_>>();
    fields.chain(foreign_keys).chain(projections).join("\n")
}

/// TypeScript type of a field while it is edited
fn form_type(field: &FieldSpec) -> &'static str {
    match (field.kind(), field.choice()) {
        (FieldKind::MediaSingle, _) => "File | null",
        (FieldKind::MediaMultiple, _) => "File[]",
        (FieldKind::Tags, _) => "string[]",
        (_, Choice::Multiple) => "number[]",
        (_, Choice::Single) => "number | null",
        (FieldKind::Number | FieldKind::Rating, _) => "number | null",
        (FieldKind::Slider, _) => "number[]",
        (FieldKind::Switch, _) => "boolean",
        (FieldKind::DateRange | FieldKind::DatetimeRange, _) => "DateRangeValue",
        _ => "string",
    }
}

pub(crate) fn form_attributes(plan: &BuildPlan) -> String {
    let fields = plan
        .fields
        .iter()
        .map(|field| format!("{}: {};", field.column(), form_type(field)));
    let foreign_keys = form_relations(plan).map(|rel| format!("{}: number | null;", rel.foreign_key()));
    let method = plan.has_media().then(|| "_method?: 'put';".to_owned());
    fields.chain(foreign_keys).chain(method).join("\n")
}

pub(crate) fn filter_attributes(plan: &BuildPlan) -> String {
    plan.filters
        .iter()
        .map(|filter| format!("{}?: string;", filter.key()))
        .join("\n")
}

/// Option lists and label lookups of the static choice fields
pub(crate) fn option_constants(plan: &BuildPlan) -> String {
    plan.fields
        .iter()
        .filter(|field| field.static_options().is_some())
        .map(|field| {
            let options = options_name(field.name());
            let entries = field
                .indexed_options()
                .into_iter()
                .map(|(value, label)| format!("    {{ value: {value}, label: {} }},", quote(label)))
                .join("\n");
            format!(
                "\nexport const {options}: StaticOption[] = [\n{entries}\n];\n\n\
                 export const {label} = (value: number | null | undefined): string =>\n    \
                 {options}.find((option) => option.value === value)?.label ?? '';",
                label = label_fn_name(field.name()),
            )
        })
        .join("\n")
}

/// Names a page imports from `types.ts`
pub(crate) fn type_imports(ctx: &RenderContext) -> String {
    let plan = ctx.plan;
    let model = &plan.names.model;
    let mut types = Vec::new();
    let mut values = Vec::new();
    match ctx.artifact {
        ArtifactKind::IndexPage => {
            types.extend([model.clone(), format!("{model}Filters"), "Paginated".to_owned()]);
            for column in &plan.table_columns {
                if let TableColumn::Field(field) = column {
                    values.extend(display_helpers(field));
                }
            }
            for filter in &plan.filters {
                if let FilterSpec::Options(field) = filter {
                    values.push(options_name(field.name()));
                }
            }
        }
        ArtifactKind::CreatePage | ArtifactKind::EditPage => {
            if ctx.artifact == ArtifactKind::EditPage {
                types.push(model.clone());
            }
            types.push(format!("{model}FormData"));
            values.extend(
                plan.fields
                    .iter()
                    .filter(|field| field.static_options().is_some())
                    .map(|field| options_name(field.name())),
            );
        }
        ArtifactKind::DetailModal | ArtifactKind::DetailPage => {
            types.push(model.clone());
            values.extend(plan.fields.iter().flat_map(display_helpers));
        }
        _ => {}
    }
    if !record_sources(plan).is_empty() {
        types.push(RECORD_OPTION.to_owned());
    }
    types
        .into_iter()
        .map(|name| format!("type {name}"))
        .chain(values.into_iter().unique())
        .join(", ")
}

/// Helpers of `types.ts` used to display a field
pub(crate) fn display_helpers(field: &FieldSpec) -> Vec<String> {
    if field.static_options().is_some() {
        vec![label_fn_name(field.name())]
    } else if field.is_dynamic() {
        vec![RECORD_LABEL.to_owned()]
    } else {
        Vec::new()
    }
}
