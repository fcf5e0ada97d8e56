//! Create and edit forms.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use modforge::{BuildPlan, Choice, FieldKind, FieldSpec, RelationshipSpec};

use super::{
    ArtifactKind, RenderContext,
    cascade::{child_list, dependents},
    display_field, form_relations, record_choices, record_sources,
    types::RECORD_OPTION,
};
use crate::util::{escape_js_keyword, indent, options_name};

const SELECT_PARTS: [&str; 4] = ["SelectContent", "SelectItem", "SelectTrigger", "SelectValue"];

fn field_choices(field: &FieldSpec) -> String {
    match field.dynamic_source() {
        Some((_, display)) => record_choices(&options_name(field.name()), display),
        None => options_name(field.name()),
    }
}

/// Component and module of the control editing `field`
fn binding(field: &FieldSpec) -> (&'static str, &'static str) {
    let ui = field.def().ui;
    if field.kind() == FieldKind::Select && field.choice() == Choice::Multiple {
        ("MultiSelect", "@/components/ui/multi-select")
    } else {
        (ui.component, ui.import)
    }
}

pub(crate) fn form_imports(plan: &BuildPlan) -> String {
    let mut imports: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for field in &plan.fields {
        let (component, module) = binding(field);
        let names = imports.entry(module).or_default();
        names.insert(component);
        match component {
            "Select" => names.extend(SELECT_PARTS),
            "RadioGroup" => {
                names.insert("RadioGroupItem");
            }
            _ => {}
        }
        if field.kind().is_range() {
            names.insert("Input");
        }
    }
    if form_relations(plan).next().is_some() {
        imports
            .entry("@/components/ui/select")
            .or_default()
            .extend(["Select"].into_iter().chain(SELECT_PARTS));
    }
    imports
        .into_iter()
        .map(|(module, names)| format!("import {{ {} }} from '{module}';", names.iter().join(", ")))
        .join("\n")
}

pub(crate) fn react_imports(plan: &BuildPlan) -> String {
    if plan.dependencies.is_empty() {
        "type FormEventHandler".to_owned()
    } else {
        "type FormEventHandler, useEffect, useState".to_owned()
    }
}

/// Record lists the forms receive as props
pub(crate) fn form_props(plan: &BuildPlan) -> String {
    record_sources(plan)
        .iter()
        .map(|source| format!("{}: {RECORD_OPTION}[];", source.prop))
        .join("\n")
}

pub(crate) fn prop_names(plan: &BuildPlan) -> Vec<String> {
    record_sources(plan)
        .into_iter()
        .map(|source| source.prop)
        .collect()
}

/// Destructured prop names; appended to other names on every page but create
pub(crate) fn prop_name_list(ctx: &RenderContext) -> String {
    let names = prop_names(ctx.plan);
    if ctx.artifact == ArtifactKind::CreatePage {
        names.join(", ")
    } else {
        names.iter().map(|name| format!(", {name}")).join("")
    }
}

fn blank_value(field: &FieldSpec) -> &'static str {
    match (field.kind(), field.choice()) {
        (FieldKind::MediaSingle, _) => "null",
        (FieldKind::MediaMultiple | FieldKind::Tags, _) => "[]",
        (_, Choice::Multiple) => "[]",
        (_, Choice::Single) => "null",
        (FieldKind::Number | FieldKind::Rating, _) => "null",
        (FieldKind::Slider, _) => "[0]",
        (FieldKind::Switch, _) => "false",
        (FieldKind::DateRange | FieldKind::DatetimeRange, _) => "{ start: null, end: null }",
        (FieldKind::Color, _) => "'#000000'",
        _ => "''",
    }
}

pub(crate) fn form_defaults(ctx: &RenderContext) -> String {
    let plan = ctx.plan;
    let editing = ctx.artifact == ArtifactKind::EditPage;
    let js = escape_js_keyword(&plan.names.variable);
    let fields = plan.fields.iter().map(|field| {
        let blank = blank_value(field);
        if editing && !field.kind().is_media() {
            format!("{}: {js}.{} ?? {blank},", field.column(), field.column())
        } else {
            format!("{}: {blank},", field.column())
        }
    });
    let foreign_keys = form_relations(plan).map(|rel| {
        if editing {
            format!("{}: {js}.{} ?? null,", rel.foreign_key(), rel.foreign_key())
        } else {
            format!("{}: null,", rel.foreign_key())
        }
    });
    let method = (editing && plan.has_media()).then(|| "_method: 'put',".to_owned());
    fields.chain(foreign_keys).chain(method).join("\n")
}

pub(crate) fn submit_method(plan: &BuildPlan) -> &'static str {
    if plan.has_media() { "post" } else { "put" }
}

pub(crate) fn submit_call(ctx: &RenderContext) -> String {
    let plan = ctx.plan;
    let route = &plan.names.route;
    let options = if plan.has_media() {
        ", { forceFormData: true }"
    } else {
        ""
    };
    match ctx.artifact {
        ArtifactKind::EditPage => format!(
            "{}(`/{route}/${{{}.id}}`{options});",
            submit_method(plan),
            escape_js_keyword(&plan.names.variable)
        ),
        _ => format!("post('/{route}'{options});"),
    }
}

pub(crate) fn form_fields(ctx: &RenderContext) -> String {
    let plan = ctx.plan;
    let editing = ctx.artifact == ArtifactKind::EditPage;
    let js = escape_js_keyword(&plan.names.variable);
    let fields = plan.fields.iter().map(|field| {
        let mut control = field_control(field);
        if editing && field.kind().is_media() {
            control.push('\n');
            control.push_str(&current_media(field, &js));
        }
        wrap(field.column(), &field.label(), &control)
    });
    let relations = form_relations(plan)
        .map(|rel| wrap(rel.foreign_key(), &rel.label(), &relation_control(plan, rel)));
    fields.chain(relations).join("\n")
}

fn wrap(key: &str, label: &str, control: &str) -> String {
    format!(
        "<div className=\"grid gap-2\">\n    \
         <Label htmlFor=\"{key}\">{label}</Label>\n\
         {}\n    \
         <InputError message={{errors.{key}}} />\n\
         </div>",
        indent(control, "    ")
    )
}

fn select(key: &str, label: &str, choices: &str, on_change: &str) -> String {
    format!(
        "<Select value={{data.{key} === null ? '' : String(data.{key})}} onValueChange={{{on_change}}}>\n    \
         <SelectTrigger id=\"{key}\">\n        \
         <SelectValue placeholder=\"Select {label}\" />\n    \
         </SelectTrigger>\n    \
         <SelectContent>\n        \
         {{{choices}.map((option) => (\n            \
         <SelectItem key={{option.value}} value={{String(option.value)}}>\n                \
         {{option.label}}\n            \
         </SelectItem>\n        \
         ))}}\n    \
         </SelectContent>\n\
         </Select>"
    )
}

fn relation_control(plan: &BuildPlan, rel: &RelationshipSpec) -> String {
    let key = rel.foreign_key();
    let list = child_list(plan, rel.name())
        .map(str::to_owned)
        .unwrap_or_else(|| options_name(rel.name()));
    let choices = record_choices(&list, display_field(plan, rel));
    let children = dependents(plan, rel.name());
    let on_change = if children.is_empty() {
        format!("(value) => setData('{key}', Number(value))")
    } else {
        let cleared = children
            .iter()
            .map(|edge| format!(", {}: null", edge.child.foreign_key()))
            .join("");
        format!("(value) => setData((previous) => ({{ ...previous, {key}: Number(value){cleared} }}))")
    };
    select(key, &rel.label(), &choices, &on_change)
}

fn field_control(field: &FieldSpec) -> String {
    let key = field.column();
    let set_text = format!("(e) => setData('{key}', e.target.value)");
    let (component, _) = binding(field);
    match component {
        "Select" => select(
            key,
            &field.label(),
            &field_choices(field),
            &format!("(value) => setData('{key}', Number(value))"),
        ),
        "MultiSelect" => format!(
            "<MultiSelect id=\"{key}\" options={{{}}} value={{data.{key}}} onChange={{(value) => setData('{key}', value)}} />",
            field_choices(field)
        ),
        "RadioGroup" => format!(
            "<RadioGroup value={{data.{key} === null ? '' : String(data.{key})}} onValueChange={{(value) => setData('{key}', Number(value))}}>\n    \
             {{{choices}.map((option) => (\n        \
             <div key={{option.value}} className=\"flex items-center gap-2\">\n            \
             <RadioGroupItem id={{`{key}-${{option.value}}`}} value={{String(option.value)}} />\n            \
             <Label htmlFor={{`{key}-${{option.value}}`}}>{{option.label}}</Label>\n        \
             </div>\n    \
             ))}}\n\
             </RadioGroup>",
            choices = field_choices(field),
        ),
        "Checkbox" => format!(
            "<div className=\"flex flex-wrap gap-4\">\n    \
             {{{choices}.map((option) => (\n        \
             <div key={{option.value}} className=\"flex items-center gap-2\">\n            \
             <Checkbox\n                \
             id={{`{key}-${{option.value}}`}}\n                \
             checked={{data.{key}.includes(option.value)}}\n                \
             onCheckedChange={{(checked) =>\n                    \
             setData('{key}', checked ? [...data.{key}, option.value] : data.{key}.filter((value) => value !== option.value))\n                \
             }}\n            \
             />\n            \
             <Label htmlFor={{`{key}-${{option.value}}`}}>{{option.label}}</Label>\n        \
             </div>\n    \
             ))}}\n\
             </div>",
            choices = field_choices(field),
        ),
        "Textarea" => format!("<Textarea id=\"{key}\" value={{data.{key}}} onChange={{{set_text}}} />"),
        "RichTextEditor" => format!(
            "<RichTextEditor id=\"{key}\" value={{data.{key}}} onChange={{(value) => setData('{key}', value)}} />"
        ),
        "Rating" => format!(
            "<Rating id=\"{key}\" value={{data.{key} ?? 0}} onChange={{(value) => setData('{key}', value)}} />"
        ),
        "Slider" => format!(
            "<Slider id=\"{key}\" value={{data.{key}}} min={{0}} max={{100}} step={{1}} onValueChange={{(value) => setData('{key}', value)}} />"
        ),
        "Switch" => format!(
            "<Switch id=\"{key}\" checked={{data.{key}}} onCheckedChange={{(checked) => setData('{key}', checked === true)}} />"
        ),
        "TagInput" => format!(
            "<TagInput id=\"{key}\" value={{data.{key}}} onChange={{(value) => setData('{key}', value)}} />"
        ),
        _ => input_control(field, &set_text),
    }
}

fn input_control(field: &FieldSpec, set_text: &str) -> String {
    let key = field.column();
    let input_type = field.def().ui.input_type.unwrap_or("text");
    match field.kind() {
        FieldKind::DateRange | FieldKind::DatetimeRange => format!(
            "<div className=\"flex items-center gap-2\">\n    \
             <Input id=\"{key}\" type=\"{input_type}\" value={{data.{key}.start ?? ''}} onChange={{(e) => setData('{key}', {{ ...data.{key}, start: e.target.value || null }})}} />\n    \
             <span>-</span>\n    \
             <Input type=\"{input_type}\" value={{data.{key}.end ?? ''}} onChange={{(e) => setData('{key}', {{ ...data.{key}, end: e.target.value || null }})}} />\n\
             </div>"
        ),
        FieldKind::Number => format!(
            "<Input id=\"{key}\" type=\"number\" value={{data.{key} ?? ''}} onChange={{(e) => setData('{key}', e.target.value === '' ? null : Number(e.target.value))}} />"
        ),
        FieldKind::Currency => format!(
            "<Input id=\"{key}\" type=\"number\" step=\"0.01\" min=\"0\" value={{data.{key}}} onChange={{{set_text}}} />"
        ),
        FieldKind::MediaSingle => {
            let accept = if field.flags().show_preview {
                " accept=\"image/*\""
            } else {
                ""
            };
            format!(
                "<Input id=\"{key}\" type=\"file\"{accept} onChange={{(e) => setData('{key}', e.target.files?.[0] ?? null)}} />"
            )
        }
        FieldKind::MediaMultiple => format!(
            "<Input id=\"{key}\" type=\"file\" multiple onChange={{(e) => setData('{key}', Array.from(e.target.files ?? []))}} />"
        ),
        _ => format!(
            "<Input id=\"{key}\" type=\"{input_type}\" value={{data.{key}}} onChange={{{set_text}}} />"
        ),
    }
}

/// What is already uploaded, shown above the file input of the edit form
fn current_media(field: &FieldSpec, js: &str) -> String {
    let value = format!("{js}.{}", field.column());
    match field.kind() {
        FieldKind::MediaSingle if field.flags().show_preview => format!(
            "{{{value} && <img src={{{value}.url}} alt={{{value}.name}} className=\"max-h-32 rounded object-cover\" />}}"
        ),
        FieldKind::MediaSingle => format!(
            "{{{value} && <p className=\"text-muted-foreground text-sm\">Current: {{{value}.name}}</p>}}"
        ),
        _ => format!(
            "{{{value}.length > 0 && (\n    \
             <p className=\"text-muted-foreground text-sm\">Current: {{{value}.map((media) => media.name).join(', ')}}</p>\n\
             )}}"
        ),
    }
}
