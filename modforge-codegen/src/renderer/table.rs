//! List columns of the index page, and how a stored value is shown.

use heck::ToSnakeCase;
use itertools::Itertools;
use modforge::{BuildPlan, FieldKind, FieldSpec, TableColumn, TableRelationshipSpec};

use super::types::RECORD_LABEL;
use crate::util::{label_fn_name, options_name, quote};

/// Badges shown in a list cell before collapsing into `+N`
pub const BADGE_LIMIT: usize = 2;

/// Where a value is displayed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Display {
    /// A compact list cell
    Cell,
    /// A detail card, nothing is truncated
    Card,
}

pub(crate) fn table_headers(plan: &BuildPlan) -> String {
    plan.table_columns
        .iter()
        .map(|column| format!("<TableHead>{}</TableHead>", column.label()))
        .join("\n")
}

pub(crate) fn table_cells(plan: &BuildPlan, js: &str) -> String {
    plan.table_columns
        .iter()
        .map(|column| {
            let value = match column {
                TableColumn::Field(field) => field_value(field, js, Display::Cell),
                TableColumn::Relation(projection) => relation_value(projection, js),
            };
            format!("<TableCell>{value}</TableCell>")
        })
        .join("\n")
}

/// Whether showing the field needs the `Badge` component
pub(crate) fn uses_badge(field: &FieldSpec) -> bool {
    field.static_options().is_some() || field.is_multi_choice()
}

pub(crate) fn relation_value(projection: &TableRelationshipSpec, js: &str) -> String {
    format!(
        "{{{js}.{}?.{} ?? '-'}}",
        projection.relation().to_snake_case(),
        projection.field()
    )
}

/// JSX showing the value of `field` on the record bound to `js`
pub(crate) fn field_value(field: &FieldSpec, js: &str, display: Display) -> String {
    let value = format!("{js}.{}", field.column());
    if field.is_multi_choice() {
        let label = if let Some((_, shown)) = field.dynamic_source() {
            format!(
                "{RECORD_LABEL}({}, item, {})",
                options_name(field.name()),
                quote(shown)
            )
        } else if field.static_options().is_some() {
            format!("{}(item)", label_fn_name(field.name()))
        } else {
            "item".to_owned()
        };
        return badges(&value, &label, display);
    }
    if let Some((_, shown)) = field.dynamic_source() {
        return format!(
            "{{{RECORD_LABEL}({}, {value}, {})}}",
            options_name(field.name()),
            quote(shown)
        );
    }
    if field.static_options().is_some() {
        return format!(
            "<Badge variant=\"outline\">{{{}({value})}}</Badge>",
            label_fn_name(field.name())
        );
    }
    match field.kind() {
        FieldKind::Switch => format!("{{{value} ? 'Yes' : 'No'}}"),
        FieldKind::Color => format!(
            "<span className=\"inline-flex items-center gap-2\">\n    \
             <span className=\"size-4 rounded border\" style={{{{ backgroundColor: {value} ?? undefined }}}} />\n    \
             {{{value}}}\n</span>"
        ),
        FieldKind::Slider => format!("{{{value}?.join(' - ') ?? '-'}}"),
        FieldKind::DateRange | FieldKind::DatetimeRange => format!(
            "{{{value} ? `${{{value}.start ?? ''}} - ${{{value}.end ?? ''}}` : '-'}}"
        ),
        FieldKind::Rating => format!("{{{value} ? '★'.repeat({value}) : '-'}}"),
        FieldKind::RichText => match display {
            Display::Cell => format!(
                "<span className=\"line-clamp-1\">{{{value}?.replace(/<[^>]+>/g, '') ?? ''}}</span>"
            ),
            Display::Card => format!(
                "<div className=\"prose prose-sm\" dangerouslySetInnerHTML={{{{ __html: {value} ?? '' }}}} />"
            ),
        },
        FieldKind::Textarea if display == Display::Cell => {
            format!("<span className=\"line-clamp-1 max-w-xs\">{{{value}}}</span>")
        }
        FieldKind::MediaSingle => media_single(field, &value, display),
        FieldKind::MediaMultiple => match display {
            Display::Cell => format!("{{{value}.length}} files"),
            Display::Card => format!(
                "<ul className=\"flex flex-col gap-1\">\n    \
                 {{{value}.map((media) => (\n        \
                 <li key={{media.id}}>\n            \
                 <a href={{media.url}} target=\"_blank\" rel=\"noreferrer\" className=\"underline\">\n                \
                 {{media.name}}\n            \
                 </a>\n        \
                 </li>\n    \
                 ))}}\n</ul>"
            ),
        },
        _ => format!("{{{value} ?? '-'}}"),
    }
}

fn media_single(field: &FieldSpec, value: &str, display: Display) -> String {
    let size = match display {
        Display::Cell => "size-10",
        Display::Card => "max-h-48",
    };
    if field.flags().show_preview {
        format!(
            "{{{value} ? (\n    \
             <img src={{{value}.url}} alt={{{value}.name}} className=\"{size} rounded object-cover\" />\n\
             ) : (\n    '-'\n)}}"
        )
    } else {
        format!(
            "{{{value} ? (\n    \
             <a href={{{value}.url}} target=\"_blank\" rel=\"noreferrer\" className=\"underline\">\n        \
             {{{value}.name}}\n    \
             </a>\n\
             ) : (\n    '-'\n)}}"
        )
    }
}

/// A badge per item, capped in list cells
fn badges(value: &str, label: &str, display: Display) -> String {
    let items = format!("({value} ?? [])");
    match display {
        Display::Cell => format!(
            "<div className=\"flex flex-wrap gap-1\">\n    \
             {{{items}.slice(0, {BADGE_LIMIT}).map((item) => (\n        \
             <Badge key={{item}} variant=\"outline\">\n            \
             {{{label}}}\n        \
             </Badge>\n    \
             ))}}\n    \
             {{{items}.length > {BADGE_LIMIT} && <Badge variant=\"secondary\">+{{{items}.length - {BADGE_LIMIT}}}</Badge>}}\n\
             </div>"
        ),
        Display::Card => format!(
            "<div className=\"flex flex-wrap gap-1\">\n    \
             {{{items}.map((item) => (\n        \
             <Badge key={{item}} variant=\"outline\">\n            \
             {{{label}}}\n        \
             </Badge>\n    \
             ))}}\n\
             </div>"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge::{GenerateOptions, PlanBuilder};
    use pretty_assertions::assert_eq;

    fn plan(fields: &str) -> BuildPlan {
        PlanBuilder::new(&GenerateOptions {
            display_name: "Ticket".into(),
            fields: fields.into(),
            ..Default::default()
        })
        .build()
    }

    #[test]
    fn status_cell_is_a_badge() {
        let plan = plan("status:select::Open|Closed");
        assert_eq!(
            table_cells(&plan, "ticket"),
            "<TableCell><Badge variant=\"outline\">{statusLabel(ticket.status)}</Badge></TableCell>"
        );
    }

    #[test]
    fn multi_values_are_capped_in_cells() {
        let plan = plan("labels:tags");
        let field = plan.field("labels").unwrap();
        let cell = field_value(field, "ticket", Display::Cell);
        assert!(cell.contains("(ticket.labels ?? []).slice(0, 2)"));
        assert!(cell.contains("+{(ticket.labels ?? []).length - 2}"));
        let card = field_value(field, "ticket", Display::Card);
        assert!(!card.contains("slice"));
    }

    #[test]
    fn dynamic_options_resolve_their_label() {
        let plan = plan("owner:select::@User.email");
        let field = plan.field("owner").unwrap();
        assert_eq!(
            field_value(field, "ticket", Display::Cell),
            "{recordLabel(ownerOptions, ticket.owner, 'email')}"
        );
        assert!(!uses_badge(field));
    }

    #[test]
    fn headers_use_labels() {
        let plan = plan("title,due_days:number");
        assert_eq!(
            table_headers(&plan),
            "<TableHead>Title</TableHead>\n<TableHead>Due Days</TableHead>"
        );
    }
}
