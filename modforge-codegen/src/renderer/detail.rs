use itertools::Itertools;
use modforge::{BuildPlan, ViewMode};

use super::table::{Display, field_value, relation_value, uses_badge};
use crate::util::{escape_js_keyword, quote};

fn card(label: &str, value: &str) -> String {
    format!(
        "<div className=\"rounded-lg border p-3\">\n    \
         <div className=\"text-muted-foreground text-sm\">{label}</div>\n    \
         <div className=\"font-medium\">\n{}\n    </div>\n</div>",
        crate::util::indent(value, "        ")
    )
}

/// One card per field, then one per projected relation column
pub(crate) fn detail_cards(plan: &BuildPlan) -> String {
    let js = escape_js_keyword(&plan.names.variable);
    let fields = plan
        .fields
        .iter()
        .map(|field| card(&field.label(), &field_value(field, &js, Display::Card)));
    let projections = plan
        .table_relationships
        .iter()
        .map(|projection| card(&projection.label(), &relation_value(projection, &js)));
    fields.chain(projections).join("\n")
}

pub(crate) fn detail_imports(plan: &BuildPlan) -> String {
    if plan.fields.iter().any(uses_badge) {
        "import { Badge } from '@/components/ui/badge';".to_owned()
    } else {
        String::new()
    }
}

pub(crate) fn detail_state(plan: &BuildPlan) -> String {
    if plan.view_mode == Some(ViewMode::Modal) {
        format!(
            "const [selected, setSelected] = useState<{} | null>(null);",
            plan.names.model
        )
    } else {
        String::new()
    }
}

/// The eye button of a list row
pub(crate) fn detail_trigger(plan: &BuildPlan) -> String {
    let js = escape_js_keyword(&plan.names.variable);
    match plan.view_mode {
        Some(ViewMode::Modal) => format!(
            "<Button variant=\"ghost\" size=\"icon\" onClick={{() => setSelected({js})}}>\n    \
             <Eye className=\"size-4\" />\n</Button>"
        ),
        Some(ViewMode::Page) => format!(
            "<Button variant=\"ghost\" size=\"icon\" asChild>\n    \
             <Link href={{`/{}/${{{js}.id}}`}}>\n        \
             <Eye className=\"size-4\" />\n    \
             </Link>\n</Button>",
            plan.names.route
        ),
        None => String::new(),
    }
}

pub(crate) fn detail_component(plan: &BuildPlan, prop_names: &[String]) -> String {
    if plan.view_mode != Some(ViewMode::Modal) {
        return String::new();
    }
    let props = prop_names
        .iter()
        .map(|prop| format!(" {prop}={{{prop}}}"))
        .join("");
    format!(
        "<{}DetailModal {}={{selected}} onClose={{() => setSelected(null)}}{props} />",
        plan.names.model,
        escape_js_keyword(&plan.names.variable)
    )
}

/// Import of the detail modal into the index page
pub(crate) fn modal_import(plan: &BuildPlan) -> Option<String> {
    (plan.view_mode == Some(ViewMode::Modal)).then(|| {
        format!(
            "import {}DetailModal from {};",
            plan.names.model,
            quote(&format!(
                "./components/{}-detail-modal",
                plan.names.route_singular
            ))
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge::{GenerateOptions, PlanBuilder};
    use pretty_assertions::assert_eq;

    fn plan(view_mode: Option<ViewMode>) -> BuildPlan {
        PlanBuilder::new(&GenerateOptions {
            display_name: "Class".into(),
            fields: "title,status:select::Open|Closed".into(),
            view_mode,
            ..Default::default()
        })
        .build()
    }

    #[test]
    fn cards_cover_every_field() {
        let cards = detail_cards(&plan(Some(ViewMode::Page)));
        assert_eq!(cards.matches("rounded-lg border p-3").count(), 2);
        assert!(cards.contains("{classRecord.title ?? '-'}"));
        assert!(cards.contains("{statusLabel(classRecord.status)}"));
    }

    #[test]
    fn trigger_depends_on_view_mode() {
        assert!(detail_trigger(&plan(None)).is_empty());
        assert!(detail_trigger(&plan(Some(ViewMode::Modal))).contains("setSelected(classRecord)"));
        assert!(
            detail_trigger(&plan(Some(ViewMode::Page))).contains("href={`/classes/${classRecord.id}`}")
        );
    }

    #[test]
    fn modal_receives_option_props() {
        let plan = plan(Some(ViewMode::Modal));
        assert_eq!(
            detail_component(&plan, &["ownerOptions".to_owned()]),
            "<ClassDetailModal classRecord={selected} onClose={() => setSelected(null)} ownerOptions={ownerOptions} />"
        );
        assert_eq!(
            modal_import(&plan).as_deref(),
            Some("import ClassDetailModal from './components/class-detail-modal';")
        );
    }
}
