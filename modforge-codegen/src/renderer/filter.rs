//! Filter controls of the index page.
//!
//! Every fragment is empty when the plan has no filters, so the page carries
//! no dead filter state.

use itertools::Itertools;
use modforge::{BuildPlan, FilterSpec};

use super::{record_choices, record_sources};
use crate::util::{options_name, quote};

pub(crate) fn filter_state(plan: &BuildPlan) -> String {
    if !plan.has_filters() {
        return String::new();
    }
    let values = plan
        .filters
        .iter()
        .map(|filter| format!("filters.{}", filter.key()))
        .join(", ");
    format!(
        "const [showFilters, setShowFilters] = useState(false);\n\
         const activeFilterCount = [{values}].filter((value) => value !== undefined && value !== null && value !== '').length;"
    )
}

/// Toggle button carrying the number of active filters
pub(crate) fn filter_badge(plan: &BuildPlan) -> String {
    if !plan.has_filters() {
        return String::new();
    }
    "<Button type=\"button\" variant=\"outline\" onClick={() => setShowFilters(!showFilters)}>\n    \
     <Filter className=\"size-4\" /> Filters\n    \
     {activeFilterCount > 0 && <Badge variant=\"secondary\">{activeFilterCount}</Badge>}\n\
     </Button>"
        .to_owned()
}

/// `[{ value, label }]` expression listing the choices of a filter
fn choices(plan: &BuildPlan, filter: &FilterSpec) -> String {
    match filter {
        FilterSpec::Options(field) => options_name(field.name()),
        FilterSpec::Records(field) => {
            let display = field.dynamic_source().map_or("name", |(_, display)| display);
            record_choices(&options_name(field.name()), display)
        }
        FilterSpec::Relation(rel) => {
            let prop = options_name(rel.name());
            let display = record_sources(plan)
                .into_iter()
                .find(|source| source.prop == prop)
                .map_or("name", |source| source.display);
            record_choices(&prop, display)
        }
    }
}

pub(crate) fn filter_ui(plan: &BuildPlan) -> String {
    if !plan.has_filters() {
        return String::new();
    }
    let selects = plan
        .filters
        .iter()
        .map(|filter| {
            let key = filter.key();
            format!(
                "<Select value={{filters.{key} ?? ''}} onValueChange={{(value) => applyFilters({{ {key}: value }})}}>\n    \
                 <SelectTrigger className=\"w-48\">\n        \
                 <SelectValue placeholder={{{label}}} />\n    \
                 </SelectTrigger>\n    \
                 <SelectContent>\n        \
                 {{{choices}.map((option) => (\n            \
                 <SelectItem key={{option.value}} value={{String(option.value)}}>\n                \
                 {{option.label}}\n            \
                 </SelectItem>\n        \
                 ))}}\n    \
                 </SelectContent>\n\
                 </Select>",
                label = quote(&filter.label()),
                choices = choices(plan, filter),
            )
        })
        .join("\n");
    let cleared = plan
        .filters
        .iter()
        .map(|filter| format!("{}: undefined", filter.key()))
        .join(", ");
    format!(
        "{{showFilters && (\n    \
         <div className=\"flex flex-wrap items-center gap-2\">\n\
         {}\n        \
         <Button type=\"button\" variant=\"ghost\" onClick={{() => applyFilters({{ {cleared} }})}}>\n            \
         <X className=\"size-4\" /> Clear\n        \
         </Button>\n    \
         </div>\n\
         )}}",
        crate::util::indent(&selects, "        ")
    )
}
