//! Client side of dependent selects: the child list is refetched whenever
//! the parent changes.

use heck::ToUpperCamelCase;
use itertools::Itertools;
use modforge::{BuildPlan, DependencyEdge};

use super::types::RECORD_OPTION;
use crate::util::options_name;

/// URL of the cascade endpoint with the parent id taken from the form
fn endpoint_url(edge: &DependencyEdge) -> String {
    edge.cascade.route_path.replace(
        &format!("{{{}}}", edge.cascade.parent_param),
        &format!("${{data.{}}}", edge.parent.foreign_key()),
    )
}

pub(crate) fn cascade_state(plan: &BuildPlan) -> String {
    plan.dependencies
        .iter()
        .map(|edge| {
            let state = &edge.cascade.state;
            let setter = format!("set{}", state.to_upper_camel_case());
            let parent = format!("data.{}", edge.parent.foreign_key());
            format!(
                "\nconst [{state}, {setter}] = useState<{RECORD_OPTION}[]>({initial});\n\
                 useEffect(() => {{\n    \
                 if ({parent} === null) {{\n        \
                 {setter}([]);\n        \
                 return;\n    \
                 }}\n    \
                 fetch(`{url}`)\n        \
                 .then((response) => response.json())\n        \
                 .then((records: {RECORD_OPTION}[]) => {setter}(records));\n\
                 }}, [{parent}]);",
                initial = options_name(edge.child.name()),
                url = endpoint_url(edge),
            )
        })
        .join("\n")
}

/// Children whose selection is cleared when the parent `relation` changes
pub(crate) fn dependents<'p>(plan: &'p BuildPlan, relation: &str) -> Vec<&'p DependencyEdge> {
    plan.dependencies
        .iter()
        .filter(|edge| edge.parent.name() == relation)
        .collect()
}

/// The list a child select draws from, the fetched state instead of the prop
pub(crate) fn child_list<'p>(plan: &'p BuildPlan, relation: &str) -> Option<&'p str> {
    plan.dependencies
        .iter()
        .find(|edge| edge.child.name() == relation)
        .map(|edge| edge.cascade.state.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge::{GenerateOptions, PlanBuilder};
    use pretty_assertions::assert_eq;

    fn plan() -> BuildPlan {
        PlanBuilder::new(&GenerateOptions {
            display_name: "Product".into(),
            fields: "name".into(),
            relationships: "category:belongsTo:Category,subcategory:belongsTo:Subcategory".into(),
            ..Default::default()
        })
        .build()
    }

    #[test]
    fn child_list_is_fetched_from_the_parent_endpoint() {
        let plan = plan();
        let state = cascade_state(&plan);
        assert!(state.contains(
            "const [subcategories, setSubcategories] = useState<RecordOption[]>(subcategoryOptions);"
        ));
        assert!(state.contains(
            "fetch(`/products/subcategories-by-category/${data.category_id}`)"
        ));
        assert!(state.ends_with("}, [data.category_id]);"));
    }

    #[test]
    fn parent_and_child_lookups() {
        let plan = plan();
        assert_eq!(dependents(&plan, "category").len(), 1);
        assert!(dependents(&plan, "subcategory").is_empty());
        assert_eq!(child_list(&plan, "subcategory"), Some("subcategories"));
        assert_eq!(child_list(&plan, "category"), None);
    }
}
