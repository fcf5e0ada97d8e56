//! Parent → child inference between declared relationships.
//!
//! A child select whose options depend on the selected parent (category →
//! subcategory) needs a fetch endpoint, a cached option list and a re-fetch
//! effect. Which relationship pairs cascade is decided here.

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tracing::debug;

use crate::{RelationshipSpec, names::pluralize};

/// How adjacent relationships are paired when no explicit `^parent` is given
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Display, AsRefStr, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum InferenceMode {
    /// Every relationship depends on its predecessor
    Adjacent,
    /// Adjacent pairs whose names or targets contain one another
    #[default]
    Containment,
    /// Only `child^parent` markers
    Explicit,
}

/// An inferred parent → child cascade
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyEdge {
    pub parent: RelationshipSpec,
    pub child: RelationshipSpec,
    pub cascade: CascadeContract,
}

/// What the UI and the route table need to wire one cascade
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CascadeContract {
    /// Controller method, `getSubcategoriesByCategory`
    pub endpoint: String,
    /// Client-side cached list, `subcategories`
    pub state: String,
    /// `job-openings.subcategories-by-category`
    pub route_name: String,
    /// `/job-openings/subcategories-by-category/{category}`
    pub route_path: String,
    /// Route parameter carrying the parent id
    pub parent_param: String,
    /// Column on the child's table pointing at the parent, `category_id`
    pub child_parent_column: String,
}

/// Pair up relationships of the entity `model` served under `route`
pub fn infer_dependencies(
    relationships: &[RelationshipSpec],
    model: &str,
    route: &str,
    mode: InferenceMode,
) -> Vec<DependencyEdge> {
    let eligible = |rel: &RelationshipSpec| rel.owns_foreign_key() && !rel.is_self_reference(model);
    let mut edges = Vec::new();

    for (i, child) in relationships.iter().enumerate() {
        if !eligible(child) {
            continue;
        }
        let parent = match child.depends_on() {
            Some(parent) => relationships.iter().find(|rel| rel.name() == parent),
            None if mode == InferenceMode::Explicit || i == 0 => None,
            None => {
                let prev = &relationships[i - 1];
                match mode {
                    InferenceMode::Adjacent => Some(prev),
                    _ if contains_either(child, prev) => Some(prev),
                    _ => None,
                }
            }
        };
        let Some(parent) = parent.filter(|&parent| eligible(parent)) else {
            continue;
        };
        debug!("{} cascades from {}", child.name(), parent.name());
        edges.push(DependencyEdge {
            cascade: CascadeContract::new(parent, child, route),
            parent: parent.clone(),
            child: child.clone(),
        });
    }
    edges
}

fn contains_either(child: &RelationshipSpec, parent: &RelationshipSpec) -> bool {
    let child_names = [child.name().to_lowercase(), child.target().to_lowercase()];
    let parent_names = [parent.name().to_lowercase(), parent.target().to_lowercase()];
    child_names
        .iter()
        .any(|c| parent_names.iter().any(|p| c != p && c.contains(p.as_str())))
}

impl CascadeContract {
    fn new(parent: &RelationshipSpec, child: &RelationshipSpec, route: &str) -> Self {
        let child_plural = pluralize(&child.target().to_snake_case());
        let parent_singular = parent.target().to_snake_case();
        let segment = format!(
            "{}-by-{}",
            child_plural.to_kebab_case(),
            parent_singular.to_kebab_case()
        );
        let parent_param = parent.name().to_lower_camel_case();
        Self {
            endpoint: format!(
                "get{}By{}",
                child_plural.to_upper_camel_case(),
                parent_singular.to_upper_camel_case()
            ),
            state: child_plural.to_lower_camel_case(),
            route_name: format!("{route}.{segment}"),
            route_path: format!("/{route}/{segment}/{{{parent_param}}}"),
            child_parent_column: format!("{parent_singular}_id"),
            parent_param,
        }
    }
}
