//! Entries a module registers in the shared files of the host project.

use std::collections::HashMap;

use heck::{ToLowerCamelCase, ToUpperCamelCase};
use modforge::{BuildPlan, RelationshipSpec, ViewMode};

use super::Layout;
use crate::{Anchor, Entry, Presence, Registration, renderer::model_class, util::quote};

const ROUTE_MIDDLEWARE: &str = "Route::middleware(['auth', 'verified'])";

const ROUTES_ANCHOR: &str = r"(?m)^[ \t]*require\s+__DIR__\s*\.\s*'/(?:settings|auth)\.php';";
const PERMISSIONS_ANCHOR: &str = r"\$permissions\s*=\s*\[";
const MAIN_NAV_ANCHOR: &str = r"const mainNavItems(?:\s*:\s*NavItem\[\])?\s*=\s*\[";
const SETUP_NAV_ANCHOR: &str = r"const setupNavItems(?:\s*:\s*NavItem\[\])?\s*=\s*\[";
const ICONS_ANCHOR: &str = r"import\s*\{[^}]*\}\s*from\s*'lucide-react';";
const SEEDER_ANCHOR: &str = r"public function run\(\)(?:\s*:\s*void)?\s*\{";
const CLASS_END_ANCHOR: &str = r"(?m)^\}[ \t]*$";

/// Registrations in the files every module shares
pub fn registrations(plan: &BuildPlan, layout: &Layout) -> Vec<Registration> {
    let mut registrations = vec![resource_route(plan, layout)];
    registrations.extend(cascade_routes(plan, layout));
    registrations.push(permissions(plan, layout));
    registrations.push(navigation_icon(plan, layout));
    registrations.push(navigation_item(plan, layout));
    registrations.push(seeder_call(plan, layout));
    registrations
}

fn resource_route(plan: &BuildPlan, layout: &Layout) -> Registration {
    let route = &plan.names.route;
    let except = if plan.view_mode == Some(ViewMode::Page) {
        ""
    } else {
        "->except(['show'])"
    };
    Registration {
        file: layout.routes.clone(),
        region: "routes".to_owned(),
        anchor: Anchor::before(ROUTES_ANCHOR),
        entry: Entry {
            key: route.clone(),
            lines: vec![format!(
                "{ROUTE_MIDDLEWARE}->resource({}, \\{}::class){except};",
                quote(route),
                plan.controller_class()
            )],
            presence: Presence::Contains(format!("resource({}", quote(route))),
        },
    }
}

fn cascade_routes<'p>(
    plan: &'p BuildPlan,
    layout: &'p Layout,
) -> impl Iterator<Item = Registration> + 'p {
    plan.dependencies.iter().map(move |edge| {
        let cascade = &edge.cascade;
        let name = quote(&cascade.route_name);
        Registration {
            file: layout.routes.clone(),
            region: "routes".to_owned(),
            anchor: Anchor::before(ROUTES_ANCHOR),
            entry: Entry {
                key: cascade.route_name.clone(),
                lines: vec![format!(
                    "{ROUTE_MIDDLEWARE}->get({}, [\\{}::class, {}])->name({name});",
                    quote(cascade.route_path.trim_start_matches('/')),
                    plan.controller_class(),
                    quote(&cascade.endpoint),
                )],
                presence: Presence::Contains(format!("name({name})")),
            },
        }
    })
}

fn permissions(plan: &BuildPlan, layout: &Layout) -> Registration {
    let keys = plan.permission_keys();
    Registration {
        file: layout.permission_seeder.clone(),
        region: "permissions".to_owned(),
        anchor: Anchor::after(PERMISSIONS_ANCHOR).nested(),
        entry: Entry {
            key: plan.names.route.clone(),
            lines: keys.iter().map(|key| format!("{},", quote(key))).collect(),
            presence: Presence::Contains(quote(&keys[0])),
        },
    }
}

fn nav_icon(plan: &BuildPlan) -> &str {
    match &plan.system_setup {
        Some(setup) => &setup.icon,
        None => &plan.icon,
    }
}

fn navigation_icon(plan: &BuildPlan, layout: &Layout) -> Registration {
    let icon = nav_icon(plan);
    Registration {
        file: layout.navigation.clone(),
        region: "navigation-icons".to_owned(),
        anchor: Anchor::after(ICONS_ANCHOR),
        entry: Entry {
            key: icon.to_owned(),
            lines: vec![format!("import {{ {icon} }} from 'lucide-react';")],
            presence: Presence::Word(icon.to_owned()),
        },
    }
}

fn navigation_item(plan: &BuildPlan, layout: &Layout) -> Registration {
    let names = &plan.names;
    let (region, anchor) = if plan.system_setup.is_some() {
        ("setup-navigation", SETUP_NAV_ANCHOR)
    } else {
        ("navigation", MAIN_NAV_ANCHOR)
    };
    let href = format!("/{}", names.route);
    Registration {
        file: layout.navigation.clone(),
        region: region.to_owned(),
        anchor: Anchor::after(anchor).nested(),
        entry: Entry {
            key: href.clone(),
            lines: vec![format!(
                "{{ title: {}, href: {}, icon: {} }},",
                quote(&names.label_plural),
                quote(&href),
                nav_icon(plan)
            )],
            presence: Presence::Contains(quote(&href)),
        },
    }
}

fn seeder_call(plan: &BuildPlan, layout: &Layout) -> Registration {
    let model = &plan.names.model;
    Registration {
        file: layout.database_seeder.clone(),
        region: "seeders".to_owned(),
        anchor: Anchor::after(SEEDER_ANCHOR).nested(),
        entry: Entry {
            key: model.clone(),
            lines: vec![format!(
                "\\{}::factory()->count(10)->create();",
                plan.model_class()
            )],
            presence: Presence::Word(format!("{model}::factory(")),
        },
    }
}

/// A reverse `hasMany` accessor for the target model of a relationship
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReverseAccessor {
    /// Class name of the model receiving the accessor
    pub target: String,
    pub entry: Entry,
}

impl ReverseAccessor {
    /// Registration in the model file found at `file`
    pub fn registration(&self, file: std::path::PathBuf) -> Registration {
        Registration {
            file,
            region: "relations".to_owned(),
            anchor: Anchor::before(CLASS_END_ANCHOR).last().nested(),
            entry: self.entry.clone(),
        }
    }
}

/// One accessor per reverse relation, prefixed by the relation name when
/// several relations point at the same target
pub fn reverse_accessors(plan: &BuildPlan) -> Vec<ReverseAccessor> {
    let relations: Vec<&RelationshipSpec> = plan.reverse_relations().collect();
    let mut per_target: HashMap<&str, usize> = HashMap::new();
    for rel in &relations {
        *per_target.entry(rel.target()).or_default() += 1;
    }
    relations
        .into_iter()
        .map(|rel| {
            let accessor = if per_target[rel.target()] > 1 {
                format!(
                    "{}{}",
                    rel.name().to_lower_camel_case(),
                    plan.names.model_plural.to_upper_camel_case()
                )
            } else {
                plan.names.variable_plural.clone()
            };
            let lines = vec![
                format!(
                    "public function {accessor}(): \\Illuminate\\Database\\Eloquent\\Relations\\HasMany"
                ),
                "{".to_owned(),
                format!(
                    "    return $this->hasMany(\\{}::class, {});",
                    plan.model_class(),
                    quote(rel.foreign_key())
                ),
                "}".to_owned(),
            ];
            ReverseAccessor {
                target: rel.target().to_owned(),
                entry: Entry {
                    key: format!("{}.{accessor}", plan.names.model),
                    lines,
                    presence: Presence::Contains(format!("function {accessor}(")),
                },
            }
        })
        .collect()
}

/// Where the model file of a related entity is looked up, in order
pub fn model_candidates(plan: &BuildPlan, layout: &Layout, target: &str) -> Vec<std::path::PathBuf> {
    let file = format!("{target}.php");
    let local = std::path::Path::new(&plan.source_root())
        .join("Models")
        .join(&file);
    let shared = layout.models_dir.join(&file);
    if model_class(plan, target).starts_with("App\\") || local == shared {
        vec![shared]
    } else {
        vec![local, shared]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge::{GenerateOptions, PlanBuilder};
    use pretty_assertions::assert_eq;

    fn plan(relationships: &str, view_mode: Option<ViewMode>) -> BuildPlan {
        PlanBuilder::new(&GenerateOptions {
            display_name: "Job Opening".into(),
            fields: "title".into(),
            relationships: relationships.into(),
            view_mode,
            ..Default::default()
        })
        .build()
    }

    #[test]
    fn resource_route_hides_show_without_detail_page() {
        let layout = Layout::default();
        let modal = resource_route(&plan("", Some(ViewMode::Modal)), &layout);
        assert_eq!(
            modal.entry.lines,
            vec![
                "Route::middleware(['auth', 'verified'])->resource('job-openings', \\App\\Http\\Controllers\\JobOpeningController::class)->except(['show']);"
            ]
        );
        let page = resource_route(&plan("", Some(ViewMode::Page)), &layout);
        assert!(!page.entry.lines[0].contains("except"));
    }

    #[test]
    fn seven_permission_keys() {
        let registration = permissions(&plan("", None), &Layout::default());
        assert_eq!(registration.entry.lines.len(), 7);
        assert_eq!(registration.entry.lines[0], "'job-openings.manage',");
        assert_eq!(registration.entry.lines[6], "'job-openings.delete',");
    }

    #[test]
    fn cascade_route_is_named() {
        let plan = plan("category:belongsTo:Category,subcategory:belongsTo:Subcategory", None);
        let routes: Vec<_> = cascade_routes(&plan, &Layout::default()).collect();
        assert_eq!(routes.len(), 1);
        assert_eq!(
            routes[0].entry.lines[0],
            "Route::middleware(['auth', 'verified'])->get('job-openings/subcategories-by-category/{category}', \
             [\\App\\Http\\Controllers\\JobOpeningController::class, 'getSubcategoriesByCategory'])\
             ->name('job-openings.subcategories-by-category');"
        );
    }

    #[test]
    fn shared_targets_get_prefixed_accessors() {
        let plan = plan(
            "recruiter:belongsTo:User,hiringManager:belongsTo:User,department:belongsTo:Department",
            None,
        );
        let accessors: Vec<_> = reverse_accessors(&plan)
            .into_iter()
            .map(|accessor| (accessor.target, accessor.entry.presence))
            .collect();
        assert_eq!(
            accessors,
            vec![
                ("User".to_owned(), Presence::Contains("function recruiterJobOpenings(".into())),
                ("User".to_owned(), Presence::Contains("function hiringManagerJobOpenings(".into())),
                ("Department".to_owned(), Presence::Contains("function jobOpenings(".into())),
            ]
        );
    }
}
