mod backend;
mod cascade;
mod detail;
mod filter;
mod form;
mod placeholders;
mod table;
mod types;

pub use placeholders::*;

use std::path::PathBuf;

use modforge::{BuildPlan, DependencyEdge, Error, FilterSpec, RelationshipSpec, ViewMode};
use strum::{AsRefStr, Display, EnumIter};
use tracing::{debug, info, warn};

use crate::{TemplateSource, substitute};

/// One generated file of a module
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ArtifactKind {
    Migration,
    Model,
    Controller,
    StoreRequest,
    UpdateRequest,
    Factory,
    IndexPage,
    CreatePage,
    EditPage,
    Types,
    DetailModal,
    DetailPage,
}

impl ArtifactKind {
    pub fn stub_name(self) -> &'static str {
        match self {
            Self::Migration => "migration.php.stub",
            Self::Model => "model.php.stub",
            Self::Controller => "controller.php.stub",
            Self::StoreRequest => "store_request.php.stub",
            Self::UpdateRequest => "update_request.php.stub",
            Self::Factory => "factory.php.stub",
            Self::IndexPage => "index.tsx.stub",
            Self::CreatePage => "create.tsx.stub",
            Self::EditPage => "edit.tsx.stub",
            Self::Types => "types.ts.stub",
            Self::DetailModal => "detail_modal.tsx.stub",
            Self::DetailPage => "detail_page.tsx.stub",
        }
    }

    /// The artifacts a plan produces, in generation order
    pub fn for_plan(plan: &BuildPlan) -> Vec<Self> {
        let mut kinds = vec![
            Self::Migration,
            Self::Model,
            Self::Controller,
            Self::StoreRequest,
            Self::UpdateRequest,
            Self::Factory,
            Self::IndexPage,
            Self::CreatePage,
            Self::EditPage,
            Self::Types,
        ];
        match plan.view_mode {
            Some(ViewMode::Modal) => kinds.push(Self::DetailModal),
            Some(ViewMode::Page) => kinds.push(Self::DetailPage),
            None => {}
        }
        kinds
    }

    /// Path of the artifact relative to the project root
    ///
    /// Migrations get their timestamp prefix when they are written.
    pub fn path(self, plan: &BuildPlan) -> PathBuf {
        let names = &plan.names;
        let src = PathBuf::from(plan.source_root());
        let project = PathBuf::from(plan.project_root());
        let pages = project.join("resources/js/pages").join(&names.route);
        match self {
            Self::Migration => project
                .join("database/migrations")
                .join(format!("create_{}_table.php", names.table)),
            Self::Model => src.join("Models").join(format!("{}.php", names.model)),
            Self::Controller => src
                .join("Http/Controllers")
                .join(format!("{}Controller.php", names.model)),
            Self::StoreRequest => src
                .join("Http/Requests")
                .join(format!("Store{}Request.php", names.model)),
            Self::UpdateRequest => src
                .join("Http/Requests")
                .join(format!("Update{}Request.php", names.model)),
            Self::Factory => project
                .join("database/factories")
                .join(format!("{}Factory.php", names.model)),
            Self::IndexPage => pages.join("index.tsx"),
            Self::CreatePage => pages.join("create.tsx"),
            Self::EditPage => pages.join("edit.tsx"),
            Self::Types => project
                .join("resources/js/types")
                .join(format!("{}.ts", names.route_singular)),
            Self::DetailModal => pages
                .join("components")
                .join(format!("{}-detail-modal.tsx", names.route_singular)),
            Self::DetailPage => pages.join("show.tsx"),
        }
    }
}

/// What every placeholder is resolved against
#[derive(Clone, Copy, Debug)]
pub struct RenderContext<'a> {
    pub plan: &'a BuildPlan,
    pub artifact: ArtifactKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFile {
    pub kind: ArtifactKind,
    /// Relative to the project root
    pub path: PathBuf,
    pub content: String,
}

/// An artifact that could not be rendered
#[derive(Debug)]
pub struct RenderFailure {
    pub kind: ArtifactKind,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct RenderOutput {
    pub files: Vec<OutputFile>,
    pub failures: Vec<RenderFailure>,
}

impl RenderOutput {
    pub fn file(&self, kind: ArtifactKind) -> Option<&OutputFile> {
        self.files.iter().find(|file| file.kind == kind)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Renderer {
    templates: TemplateSource,
}

impl Renderer {
    pub fn new(templates: TemplateSource) -> Self {
        Self { templates }
    }

    /// Render every artifact of the plan
    ///
    /// A missing template fails that artifact only, the others are still
    /// rendered.
    pub fn render(&self, plan: &BuildPlan) -> RenderOutput {
        let mut output = RenderOutput::default();
        for kind in ArtifactKind::for_plan(plan) {
            match self.render_artifact(plan, kind) {
                Ok(file) => output.files.push(file),
                Err(error) => {
                    warn!("Skipping {kind}: {error}");
                    output.failures.push(RenderFailure { kind, error });
                }
            }
        }
        info!(
            "Rendered {} files for {}",
            output.files.len(),
            plan.names.model
        );
        output
    }

    pub fn render_artifact(&self, plan: &BuildPlan, kind: ArtifactKind) -> Result<OutputFile, Error> {
        let template = self.templates.load(kind)?;
        let context = RenderContext {
            plan,
            artifact: kind,
        };
        debug!("Rendering {kind}");
        Ok(OutputFile {
            kind,
            path: kind.path(plan),
            content: substitute(&template, |placeholder| placeholder.resolve(&context)),
        })
    }
}

/// Column of the related entity shown in selects and list cells
pub(crate) fn display_field<'p>(plan: &'p BuildPlan, rel: &RelationshipSpec) -> &'p str {
    plan.table_relationships
        .iter()
        .find(|projection| projection.relation() == rel.name())
        .map(|projection| projection.field())
        .unwrap_or("name")
}

/// Fully qualified class of a related entity
///
/// Related models live next to the generated one, except `User` which is
/// always the application's.
pub(crate) fn model_class(plan: &BuildPlan, model: &str) -> String {
    if model == "User" {
        "App\\Models\\User".to_owned()
    } else {
        format!("{}\\Models\\{model}", plan.namespace())
    }
}

/// Belongs-to relationships edited through a select on the forms
pub(crate) fn form_relations(plan: &BuildPlan) -> impl Iterator<Item = &RelationshipSpec> {
    plan.foreign_keys()
        .filter(|rel| !rel.is_self_reference(&plan.names.model))
}

/// A list of records offered to a select, fed by the controller's `options()`
#[derive(Clone, Debug)]
pub(crate) struct RecordSource<'p> {
    /// Page prop and `options()` key, `departmentOptions`
    pub prop: String,
    pub model: &'p str,
    pub display: &'p str,
    /// Set when the list depends on a parent select
    pub cascade: Option<&'p DependencyEdge>,
}

/// Every record list the pages receive, relations first
pub(crate) fn record_sources(plan: &BuildPlan) -> Vec<RecordSource<'_>> {
    let mut relations: Vec<&RelationshipSpec> = form_relations(plan).collect();
    for filter in &plan.filters {
        if let FilterSpec::Relation(rel) = filter {
            if relations.iter().all(|known| known.name() != rel.name()) {
                relations.push(rel);
            }
        }
    }
    let relations = relations.into_iter().map(|rel| RecordSource {
        prop: crate::util::options_name(rel.name()),
        model: rel.target(),
        display: display_field(plan, rel),
        cascade: plan
            .dependencies
            .iter()
            .find(|edge| edge.child.name() == rel.name()),
    });
    let dynamic = plan.dynamic_fields().filter_map(|field| {
        let (model, display) = field.dynamic_source()?;
        Some(RecordSource {
            prop: crate::util::options_name(field.name()),
            model,
            display,
            cascade: None,
        })
    });
    relations.chain(dynamic).collect()
}

/// `[{ value, label }]` expression of a record list
pub(crate) fn record_choices(list: &str, display: &str) -> String {
    format!(
        "{list}.map((option) => ({{ value: option.id, label: String(option[{}]) }}))",
        crate::util::quote(display)
    )
}

/// `use` lines, sorted and deduplicated
pub(crate) fn use_lines(classes: impl IntoIterator<Item = String>, namespace: &str) -> String {
    let mut classes: Vec<String> = classes
        .into_iter()
        .filter(|class| {
            class
                .rsplit_once('\\')
                .is_none_or(|(class_namespace, _)| class_namespace != namespace)
        })
        .collect();
    classes.sort();
    classes.dedup();
    classes
        .iter()
        .map(|class| format!("use {class};"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge::{GenerateOptions, PlanBuilder};
    use pretty_assertions::assert_eq;

    fn plan(view_mode: Option<ViewMode>, package: Option<&str>) -> BuildPlan {
        PlanBuilder::new(&GenerateOptions {
            display_name: "Job Opening".into(),
            fields: "title".into(),
            view_mode,
            package: package.map(str::to_owned),
            ..Default::default()
        })
        .build()
    }

    #[test]
    fn detail_view_only_with_a_view_mode() {
        assert_eq!(ArtifactKind::for_plan(&plan(None, None)).len(), 10);
        assert_eq!(
            ArtifactKind::for_plan(&plan(Some(ViewMode::Page), None)).last(),
            Some(&ArtifactKind::DetailPage)
        );
        assert_eq!(
            ArtifactKind::for_plan(&plan(Some(ViewMode::Modal), None)).last(),
            Some(&ArtifactKind::DetailModal)
        );
    }

    #[test]
    fn artifact_paths() {
        let plan = plan(Some(ViewMode::Modal), None);
        let paths: Vec<_> = ArtifactKind::for_plan(&plan)
            .into_iter()
            .map(|kind| kind.path(&plan).to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            paths,
            vec![
                "database/migrations/create_job_openings_table.php",
                "app/Models/JobOpening.php",
                "app/Http/Controllers/JobOpeningController.php",
                "app/Http/Requests/StoreJobOpeningRequest.php",
                "app/Http/Requests/UpdateJobOpeningRequest.php",
                "database/factories/JobOpeningFactory.php",
                "resources/js/pages/job-openings/index.tsx",
                "resources/js/pages/job-openings/create.tsx",
                "resources/js/pages/job-openings/edit.tsx",
                "resources/js/types/job-opening.ts",
                "resources/js/pages/job-openings/components/job-opening-detail-modal.tsx",
            ]
        );
    }

    #[test]
    fn package_paths() {
        let plan = plan(None, Some("Job Board"));
        assert_eq!(
            ArtifactKind::Model.path(&plan),
            PathBuf::from("packages/job-board/src/Models/JobOpening.php")
        );
        assert_eq!(
            ArtifactKind::Factory.path(&plan),
            PathBuf::from("packages/job-board/database/factories/JobOpeningFactory.php")
        );
    }

    #[test]
    fn use_lines_skip_own_namespace() {
        let lines = use_lines(
            [
                "App\\Models\\User".to_owned(),
                "Illuminate\\Database\\Eloquent\\Model".to_owned(),
                "App\\Models\\User".to_owned(),
            ],
            "App\\Models",
        );
        assert_eq!(lines, "use Illuminate\\Database\\Eloquent\\Model;");
    }
}
