use itertools::Itertools;
use modforge::{TableColumn, ViewMode};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::{RenderContext, backend, cascade, detail, filter, form, table, types};
use crate::util::escape_js_keyword;

/// Every token a template may contain, written `%%camelCase%%`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum Placeholder {
    // names
    ModelName,
    ModelNamePlural,
    ModelVariable,
    ModelVariablePlural,
    ModelLabel,
    ModelLabelPlural,
    TableName,
    SnakeName,
    RouteName,
    RouteNameSingular,
    JsVariable,
    ModelClass,
    // namespaces
    ModelNamespace,
    ControllerNamespace,
    RequestNamespace,
    FactoryNamespace,
    // migration
    MigrationColumns,
    MigrationForeignKeys,
    // model
    ModelImports,
    ModelInterfaces,
    ModelTraits,
    Fillable,
    Casts,
    ModelAppends,
    ModelFactoryMethod,
    ModelRelations,
    ModelMediaMethods,
    // requests and factory
    RequestImports,
    StoreRules,
    UpdateRules,
    FactoryImports,
    FactoryDefinitions,
    // controller
    ControllerImports,
    EagerLoads,
    SearchQuery,
    FilterQuery,
    FilterKeys,
    MediaKeys,
    MediaStore,
    MediaUpdate,
    ShowMethod,
    CascadeEndpoints,
    OptionQueries,
    // index page
    IndexIcons,
    IndexImports,
    SearchPlaceholder,
    FilterState,
    FilterBadge,
    FilterUi,
    TableHeaders,
    TableCells,
    DetailState,
    DetailTrigger,
    DetailComponent,
    // shared by pages
    TypeImports,
    PageProps,
    PagePropNames,
    // forms
    ReactImports,
    FormImports,
    FormProps,
    FormPropNames,
    FormDefaults,
    CascadeState,
    FormFields,
    SubmitCall,
    SubmitMethod,
    // types.ts
    TypeHelpers,
    ModelAttributes,
    FormAttributes,
    FilterAttributes,
    OptionConstants,
    // detail view
    DetailImports,
    DetailCards,
}

impl Placeholder {
    /// The text standing in for this token in the artifact being rendered
    pub fn resolve(self, ctx: &RenderContext) -> String {
        let plan = ctx.plan;
        let names = &plan.names;
        let js = || escape_js_keyword(&names.variable);
        match self {
            Self::ModelName => names.model.clone(),
            Self::ModelNamePlural => names.model_plural.clone(),
            Self::ModelVariable => names.variable.clone(),
            Self::ModelVariablePlural => names.variable_plural.clone(),
            Self::ModelLabel => names.label.clone(),
            Self::ModelLabelPlural => names.label_plural.clone(),
            Self::TableName => names.table.clone(),
            Self::SnakeName => names.snake.clone(),
            Self::RouteName => names.route.clone(),
            Self::RouteNameSingular => names.route_singular.clone(),
            Self::JsVariable => js(),
            Self::ModelClass => plan.model_class(),

            Self::ModelNamespace => backend::model_namespace(plan),
            Self::ControllerNamespace => backend::controller_namespace(plan),
            Self::RequestNamespace => backend::request_namespace(plan),
            Self::FactoryNamespace => backend::factory_namespace(plan),

            Self::MigrationColumns => backend::migration_columns(plan),
            Self::MigrationForeignKeys => backend::migration_foreign_keys(plan),

            Self::ModelImports => backend::model_imports(plan),
            Self::ModelInterfaces => backend::model_interfaces(plan),
            Self::ModelTraits => backend::model_traits(plan),
            Self::Fillable => backend::fillable(plan),
            Self::Casts => backend::casts(plan),
            Self::ModelAppends => backend::model_appends(plan),
            Self::ModelFactoryMethod => backend::model_factory_method(plan),
            Self::ModelRelations => backend::model_relations(plan),
            Self::ModelMediaMethods => backend::model_media_methods(plan),

            Self::RequestImports => backend::request_imports(ctx),
            Self::StoreRules => backend::store_rules(plan),
            Self::UpdateRules => backend::update_rules(plan),
            Self::FactoryImports => backend::factory_imports(plan),
            Self::FactoryDefinitions => backend::factory_definitions(plan),

            Self::ControllerImports => backend::controller_imports(plan),
            Self::EagerLoads => backend::eager_loads(plan),
            Self::SearchQuery => backend::search_query(plan),
            Self::FilterQuery => backend::filter_query(plan),
            Self::FilterKeys => backend::filter_keys(plan),
            Self::MediaKeys => backend::media_keys(plan),
            Self::MediaStore => backend::media_store(ctx, false),
            Self::MediaUpdate => backend::media_store(ctx, true),
            Self::ShowMethod => backend::show_method(plan),
            Self::CascadeEndpoints => backend::cascade_endpoints(plan),
            Self::OptionQueries => backend::option_queries(plan),

            Self::IndexIcons => index_icons(ctx),
            Self::IndexImports => index_imports(ctx),
            Self::SearchPlaceholder => match plan.primary_search() {
                Some(search) => format!("Search by {}...", search.field.label().to_lowercase()),
                None => format!("Search {}...", names.label_plural.to_lowercase()),
            },
            Self::FilterState => filter::filter_state(plan),
            Self::FilterBadge => filter::filter_badge(plan),
            Self::FilterUi => filter::filter_ui(plan),
            Self::TableHeaders => table::table_headers(plan),
            Self::TableCells => table::table_cells(plan, &js()),
            Self::DetailState => detail::detail_state(plan),
            Self::DetailTrigger => detail::detail_trigger(plan),
            Self::DetailComponent => detail::detail_component(plan, &form::prop_names(plan)),

            Self::TypeImports => types::type_imports(ctx),
            Self::PageProps | Self::FormProps => form::form_props(plan),
            Self::PagePropNames | Self::FormPropNames => form::prop_name_list(ctx),

            Self::ReactImports => form::react_imports(plan),
            Self::FormImports => form::form_imports(plan),
            Self::FormDefaults => form::form_defaults(ctx),
            Self::CascadeState => cascade::cascade_state(plan),
            Self::FormFields => form::form_fields(ctx),
            Self::SubmitCall => form::submit_call(ctx),
            Self::SubmitMethod => form::submit_method(plan).to_owned(),

            Self::TypeHelpers => types::type_helpers(plan),
            Self::ModelAttributes => types::model_attributes(plan),
            Self::FormAttributes => types::form_attributes(plan),
            Self::FilterAttributes => types::filter_attributes(plan),
            Self::OptionConstants => types::option_constants(plan),

            Self::DetailImports => detail::detail_imports(plan),
            Self::DetailCards => detail::detail_cards(plan),
        }
    }
}

fn index_icons(ctx: &RenderContext) -> String {
    let plan = ctx.plan;
    let mut icons = vec!["Pencil", "Plus", "Search", "Trash2"];
    if plan.view_mode.is_some() {
        icons.push("Eye");
    }
    if plan.has_filters() {
        icons.extend(["Filter", "X"]);
    }
    icons.sort_unstable();
    icons.join(", ")
}

fn index_imports(ctx: &RenderContext) -> String {
    let plan = ctx.plan;
    let badge_cells = plan.table_columns.iter().any(|column| match column {
        TableColumn::Field(field) => table::uses_badge(field),
        TableColumn::Relation(_) => false,
    });
    let mut imports = Vec::new();
    if badge_cells || plan.has_filters() {
        imports.push("import { Badge } from '@/components/ui/badge';".to_owned());
    }
    if plan.has_filters() {
        imports.push(
            "import { Select, SelectContent, SelectItem, SelectTrigger, SelectValue } from '@/components/ui/select';"
                .to_owned(),
        );
    }
    if plan.view_mode == Some(ViewMode::Modal) {
        imports.extend(detail::modal_import(plan));
    }
    imports.into_iter().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn tokens_are_camel_case() {
        assert_eq!("modelVariablePlural".parse(), Ok(Placeholder::ModelVariablePlural));
        assert_eq!(Placeholder::FilterUi.to_string(), "filterUi");
        assert!("model_name".parse::<Placeholder>().is_err());
    }

    #[test]
    fn every_token_round_trips() {
        for placeholder in Placeholder::iter() {
            assert_eq!(placeholder.as_ref().parse(), Ok(placeholder));
        }
    }
}
