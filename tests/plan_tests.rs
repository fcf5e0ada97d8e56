use modforge::{
    DiagnosticKind, FieldKind, FilterSpec, GenerateOptions, InferenceMode, PlanBuilder,
    SearchMode, TableColumn, ViewMode,
};
use pretty_assertions::assert_eq;

fn status_scenario() -> GenerateOptions {
    GenerateOptions {
        display_name: "Ticket".to_owned(),
        fields: "name:textbox,status:select:nullable:Open|Closed".to_owned(),
        searchable: vec!["name".to_owned()],
        filterable: vec!["status".to_owned()],
        ..Default::default()
    }
}

#[test]
fn status_select_scenario() {
    let plan = PlanBuilder::new(&status_scenario()).build();

    assert!(plan.diagnostics.is_empty());
    assert_eq!(plan.filters.len(), 1);
    let FilterSpec::Options(status) = &plan.filters[0] else {
        panic!("expected a static option filter, got {:?}", plan.filters[0]);
    };
    assert_eq!(status.name(), "status");
    assert_eq!(status.indexed_options(), vec![(0, "Open"), (1, "Closed")]);

    let search = plan.primary_search().unwrap();
    assert_eq!(search.field.name(), "name");
    assert_eq!(search.mode, SearchMode::Like);

    assert_eq!(plan.field("name").unwrap().kind(), FieldKind::Text);
    assert_eq!(plan.fillable, vec!["name", "status"]);
}

#[test]
fn every_column_keeps_its_name() {
    let options = GenerateOptions {
        display_name: "Job Opening".to_owned(),
        fields: "title,due_days:number,is_remote:switch,salary_max:currency".to_owned(),
        ..Default::default()
    };
    let plan = PlanBuilder::new(&options).build();
    let columns: Vec<_> = plan
        .table_columns
        .iter()
        .map(|column| (column.key(), column.label()))
        .collect();
    assert_eq!(
        columns,
        vec![
            ("title".to_owned(), "Title".to_owned()),
            ("due_days".to_owned(), "Due Days".to_owned()),
            ("is_remote".to_owned(), "Is Remote".to_owned()),
            ("salary_max".to_owned(), "Salary Max".to_owned()),
        ]
    );
    assert!(matches!(plan.table_columns[0], TableColumn::Field(_)));
}

#[test]
fn cascade_between_category_and_subcategory() {
    let options = GenerateOptions {
        display_name: "Product".to_owned(),
        fields: "name".to_owned(),
        relationships: "category:belongsTo:Category,subcategory:belongsTo:Subcategory".to_owned(),
        ..Default::default()
    };
    let plan = PlanBuilder::new(&options).build();
    assert_eq!(plan.dependencies.len(), 1);
    let edge = &plan.dependencies[0];
    assert_eq!(edge.child.name(), "subcategory");
    assert_eq!(edge.parent.name(), "category");
    assert_eq!(edge.cascade.endpoint, "getSubcategoriesByCategory");
}

#[test]
fn independent_neighbours_are_not_wired_by_default() {
    let mut options = GenerateOptions {
        display_name: "Job Opening".to_owned(),
        relationships: "department:belongsTo:Department,recruiter:belongsTo:User".to_owned(),
        ..Default::default()
    };
    assert!(PlanBuilder::new(&options).build().dependencies.is_empty());

    options.inference = InferenceMode::Adjacent;
    assert_eq!(PlanBuilder::new(&options).build().dependencies.len(), 1);

    options.inference = InferenceMode::Explicit;
    options.relationships = "department:belongsTo:Department,recruiter^department:belongsTo:User"
        .to_owned();
    let plan = PlanBuilder::new(&options).build();
    assert_eq!(plan.dependencies.len(), 1);
    assert_eq!(
        plan.dependencies[0].cascade.route_name,
        "job-openings.users-by-department"
    );
}

#[test]
fn degraded_input_is_reported_not_fatal() {
    let options = GenerateOptions {
        display_name: "Asset".to_owned(),
        fields: "label:hologram,serial".to_owned(),
        relationships: "owner:belongsTo".to_owned(),
        filterable: vec!["serial".to_owned()],
        view_mode: Some(ViewMode::Modal),
        ..Default::default()
    };
    let plan = PlanBuilder::new(&options).build();
    assert_eq!(plan.fields.len(), 2);
    assert!(plan.relationships.is_empty());
    assert!(!plan.has_filters());
    let kinds: Vec<_> = plan.diagnostics.iter().map(|d| d.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            DiagnosticKind::UnknownFieldType("hologram".to_owned()),
            DiagnosticKind::MalformedRelationship,
            DiagnosticKind::NotFilterable,
        ]
    );
    assert_eq!(plan.view_mode, Some(ViewMode::Modal));
}
