//! PHP fragments: migration, model, request objects, factory and controller.

use heck::{ToLowerCamelCase, ToUpperCamelCase};
use itertools::Itertools;
use modforge::{
    BuildPlan, Choice, FieldKind, FieldSpec, RelationType, SearchMode, Storage, ValidationRule,
    ViewMode,
};

use super::{display_field, form_relations, model_class, record_sources, use_lines};
use crate::{
    ArtifactKind, RenderContext,
    util::{quote, quote_list},
};

pub(crate) fn migration_columns(plan: &BuildPlan) -> String {
    plan.fields.iter().filter_map(column_definition).join("\n")
}

fn column_definition(field: &FieldSpec) -> Option<String> {
    let column = quote(field.column());
    let storage = field.def().storage;
    let column_type = if field.is_dynamic() && !field.is_multi_choice() {
        format!("unsignedBigInteger({column})")
    } else if field.is_multi_choice() {
        format!("json({column})")
    } else {
        match storage {
            Storage::String(255) => format!("string({column})"),
            Storage::String(length) => format!("string({column}, {length})"),
            Storage::Text => format!("text({column})"),
            Storage::LongText => format!("longText({column})"),
            Storage::Json => format!("json({column})"),
            Storage::Date => format!("date({column})"),
            Storage::Integer => format!("integer({column})"),
            Storage::UnsignedTinyInteger => format!("unsignedTinyInteger({column})"),
            Storage::Decimal(precision, scale) => {
                format!("decimal({column}, {precision}, {scale})")
            }
            Storage::Boolean => format!("boolean({column})"),
            Storage::External => return None,
        }
    };
    let modifier = if field.nullable() {
        "->nullable()"
    } else if storage == Storage::Boolean {
        "->default(false)"
    } else {
        ""
    };
    Some(format!("$table->{column_type}{modifier};"))
}

pub(crate) fn migration_foreign_keys(plan: &BuildPlan) -> String {
    plan.foreign_keys()
        .map(|rel| {
            format!(
                "$table->foreignId({})->nullable()->constrained({})->nullOnDelete();",
                quote(rel.foreign_key()),
                quote(rel.target_table())
            )
        })
        .join("\n")
}

fn factory_class(plan: &BuildPlan) -> String {
    format!("{}\\{}Factory", factory_namespace(plan), plan.names.model)
}

pub(crate) fn model_namespace(plan: &BuildPlan) -> String {
    format!("{}\\Models", plan.namespace())
}

pub(crate) fn controller_namespace(plan: &BuildPlan) -> String {
    format!("{}\\Http\\Controllers", plan.namespace())
}

pub(crate) fn request_namespace(plan: &BuildPlan) -> String {
    format!("{}\\Http\\Requests", plan.namespace())
}

pub(crate) fn factory_namespace(plan: &BuildPlan) -> String {
    match &plan.package {
        Some(package) => format!("Packages\\{}\\Database\\Factories", package.namespace),
        None => "Database\\Factories".to_owned(),
    }
}

fn relation_class(rel_type: RelationType) -> &'static str {
    match rel_type {
        RelationType::BelongsTo => "BelongsTo",
        RelationType::HasOne => "HasOne",
        RelationType::HasMany => "HasMany",
        RelationType::BelongsToMany => "BelongsToMany",
    }
}

pub(crate) fn model_imports(plan: &BuildPlan) -> String {
    let mut classes = vec![
        "Illuminate\\Database\\Eloquent\\Factories\\HasFactory".to_owned(),
        "Illuminate\\Database\\Eloquent\\Model".to_owned(),
        "Illuminate\\Database\\Eloquent\\Relations\\BelongsTo".to_owned(),
        model_class(plan, "User"),
    ];
    for rel in &plan.relationships {
        classes.push(format!(
            "Illuminate\\Database\\Eloquent\\Relations\\{}",
            relation_class(rel.rel_type())
        ));
        classes.push(model_class(plan, rel.target()));
    }
    if plan.package.is_some() {
        classes.push(factory_class(plan));
    }
    if plan.has_media() {
        classes.push("Spatie\\MediaLibrary\\HasMedia".to_owned());
        classes.push("Spatie\\MediaLibrary\\InteractsWithMedia".to_owned());
    }
    use_lines(classes, &model_namespace(plan))
}

pub(crate) fn model_interfaces(plan: &BuildPlan) -> String {
    if plan.has_media() {
        " implements HasMedia".to_owned()
    } else {
        String::new()
    }
}

pub(crate) fn model_traits(plan: &BuildPlan) -> String {
    if plan.has_media() {
        "use HasFactory, InteractsWithMedia;".to_owned()
    } else {
        "use HasFactory;".to_owned()
    }
}

pub(crate) fn fillable(plan: &BuildPlan) -> String {
    plan.fillable
        .iter()
        .map(|column| format!("{},", quote(column)))
        .join("\n")
}

pub(crate) fn casts(plan: &BuildPlan) -> String {
    plan.casts
        .iter()
        .map(|(column, cast)| format!("{} => {},", quote(column), quote(cast)))
        .join("\n")
}

pub(crate) fn model_appends(plan: &BuildPlan) -> String {
    if !plan.has_media() {
        return String::new();
    }
    let columns = quote_list(plan.media_fields().map(FieldSpec::column));
    format!(
        "\n/**\n * @var list<string>\n */\nprotected $appends = [{columns}];\n\n\
         /**\n * @var list<string>\n */\nprotected $hidden = ['media'];"
    )
}

pub(crate) fn model_factory_method(plan: &BuildPlan) -> String {
    if plan.package.is_none() {
        return String::new();
    }
    let factory = format!("{}Factory", plan.names.model);
    format!(
        "\nprotected static function newFactory(): {factory}\n{{\n    return {factory}::new();\n}}"
    )
}

pub(crate) fn model_relations(plan: &BuildPlan) -> String {
    plan.relationships
        .iter()
        .map(|rel| {
            let class = relation_class(rel.rel_type());
            let target = rel.target();
            let call = match rel.rel_type() {
                RelationType::BelongsTo => format!(
                    "$this->belongsTo({target}::class, {})",
                    quote(rel.foreign_key())
                ),
                RelationType::BelongsToMany => format!("$this->belongsToMany({target}::class)"),
                RelationType::HasOne | RelationType::HasMany => {
                    let method = class.to_lower_camel_case();
                    if rel.foreign_key() == format!("{}_id", rel.name()) {
                        format!("$this->{method}({target}::class)")
                    } else {
                        format!(
                            "$this->{method}({target}::class, {})",
                            quote(rel.foreign_key())
                        )
                    }
                }
            };
            format!(
                "\npublic function {}(): {class}\n{{\n    return {call};\n}}",
                rel.name().to_lower_camel_case()
            )
        })
        .join("")
}

pub(crate) fn model_media_methods(plan: &BuildPlan) -> String {
    if !plan.has_media() {
        return String::new();
    }
    let collections = plan
        .media_fields()
        .map(|field| {
            let single = if field.kind() == FieldKind::MediaSingle {
                "->singleFile()"
            } else {
                ""
            };
            format!(
                "    $this->addMediaCollection({}){single};",
                quote(field.column())
            )
        })
        .join("\n");
    let accessors = plan
        .media_fields()
        .map(|field| {
            let name = field.column().to_upper_camel_case();
            let collection = quote(field.column());
            if field.kind() == FieldKind::MediaSingle {
                format!(
                    "\n/**\n * @return array{{id: int, name: string, url: string}}|null\n */\n\
                     public function get{name}Attribute(): ?array\n{{\n    \
                     $media = $this->getFirstMedia({collection});\n\n    \
                     return $media ? self::mediaItem($media) : null;\n}}"
                )
            } else {
                format!(
                    "\n/**\n * @return list<array{{id: int, name: string, url: string}}>\n */\n\
                     public function get{name}Attribute(): array\n{{\n    \
                     return $this->getMedia({collection})->map(fn ($media) => self::mediaItem($media))->values()->all();\n}}"
                )
            }
        })
        .join("\n");
    format!(
        "\npublic function registerMediaCollections(): void\n{{\n{collections}\n}}\n{accessors}\n\n\
         /**\n * @return array{{id: int, name: string, url: string}}\n */\n\
         private static function mediaItem(\\Spatie\\MediaLibrary\\MediaCollections\\Models\\Media $media): array\n{{\n    \
         return ['id' => $media->id, 'name' => $media->file_name, 'url' => $media->getUrl()];\n}}"
    )
}

pub(crate) fn request_imports(ctx: &RenderContext) -> String {
    let mut classes = vec!["Illuminate\\Foundation\\Http\\FormRequest".to_owned()];
    if ctx.artifact == ArtifactKind::UpdateRequest
        && ctx.plan.rules.iter().any(|rule| has_unique(&rule.rule))
    {
        classes.push("Illuminate\\Validation\\Rule".to_owned());
    }
    use_lines(classes, &request_namespace(ctx.plan))
}

fn has_unique(rule: &str) -> bool {
    rule.split('|').any(|segment| segment.trim().starts_with("unique:"))
}

pub(crate) fn store_rules(plan: &BuildPlan) -> String {
    plan.rules
        .iter()
        .map(|ValidationRule { key, rule }| format!("{} => {},", quote(key), quote(rule)))
        .join("\n")
}

/// Same rules as the store request, `unique` rules ignore the edited record
pub(crate) fn update_rules(plan: &BuildPlan) -> String {
    plan.rules
        .iter()
        .map(|ValidationRule { key, rule }| {
            let rule = if has_unique(rule) {
                let segments = rule
                    .split('|')
                    .map(|segment| match segment.trim().strip_prefix("unique:") {
                        Some(target) => {
                            let (table, column) = target.split_once(',').unwrap_or((target, key));
                            format!(
                                "Rule::unique({}, {})->ignore($this->route({}))",
                                quote(table),
                                quote(column),
                                quote(&plan.names.variable)
                            )
                        }
                        None => quote(segment),
                    })
                    .join(", ");
                format!("[{segments}]")
            } else {
                quote(rule)
            };
            format!("{} => {rule},", quote(key))
        })
        .join("\n")
}

pub(crate) fn factory_imports(plan: &BuildPlan) -> String {
    let mut classes = vec![
        "Illuminate\\Database\\Eloquent\\Factories\\Factory".to_owned(),
        plan.model_class(),
        model_class(plan, "User"),
    ];
    classes.extend(
        form_relations(plan).map(|rel| model_class(plan, rel.target())),
    );
    classes.extend(
        plan.dynamic_fields()
            .filter_map(|field| field.dynamic_source())
            .map(|(model, _)| model_class(plan, model)),
    );
    use_lines(classes, &factory_namespace(plan))
}

pub(crate) fn factory_definitions(plan: &BuildPlan) -> String {
    let fields = plan
        .fields
        .iter()
        .filter(|field| field.def().form_writable)
        .map(|field| format!("{} => {},", quote(field.column()), fake_value(field)));
    let foreign_keys = form_relations(plan)
        .map(|rel| format!("{} => {}::factory(),", quote(rel.foreign_key()), rel.target()));
    let owner = "'created_by' => User::query()->inRandomOrder()->value('id'),".to_owned();
    fields.chain(foreign_keys).chain([owner]).join("\n")
}

fn fake_value(field: &FieldSpec) -> String {
    if let Some((model, _)) = field.dynamic_source() {
        return if field.is_multi_choice() {
            format!("{model}::query()->inRandomOrder()->limit(2)->pluck('id')->all()")
        } else {
            format!("{model}::query()->inRandomOrder()->value('id')")
        };
    }
    let count = field.static_options().map_or(0, <[String]>::len);
    if field.kind().is_enumerable() {
        let indexes = (0..count.max(1)).join(", ");
        return match field.choice() {
            Choice::Multiple => format!("fake()->randomElements([{indexes}], {})", count.min(2)),
            _ => format!("fake()->randomElement([{indexes}])"),
        };
    }
    match field.kind() {
        FieldKind::Text => "fake()->sentence(3)".to_owned(),
        FieldKind::Textarea => "fake()->paragraph()".to_owned(),
        FieldKind::RichText => "'<p>'.fake()->paragraph().'</p>'".to_owned(),
        FieldKind::Date => "fake()->date()".to_owned(),
        FieldKind::DateRange => {
            "['start' => fake()->date(), 'end' => fake()->date()]".to_owned()
        }
        FieldKind::DatetimeRange => "['start' => fake()->dateTime()->format('Y-m-d\\TH:i'), \
                                     'end' => fake()->dateTime()->format('Y-m-d\\TH:i')]"
            .to_owned(),
        FieldKind::Number => "fake()->numberBetween(1, 100)".to_owned(),
        FieldKind::Currency => "fake()->randomFloat(2, 10, 10000)".to_owned(),
        FieldKind::Rating => "fake()->numberBetween(1, 5)".to_owned(),
        FieldKind::Slider => "[fake()->numberBetween(0, 100)]".to_owned(),
        FieldKind::Switch => "fake()->boolean()".to_owned(),
        FieldKind::Color => "fake()->hexColor()".to_owned(),
        FieldKind::Phone => "fake()->phoneNumber()".to_owned(),
        FieldKind::Tags => "fake()->words(3)".to_owned(),
        _ => "null".to_owned(),
    }
}

pub(crate) fn controller_imports(plan: &BuildPlan) -> String {
    let names = &plan.names;
    let requests = request_namespace(plan);
    let mut classes = vec![
        "App\\Http\\Controllers\\Controller".to_owned(),
        plan.model_class(),
        format!("{requests}\\Store{}Request", names.model),
        format!("{requests}\\Update{}Request", names.model),
        "Illuminate\\Http\\RedirectResponse".to_owned(),
        "Illuminate\\Http\\Request".to_owned(),
        "Inertia\\Inertia".to_owned(),
        "Inertia\\Response".to_owned(),
    ];
    if !plan.dependencies.is_empty() {
        classes.push("Illuminate\\Http\\JsonResponse".to_owned());
    }
    classes.extend(
        record_sources(plan)
            .iter()
            .map(|source| model_class(plan, source.model)),
    );
    use_lines(classes, &controller_namespace(plan))
}

/// `->with([...])` for the relations shown as list columns
pub(crate) fn eager_loads(plan: &BuildPlan) -> String {
    let relations: Vec<String> = plan
        .table_relationships
        .iter()
        .map(|projection| projection.relation().to_lower_camel_case())
        .unique()
        .collect();
    if relations.is_empty() {
        String::new()
    } else {
        format!("->with([{}])", quote_list(relations.iter().map(String::as_str)))
    }
}

pub(crate) fn search_query(plan: &BuildPlan) -> String {
    if plan.searchable.is_empty() {
        return String::new();
    }
    let conditions = plan
        .searchable
        .iter()
        .enumerate()
        .map(|(i, search)| {
            let column = quote(search.field.column());
            let (method, args) = match search.mode {
                SearchMode::Like => ("where", format!("{column}, 'like', \"%{{$search}}%\"")),
                SearchMode::Exact => ("where", format!("{column}, $search")),
                SearchMode::JsonContains if search.field.kind() == FieldKind::Tags => {
                    ("whereJsonContains", format!("{column}, $search"))
                }
                SearchMode::JsonContains => {
                    ("whereJsonContains", format!("{column}, (int) $search"))
                }
            };
            if i == 0 {
                format!("        $query->{method}({args})")
            } else {
                format!("            ->or{}({args})", method.to_upper_camel_case())
            }
        })
        .join("\n");
    format!(
        "\nif ($search = trim((string) $request->input('search'))) {{\n    \
         $query->where(function ($query) use ($search) {{\n{conditions};\n    }});\n}}"
    )
}

pub(crate) fn filter_query(plan: &BuildPlan) -> String {
    plan.filters
        .iter()
        .map(|filter| {
            let key = quote(filter.key());
            let method = if filter.is_multiple() {
                "whereJsonContains"
            } else {
                "where"
            };
            format!(
                "\nif ($request->filled({key})) {{\n    $query->{method}({key}, $request->integer({key}));\n}}"
            )
        })
        .join("")
}

pub(crate) fn filter_keys(plan: &BuildPlan) -> String {
    quote_list(["search"].into_iter().chain(plan.filters.iter().map(|f| f.key())))
}

pub(crate) fn media_keys(plan: &BuildPlan) -> String {
    quote_list(plan.media_fields().map(FieldSpec::column))
}

pub(crate) fn media_store(ctx: &RenderContext, replace: bool) -> String {
    let variable = &ctx.plan.names.variable;
    ctx.plan
        .media_fields()
        .map(|field| {
            let key = quote(field.column());
            if field.kind() == FieldKind::MediaSingle {
                let clear = if replace {
                    format!("\n    ${variable}->clearMediaCollection({key});")
                } else {
                    String::new()
                };
                format!(
                    "\nif ($request->hasFile({key})) {{{clear}\n    \
                     ${variable}->addMediaFromRequest({key})->toMediaCollection({key});\n}}"
                )
            } else {
                format!(
                    "\nforeach ($request->file({key}, []) as $file) {{\n    \
                     ${variable}->addMedia($file)->toMediaCollection({key});\n}}"
                )
            }
        })
        .join("")
}

pub(crate) fn show_method(plan: &BuildPlan) -> String {
    if plan.view_mode != Some(ViewMode::Page) {
        return String::new();
    }
    let names = &plan.names;
    let relations = plan
        .table_relationships
        .iter()
        .map(|projection| projection.relation().to_lower_camel_case())
        .unique()
        .collect::<Vec<_>>();
    let loaded = if relations.is_empty() {
        format!("${}", names.variable)
    } else {
        format!(
            "${}->load([{}])",
            names.variable,
            quote_list(relations.iter().map(String::as_str))
        )
    };
    format!(
        "\npublic function show({model} ${var}): Response\n{{\n    \
         return Inertia::render('{route}/show', [\n        \
         '{var}' => {loaded},\n        \
         ...$this->options(all: true),\n    \
         ]);\n}}",
        model = names.model,
        var = names.variable,
        route = names.route,
    )
}

/// Entries of the private `options()` method feeding every select
pub(crate) fn option_queries(plan: &BuildPlan) -> String {
    let variable = &plan.names.variable;
    record_sources(plan)
        .iter()
        .map(|source| {
            let display = quote(source.display);
            let list = format!(
                "{}::query()->orderBy({display})->get(['id', {display}])",
                source.model
            );
            let prop = quote(&source.prop);
            match source.cascade {
                Some(edge) => {
                    let filtered = format!(
                        "{}::query()->where({}, ${variable}->{})->orderBy({display})->get(['id', {display}])",
                        source.model,
                        quote(&edge.cascade.child_parent_column),
                        edge.parent.foreign_key(),
                    );
                    format!(
                        "{prop} => match (true) {{\n    $all => {list},\n    \
                         ${variable} !== null => {filtered},\n    default => [],\n}},"
                    )
                }
                None => format!("{prop} => {list},"),
            }
        })
        .join("\n")
}

/// One JSON endpoint per cascade, listing the children of a parent
pub(crate) fn cascade_endpoints(plan: &BuildPlan) -> String {
    plan.dependencies
        .iter()
        .map(|edge| {
            let child = &edge.child;
            let display = quote(display_field(plan, child));
            format!(
                "\npublic function {endpoint}(int ${param}): JsonResponse\n{{\n    \
                 return response()->json(\n        \
                 {model}::query()->where({column}, ${param})->orderBy({display})->get(['id', {display}])\n    \
                 );\n}}",
                endpoint = edge.cascade.endpoint,
                param = edge.cascade.parent_param,
                model = child.target(),
                column = quote(&edge.cascade.child_parent_column),
            )
        })
        .join("\n")
}
