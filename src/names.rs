use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};

/// Every casing of an entity name the artifacts need
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Names {
    /// `JobOpening`
    pub model: String,
    /// `JobOpenings`
    pub model_plural: String,
    /// `jobOpening`
    pub variable: String,
    /// `jobOpenings`
    pub variable_plural: String,
    /// `Job Opening`
    pub label: String,
    /// `Job Openings`
    pub label_plural: String,
    /// `job_opening`
    pub snake: String,
    /// `job_openings`
    pub table: String,
    /// `job-openings`
    pub route: String,
    /// `job-opening`
    pub route_singular: String,
}

impl Names {
    /// Derive all casings from a free-form display name
    ///
    /// Multi-word input collapses into one identifier and a plural input is
    /// singularised, so `"job openings"` and `"JobOpening"` agree.
    pub fn from_display_name(display_name: &str) -> Self {
        let snake = singularize(&display_name.trim().to_upper_camel_case().to_snake_case());
        let table = pluralize(&snake);
        Self {
            model: snake.to_upper_camel_case(),
            model_plural: table.to_upper_camel_case(),
            variable: snake.to_lower_camel_case(),
            variable_plural: table.to_lower_camel_case(),
            label: label_for(&snake),
            label_plural: label_for(&table),
            route: table.to_kebab_case(),
            route_singular: snake.to_kebab_case(),
            snake,
            table,
        }
    }
}

pub fn pluralize(word: &str) -> String {
    pluralizer::pluralize(word, 2, false)
}

pub fn singularize(word: &str) -> String {
    pluralizer::pluralize(word, 1, false)
}

/// Human label of a column: underscores become spaces, words are capitalised
pub fn label_for(name: &str) -> String {
    name.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
