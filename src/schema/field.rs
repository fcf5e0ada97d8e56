use crate::{Choice, FieldKind, FieldTypeDef, names::label_for};

/// One declared attribute of the generated entity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) kind: FieldKind,
    pub(crate) nullable: bool,
    pub(crate) custom_validation: Option<String>,
    pub(crate) options: FieldOptions,
    pub(crate) flags: FieldFlags,
}

/// Where the selectable values of a field come from
///
/// Static and dynamic option sources are mutually exclusive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FieldOptions {
    #[default]
    None,
    /// Literal labels, stored by index
    Static(Vec<String>),
    /// Records of another entity, stored by id
    Dynamic { model: String, display_field: String },
}

/// Behaviour switches written inside the validation segment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldFlags {
    pub show_preview: bool,
    pub multiple: bool,
    pub searchable: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            custom_validation: None,
            options: FieldOptions::None,
            flags: FieldFlags::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage column, always the declared name unchanged
    pub fn column(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> String {
        label_for(&self.name)
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn def(&self) -> FieldTypeDef {
        self.kind.def()
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn custom_validation(&self) -> Option<&str> {
        self.custom_validation.as_deref()
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    pub fn flags(&self) -> FieldFlags {
        self.flags
    }

    pub fn static_options(&self) -> Option<&[String]> {
        match &self.options {
            FieldOptions::Static(labels) => Some(labels),
            _ => None,
        }
    }

    pub fn dynamic_source(&self) -> Option<(&str, &str)> {
        match &self.options {
            FieldOptions::Dynamic {
                model,
                display_field,
            } => Some((model, display_field)),
            _ => None,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.options, FieldOptions::Dynamic { .. })
    }

    /// Effective choice arity, a `multiple` flag widens a single choice
    pub fn choice(&self) -> Choice {
        match self.def().choice {
            Choice::Single if self.flags.multiple => Choice::Multiple,
            choice => choice,
        }
    }

    pub fn is_multi_choice(&self) -> bool {
        self.choice() == Choice::Multiple
    }

    /// Whether a filter control can be offered for this field
    pub fn is_filterable(&self) -> bool {
        self.kind.is_enumerable() && !matches!(self.options, FieldOptions::None)
    }

    /// Value/label pairs of a static option list, values are stored indexes
    pub fn indexed_options(&self) -> Vec<(usize, &str)> {
        self.static_options()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(index, label)| (index, label.as_str()))
            .collect()
    }
}

impl FieldFlags {
    pub const SHOW_PREVIEW: &'static str = "showPreview";
    pub const MULTIPLE: &'static str = "multiple";
    pub const SEARCHABLE: &'static str = "searchable";
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn column_is_identity_and_label_is_title_cased() {
        for name in ["due_days", "title", "start_date_2", "x"] {
            let field = FieldSpec::new(name, FieldKind::Text);
            assert_eq!(field.column(), name);
        }
        assert_eq!(FieldSpec::new("due_days", FieldKind::Number).label(), "Due Days");
        assert_eq!(FieldSpec::new("name", FieldKind::Text).label(), "Name");
    }

    #[test]
    fn multiple_flag_widens_select() {
        let mut field = FieldSpec::new("skills", FieldKind::Select);
        assert_eq!(field.choice(), Choice::Single);
        field.flags.multiple = true;
        assert!(field.is_multi_choice());
    }

    #[test]
    fn indexed_options() {
        let mut field = FieldSpec::new("status", FieldKind::Select);
        field.options = FieldOptions::Static(vec!["Open".into(), "Closed".into()]);
        assert_eq!(field.indexed_options(), vec![(0, "Open"), (1, "Closed")]);
        assert!(field.is_filterable());
    }
}
