//! The closed catalog of semantic field kinds.
//!
//! Each [`FieldKind`] maps to a static [`FieldTypeDef`]: how the value is
//! stored, the default validation rule, the model cast and the UI control
//! used to edit it. Everything downstream (plan builder, renderers) reads
//! from here, so adding a kind means adding one arm to [`FieldKind::def`].

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Semantic type of a declared field
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Display,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    #[default]
    #[strum(to_string = "text", serialize = "textbox", serialize = "string")]
    Text,
    Textarea,
    Select,
    Radio,
    #[strum(to_string = "checkbox-group", serialize = "checkbox", serialize = "checkboxes")]
    CheckboxGroup,
    #[strum(to_string = "multiselect", serialize = "multi-select")]
    Multiselect,
    Date,
    #[strum(to_string = "date-range", serialize = "daterange", serialize = "date_range")]
    DateRange,
    #[strum(
        to_string = "datetime-range",
        serialize = "datetimerange",
        serialize = "datetime_range"
    )]
    DatetimeRange,
    #[strum(to_string = "number", serialize = "integer")]
    Number,
    #[strum(to_string = "currency", serialize = "money", serialize = "decimal")]
    Currency,
    Rating,
    Slider,
    #[strum(to_string = "switch", serialize = "toggle", serialize = "boolean")]
    Switch,
    Color,
    #[strum(
        to_string = "rich-text",
        serialize = "richtext",
        serialize = "rich_text",
        serialize = "editor"
    )]
    RichText,
    #[strum(to_string = "phone", serialize = "tel")]
    Phone,
    Tags,
    #[strum(
        to_string = "media-single",
        serialize = "media_single",
        serialize = "file",
        serialize = "image"
    )]
    MediaSingle,
    #[strum(
        to_string = "media-multiple",
        serialize = "media_multiple",
        serialize = "files",
        serialize = "images"
    )]
    MediaMultiple,
}

/// How many values a field holds when it is a choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    None,
    Single,
    Multiple,
}

/// Column shape in the persistence schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    String(u16),
    Text,
    LongText,
    Json,
    Date,
    Integer,
    UnsignedTinyInteger,
    Decimal(u8, u8),
    Boolean,
    /// Stored outside the table (media library)
    External,
}

/// UI control used to edit and display the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiBinding {
    /// Component name rendered in forms
    pub component: &'static str,
    /// Module the component is imported from
    pub import: &'static str,
    /// HTML input type, when the component is a plain input
    pub input_type: Option<&'static str>,
}

/// Static facts about one [`FieldKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTypeDef {
    pub kind: FieldKind,
    pub storage: Storage,
    /// Rule body without the leading `required` / `nullable`
    pub rule: &'static str,
    pub cast: Option<&'static str>,
    pub ui: UiBinding,
    /// Whether the value is mass-assigned from the request
    pub form_writable: bool,
    pub choice: Choice,
    /// TypeScript type of the attribute
    pub ts_type: &'static str,
}

const INPUT: &str = "@/components/ui/input";

const fn input(input_type: &'static str) -> UiBinding {
    UiBinding {
        component: "Input",
        import: INPUT,
        input_type: Some(input_type),
    }
}

const fn control(component: &'static str, import: &'static str) -> UiBinding {
    UiBinding {
        component,
        import,
        input_type: None,
    }
}

impl FieldKind {
    /// Look up the catalog entry
    pub const fn def(self) -> FieldTypeDef {
        use FieldKind::*;
        let (storage, rule, cast, ui, choice, ts_type) = match self {
            Text => (
                Storage::String(255),
                "string|max:255",
                None,
                input("text"),
                Choice::None,
                "string",
            ),
            Textarea => (
                Storage::Text,
                "string",
                None,
                control("Textarea", "@/components/ui/textarea"),
                Choice::None,
                "string",
            ),
            Select => (
                Storage::Integer,
                "integer",
                Some("integer"),
                control("Select", "@/components/ui/select"),
                Choice::Single,
                "number",
            ),
            Radio => (
                Storage::Integer,
                "integer",
                Some("integer"),
                control("RadioGroup", "@/components/ui/radio-group"),
                Choice::Single,
                "number",
            ),
            CheckboxGroup => (
                Storage::Json,
                "array",
                Some("array"),
                control("Checkbox", "@/components/ui/checkbox"),
                Choice::Multiple,
                "number[]",
            ),
            Multiselect => (
                Storage::Json,
                "array",
                Some("array"),
                control("MultiSelect", "@/components/ui/multi-select"),
                Choice::Multiple,
                "number[]",
            ),
            Date => (
                Storage::Date,
                "date",
                Some("date:Y-m-d"),
                input("date"),
                Choice::None,
                "string",
            ),
            DateRange => (
                Storage::Json,
                "array",
                Some("array"),
                input("date"),
                Choice::None,
                "DateRangeValue",
            ),
            DatetimeRange => (
                Storage::Json,
                "array",
                Some("array"),
                input("datetime-local"),
                Choice::None,
                "DateRangeValue",
            ),
            Number => (
                Storage::Integer,
                "integer",
                Some("integer"),
                input("number"),
                Choice::None,
                "number",
            ),
            Currency => (
                Storage::Decimal(12, 2),
                "numeric|min:0",
                Some("decimal:2"),
                input("number"),
                Choice::None,
                "string",
            ),
            Rating => (
                Storage::UnsignedTinyInteger,
                "integer|min:1|max:5",
                Some("integer"),
                control("Rating", "@/components/ui/rating"),
                Choice::None,
                "number",
            ),
            Slider => (
                Storage::Json,
                "array",
                Some("array"),
                control("Slider", "@/components/ui/slider"),
                Choice::None,
                "number[]",
            ),
            Switch => (
                Storage::Boolean,
                "boolean",
                Some("boolean"),
                control("Switch", "@/components/ui/switch"),
                Choice::None,
                "boolean",
            ),
            Color => (
                Storage::String(20),
                "string|max:20",
                None,
                input("color"),
                Choice::None,
                "string",
            ),
            RichText => (
                Storage::LongText,
                "string",
                None,
                control("RichTextEditor", "@/components/rich-text-editor"),
                Choice::None,
                "string",
            ),
            Phone => (
                Storage::String(30),
                "string|max:30",
                None,
                input("tel"),
                Choice::None,
                "string",
            ),
            Tags => (
                Storage::Json,
                "array",
                Some("array"),
                control("TagInput", "@/components/ui/tag-input"),
                Choice::Multiple,
                "string[]",
            ),
            MediaSingle => (
                Storage::External,
                "file|max:10240",
                None,
                input("file"),
                Choice::None,
                "MediaItem | null",
            ),
            MediaMultiple => (
                Storage::External,
                "array",
                None,
                input("file"),
                Choice::None,
                "MediaItem[]",
            ),
        };
        FieldTypeDef {
            kind: self,
            storage,
            rule,
            cast,
            ui,
            form_writable: !matches!(storage, Storage::External),
            choice,
            ts_type,
        }
    }

    /// Parse a declared type, `None` when the catalog has no such entry
    pub fn lookup(declared: &str) -> Option<Self> {
        declared.trim().parse().ok()
    }

    /// Kinds whose value is picked from a list of options
    pub fn is_enumerable(self) -> bool {
        !matches!(self.def().choice, Choice::None) && self != Self::Tags
    }

    /// Kinds searched with a partial `LIKE` match
    pub fn is_string_like(self) -> bool {
        matches!(
            self,
            Self::Text | Self::Textarea | Self::RichText | Self::Phone | Self::Color
        )
    }

    pub fn is_media(self) -> bool {
        matches!(self, Self::MediaSingle | Self::MediaMultiple)
    }

    pub fn is_range(self) -> bool {
        matches!(self, Self::DateRange | Self::DatetimeRange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn every_kind_round_trips_through_its_name() {
        for kind in FieldKind::iter() {
            assert_eq!(FieldKind::lookup(kind.as_ref()), Some(kind));
        }
        assert_eq!(FieldKind::iter().count(), 20);
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(FieldKind::default(), FieldKind::Text);
        assert_eq!(FieldKind::lookup("textbox"), Some(FieldKind::Text));
        assert_eq!(FieldKind::lookup("Rich-Text"), Some(FieldKind::RichText));
        assert_eq!(FieldKind::lookup("toggle"), Some(FieldKind::Switch));
        assert_eq!(FieldKind::lookup("images"), Some(FieldKind::MediaMultiple));
        assert_eq!(FieldKind::lookup("spreadsheet"), None);
    }

    #[test]
    fn media_is_not_mass_assigned() {
        assert!(!FieldKind::MediaSingle.def().form_writable);
        assert!(!FieldKind::MediaMultiple.def().form_writable);
        assert!(FieldKind::Slider.def().form_writable);
    }

    #[test]
    fn enumerable_kinds() {
        let enumerable: Vec<_> = FieldKind::iter().filter(|k| k.is_enumerable()).collect();
        assert_eq!(
            enumerable,
            vec![
                FieldKind::Select,
                FieldKind::Radio,
                FieldKind::CheckboxGroup,
                FieldKind::Multiselect
            ]
        );
    }
}
