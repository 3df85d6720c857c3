use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// The kind of question a form author can place on an application form.
///
/// Anything the author sends that we don't recognise is kept as
/// [`FieldType::Other`] so that it reaches validation and is rejected there,
/// rather than being silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Label,
    InputText,
    Textarea,
    InputEmail,
    Checkbox,
    MultipleChoiceOption,
    Other(String),
}

impl FieldType {
    /// The wire name of this field type, which is also the block type it translates to.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "TEXT",
            Self::Label => "LABEL",
            Self::InputText => "INPUT_TEXT",
            Self::Textarea => "TEXTAREA",
            Self::InputEmail => "INPUT_EMAIL",
            Self::Checkbox => "CHECKBOX",
            Self::MultipleChoiceOption => "MULTIPLE_CHOICE_OPTION",
            Self::Other(name) => name,
        }
    }

    /// Does this field type need a list of options?
    pub fn takes_options(&self) -> bool {
        matches!(self, Self::Checkbox | Self::MultipleChoiceOption)
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "TEXT" => Self::Text,
            "LABEL" => Self::Label,
            "INPUT_TEXT" => Self::InputText,
            "TEXTAREA" => Self::Textarea,
            "INPUT_EMAIL" => Self::InputEmail,
            "CHECKBOX" => Self::Checkbox,
            "MULTIPLE_CHOICE_OPTION" => Self::MultipleChoiceOption,
            _ => Self::Other(name),
        }
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single question as authored in the form builder.
///
/// Fields only live for the duration of a submission: they are translated
/// into blocks and then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    /// Identifier assigned by the form builder. Opaque to us.
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    /// Heading shown above a checkbox group.
    #[serde(default)]
    pub question_text: Option<String>,
    #[serde(default)]
    pub min_choices: Option<u32>,
    #[serde(default)]
    pub max_choices: Option<u32>,
    /// Only meaningful for multiple choice fields.
    #[serde(default)]
    pub allow_multiple: bool,
    /// Classification tag copied onto the translated blocks.
    #[serde(default)]
    pub group_type: Option<String>,
}

impl FormField {
    /// A field of the given type with everything else left empty.
    pub fn new(id: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            required: false,
            placeholder: None,
            options: Vec::new(),
            question_text: None,
            min_choices: None,
            max_choices: None,
            allow_multiple: false,
            group_type: None,
        }
    }

    /// Whether the min/max choice bounds apply to this field.
    pub fn has_choice_bounds(&self) -> bool {
        match self.field_type {
            FieldType::Checkbox => true,
            FieldType::MultipleChoiceOption => self.allow_multiple,
            _ => false,
        }
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl FormField {
        pub fn example_name() -> Self {
            Self {
                required: true,
                ..Self::new("name", FieldType::InputText, "Name")
            }
        }

        pub fn example_cover_letter() -> Self {
            Self {
                placeholder: Some("Tell us about yourself".to_string()),
                ..Self::new("cover", FieldType::Textarea, "Cover letter")
            }
        }

        pub fn example_languages() -> Self {
            Self {
                required: true,
                options: vec!["Rust".to_string(), "C++".to_string(), "Python".to_string()],
                question_text: Some("Which languages do you use?".to_string()),
                min_choices: Some(1),
                max_choices: Some(2),
                ..Self::new("languages", FieldType::Checkbox, "Languages")
            }
        }

        pub fn example_year() -> Self {
            Self {
                required: true,
                options: vec![
                    "First".to_string(),
                    "Second".to_string(),
                    "Final".to_string(),
                ],
                ..Self::new("year", FieldType::MultipleChoiceOption, "Year of study")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_names() {
        for name in [
            "TEXT",
            "LABEL",
            "INPUT_TEXT",
            "TEXTAREA",
            "INPUT_EMAIL",
            "CHECKBOX",
            "MULTIPLE_CHOICE_OPTION",
        ] {
            let field_type = FieldType::from(name.to_string());
            assert!(!matches!(field_type, FieldType::Other(_)), "{name}");
            assert_eq!(field_type.as_str(), name);
        }

        let other = FieldType::from("SIGNATURE".to_string());
        assert_eq!(other, FieldType::Other("SIGNATURE".to_string()));
        assert_eq!(String::from(other), "SIGNATURE");
    }

    #[test]
    fn deserialize_from_builder() {
        let field: FormField = serde_json::from_str(
            r#"{
                "id": "f1",
                "type": "CHECKBOX",
                "label": "Interests",
                "options": ["Backend", "Frontend"],
                "minChoices": 1,
                "groupType": "CHECKBOXES"
            }"#,
        )
        .unwrap();

        assert_eq!(field.field_type, FieldType::Checkbox);
        assert_eq!(field.options.len(), 2);
        assert_eq!(field.min_choices, Some(1));
        assert_eq!(field.max_choices, None);
        assert!(!field.required);
        assert_eq!(field.group_type.as_deref(), Some("CHECKBOXES"));
    }

    #[test]
    fn choice_bounds_only_for_multi_select() {
        assert!(FormField::example_languages().has_choice_bounds());
        let mut year = FormField::example_year();
        assert!(!year.has_choice_bounds());
        year.allow_multiple = true;
        assert!(year.has_choice_bounds());
        assert!(!FormField::example_name().has_choice_bounds());
    }
}
