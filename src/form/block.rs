use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Publication status requested for a hosted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormStatus {
    Draft,
    Published,
}

impl Default for FormStatus {
    fn default() -> Self {
        Self::Published
    }
}

/// A complete form creation request, in the form host's block format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormRequest {
    pub status: FormStatus,
    pub blocks: Vec<Block>,
}

impl FormRequest {
    /// The request as untyped JSON, ready to be run through the schema validator.
    pub fn to_candidate(&self) -> Value {
        // Serialising plain structs with string keys cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// One block of a hosted form.
///
/// Serialises as `{uuid, type, groupUuid, groupType, payload}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub uuid: Uuid,
    pub group_uuid: Uuid,
    pub group_type: String,
    pub content: BlockContent,
}

impl Block {
    /// The `type` discriminant sent on the wire.
    pub fn block_type(&self) -> &str {
        self.content.block_type()
    }
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Block", 5)?;
        state.serialize_field("uuid", &self.uuid)?;
        state.serialize_field("type", self.block_type())?;
        state.serialize_field("groupUuid", &self.group_uuid)?;
        state.serialize_field("groupType", &self.group_type)?;
        match &self.content {
            BlockContent::FormTitle(payload)
            | BlockContent::Title(payload)
            | BlockContent::Text(payload)
            | BlockContent::Label(payload)
            | BlockContent::Unrecognized { payload, .. } => {
                state.serialize_field("payload", payload)?
            }
            BlockContent::InputText(payload)
            | BlockContent::Textarea(payload)
            | BlockContent::InputEmail(payload) => state.serialize_field("payload", payload)?,
            BlockContent::Checkbox(payload) | BlockContent::MultipleChoiceOption(payload) => {
                state.serialize_field("payload", payload)?
            }
        }
        state.end()
    }
}

/// The type-specific part of a block. Adding a block type means adding a variant here,
/// and the compiler then points at every place that needs to handle it.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    FormTitle(HtmlPayload),
    Title(HtmlPayload),
    Text(HtmlPayload),
    Label(HtmlPayload),
    InputText(InputPayload),
    Textarea(InputPayload),
    InputEmail(InputPayload),
    Checkbox(OptionPayload),
    MultipleChoiceOption(OptionPayload),
    /// Produced only when translating a field type we don't know.
    /// The schema validator never accepts it.
    Unrecognized {
        block_type: String,
        payload: HtmlPayload,
    },
}

impl BlockContent {
    pub fn block_type(&self) -> &str {
        match self {
            Self::FormTitle(_) => "FORM_TITLE",
            Self::Title(_) => "TITLE",
            Self::Text(_) => "TEXT",
            Self::Label(_) => "LABEL",
            Self::InputText(_) => "INPUT_TEXT",
            Self::Textarea(_) => "TEXTAREA",
            Self::InputEmail(_) => "INPUT_EMAIL",
            Self::Checkbox(_) => "CHECKBOX",
            Self::MultipleChoiceOption(_) => "MULTIPLE_CHOICE_OPTION",
            Self::Unrecognized { block_type, .. } => block_type,
        }
    }

    /// The option payload, if this is one option of a choice group.
    pub fn option(&self) -> Option<&OptionPayload> {
        match self {
            Self::Checkbox(payload) | Self::MultipleChoiceOption(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Payload of the rich-text block kinds. Unknown keys are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HtmlPayload {
    pub html: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HtmlPayload {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            extra: Map::new(),
        }
    }
}

/// Payload of the free-text input kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputPayload {
    pub is_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_default_answer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_min_characters: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_characters: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_max_characters: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_characters: Option<u32>,
}

/// Payload of a single option within a checkbox or multiple choice group.
///
/// The form host does not infer position from array order, so every option
/// carries its own `index`, `isFirst` and `isLast`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionPayload {
    pub index: u32,
    pub is_first: bool,
    pub is_last: bool,
    pub text: String,
    pub is_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_multiple: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_min_choices: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_choices: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_max_choices: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_choices: Option<u32>,
}
