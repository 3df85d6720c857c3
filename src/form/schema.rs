//! Local validation of form requests against the form host's block format.
//!
//! Validation is synchronous and never talks to the form host. It exists so
//! that a request the host would reject is caught before anything is created.
//! Every violation carries the dotted path of the offending value.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::block::{
    Block, BlockContent, FormRequest, FormStatus, HtmlPayload, InputPayload, OptionPayload,
};
use super::field::{FieldType, FormField};

/// A single problem found in a candidate request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// All violations found in a candidate request, in the order they were found.
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<Violation>);

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.primary())
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    /// The first violation, which is the one reported to the user.
    pub fn primary(&self) -> &Violation {
        // Only constructed from a non-empty list.
        &self.0[0]
    }

    pub fn violations(&self) -> &[Violation] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Validate an untyped request, producing the typed request if it is well-formed.
pub fn validate(candidate: &Value) -> Result<FormRequest, ValidationErrors> {
    let mut report = Report::default();
    let request = check_request(candidate, &mut report);
    if !report.0.is_empty() {
        return Err(ValidationErrors(report.0));
    }
    request.ok_or_else(|| {
        ValidationErrors(vec![Violation {
            path: String::new(),
            message: "invalid form request".to_string(),
        }])
    })
}

/// Check authored fields for what their blocks cannot show: choice fields
/// with nothing to choose from, and choice bounds no option list satisfies.
///
/// Paths look like `fields.2.minChoices`.
pub fn check_fields(fields: &[FormField]) -> Result<(), ValidationErrors> {
    let mut report = Report::default();
    let path = Path::default().key("fields");
    for (i, field) in fields.iter().enumerate() {
        check_field(field, path.index(i), &mut report);
    }
    if report.0.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(report.0))
    }
}

fn check_field(field: &FormField, path: Path, report: &mut Report) {
    // A checkbox without options stands alone, labelled by the field.
    if field.field_type.takes_options()
        && field.field_type != FieldType::Checkbox
        && field.options.is_empty()
    {
        report.add(&path.key("options"), "must have at least one option");
    }

    if !field.has_choice_bounds() {
        return;
    }
    let count = field.options.len();
    for (key, bound) in [("minChoices", field.min_choices), ("maxChoices", field.max_choices)] {
        match bound {
            Some(0) => report.add(&path.key(key), "must be at least 1"),
            Some(bound) if bound as usize > count => report.add(
                &path.key(key),
                format!("must not exceed the number of options ({count})"),
            ),
            _ => {}
        }
    }
    if let (Some(lo), Some(hi)) = (field.min_choices, field.max_choices) {
        if lo > hi {
            report.add(
                &path.key("minChoices"),
                format!("must not exceed maxChoices ({lo} > {hi})"),
            );
        }
    }
}

/// Collected violations.
#[derive(Default)]
struct Report(Vec<Violation>);

impl Report {
    fn add(&mut self, path: &Path, message: impl Into<String>) {
        self.0.push(Violation {
            path: path.0.clone(),
            message: message.into(),
        });
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

/// A dotted path into the candidate, e.g. `blocks.2.payload.text`.
#[derive(Debug, Clone, Default)]
struct Path(String);

impl Path {
    fn key(&self, key: &str) -> Path {
        if self.0.is_empty() {
            Path(key.to_string())
        } else {
            Path(format!("{}.{key}", self.0))
        }
    }

    fn index(&self, index: usize) -> Path {
        self.key(&index.to_string())
    }
}

/// Reads the keys of one JSON object, remembering which ones were looked at
/// so that the rest can be rejected or passed through.
struct Fields<'v> {
    map: &'v Map<String, Value>,
    path: Path,
    seen: Vec<&'static str>,
}

impl<'v> Fields<'v> {
    fn of(value: &'v Value, path: Path, report: &mut Report) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self {
                map,
                path,
                seen: Vec::new(),
            }),
            _ => {
                report.add(&path, "expected an object");
                None
            }
        }
    }

    /// Look up a key. `null` counts as absent.
    fn get(&mut self, key: &'static str) -> Option<&'v Value> {
        self.seen.push(key);
        self.map.get(key).filter(|value| !value.is_null())
    }

    fn required(&mut self, key: &'static str, report: &mut Report) -> Option<&'v Value> {
        let value = self.get(key);
        if value.is_none() {
            report.add(&self.path.key(key), "is required");
        }
        value
    }

    fn string(&mut self, key: &'static str, report: &mut Report) -> Option<String> {
        let value = self.get(key)?;
        self.as_string(key, value, report)
    }

    fn required_string(&mut self, key: &'static str, report: &mut Report) -> Option<String> {
        let value = self.required(key, report)?;
        self.as_string(key, value, report)
    }

    /// A required string that must contain something other than whitespace.
    fn non_empty_string(&mut self, key: &'static str, report: &mut Report) -> Option<String> {
        let value = self.required_string(key, report)?;
        if value.trim().is_empty() {
            report.add(&self.path.key(key), "must not be empty");
            return None;
        }
        Some(value)
    }

    fn as_string(&self, key: &str, value: &Value, report: &mut Report) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => {
                report.add(&self.path.key(key), "expected a string");
                None
            }
        }
    }

    fn boolean(&mut self, key: &'static str, report: &mut Report) -> Option<bool> {
        let value = self.get(key)?;
        self.as_bool(key, value, report)
    }

    fn required_bool(&mut self, key: &'static str, report: &mut Report) -> Option<bool> {
        let value = self.required(key, report)?;
        self.as_bool(key, value, report)
    }

    fn as_bool(&self, key: &str, value: &Value, report: &mut Report) -> Option<bool> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => {
                report.add(&self.path.key(key), "expected a boolean");
                None
            }
        }
    }

    fn count(&mut self, key: &'static str, report: &mut Report) -> Option<u32> {
        let value = self.get(key)?;
        self.as_count(key, value, report)
    }

    fn required_count(&mut self, key: &'static str, report: &mut Report) -> Option<u32> {
        let value = self.required(key, report)?;
        self.as_count(key, value, report)
    }

    fn as_count(&self, key: &str, value: &Value, report: &mut Report) -> Option<u32> {
        let count = value.as_u64().and_then(|n| u32::try_from(n).ok());
        if count.is_none() {
            report.add(&self.path.key(key), "expected a non-negative integer");
        }
        count
    }

    fn uuid(&mut self, key: &'static str, report: &mut Report) -> Option<Uuid> {
        let value = self.required_string(key, report)?;
        match Uuid::parse_str(&value) {
            Ok(uuid) => Some(uuid),
            Err(_) => {
                report.add(&self.path.key(key), "expected a UUID");
                None
            }
        }
    }

    /// `flag` set implies `value` present.
    fn implied(
        &self,
        flag: (&str, Option<bool>),
        value: (&str, bool),
        report: &mut Report,
    ) {
        if flag.1 == Some(true) && !value.1 {
            report.add(
                &self.path.key(value.0),
                format!("is required when {} is set", flag.0),
            );
        }
    }

    /// `min <= max` when both are given.
    fn ordered(&self, min: (&str, Option<u32>), max: (&str, Option<u32>), report: &mut Report) {
        if let (Some(lo), Some(hi)) = (min.1, max.1) {
            if lo > hi {
                report.add(
                    &self.path.key(min.0),
                    format!("must not exceed {} ({lo} > {hi})", max.0),
                );
            }
        }
    }

    fn was_seen(&self, key: &str) -> bool {
        self.seen.iter().any(|seen| *seen == key)
    }

    /// Reject every key that was never looked at.
    fn deny_unknown(self, report: &mut Report) {
        for key in self.map.keys() {
            if !self.was_seen(key) {
                report.add(&self.path.key(key), "unrecognized field");
            }
        }
    }

    /// Everything that was never looked at, for pass-through payloads.
    fn into_rest(self) -> Map<String, Value> {
        self.map
            .iter()
            .filter(|(key, _)| !self.was_seen(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

fn check_request(candidate: &Value, report: &mut Report) -> Option<FormRequest> {
    let mut fields = Fields::of(candidate, Path::default(), report)?;

    let status = fields
        .required_string("status", report)
        .and_then(|status| match status.as_str() {
            "DRAFT" => Some(FormStatus::Draft),
            "PUBLISHED" => Some(FormStatus::Published),
            _ => {
                report.add(&Path::default().key("status"), "expected one of DRAFT, PUBLISHED");
                None
            }
        });

    let blocks_path = Path::default().key("blocks");
    let blocks = match fields.required("blocks", report) {
        Some(Value::Array(items)) if items.is_empty() => {
            report.add(&blocks_path, "must contain at least one block");
            None
        }
        Some(Value::Array(items)) => {
            let before = report.len();
            let blocks: Vec<Option<Block>> = items
                .iter()
                .enumerate()
                .map(|(i, item)| check_block(item, blocks_path.index(i), report))
                .collect();
            if let Some(Some(first)) = blocks.first() {
                if !matches!(first.content, BlockContent::FormTitle(_)) {
                    report.add(
                        &blocks_path.index(0).key("type"),
                        "the first block must be FORM_TITLE",
                    );
                }
            }
            let blocks: Option<Vec<Block>> = blocks.into_iter().collect();
            if let Some(blocks) = &blocks {
                if report.len() == before {
                    check_option_groups(blocks, &blocks_path, report);
                }
            }
            blocks
        }
        Some(_) => {
            report.add(&blocks_path, "expected an array");
            None
        }
        None => None,
    };

    fields.deny_unknown(report);

    Some(FormRequest {
        status: status?,
        blocks: blocks?,
    })
}

fn check_block(value: &Value, path: Path, report: &mut Report) -> Option<Block> {
    let mut fields = Fields::of(value, path.clone(), report)?;
    let uuid = fields.uuid("uuid", report);
    let block_type = fields.required_string("type", report);
    let group_uuid = fields.uuid("groupUuid", report);
    let group_type = fields.required_string("groupType", report);
    let payload = fields.required("payload", report);
    fields.deny_unknown(report);

    let block_type = block_type?;
    let payload_path = path.key("payload");
    let content = match (block_type.as_str(), payload) {
        (_, None) => None,
        ("FORM_TITLE", Some(payload)) => {
            check_html(payload, payload_path, true, report).map(BlockContent::FormTitle)
        }
        ("TITLE", Some(payload)) => {
            check_html(payload, payload_path, true, report).map(BlockContent::Title)
        }
        ("TEXT", Some(payload)) => {
            check_html(payload, payload_path, false, report).map(BlockContent::Text)
        }
        ("LABEL", Some(payload)) => {
            check_html(payload, payload_path, false, report).map(BlockContent::Label)
        }
        ("INPUT_TEXT", Some(payload)) => {
            check_input(payload, payload_path, report).map(BlockContent::InputText)
        }
        ("TEXTAREA", Some(payload)) => {
            check_input(payload, payload_path, report).map(BlockContent::Textarea)
        }
        ("INPUT_EMAIL", Some(payload)) => {
            check_input(payload, payload_path, report).map(BlockContent::InputEmail)
        }
        ("CHECKBOX", Some(payload)) => {
            check_option(payload, payload_path, false, report).map(BlockContent::Checkbox)
        }
        ("MULTIPLE_CHOICE_OPTION", Some(payload)) => {
            check_option(payload, payload_path, true, report)
                .map(BlockContent::MultipleChoiceOption)
        }
        (other, Some(_)) => {
            report.add(&path.key("type"), format!("unknown block type `{other}`"));
            None
        }
    };

    Some(Block {
        uuid: uuid?,
        group_uuid: group_uuid?,
        group_type: group_type?,
        content: content?,
    })
}

/// Rich-text payloads are pass-through: keys we don't know are kept.
fn check_html(
    value: &Value,
    path: Path,
    non_empty: bool,
    report: &mut Report,
) -> Option<HtmlPayload> {
    let mut fields = Fields::of(value, path, report)?;
    let html = if non_empty {
        fields.non_empty_string("html", report)
    } else {
        fields.required_string("html", report)
    };
    let extra = fields.into_rest();
    Some(HtmlPayload { html: html?, extra })
}

fn check_input(value: &Value, path: Path, report: &mut Report) -> Option<InputPayload> {
    let before = report.len();
    let mut fields = Fields::of(value, path, report)?;

    let payload = InputPayload {
        is_required: fields.boolean("isRequired", report).unwrap_or(false),
        placeholder: fields.string("placeholder", report),
        has_default_answer: fields.boolean("hasDefaultAnswer", report),
        default_answer: fields.string("defaultAnswer", report),
        has_min_characters: fields.boolean("hasMinCharacters", report),
        min_characters: fields.count("minCharacters", report),
        has_max_characters: fields.boolean("hasMaxCharacters", report),
        max_characters: fields.count("maxCharacters", report),
    };

    fields.implied(
        ("hasDefaultAnswer", payload.has_default_answer),
        ("defaultAnswer", payload.default_answer.is_some()),
        report,
    );
    fields.implied(
        ("hasMinCharacters", payload.has_min_characters),
        ("minCharacters", payload.min_characters.is_some()),
        report,
    );
    fields.implied(
        ("hasMaxCharacters", payload.has_max_characters),
        ("maxCharacters", payload.max_characters.is_some()),
        report,
    );
    fields.ordered(
        ("minCharacters", payload.min_characters),
        ("maxCharacters", payload.max_characters),
        report,
    );
    fields.deny_unknown(report);

    (report.len() == before).then_some(payload)
}

fn check_option(
    value: &Value,
    path: Path,
    multiple_choice: bool,
    report: &mut Report,
) -> Option<OptionPayload> {
    let before = report.len();
    let mut fields = Fields::of(value, path.clone(), report)?;

    let index = fields.required_count("index", report);
    let is_first = fields.required_bool("isFirst", report);
    let is_last = fields.required_bool("isLast", report);
    let text = fields.non_empty_string("text", report);
    let is_required = fields.boolean("isRequired", report).unwrap_or(false);
    // Checkboxes have no notion of single selection, so the key is unrecognized there.
    let allow_multiple = if multiple_choice {
        fields.boolean("allowMultiple", report)
    } else {
        None
    };
    let has_min_choices = fields.boolean("hasMinChoices", report);
    let min_choices = fields.count("minChoices", report);
    let has_max_choices = fields.boolean("hasMaxChoices", report);
    let max_choices = fields.count("maxChoices", report);

    if let (Some(index), Some(is_first)) = (index, is_first) {
        if is_first != (index == 0) {
            report.add(
                &path.key("isFirst"),
                "must be true exactly when index is 0",
            );
        }
    }

    fields.implied(
        ("hasMinChoices", has_min_choices),
        ("minChoices", min_choices.is_some()),
        report,
    );
    fields.implied(
        ("hasMaxChoices", has_max_choices),
        ("maxChoices", max_choices.is_some()),
        report,
    );
    for (key, bound) in [("minChoices", min_choices), ("maxChoices", max_choices)] {
        if bound == Some(0) {
            report.add(&path.key(key), "must be at least 1");
        }
    }
    fields.ordered(("minChoices", min_choices), ("maxChoices", max_choices), report);

    let has_bounds = has_min_choices == Some(true)
        || has_max_choices == Some(true)
        || min_choices.is_some()
        || max_choices.is_some();
    if multiple_choice && has_bounds && allow_multiple != Some(true) {
        report.add(
            &path.key("allowMultiple"),
            "must be set when choice bounds are given",
        );
    }

    fields.deny_unknown(report);

    if report.len() != before {
        return None;
    }
    Some(OptionPayload {
        index: index?,
        is_first: is_first?,
        is_last: is_last?,
        text: text?,
        is_required,
        allow_multiple,
        has_min_choices,
        min_choices,
        has_max_choices,
        max_choices,
    })
}

/// Checks that span the option blocks of one group: contiguity, positions
/// and choice bounds against the number of options.
fn check_option_groups(blocks: &[Block], path: &Path, report: &mut Report) {
    let mut finished = HashSet::new();
    let mut start = 0;
    while start < blocks.len() {
        let group = blocks[start].group_uuid;
        let mut end = start + 1;
        while end < blocks.len() && blocks[end].group_uuid == group {
            end += 1;
        }

        let run = &blocks[start..end];
        if run.iter().any(|block| block.content.option().is_some()) {
            if !finished.insert(group) {
                report.add(
                    &path.index(start).key("groupUuid"),
                    "options of a group must be contiguous",
                );
            }
            check_option_run(run, start, path, report);
        }
        start = end;
    }
}

fn check_option_run(run: &[Block], offset: usize, path: &Path, report: &mut Report) {
    let block_type = run[0].block_type();
    let count = run.len();
    for (position, block) in run.iter().enumerate() {
        let block_path = path.index(offset + position);
        if block.block_type() != block_type {
            report.add(
                &block_path.key("type"),
                format!("all options of a group must be {block_type}"),
            );
            continue;
        }
        let Some(option) = block.content.option() else {
            continue;
        };
        let payload_path = block_path.key("payload");
        if option.index as usize != position {
            report.add(
                &payload_path.key("index"),
                format!("expected index {position}"),
            );
        }
        if option.is_last != (position == count - 1) {
            report.add(
                &payload_path.key("isLast"),
                "must be true only on the last option of its group",
            );
        }
        for (key, bound) in [("minChoices", option.min_choices), ("maxChoices", option.max_choices)] {
            if let Some(bound) = bound {
                if bound as usize > count {
                    report.add(
                        &payload_path.key(key),
                        format!("must not exceed the number of options ({count})"),
                    );
                }
            }
        }
    }
}
