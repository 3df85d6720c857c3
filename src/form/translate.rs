use uuid::Uuid;

use super::block::{Block, BlockContent, HtmlPayload, InputPayload, OptionPayload};
use super::field::{FieldType, FormField};

/// Source of block and group identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> Uuid;
}

/// Random v4 UUIDs, used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

impl<F> IdGenerator for F
where
    F: FnMut() -> Uuid,
{
    fn next_id(&mut self) -> Uuid {
        self()
    }
}

const FORM_TITLE_GROUP: &str = "FORM_TITLE";
const QUESTION_GROUP: &str = "QUESTION";
const CHECKBOX_GROUP: &str = "CHECKBOXES";
const MULTIPLE_CHOICE_GROUP: &str = "MULTIPLE_CHOICE";

/// Translate an authored field list into the form host's block format.
///
/// The first block is always the form title, and blocks follow the order of
/// `fields` exactly. Identifiers come from `ids`; everything else is a pure
/// function of the input.
pub fn translate(form_title: &str, fields: &[FormField], ids: &mut impl IdGenerator) -> Vec<Block> {
    let mut writer = BlockWriter {
        ids,
        blocks: Vec::with_capacity(fields.len() + 1),
    };

    writer.push_alone(
        FORM_TITLE_GROUP,
        BlockContent::FormTitle(HtmlPayload::new(form_title)),
    );

    for field in fields {
        writer.write_field(field);
    }

    writer.blocks
}

struct BlockWriter<'g, G> {
    ids: &'g mut G,
    blocks: Vec<Block>,
}

impl<'g, G> BlockWriter<'g, G>
where
    G: IdGenerator,
{
    /// Push a block that sits in a group of its own.
    fn push_alone(&mut self, group_type: &str, content: BlockContent) {
        let uuid = self.ids.next_id();
        let group_uuid = self.ids.next_id();
        self.push(uuid, group_uuid, group_type, content);
    }

    fn push(&mut self, uuid: Uuid, group_uuid: Uuid, group_type: &str, content: BlockContent) {
        self.blocks.push(Block {
            uuid,
            group_uuid,
            group_type: group_type.to_string(),
            content,
        });
    }

    fn write_field(&mut self, field: &FormField) {
        let group_type = field.group_type.as_deref();
        match &field.field_type {
            FieldType::Text => self.push_alone(
                group_type.unwrap_or("TEXT"),
                BlockContent::Text(HtmlPayload::new(&field.label)),
            ),
            FieldType::Label => self.push_alone(
                group_type.unwrap_or("LABEL"),
                BlockContent::Label(HtmlPayload::new(&field.label)),
            ),
            FieldType::Other(name) => self.push_alone(
                group_type.unwrap_or(name),
                BlockContent::Unrecognized {
                    block_type: name.clone(),
                    payload: HtmlPayload::new(&field.label),
                },
            ),
            FieldType::InputText => self.write_input(field, BlockContent::InputText),
            FieldType::Textarea => self.write_input(field, BlockContent::Textarea),
            FieldType::InputEmail => self.write_input(field, BlockContent::InputEmail),
            FieldType::Checkbox => self.write_checkboxes(field),
            FieldType::MultipleChoiceOption => self.write_multiple_choice(field),
        }
    }

    /// A title block followed by the control itself, each in its own group.
    fn write_input(&mut self, field: &FormField, control: fn(InputPayload) -> BlockContent) {
        self.push_alone(
            QUESTION_GROUP,
            BlockContent::Title(HtmlPayload::new(&field.label)),
        );
        let payload = InputPayload {
            is_required: field.required,
            placeholder: field.placeholder.clone(),
            ..Default::default()
        };
        self.push_alone(
            field
                .group_type
                .as_deref()
                .unwrap_or(field.field_type.as_str()),
            control(payload),
        );
    }

    fn write_checkboxes(&mut self, field: &FormField) {
        let group_type = field.group_type.as_deref().unwrap_or(CHECKBOX_GROUP);
        if field.options.is_empty() {
            let mut payload = OptionPayload {
                index: 0,
                is_first: true,
                is_last: true,
                text: field.label.clone(),
                is_required: field.required,
                ..Default::default()
            };
            copy_bounds(&mut payload, field);
            self.push_alone(group_type, BlockContent::Checkbox(payload));
            return;
        }

        if let Some(question) = &field.question_text {
            self.push_alone(
                QUESTION_GROUP,
                BlockContent::Title(HtmlPayload::new(question)),
            );
        }
        self.write_options(field, group_type, true, BlockContent::Checkbox);
    }

    fn write_multiple_choice(&mut self, field: &FormField) {
        let group_type = field.group_type.as_deref().unwrap_or(MULTIPLE_CHOICE_GROUP);
        self.push_alone(
            QUESTION_GROUP,
            BlockContent::Title(HtmlPayload::new(&field.label)),
        );
        if field.options.is_empty() {
            // Nothing to choose from: a lone option without text, which validation rejects.
            let payload = OptionPayload {
                index: 0,
                is_first: true,
                is_last: true,
                is_required: field.required,
                ..Default::default()
            };
            self.push_alone(group_type, BlockContent::MultipleChoiceOption(payload));
            return;
        }
        self.write_options(
            field,
            group_type,
            field.allow_multiple,
            BlockContent::MultipleChoiceOption,
        );
    }

    /// One block per option, all sharing a single group.
    fn write_options(
        &mut self,
        field: &FormField,
        group_type: &str,
        with_bounds: bool,
        option: fn(OptionPayload) -> BlockContent,
    ) {
        let group_uuid = self.ids.next_id();
        let last = field.options.len() - 1;
        let allow_multiple = matches!(field.field_type, FieldType::MultipleChoiceOption)
            && field.allow_multiple;

        for (index, text) in field.options.iter().enumerate() {
            let mut payload = OptionPayload {
                // Option lists come from a form builder UI; they never approach u32::MAX.
                index: index as u32,
                is_first: index == 0,
                is_last: index == last,
                text: text.clone(),
                is_required: field.required,
                allow_multiple: allow_multiple.then_some(true),
                ..Default::default()
            };
            if with_bounds {
                copy_bounds(&mut payload, field);
            }
            let uuid = self.ids.next_id();
            self.push(uuid, group_uuid, group_type, option(payload));
        }
    }
}

/// Copy the field's choice bounds onto an option payload.
fn copy_bounds(payload: &mut OptionPayload, field: &FormField) {
    if let Some(min) = field.min_choices {
        payload.has_min_choices = Some(true);
        payload.min_choices = Some(min);
    }
    if let Some(max) = field.max_choices {
        payload.has_max_choices = Some(true);
        payload.max_choices = Some(max);
    }
}

/// Deterministic identifiers for tests: 1, 2, 3, ...
#[cfg(test)]
#[derive(Debug, Default)]
pub struct SequentialIds(u128);

#[cfg(test)]
impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> Uuid {
        self.0 += 1;
        Uuid::from_u128(self.0)
    }
}
