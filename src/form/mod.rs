//! Application forms: authored fields, the form host's block format, the
//! translation between the two, and local validation of the result.

pub mod block;
pub mod field;
pub mod schema;
pub mod translate;

pub use block::{Block, BlockContent, FormRequest, FormStatus};
pub use field::{FieldType, FormField};
pub use schema::{check_fields, validate, ValidationErrors, Violation};
pub use translate::{translate, IdGenerator, RandomIds};

/// Check `fields`, translate them and check the result against the block
/// schema.
///
/// This is everything that can be done about a form without side effects.
pub fn prepare(
    form_title: &str,
    fields: &[FormField],
    status: FormStatus,
    ids: &mut impl IdGenerator,
) -> Result<FormRequest, ValidationErrors> {
    check_fields(fields)?;
    let candidate = FormRequest {
        status,
        blocks: translate(form_title, fields, ids),
    };
    validate(&candidate.to_candidate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::translate::SequentialIds;

    #[test]
    fn prepare_keeps_generated_ids() {
        let request = prepare(
            "Software intern",
            &[FormField::example_name()],
            FormStatus::Draft,
            &mut SequentialIds::default(),
        )
        .unwrap();

        assert_eq!(request.status, FormStatus::Draft);
        let types: Vec<_> = request.blocks.iter().map(Block::block_type).collect();
        assert_eq!(types, ["FORM_TITLE", "TITLE", "INPUT_TEXT"]);
        let uuids: Vec<_> = request.blocks.iter().map(|b| b.uuid.as_u128()).collect();
        assert_eq!(uuids, [1, 3, 5]);
    }

    #[test]
    fn prepare_reports_first_violation() {
        let errors = prepare(
            "Software intern",
            &[FormField::new("c", FieldType::Checkbox, "")],
            FormStatus::Published,
            &mut RandomIds,
        )
        .unwrap_err();

        assert_eq!(errors.primary().path, "blocks.1.payload.text");
    }

    #[test]
    fn prepare_checks_fields_first() {
        let year = FormField {
            options: Vec::new(),
            ..FormField::example_year()
        };
        let errors = prepare(
            "Software intern",
            &[FormField::example_name(), year],
            FormStatus::Published,
            &mut RandomIds,
        )
        .unwrap_err();

        assert_eq!(errors.primary().path, "fields.1.options");
        assert_eq!(errors.primary().message, "must have at least one option");
    }
}
