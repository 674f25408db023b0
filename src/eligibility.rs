//! Question/answer layout eligibility

use crate::types::{FieldDescriptor, SemanticType, ViewFieldOrder};
use tracing::debug;

/// Display title the question field must have
pub const QUESTION_TITLE: &str = "Title";

/// Display title the answer field must have
pub const ANSWER_TITLE: &str = "Answer";

/// Whether a view qualifies for question/answer layout
///
/// True only for exactly two fields: one single-line or computed field
/// titled `Title` and one multi-line text field titled `Answer`, in either
/// order. Titles are matched exactly.
pub fn is_qna_eligible(view_fields: &ViewFieldOrder, descriptors: &[FieldDescriptor]) -> bool {
    let eligible = view_fields.len() == 2
        && descriptors.len() == 2
        && descriptors.iter().any(is_question)
        && descriptors.iter().any(is_answer);

    debug!(fields = view_fields.len(), eligible, "checked question/answer eligibility");
    eligible
}

fn is_question(field: &FieldDescriptor) -> bool {
    matches!(
        field.semantic_type(),
        SemanticType::PlainText | SemanticType::Computed
    ) && field.display_title == QUESTION_TITLE
}

fn is_answer(field: &FieldDescriptor) -> bool {
    field.semantic_type() == SemanticType::MultiLineText && field.display_title == ANSWER_TITLE
}
