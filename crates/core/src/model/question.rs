use serde::Serialize;
use thiserror::Error;

use crate::model::ShapeDescriptor;

/// Number of answer options presented per question.
pub const OPTION_COUNT: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("expected {OPTION_COUNT} options, got {len}")]
    WrongOptionCount { len: usize },

    #[error("duplicate option value: {value}")]
    DuplicateValue { value: String },

    #[error("answer index {index} is out of range")]
    AnswerIndexOutOfRange { index: usize },

    #[error("option at answer index does not match the answer value")]
    AnswerMismatch,
}

/// A single presentable answer choice.
///
/// `value` is the canonical comparison key; `label` is what the UI shows
/// (value plus unit suffix, or a formatted coordinate pair).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionOption {
    label: String,
    value: String,
}

impl QuestionOption {
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// One generated quiz round, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    prompt: String,
    explanation: String,
    options: Vec<QuestionOption>,
    answer_index: usize,
    answer_value: String,
    feedback_success: String,
    feedback_error: String,
    shape: ShapeDescriptor,
}

impl Question {
    /// Build a question, checking the option-set invariants.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` unless there are exactly [`OPTION_COUNT`]
    /// options with pairwise-distinct values and `options[answer_index]`
    /// carries `answer_value`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        prompt: impl Into<String>,
        explanation: impl Into<String>,
        options: Vec<QuestionOption>,
        answer_index: usize,
        answer_value: impl Into<String>,
        feedback_success: impl Into<String>,
        feedback_error: impl Into<String>,
        shape: ShapeDescriptor,
    ) -> Result<Self, QuestionError> {
        let answer_value = answer_value.into();

        if options.len() != OPTION_COUNT {
            return Err(QuestionError::WrongOptionCount { len: options.len() });
        }
        for (i, option) in options.iter().enumerate() {
            if options[..i].iter().any(|o| o.value == option.value) {
                return Err(QuestionError::DuplicateValue {
                    value: option.value.clone(),
                });
            }
        }
        let Some(answer) = options.get(answer_index) else {
            return Err(QuestionError::AnswerIndexOutOfRange {
                index: answer_index,
            });
        };
        if answer.value != answer_value {
            return Err(QuestionError::AnswerMismatch);
        }

        Ok(Self {
            prompt: prompt.into(),
            explanation: explanation.into(),
            options,
            answer_index,
            answer_value,
            feedback_success: feedback_success.into(),
            feedback_error: feedback_error.into(),
            shape,
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Options in presentation order (already shuffled).
    #[must_use]
    pub fn options(&self) -> &[QuestionOption] {
        &self.options
    }

    #[must_use]
    pub fn answer_index(&self) -> usize {
        self.answer_index
    }

    #[must_use]
    pub fn answer_value(&self) -> &str {
        &self.answer_value
    }

    #[must_use]
    pub fn feedback_success(&self) -> &str {
        &self.feedback_success
    }

    #[must_use]
    pub fn feedback_error(&self) -> &str {
        &self.feedback_error
    }

    #[must_use]
    pub fn shape(&self) -> &ShapeDescriptor {
        &self.shape
    }

    /// Whether `selected` is the canonical key of the correct option.
    #[must_use]
    pub fn is_correct(&self, selected: &str) -> bool {
        self.answer_value == selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(values: &[&str]) -> Vec<QuestionOption> {
        values
            .iter()
            .map(|v| QuestionOption::new(format!("{v} units"), *v))
            .collect()
    }

    fn build(options: Vec<QuestionOption>, answer_index: usize, answer_value: &str) -> Result<Question, QuestionError> {
        Question::new(
            "What is the perimeter?",
            "Perimeter = 2(w + h).",
            options,
            answer_index,
            answer_value,
            "Correct!",
            "Not quite.",
            ShapeDescriptor::Rectangle {
                width: 6,
                height: 4,
            },
        )
    }

    #[test]
    fn valid_question_passes_invariants() {
        let q = build(options(&["20", "18", "24", "22"]), 2, "24").unwrap();
        assert_eq!(q.options().len(), OPTION_COUNT);
        assert_eq!(q.options()[q.answer_index()].value(), q.answer_value());
        assert!(q.is_correct("24"));
        assert!(!q.is_correct("22"));
    }

    #[test]
    fn rejects_wrong_option_count() {
        let err = build(options(&["20", "18", "24"]), 2, "24").unwrap_err();
        assert!(matches!(err, QuestionError::WrongOptionCount { len: 3 }));
    }

    #[test]
    fn rejects_duplicate_values() {
        let err = build(options(&["20", "24", "24", "22"]), 1, "24").unwrap_err();
        assert!(matches!(err, QuestionError::DuplicateValue { .. }));
    }

    #[test]
    fn rejects_out_of_range_answer_index() {
        let err = build(options(&["20", "18", "24", "22"]), 4, "24").unwrap_err();
        assert!(matches!(err, QuestionError::AnswerIndexOutOfRange { index: 4 }));
    }

    #[test]
    fn rejects_answer_mismatch() {
        let err = build(options(&["20", "18", "24", "22"]), 0, "24").unwrap_err();
        assert!(matches!(err, QuestionError::AnswerMismatch));
    }
}
