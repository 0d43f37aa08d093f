//! Parser for the summary stage's structured output.
//!
//! The summary agent reports its findings as semicolon-separated records of
//! the form `Label - value` (some service outputs use `Label: value`; both
//! separators are accepted). Recognized labels are Topic, Word Count,
//! Reference/Referencing Style, Writing/Academic Style, and Job Summary;
//! everything after the Job Summary label is folded into the summary text.

// ---------------------------------------------------------------------------
// SummaryFields
// ---------------------------------------------------------------------------

/// Structured fields recovered from the summary stage output.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryFields {
    pub topic: String,
    pub word_count: u32,
    pub reference_style: String,
    pub writing_style: String,
    pub summary_text: String,
}

impl Default for SummaryFields {
    fn default() -> Self {
        Self {
            topic: "Not specified".to_string(),
            word_count: 1500,
            reference_style: "Harvard".to_string(),
            writing_style: "Report".to_string(),
            summary_text: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Split a record into label and value at the first ` - ` or `:` separator.
fn split_record(segment: &str) -> Option<(&str, &str)> {
    if let Some((label, value)) = segment.split_once(" - ") {
        return Some((label.trim(), value.trim()));
    }
    if let Some((label, value)) = segment.split_once(':') {
        return Some((label.trim(), value.trim()));
    }
    None
}

fn digits_of(value: &str) -> Option<u32> {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Convert the summary agent's output into structured fields.
///
/// Unrecognized labels are ignored. A missing field keeps its default
/// (word count 1500, Harvard, Report). When no Job Summary label is present
/// the whole text becomes the summary.
pub fn parse_summary_fields(text: &str) -> SummaryFields {
    let mut fields = SummaryFields {
        summary_text: text.trim().to_string(),
        ..SummaryFields::default()
    };

    let mut summary_started = false;
    let mut summary_tail: Vec<String> = Vec::new();

    for segment in text.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let Some((label, value)) = split_record(segment) else {
            if summary_started {
                summary_tail.push(segment.to_string());
            }
            continue;
        };

        match label.to_lowercase().as_str() {
            "topic" => {
                if !value.is_empty() {
                    fields.topic = value.to_string();
                }
            }
            "word count" => {
                if let Some(n) = digits_of(value) {
                    fields.word_count = n;
                }
            }
            "reference style" | "referencing style" => {
                if !value.is_empty() {
                    fields.reference_style = value.to_string();
                }
            }
            "writing style" | "academic style" => {
                if !value.is_empty() {
                    fields.writing_style = value.to_string();
                }
            }
            "job summary" => {
                fields.summary_text = value.to_string();
                summary_started = true;
            }
            _ => {
                if summary_started {
                    summary_tail.push(segment.to_string());
                }
            }
        }
    }

    if summary_started && !summary_tail.is_empty() {
        fields.summary_text = format!("{}; {}", fields.summary_text, summary_tail.join("; "));
    }

    fields
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_OUTPUT: &str = "Topic - Retail customer experience; \
        Word Count - 2500; \
        Referencing Style - APA; \
        Academic Style - Essay; \
        Job Summary - Discuss how retail customer experience shapes loyalty";

    #[test]
    fn parses_topic() {
        let fields = parse_summary_fields(FULL_OUTPUT);
        assert_eq!(fields.topic, "Retail customer experience");
    }

    #[test]
    fn parses_word_count() {
        let fields = parse_summary_fields(FULL_OUTPUT);
        assert_eq!(fields.word_count, 2500);
    }

    #[test]
    fn parses_reference_style() {
        let fields = parse_summary_fields(FULL_OUTPUT);
        assert_eq!(fields.reference_style, "APA");
    }

    #[test]
    fn parses_writing_style() {
        let fields = parse_summary_fields(FULL_OUTPUT);
        assert_eq!(fields.writing_style, "Essay");
    }

    #[test]
    fn parses_job_summary() {
        let fields = parse_summary_fields(FULL_OUTPUT);
        assert_eq!(
            fields.summary_text,
            "Discuss how retail customer experience shapes loyalty"
        );
    }

    #[test]
    fn colon_separator_accepted() {
        let fields = parse_summary_fields("Topic: Supply chains; Word Count: 1800");
        assert_eq!(fields.topic, "Supply chains");
        assert_eq!(fields.word_count, 1800);
    }

    #[test]
    fn word_count_strips_non_digits() {
        let fields = parse_summary_fields("Word Count - approx. 2,000 words");
        assert_eq!(fields.word_count, 2000);
    }

    #[test]
    fn defaults_when_fields_missing() {
        let fields = parse_summary_fields("Topic - Something");
        assert_eq!(fields.word_count, 1500);
        assert_eq!(fields.reference_style, "Harvard");
        assert_eq!(fields.writing_style, "Report");
    }

    #[test]
    fn whole_text_is_summary_when_unlabeled() {
        let fields = parse_summary_fields("Just a plain paragraph of output.");
        assert_eq!(fields.summary_text, "Just a plain paragraph of output.");
        assert_eq!(fields.topic, "Not specified");
    }

    #[test]
    fn summary_continues_across_semicolons() {
        let fields = parse_summary_fields(
            "Topic - X; Job Summary - First part; second part; third part",
        );
        assert_eq!(
            fields.summary_text,
            "First part; second part; third part"
        );
    }

    #[test]
    fn empty_values_keep_defaults() {
        let fields = parse_summary_fields("Topic - ; Reference Style - ");
        assert_eq!(fields.topic, "Not specified");
        assert_eq!(fields.reference_style, "Harvard");
    }

    #[test]
    fn unknown_labels_do_not_clobber_fields() {
        let fields = parse_summary_fields("Marking Criteria - rubric; Topic - Y");
        assert_eq!(fields.topic, "Y");
        assert_eq!(fields.word_count, 1500);
    }
}
