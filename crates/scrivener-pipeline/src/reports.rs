//! Quality-check report builders.
//!
//! The plagiarism and AI-likeness stages produce locally built reports with
//! fixed percentages until the external detection services are wired in.
//! They are full pipeline stages regardless: budgeted, recorded, and gated
//! on approval like every other artifact.

const PLACEHOLDER_SIMILARITY: f64 = 5.2;
const PLACEHOLDER_AI_SHARE: f64 = 12.5;

/// Build the plagiarism report for a finished document.
pub fn plagiarism_report(content_text: &str) -> (String, f64) {
    let words = content_text.split_whitespace().count();
    let report = format!(
        "Plagiarism Report\n\n\
         Placeholder result pending external detection service integration.\n\
         Total Word Count: {words}\n\
         Similarity Percentage: {PLACEHOLDER_SIMILARITY}%\n\
         Status: PASSED\n"
    );
    (report, PLACEHOLDER_SIMILARITY)
}

/// Build the AI-likeness report for a finished document.
pub fn ai_likeness_report(content_text: &str) -> (String, f64) {
    let words = content_text.split_whitespace().count();
    let report = format!(
        "AI Detection Report\n\n\
         Placeholder result pending external detection service integration.\n\
         Total Word Count: {words}\n\
         AI-Generated Content: {PLACEHOLDER_AI_SHARE}%\n\
         Status: ACCEPTABLE\n"
    );
    (report, PLACEHOLDER_AI_SHARE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plagiarism_report_counts_words() {
        let (report, similarity) = plagiarism_report("one two three four");
        assert!(report.contains("Total Word Count: 4"));
        assert!(report.contains("Similarity Percentage: 5.2%"));
        assert!(report.contains("Status: PASSED"));
        assert_eq!(similarity, 5.2);
    }

    #[test]
    fn ai_report_counts_words() {
        let (report, share) = ai_likeness_report("alpha beta");
        assert!(report.contains("Total Word Count: 2"));
        assert!(report.contains("AI-Generated Content: 12.5%"));
        assert!(report.contains("Status: ACCEPTABLE"));
        assert_eq!(share, 12.5);
    }
}
