//! Stage instruction texts and payload builders.
//!
//! Each generation stage sends a fixed instruction string plus a payload
//! built from the previous stage's approved output. The instruction texts
//! pin down the structured output each stage must produce — the summary's
//! labeled records, the outline's heading grammar, the reference/citation
//! list split — which the rest of the pipeline parses.

pub const DEFAULT_JOB_INSTRUCTIONS: &str = "The instructions for the writing task are in the \
attached extracted file contents. Infer all possible details about the assignment.";

pub const SUMMARY_INSTRUCTIONS: &str = "You are an assistant that turns writing-task \
instructions into a structured job summary, not the finished document. Read the instructions \
and any extracted attachment text, identify what has to be written, and respond as \
semicolon-separated records of the form `Label - value` using exactly these labels: Topic, \
Word Count, Referencing Style, Academic Style, Job Summary. Use a plain number for Word Count; \
default it to 1500 and Referencing Style to Harvard when nothing is specified. The Job Summary \
must be a concise brief of 150-250 words that another writer could follow directly. Do not add \
other sections and do not write any of the assignment itself.";

pub const STRUCTURE_INSTRUCTIONS: &str = "You are an assistant that designs document outlines. \
From the job summary you receive, produce a numbered outline where every heading sits on its \
own line in the form `<number>. <Title> - <count> words`, using up to three numbering levels \
(1., 1.1., 1.1.1.). Subsection counts must sum exactly to their parent and top-level counts \
must sum to the total word count. Allocate roughly 10% of the total to the introduction and \
10% to the conclusion. Cover Page, AI Disclaimer, and References sections stay outside the \
total. Begin with the document title followed by a `Total Word Count: <count>` line. Plain \
text only: no bold, no markdown. Output only the outline.";

pub const CONTENT_INSTRUCTIONS: &str = "You are an assistant that writes documents from an \
outline. Preserve the given headings, numbering, and order exactly, and write cohesive formal \
prose under each one. Match every section and subsection word target as closely as possible, \
staying within 2% of each, and keep the overall length within 10% of the stated total. Use \
plain-text headings only - no markdown markers (#) and no bold (**). Do not include any \
citations, reference list, or bibliography; that is handled separately. Output only the \
document.";

pub const REFERENCES_INSTRUCTIONS: &str = "You are an assistant that compiles reference lists. \
For the content you receive, produce real, verifiable sources published from 2022 onward, \
about 7 references for every 1000 words, all directly relevant to the subject matter. First \
output a `Reference List` section formatted strictly in the requested referencing style and \
ordered alphabetically by first author surname. Then output a `Citation List` section giving \
the matching in-text citation for every entry above. Output only these two lists.";

pub const MERGE_INSTRUCTIONS: &str = "You are an assistant that finalizes documents. Insert \
in-text citations from the provided citation list into the content at suitable points without \
rewriting, shortening, or reordering any existing text, then append the full reference list at \
the end. Do not cite inside introduction or conclusion sections. Every reference must be cited \
at least once and no new references may be invented. Output the complete cited document and \
nothing else.";

// ---------------------------------------------------------------------------
// Payload builders
// ---------------------------------------------------------------------------

/// Payload handed to the structure stage, built from the approved summary.
pub fn structure_payload(
    topic: &str,
    word_count: u32,
    reference_style: &str,
    writing_style: &str,
    summary_text: &str,
) -> String {
    format!(
        "Topic: {topic}; Word Count: {word_count}; Reference Style: {reference_style}; \
         Writing Style: {writing_style}; Job Summary: {summary_text}"
    )
}

/// Payload handed to the references stage.
pub fn references_payload(content_text: &str, reference_style: &str, total_words: u32) -> String {
    format!(
        "Reference style: {reference_style}\nApproximate total word count: {total_words}\n\n\
         Content:\n{content_text}"
    )
}

/// Payload handed to the merge stage.
pub fn merge_payload(
    content_text: &str,
    reference_list: &str,
    citation_list: &str,
    reference_style: &str,
) -> String {
    format!(
        "Reference style: {reference_style}\n\n\
         === CONTENT (NO CITATIONS) ===\n{content_text}\n\n\
         === REFERENCE LIST ===\n{reference_list}\n\n\
         === CITATION LIST ===\n{citation_list}\n"
    )
}

/// Corrective instruction appended for the draft stage's single retry.
pub fn content_retry_reminder(target_total: Option<u32>) -> String {
    let total = target_total
        .map(|t| t.to_string())
        .unwrap_or_else(|| "the stated total".to_string());
    format!(
        "Regenerate with plain text headings (no # or **). Match every section and subsection \
         word target exactly and keep the total around {total} words."
    )
}

// ---------------------------------------------------------------------------
// Response splitting
// ---------------------------------------------------------------------------

/// Split the references stage output into reference list and citation list.
pub fn split_references_block(raw: &str) -> (String, String) {
    match raw.split_once("Citation List") {
        Some((head, tail)) => (
            head.trim().to_string(),
            format!("Citation List{}", tail.trim_end()),
        ),
        None => (raw.trim().to_string(), String::new()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structure_payload_carries_all_fields() {
        let payload = structure_payload("Topic X", 2500, "APA", "Essay", "Write about X.");
        assert!(payload.contains("Topic: Topic X"));
        assert!(payload.contains("Word Count: 2500"));
        assert!(payload.contains("Reference Style: APA"));
        assert!(payload.contains("Writing Style: Essay"));
        assert!(payload.contains("Job Summary: Write about X."));
    }

    #[test]
    fn references_payload_shape() {
        let payload = references_payload("The content.", "Harvard", 1500);
        assert!(payload.starts_with("Reference style: Harvard\n"));
        assert!(payload.contains("Approximate total word count: 1500"));
        assert!(payload.ends_with("Content:\nThe content."));
    }

    #[test]
    fn merge_payload_sections_in_order() {
        let payload = merge_payload("content", "refs", "cites", "IEEE");
        let content_pos = payload.find("=== CONTENT (NO CITATIONS) ===").unwrap();
        let refs_pos = payload.find("=== REFERENCE LIST ===").unwrap();
        let cites_pos = payload.find("=== CITATION LIST ===").unwrap();
        assert!(content_pos < refs_pos && refs_pos < cites_pos);
    }

    #[test]
    fn retry_reminder_names_the_target() {
        assert!(content_retry_reminder(Some(2000)).contains("around 2000 words"));
        assert!(content_retry_reminder(None).contains("around the stated total words"));
    }

    #[test]
    fn split_references_separates_citation_list() {
        let raw = "Reference List\nSmith, J. (2023).\n\nCitation List\n(Smith, 2023)";
        let (refs, cites) = split_references_block(raw);
        assert_eq!(refs, "Reference List\nSmith, J. (2023).");
        assert_eq!(cites, "Citation List\n(Smith, 2023)");
    }

    #[test]
    fn split_references_without_citation_list() {
        let raw = "Reference List\nSmith, J. (2023).";
        let (refs, cites) = split_references_block(raw);
        assert_eq!(refs, raw);
        assert!(cites.is_empty());
    }
}
