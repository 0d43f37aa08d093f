//! Draft validation against the declared outline targets.
//!
//! The content stage must respect the approved outline: every section within
//! ±2% of its declared word count, the whole draft within ±10% of the grand
//! total, and plain-text headings only (no markdown markers). A violation
//! earns the draft exactly one corrective regeneration; a second miss is
//! accepted as best effort.

use regex::Regex;

// ---------------------------------------------------------------------------
// Text cleanup
// ---------------------------------------------------------------------------

/// Remove leading markdown heading markers and bold markers.
pub fn strip_markdown(text: &str) -> String {
    let heading_re = Regex::new(r"^\s*#+\s*").unwrap();
    text.lines()
        .map(|line| heading_re.replace(line, "").replace("**", ""))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop a trailing References block the service added despite instructions.
pub fn strip_trailing_references(text: &str) -> String {
    let re = Regex::new(r"(?i)\n[ \t]*references[ \t]*\n").unwrap();
    let result = re
        .splitn(text, 2)
        .next()
        .unwrap_or(text)
        .trim()
        .to_string();
    result
}

/// Word count as the number of `\w+` tokens.
pub fn count_words(text: &str) -> u32 {
    Regex::new(r"\w+").unwrap().find_iter(text).count() as u32
}

// ---------------------------------------------------------------------------
// Outline targets
// ---------------------------------------------------------------------------

/// One declared section target parsed from the outline.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionTarget {
    pub number: String,
    pub title: String,
    pub words: u32,
    pub depth: usize,
}

const IGNORE_KEYS: &[&str] = &[
    "cover",
    "cover page",
    "ai disclaimer",
    "disclaimer",
    "references",
    "reference",
    "bibliography",
];

fn is_ignored(line: &str) -> bool {
    let low = line.to_lowercase();
    IGNORE_KEYS.iter().any(|key| low.contains(key))
}

fn heading_re() -> Regex {
    Regex::new(r"^\s*(\d{1,4}(?:\.\d{1,4}){0,2})\.?\s+(.*)$").unwrap()
}

/// Parse the numbered, non-ignored section targets out of an outline.
pub fn parse_section_targets(structure_text: &str) -> Vec<SectionTarget> {
    let heading = heading_re();
    let count = Regex::new(r"(?i)^(.*?)\s*[-–]\s*(\d{1,6})\s*words?\b").unwrap();

    structure_text
        .lines()
        .filter(|line| !is_ignored(line) && !line.to_lowercase().contains("total word count"))
        .filter_map(|line| {
            let caps = heading.captures(line)?;
            let number = caps[1].to_string();
            let rest = caps[2].to_string();
            let count_caps = count.captures(&rest)?;
            Some(SectionTarget {
                depth: number.split('.').count(),
                number,
                title: count_caps[1].trim().to_string(),
                words: count_caps[2].parse().ok()?,
            })
        })
        .collect()
}

/// The declared grand total: the Total Word Count line when present,
/// otherwise the sum of the top-level section counts.
pub fn parse_total_target(structure_text: &str) -> Option<u32> {
    let total_re = Regex::new(r"(?i)total\s*word\s*count\s*[:\-]?\s*(\d{2,6})").unwrap();
    if let Some(caps) = total_re.captures(structure_text) {
        return caps[1].parse().ok();
    }

    let tops: Vec<u32> = parse_section_targets(structure_text)
        .into_iter()
        .filter(|t| t.depth == 1)
        .map(|t| t.words)
        .collect();
    if tops.is_empty() {
        None
    } else {
        Some(tops.iter().sum())
    }
}

// ---------------------------------------------------------------------------
// DraftReport
// ---------------------------------------------------------------------------

/// Result of measuring a draft against its outline.
#[derive(Debug, Clone)]
pub struct DraftReport {
    pub total_words: u32,
    pub total_target: Option<u32>,
    pub section_issues: Vec<String>,
    pub has_markdown_headings: bool,
}

impl DraftReport {
    /// Whether the draft total sits within ±10% of the declared grand total.
    pub fn total_in_tolerance(&self) -> bool {
        match self.total_target {
            Some(target) => {
                let total = self.total_words as f64;
                let target = target as f64;
                total >= 0.9 * target && total <= 1.1 * target
            }
            None => true,
        }
    }

    /// Whether the draft passes every check and needs no regeneration.
    pub fn within_tolerance(&self) -> bool {
        self.section_issues.is_empty() && self.total_in_tolerance() && !self.has_markdown_headings
    }
}

/// Measure a draft against the outline it was generated from.
///
/// A section's span runs from its heading to the next heading of equal or
/// shallower depth, so a parent's span includes its children — consistent
/// with parents being the sum of their children in the outline.
pub fn validate_draft(draft: &str, structure_text: &str) -> DraftReport {
    let targets = parse_section_targets(structure_text);
    let total_target = parse_total_target(structure_text);
    let total_words = count_words(draft);

    let heading = heading_re();
    let lines: Vec<&str> = draft.lines().collect();
    let draft_headings: Vec<(usize, String, usize)> = lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            let caps = heading.captures(line)?;
            let number = caps[1].to_string();
            let depth = number.split('.').count();
            Some((idx, number, depth))
        })
        .collect();

    let mut section_issues = Vec::new();
    for target in &targets {
        let Some(pos) = draft_headings.iter().position(|(_, n, _)| *n == target.number) else {
            section_issues.push(format!(
                "Section {} ({}) not found in draft",
                target.number, target.title
            ));
            continue;
        };
        let (start, _, depth) = &draft_headings[pos];
        let end = draft_headings[pos + 1..]
            .iter()
            .find(|(_, _, d)| d <= depth)
            .map(|(idx, _, _)| *idx)
            .unwrap_or(lines.len());
        let actual = count_words(&lines[*start..end].join("\n"));

        let allowed = target.words as f64 * 0.02;
        if (actual as f64 - target.words as f64).abs() > allowed {
            section_issues.push(format!(
                "Section {} ({}): {} words, target {} ±2%",
                target.number, target.title, actual, target.words
            ));
        }
    }

    DraftReport {
        total_words,
        total_target,
        section_issues,
        has_markdown_headings: draft.contains('#'),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
