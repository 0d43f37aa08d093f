//! Hint extraction from free-form instruction text.
//!
//! Instruction text and extracted attachment text frequently carry a word
//! count ("2,500 words", "a 4-page report") or a citation style ("Harvard
//! referencing"). These pure functions pull those hints out so the pipeline
//! can seed the target total and reference style before the first stage runs,
//! overriding whatever defaults the generation service would otherwise pick.

use regex::Regex;

/// Conversion rate used when a length is given in pages.
pub const WORDS_PER_PAGE: u32 = 275;

// ---------------------------------------------------------------------------
// Word count hints
// ---------------------------------------------------------------------------

/// Find a word-count hint in free text.
///
/// Tried in priority order: an explicit range ("2500-3000 words"), a single
/// count ("2500 words"), a labeled count ("word count: 2500", "wc: 2500",
/// "word limit of 2500"), then a page count converted at
/// [`WORDS_PER_PAGE`] words per page. Ranges are returned as `"low-high"`.
pub fn extract_word_count_hint(text: &str) -> Option<String> {
    // 2,500 -> 2500
    let text = Regex::new(r"(\d),(\d)")
        .unwrap()
        .replace_all(text, "${1}${2}")
        .into_owned();

    let patterns = [
        r"(?i)(\d{2,5})\s*(?:to|[-–—])\s*(\d{2,5})\s*words?\b",
        r"(?i)(\d{2,5})\s*words?\b",
        r"(?i)words?\s*[:\-]\s*(\d{2,5})",
        r"(?i)word\s*count\s*[:\-]?\s*(\d{2,5})",
        r"(?i)\bwc\s*[:\-]?\s*(\d{2,5})\b",
        r"(?i)word\s*limit\s*(?:of\s*)?[:\-]?\s*(\d{2,5})(?:\s*(?:to|[-–—])\s*(\d{2,5}))?",
    ];
    for pattern in patterns {
        let re = Regex::new(pattern).unwrap();
        if let Some(caps) = re.captures(&text) {
            if let (Some(low), Some(high)) = (caps.get(1), caps.get(2)) {
                return Some(format!("{}-{}", low.as_str(), high.as_str()));
            }
            if let Some(single) = caps.get(1) {
                return Some(single.as_str().to_string());
            }
        }
    }

    // Page hints, including hyphenated forms like "4-page".
    let page_re =
        Regex::new(r"(?i)(\d{1,3})(?:\s*(?:to|[-–—])\s*(\d{1,3}))?[\s\-]*pages?\b").unwrap();
    if let Some(caps) = page_re.captures(&text) {
        let low: u32 = caps[1].parse().ok()?;
        if let Some(high) = caps.get(2) {
            let high: u32 = high.as_str().parse().ok()?;
            return Some(format!("{}-{}", low * WORDS_PER_PAGE, high * WORDS_PER_PAGE));
        }
        return Some((low * WORDS_PER_PAGE).to_string());
    }
    None
}

/// The lower bound of a hint produced by [`extract_word_count_hint`].
pub fn hint_lower_bound(hint: &str) -> Option<u32> {
    hint.split('-').next()?.parse().ok()
}

// ---------------------------------------------------------------------------
// Reference style hints
// ---------------------------------------------------------------------------

/// Citation styles the pipeline recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceStyle {
    Apa,
    Mla,
    Harvard,
    Chicago,
    Ieee,
    Vancouver,
    Oscola,
    Turabian,
}

impl ReferenceStyle {
    /// The canonical label used in payloads and instruction text.
    pub fn as_str(self) -> &'static str {
        match self {
            ReferenceStyle::Apa => "APA",
            ReferenceStyle::Mla => "MLA",
            ReferenceStyle::Harvard => "Harvard",
            ReferenceStyle::Chicago => "Chicago",
            ReferenceStyle::Ieee => "IEEE",
            ReferenceStyle::Vancouver => "Vancouver",
            ReferenceStyle::Oscola => "OSCOLA",
            ReferenceStyle::Turabian => "Turabian",
        }
    }
}

impl std::fmt::Display for ReferenceStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const STYLE_VOCABULARY: &[(&str, ReferenceStyle)] = &[
    ("APA", ReferenceStyle::Apa),
    ("MLA", ReferenceStyle::Mla),
    ("HARVARD", ReferenceStyle::Harvard),
    ("CHICAGO", ReferenceStyle::Chicago),
    ("IEEE", ReferenceStyle::Ieee),
    ("VANCOUVER", ReferenceStyle::Vancouver),
    ("OSCOLA", ReferenceStyle::Oscola),
    ("TURABIAN", ReferenceStyle::Turabian),
];

/// Detect a citation style mentioned anywhere in free text.
///
/// Case-insensitive substring match against the fixed style vocabulary;
/// variants like "APA7" or "APA 7th" collapse to the canonical label.
pub fn extract_reference_style(text: &str) -> Option<ReferenceStyle> {
    let upper = text.to_uppercase();
    STYLE_VOCABULARY
        .iter()
        .find(|(needle, _)| upper.contains(needle))
        .map(|(_, style)| *style)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
