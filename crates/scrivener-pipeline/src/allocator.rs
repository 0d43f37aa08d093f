//! Hierarchical word-count rebalancing for generated outlines.
//!
//! The structure stage asks the generation service for numbered headings of
//! the form `"<n>[.<m>[.<k>]]. <Title> - <count> words"` plus a
//! `"Total Word Count: <count>"` line, but the declared counts rarely add
//! up. [`rebalance`] repairs them so that every parent equals the sum of its
//! children, the top-level sections sum exactly to the target total, and
//! introduction/conclusion sections land on 10% of the total each. Rounding
//! drift is always reconciled into a single section, never dropped, which
//! makes the pass idempotent: re-running it on its own output is a no-op.
//!
//! Sections whose heading matches the ignore vocabulary (cover page,
//! disclaimer, references/bibliography) are never touched and never
//! contribute to any sum.

use std::collections::HashMap;

use regex::Regex;

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

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

#[derive(Debug, Clone)]
struct Heading {
    line_idx: usize,
    number: Vec<u32>,
}

fn heading_number_re() -> Regex {
    Regex::new(r"^\s*(\d{1,4}(?:\.\d{1,4}){0,2})\.?\s+").unwrap()
}

fn count_re() -> Regex {
    Regex::new(r"(?i)(\d{1,6})(\s*words?\b)").unwrap()
}

fn total_line_re() -> Regex {
    Regex::new(r"(?i)(total\s*word\s*count\s*[:\-]?\s*)(\d{1,6})").unwrap()
}

/// Replace the first word count on a heading line, preserving the suffix.
fn replace_count(line: &str, new_val: i64) -> String {
    count_re()
        .replace(line, |caps: &regex::Captures| {
            format!("{}{}", new_val, &caps[2])
        })
        .into_owned()
}

/// Round to nearest, floor at one word.
fn round_min_one(value: f64) -> i64 {
    (value.round() as i64).max(1)
}

/// Index (into `keys`) of the entry with the largest count, first wins ties.
fn largest_of(keys: &[Vec<u32>], counts: &HashMap<Vec<u32>, i64>) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (idx, key) in keys.iter().enumerate() {
        let count = counts[key];
        if best.map(|(_, c)| count > c).unwrap_or(true) {
            best = Some((idx, count));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Scale `keys` so they sum exactly to `target`: proportional scale, round
/// to nearest (minimum 1), then push the whole rounding drift into the
/// largest entry.
fn scale_to_target(keys: &[Vec<u32>], counts: &mut HashMap<Vec<u32>, i64>, target: i64) {
    let current: i64 = keys.iter().map(|k| counts[k]).sum();
    if current <= 0 || keys.is_empty() {
        return;
    }
    let factor = target as f64 / current as f64;
    for key in keys {
        let scaled = round_min_one(counts[key] as f64 * factor);
        counts.insert(key.clone(), scaled);
    }
    let drift = target - keys.iter().map(|k| counts[k]).sum::<i64>();
    if drift != 0 {
        if let Some(idx) = largest_of(keys, counts) {
            let key = &keys[idx];
            let adjusted = (counts[key] + drift).max(1);
            counts.insert(key.clone(), adjusted);
        }
    }
}

// ---------------------------------------------------------------------------
// rebalance
// ---------------------------------------------------------------------------

/// Rewrite an outline so its declared word counts satisfy the sum
/// invariants, optionally rescaling the whole document to `target_total`.
pub fn rebalance(structure_text: &str, target_total: Option<u32>) -> String {
    if structure_text.is_empty() {
        return String::new();
    }

    // Headings are plain text; strip any bold markers the service slipped in.
    let text = Regex::new(r"\*\*(.*?)\*\*")
        .unwrap()
        .replace_all(structure_text, "$1")
        .into_owned();

    let mut lines: Vec<String> = text.lines().map(String::from).collect();
    let total_idx = lines
        .iter()
        .position(|l| l.to_lowercase().contains("total word count"));

    let number_re = heading_number_re();
    let counter = count_re();

    let mut headings: Vec<Heading> = Vec::new();
    let mut counts: HashMap<Vec<u32>, i64> = HashMap::new();
    for (idx, line) in lines.iter().enumerate() {
        if Some(idx) == total_idx || is_ignored(line) {
            continue;
        }
        let Some(num_caps) = number_re.captures(line) else {
            continue;
        };
        let Some(count_caps) = counter.captures(line) else {
            continue;
        };
        let number: Vec<u32> = num_caps[1]
            .split('.')
            .filter_map(|part| part.parse().ok())
            .collect();
        let count: i64 = count_caps[1].parse().unwrap_or(0);
        counts.insert(number.clone(), count);
        headings.push(Heading {
            line_idx: idx,
            number,
        });
    }

    let top_keys: Vec<Vec<u32>> = headings
        .iter()
        .filter(|h| h.number.len() == 1)
        .map(|h| h.number.clone())
        .collect();
    if top_keys.is_empty() {
        return lines.join("\n");
    }

    let children_of = |parent: &[u32], headings: &[Heading]| -> Vec<Vec<u32>> {
        headings
            .iter()
            .filter(|h| h.number.len() == parent.len() + 1 && h.number[..parent.len()] == *parent)
            .map(|h| h.number.clone())
            .collect()
    };

    // Children are the source of truth: derive every parent that has
    // children from their sum, deepest parents first.
    for depth in [2usize, 1] {
        let parents: Vec<Vec<u32>> = headings
            .iter()
            .filter(|h| h.number.len() == depth)
            .map(|h| h.number.clone())
            .collect();
        for parent in parents {
            let kids = children_of(&parent, &headings);
            if kids.is_empty() {
                continue;
            }
            let sum: i64 = kids.iter().map(|k| counts[k]).sum();
            if sum > 0 {
                counts.insert(parent, sum);
            }
        }
    }

    if top_keys.iter().map(|k| counts[k]).sum::<i64>() <= 0 {
        return lines.join("\n");
    }

    // Rescale the top level to the requested total.
    if let Some(target) = target_total.filter(|t| *t > 0) {
        scale_to_target(&top_keys, &mut counts, target as i64);
    }

    // Introduction and conclusion take 10% of the total each; the drift goes
    // into the largest remaining section so the total stays exact.
    let total_main: i64 = top_keys.iter().map(|k| counts[k]).sum();
    let find_top = |needle: &str, exclude: Option<&Vec<u32>>| -> Option<Vec<u32>> {
        headings
            .iter()
            .filter(|h| h.number.len() == 1 && Some(&h.number) != exclude)
            .find(|h| lines[h.line_idx].to_lowercase().contains(needle))
            .map(|h| h.number.clone())
    };
    let intro = find_top("introduction", None);
    let concl = find_top("conclusion", intro.as_ref());

    if total_main > 0 && (intro.is_some() || concl.is_some()) {
        let share = round_min_one(total_main as f64 * 0.10);
        for key in intro.iter().chain(concl.iter()) {
            counts.insert(key.clone(), share);
        }
        let drift = total_main - top_keys.iter().map(|k| counts[k]).sum::<i64>();
        if drift != 0 {
            let remaining: Vec<Vec<u32>> = top_keys
                .iter()
                .filter(|k| Some(*k) != intro.as_ref() && Some(*k) != concl.as_ref())
                .cloned()
                .collect();
            let bucket = if remaining.is_empty() {
                largest_of(&top_keys, &counts).map(|idx| top_keys[idx].clone())
            } else {
                largest_of(&remaining, &counts).map(|idx| remaining[idx].clone())
            };
            if let Some(key) = bucket {
                let adjusted = (counts[&key] + drift).max(1);
                counts.insert(key, adjusted);
            }
        }
    }

    // Propagate parent totals downward, one generation per pass.
    for depth in [1usize, 2] {
        let parents: Vec<Vec<u32>> = headings
            .iter()
            .filter(|h| h.number.len() == depth)
            .map(|h| h.number.clone())
            .collect();
        for parent in parents {
            let kids = children_of(&parent, &headings);
            if kids.is_empty() {
                continue;
            }
            let kid_sum: i64 = kids.iter().map(|k| counts[k]).sum();
            if kid_sum <= 0 {
                continue;
            }
            let parent_target = counts[&parent];
            scale_to_target(&kids, &mut counts, parent_target);
        }
    }

    // Rewrite every heading's count in place.
    for heading in &headings {
        lines[heading.line_idx] = replace_count(&lines[heading.line_idx], counts[&heading.number]);
    }

    let final_total: i64 = top_keys.iter().map(|k| counts[k]).sum();
    match total_idx {
        Some(idx) => {
            lines[idx] = total_line_re()
                .replace(&lines[idx], |caps: &regex::Captures| {
                    format!("{}{}", &caps[1], final_total)
                })
                .into_owned();
        }
        None => {
            let at = 1.min(lines.len());
            lines.insert(at, format!("Total Word Count: {final_total}"));
        }
    }

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Inspection helpers
// ---------------------------------------------------------------------------

/// Sum of the non-ignored top-level counts in an outline.
pub fn top_level_total(structure_text: &str) -> i64 {
    let number_re = heading_number_re();
    let counter = count_re();
    structure_text
        .lines()
        .filter(|line| !is_ignored(line) && !line.to_lowercase().contains("total word count"))
        .filter_map(|line| {
            let num = number_re.captures(line)?;
            if num[1].contains('.') {
                return None;
            }
            let count = counter.captures(line)?;
            count[1].parse::<i64>().ok()
        })
        .sum()
}

/// The declared count for a heading whose title contains `needle`.
pub fn count_for(structure_text: &str, needle: &str) -> Option<i64> {
    let counter = count_re();
    let low = needle.to_lowercase();
    structure_text
        .lines()
        .find(|line| line.to_lowercase().contains(&low))
        .and_then(|line| counter.captures(line))
        .and_then(|caps| caps[1].parse().ok())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
