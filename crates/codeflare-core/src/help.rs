//! Help aggregator.
//!
//! Read-only over the registry and usable at any time, including after some
//! feature modules failed to register. Never fails.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use itertools::Itertools;

use crate::registry::{Registry, RegistryEntry};

const NO_COMMANDS: &str = "no commands found";

/// Usage text for every entry, or for entries whose literal prefix starts
/// with `prefix`.
///
/// `prefix` is split like a template, so `"codeflare/chart"` and
/// `"codeflare chart"` select the same entries. An empty prefix selects
/// everything.
pub fn help_for(registry: &Registry, prefix: Option<&str>) -> String {
    let wanted: Vec<&str> = prefix.map(prefix_words).unwrap_or_default();

    let lines: Vec<(String, &str)> = registry
        .entries()
        .iter()
        .filter(|entry| starts_with(entry, &wanted))
        .map(|entry| (usage(entry), entry.help()))
        .collect();

    if lines.is_empty() {
        return if wanted.is_empty() {
            NO_COMMANDS.to_string()
        } else {
            format!("{NO_COMMANDS} matching '{}'", wanted.join(" "))
        };
    }

    let width = lines.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
    let body = lines
        .iter()
        .map(|(usage, help)| {
            if help.is_empty() {
                format!("  {usage}")
            } else {
                format!("  {usage:<width$}  {help}")
            }
        })
        .join("\n");

    format!("Usage:\n{body}")
}

/// Closest registered pattern to an unmatched invocation.
///
/// Each entry's literal prefix is compared with the same number of leading
/// words by edit distance. Entries without literals are never suggested.
/// Ties go to the entry that sorts first by specificity.
pub fn suggest(registry: &Registry, words: &[&str], max_distance: usize) -> Option<String> {
    registry
        .entries()
        .iter()
        .filter_map(|entry| {
            let literals = entry.pattern().literal_prefix();
            if literals.is_empty() {
                return None;
            }
            let typed = words.iter().take(literals.len()).join(" ");
            let distance = levenshtein(&typed, &literals.join(" "));
            (distance <= max_distance).then_some((distance, entry))
        })
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, entry)| entry.pattern().to_string())
}

fn prefix_words(prefix: &str) -> Vec<&str> {
    prefix
        .split(|c: char| c.is_whitespace() || c == '/')
        .filter(|word| !word.is_empty())
        .collect()
}

fn starts_with(entry: &RegistryEntry, wanted: &[&str]) -> bool {
    let literals = entry.pattern().literal_prefix();
    literals.len() >= wanted.len() && literals.iter().zip(wanted).all(|(a, b)| a == b)
}

fn usage(entry: &RegistryEntry) -> String {
    let synopsis = entry.flags().synopsis();
    if synopsis.is_empty() {
        entry.pattern().to_string()
    } else {
        format!("{} {synopsis}", entry.pattern())
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();

    // Single row, rolled forward per character of `a`.
    let mut prev_row: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr_row = vec![0usize; b_chars.len() + 1];

    for (i, a_ch) in a.chars().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_ch) in b_chars.iter().enumerate() {
            let cost = usize::from(a_ch != *b_ch);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_chars.len()]
}
