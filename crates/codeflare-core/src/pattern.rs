//! Pattern compiler for hierarchical command path templates.
//!
//! A template is a whitespace-separated list of segments. Literal words may
//! also be separated by `/`, so `/codeflare/dashboard <dir>` and
//! `codeflare dashboard <dir>` compile to the same pattern.
//!
//! | Syntax                        | Segment                 |
//! |-------------------------------|-------------------------|
//! | `word`                        | [`Segment::Literal`]    |
//! | `<name>`                      | [`Segment::Capture`]    |
//! | `[<name>]` or `[name]`        | [`Segment::OptionalCapture`] |
//! | `<name...>` or `[<name...>]`  | [`Segment::Variadic`]   |
//!
//! Compilation is pure and deterministic. A compiled [`CommandPattern`] is
//! immutable and its `Display` form compiles back to an equal pattern.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::{cmp::Reverse, collections::HashSet, fmt};

use itertools::Itertools;

use crate::error::PatternSyntaxError;

const VARIADIC_MARKER: &str = "...";

/// One position of a command pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Token must equal this text.
    Literal(String),
    /// Token is bound under this name.
    Capture(String),
    /// Token, when present, is bound under this name.
    OptionalCapture(String),
    /// All remaining tokens (zero or more) are bound under this name.
    Variadic(String),
}

impl Segment {
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Capture name, `None` for literals.
    pub fn capture_name(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::Capture(name) | Self::OptionalCapture(name) | Self::Variadic(name) => {
                Some(name)
            }
        }
    }

    const fn is_open(&self) -> bool {
        matches!(self, Self::OptionalCapture(_) | Self::Variadic(_))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write!(f, "{text}"),
            Self::Capture(name) => write!(f, "<{name}>"),
            Self::OptionalCapture(name) => write!(f, "[<{name}>]"),
            Self::Variadic(name) => write!(f, "<{name}{VARIADIC_MARKER}>"),
        }
    }
}

/// Accepted range of positional token counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    /// `None` when a variadic tail absorbs any number of tokens.
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exactly(count: usize) -> Self {
        Self {
            min: count,
            max: Some(count),
        }
    }

    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "exactly {max}"),
            Some(max) => write!(f, "{} to {max}", self.min),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// Ranking of a pattern against competitors. Smaller sorts first.
///
/// Fields compare in order: leading literals, total literals, open
/// (optional or variadic) segments, then the literal/capture shape position
/// by position. Two patterns with equal specificity and overlapping arity
/// are a registration conflict.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity {
    leading_literals: Reverse<usize>,
    total_literals: Reverse<usize>,
    open_segments: usize,
    shape: Reverse<Vec<bool>>,
}

/// A compiled command path template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandPattern {
    segments: Vec<Segment>,
}

/// Kind of segment occupying a position for a given token count.
#[derive(PartialEq, Eq)]
enum Slot<'a> {
    Literal(&'a str),
    Capture,
}

impl CommandPattern {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Literal segments before the first capture.
    pub fn literal_prefix(&self) -> Vec<&str> {
        self.segments
            .iter()
            .map_while(|segment| match segment {
                Segment::Literal(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Names of all capture segments, in order.
    pub fn capture_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::capture_name)
    }

    pub fn has_variadic(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Variadic(_)))
    }

    pub fn arity(&self) -> Arity {
        let required = self
            .segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Literal(_) | Segment::Capture(_)))
            .count();

        if self.has_variadic() {
            Arity::at_least(required)
        } else {
            Arity {
                min: required,
                max: Some(self.segments.len()),
            }
        }
    }

    pub fn specificity(&self) -> Specificity {
        Specificity {
            leading_literals: Reverse(self.literal_prefix().len()),
            total_literals: Reverse(self.segments.iter().filter(|s| s.is_literal()).count()),
            open_segments: self.segments.iter().filter(|s| s.is_open()).count(),
            shape: Reverse(self.segments.iter().map(Segment::is_literal).collect()),
        }
    }

    /// True when every literal segment has an equal token at its position.
    pub fn literals_consistent<S: AsRef<str>>(&self, tokens: &[S]) -> bool {
        self.segments.iter().enumerate().all(|(index, segment)| match segment {
            Segment::Literal(text) => tokens
                .get(index)
                .is_some_and(|token| token.as_ref() == text),
            _ => true,
        })
    }

    /// True when some token sequence matches both patterns position for
    /// position: equal literal text, or a capture in both.
    pub fn overlaps(&self, other: &Self) -> bool {
        let (ours, theirs) = (self.arity(), other.arity());
        let low = ours.min.max(theirs.min);
        let longest = self.segments.len().max(other.segments.len());
        let high = [ours.max, theirs.max]
            .into_iter()
            .flatten()
            .fold(longest, usize::min);

        (low..=high).any(|count| {
            ours.contains(count)
                && theirs.contains(count)
                && (0..count).all(|index| self.slot(index) == other.slot(index))
        })
    }

    fn slot(&self, index: usize) -> Slot<'_> {
        match self.segments.get(index) {
            Some(Segment::Literal(text)) => Slot::Literal(text),
            _ => Slot::Capture,
        }
    }
}

impl fmt::Display for CommandPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.iter().join(" "))
    }
}

impl std::str::FromStr for CommandPattern {
    type Err = PatternSyntaxError;

    fn from_str(template: &str) -> Result<Self, Self::Err> {
        compile(template)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// COMPILER
// ═══════════════════════════════════════════════════════════════════════════

/// Compile a command path template.
///
/// # Errors
///
/// Returns [`PatternSyntaxError`] when the template is empty, has unbalanced
/// capture delimiters, an invalid capture name, a variadic segment that is
/// not last, a required segment after an optional one, or a duplicated
/// capture name.
pub fn compile(template: &str) -> Result<CommandPattern, PatternSyntaxError> {
    let segments = template
        .split_whitespace()
        .map(parse_word)
        .flatten_ok()
        .collect::<Result<Vec<_>, _>>()?;

    if segments.is_empty() {
        return Err(PatternSyntaxError::Empty);
    }

    validate_order(&segments)?;
    validate_unique_names(&segments)?;

    Ok(CommandPattern { segments })
}

/// A whitespace-separated word yields one capture or one or more literals.
fn parse_word(word: &str) -> Result<Vec<Segment>, PatternSyntaxError> {
    if let Some(inner) = word.strip_prefix('[') {
        let inner = inner
            .strip_suffix(']')
            .ok_or_else(|| unbalanced(word))?;
        let inner = match inner.strip_prefix('<') {
            Some(rest) => rest.strip_suffix('>').ok_or_else(|| unbalanced(word))?,
            None => inner,
        };
        return parse_capture(word, inner, true).map(|segment| vec![segment]);
    }

    if let Some(inner) = word.strip_prefix('<') {
        let inner = inner
            .strip_suffix('>')
            .ok_or_else(|| unbalanced(word))?;
        return parse_capture(word, inner, false).map(|segment| vec![segment]);
    }

    if word.contains(['<', '>', '[', ']']) {
        return Err(unbalanced(word));
    }

    Ok(word
        .split('/')
        .filter(|piece| !piece.is_empty())
        .map(|piece| Segment::Literal(piece.to_string()))
        .collect())
}

fn parse_capture(word: &str, inner: &str, optional: bool) -> Result<Segment, PatternSyntaxError> {
    let (name, variadic) = inner
        .strip_suffix(VARIADIC_MARKER)
        .map_or((inner, false), |name| (name, true));

    if name.contains(['<', '>', '[', ']']) {
        return Err(unbalanced(word));
    }
    if !is_valid_name(name) {
        return Err(PatternSyntaxError::InvalidName {
            segment: word.to_string(),
        });
    }

    let name = name.to_string();
    Ok(match (variadic, optional) {
        (true, _) => Segment::Variadic(name),
        (false, true) => Segment::OptionalCapture(name),
        (false, false) => Segment::Capture(name),
    })
}

fn validate_order(segments: &[Segment]) -> Result<(), PatternSyntaxError> {
    let mut seen_optional = false;

    for (index, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Variadic(name) if index + 1 != segments.len() => {
                return Err(PatternSyntaxError::VariadicNotLast { name: name.clone() });
            }
            Segment::Literal(_) | Segment::Capture(_) if seen_optional => {
                return Err(PatternSyntaxError::RequiredAfterOptional {
                    segment: segment.to_string(),
                });
            }
            Segment::OptionalCapture(_) => seen_optional = true,
            _ => {}
        }
    }

    Ok(())
}

fn validate_unique_names(segments: &[Segment]) -> Result<(), PatternSyntaxError> {
    let mut seen = HashSet::new();
    segments
        .iter()
        .filter_map(Segment::capture_name)
        .try_for_each(|name| {
            if seen.insert(name) {
                Ok(())
            } else {
                Err(PatternSyntaxError::DuplicateCapture {
                    name: name.to_string(),
                })
            }
        })
}

pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

fn unbalanced(word: &str) -> PatternSyntaxError {
    PatternSyntaxError::UnbalancedDelimiter {
        segment: word.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(template: &str) -> CommandPattern {
        compile(template).unwrap_or_else(|e| panic!("'{template}' should compile: {e}"))
    }

    #[test]
    fn test_compile_literals_and_captures() {
        let compiled = pattern("codeflare chart <metric> <paths...>");
        assert_eq!(
            compiled.segments(),
            &[
                Segment::Literal("codeflare".to_string()),
                Segment::Literal("chart".to_string()),
                Segment::Capture("metric".to_string()),
                Segment::Variadic("paths".to_string()),
            ]
        );
    }

    #[test]
    fn test_slash_path_equals_spaced_path() {
        assert_eq!(
            pattern("/codeflare/dashboard <dir>"),
            pattern("codeflare dashboard <dir>")
        );
    }

    #[test]
    fn test_optional_forms() {
        assert_eq!(pattern("browse [<dir>]"), pattern("browse [dir]"));
        assert_eq!(pattern("browse [<dirs...>]"), pattern("browse <dirs...>"));
    }

    #[test]
    fn test_display_is_canonical() {
        let compiled = pattern("/codeflare/run [task] <rest...>");
        assert_eq!(compiled.to_string(), "codeflare run [<task>] <rest...>");
        assert_eq!(pattern(&compiled.to_string()), compiled);
    }

    #[test]
    fn test_empty_template_rejected() {
        assert_eq!(compile("   "), Err(PatternSyntaxError::Empty));
        assert_eq!(compile("/"), Err(PatternSyntaxError::Empty));
    }

    #[test]
    fn test_unbalanced_delimiters_rejected() {
        for template in ["chart <metric", "chart metric>", "browse [<dir>", "browse [dir", "a<b"] {
            assert!(
                matches!(
                    compile(template),
                    Err(PatternSyntaxError::UnbalancedDelimiter { .. })
                ),
                "{template} should be unbalanced"
            );
        }
    }

    #[test]
    fn test_invalid_capture_name_rejected() {
        assert!(matches!(
            compile("chart <>"),
            Err(PatternSyntaxError::InvalidName { .. })
        ));
        assert!(matches!(
            compile("chart <me tric>"),
            Err(PatternSyntaxError::UnbalancedDelimiter { .. })
        ));
        assert!(matches!(
            compile("chart <m$>"),
            Err(PatternSyntaxError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_variadic_must_be_last() {
        assert_eq!(
            compile("chart <paths...> <metric>"),
            Err(PatternSyntaxError::VariadicNotLast {
                name: "paths".to_string()
            })
        );
    }

    #[test]
    fn test_required_after_optional_rejected() {
        assert!(matches!(
            compile("run [<task>] <store>"),
            Err(PatternSyntaxError::RequiredAfterOptional { .. })
        ));
        assert!(matches!(
            compile("run [<task>] now"),
            Err(PatternSyntaxError::RequiredAfterOptional { .. })
        ));
        assert!(compile("run [<task>] <rest...>").is_ok());
    }

    #[test]
    fn test_duplicate_capture_rejected() {
        assert_eq!(
            compile("copy <dir> <dir>"),
            Err(PatternSyntaxError::DuplicateCapture {
                name: "dir".to_string()
            })
        );
    }

    #[test]
    fn test_arity() {
        assert_eq!(pattern("dashboard <dir>").arity(), Arity::exactly(2));
        assert_eq!(
            pattern("browse [<dir>]").arity(),
            Arity {
                min: 1,
                max: Some(2)
            }
        );
        assert_eq!(pattern("chart <metric> <paths...>").arity(), Arity::at_least(2));
    }

    #[test]
    fn test_arity_display() {
        assert_eq!(Arity::exactly(2).to_string(), "exactly 2");
        assert_eq!(Arity { min: 1, max: Some(3) }.to_string(), "1 to 3");
        assert_eq!(Arity::at_least(2).to_string(), "at least 2");
    }

    #[test]
    fn test_literal_prefix_stops_at_first_capture() {
        assert_eq!(
            pattern("job <id> logs").literal_prefix(),
            vec!["job"]
        );
    }

    #[test]
    fn test_literals_consistent() {
        let compiled = pattern("job <id> logs");
        assert!(compiled.literals_consistent(&["job", "7", "logs"]));
        assert!(!compiled.literals_consistent(&["job", "7"]));
        assert!(!compiled.literals_consistent(&["job", "7", "events"]));
    }

    #[test]
    fn test_overlap_same_skeleton() {
        assert!(pattern("chart <metric> <dir>").overlaps(&pattern("chart <a> <b>")));
        assert!(pattern("chart <metric> <paths...>").overlaps(&pattern("chart <metric> <dir>")));
        assert!(pattern("browse [<dir>]").overlaps(&pattern("browse")));
    }

    #[test]
    fn test_no_overlap_when_literal_meets_capture() {
        assert!(!pattern("dashboard <dir>").overlaps(&pattern("<anything> <dir>")));
    }

    #[test]
    fn test_no_overlap_when_arity_disjoint() {
        assert!(!pattern("job <id>").overlaps(&pattern("job <id> <x>")));
    }

    #[test]
    fn test_no_overlap_different_literals() {
        assert!(!pattern("codeflare chart <m>").overlaps(&pattern("codeflare events <m>")));
    }

    #[test]
    fn test_specificity_prefers_leading_literals() {
        assert!(pattern("dashboard <dir>").specificity() < pattern("<anything> <dir>").specificity());
        assert!(pattern("a b <x>").specificity() < pattern("a <x> b").specificity());
    }

    #[test]
    fn test_specificity_prefers_fewer_open_segments() {
        assert!(pattern("a <x> <y>").specificity() < pattern("a <x> <y...>").specificity());
    }

    #[test]
    fn test_specificity_shape_breaks_remaining_ties() {
        assert!(pattern("a <x> b <y>").specificity() < pattern("a <x> <y> b").specificity());
    }
}
