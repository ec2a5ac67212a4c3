//! Flag schemas: declaration, per-entry token splitting and validation.
//!
//! A schema is declared once per registration with [`define_flags`] and is
//! independent of the positional pattern. At dispatch time the schema first
//! [`split`](FlagSchema::split)s the invocation into positional words and raw
//! flags, then [`validate`](FlagSchema::validate)s the raw flags into typed
//! values. Unknown flags are a hard error, never ignored.

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use strum::{Display, EnumString};

use crate::{
    args::{BoundArguments, Value},
    error::{DispatchError, FlagSchemaError},
    invocation::{Invocation, Token},
};

/// Declared type of a flag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Boolean,
}

impl ValueType {
    /// Coerce a raw token to this type.
    pub fn coerce(self, raw: &str) -> Option<Value> {
        match self {
            Self::String => Some(Value::String(raw.to_string())),
            Self::Number => raw
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Number),
            Self::Boolean => parse_bool(raw).map(Value::Boolean),
        }
    }

    const fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String, Value::String(_))
                | (Self::Number, Value::Number(_))
                | (Self::Boolean, Value::Boolean(_))
        )
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Number of value tokens a flag takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagArity {
    /// Presence switch.
    Zero,
    /// Takes one value, inline (`--name=value`) or as the next word.
    One,
}

// ═══════════════════════════════════════════════════════════════════════════
// FLAG SPEC BUILDER
// ═══════════════════════════════════════════════════════════════════════════

/// Declaration of a single flag.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagSpec {
    name: String,
    aliases: Vec<String>,
    arity: FlagArity,
    value_type: ValueType,
    required: bool,
    default: Option<Value>,
}

impl FlagSpec {
    pub fn new(name: impl Into<String>, arity: FlagArity, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            arity,
            value_type,
            required: false,
            default: None,
        }
    }

    /// Boolean presence switch, e.g. `-u`.
    pub fn switch(name: impl Into<String>) -> Self {
        Self::new(name, FlagArity::Zero, ValueType::Boolean)
    }

    /// Flag taking one value of the given type, e.g. `--since 1h`.
    pub fn option(name: impl Into<String>, value_type: ValueType) -> Self {
        Self::new(name, FlagArity::One, value_type)
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub const fn arity(&self) -> FlagArity {
        self.arity
    }

    pub const fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub const fn is_required(&self) -> bool {
        self.required
    }

    pub const fn declared_default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    fn spellings(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name()).chain(self.aliases().iter().map(String::as_str))
    }

    /// Usage form, e.g. `-s|--store <string>`.
    pub fn synopsis(&self) -> String {
        let names = self
            .spellings()
            .sorted_by_key(|spelling| spelling.len())
            .map(dashed)
            .join("|");
        match self.arity() {
            FlagArity::Zero => names,
            FlagArity::One => format!("{names} <{}>", self.value_type()),
        }
    }
}

/// `-x` for single characters, `--name` otherwise.
pub fn dashed(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{name}")
    } else {
        format!("--{name}")
    }
}

fn is_valid_flag_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.contains('=')
        && !name.chars().any(char::is_whitespace)
}

// ═══════════════════════════════════════════════════════════════════════════
// SCHEMA
// ═══════════════════════════════════════════════════════════════════════════

/// Validated set of flags for one registration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagSchema {
    flags: Vec<FlagSpec>,
    lookup: HashMap<String, usize>,
}

/// A flag occurrence after splitting, before type coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFlag<'a> {
    /// As typed, e.g. `-s` or `--since`.
    pub spelled: String,
    /// Name used for schema lookup.
    pub name: &'a str,
    pub value: Option<&'a str>,
}

/// Result of splitting an invocation against one schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split<'a> {
    pub positionals: Vec<&'a str>,
    pub flags: Vec<RawFlag<'a>>,
}

/// Build a schema, rejecting inconsistent declarations.
///
/// # Errors
///
/// Returns [`FlagSchemaError`] for an invalid or duplicated spelling, a
/// required flag with a default, a default of the wrong type, or a switch
/// that is not boolean.
pub fn define_flags<I>(specs: I) -> Result<FlagSchema, FlagSchemaError>
where
    I: IntoIterator<Item = FlagSpec>,
{
    let flags: Vec<FlagSpec> = specs.into_iter().collect();
    let mut lookup = HashMap::new();

    for (index, spec) in flags.iter().enumerate() {
        validate_spec(spec)?;

        for spelling in spec.spellings() {
            if lookup.insert(spelling.to_string(), index).is_some() {
                return Err(FlagSchemaError::DuplicateAlias {
                    alias: spelling.to_string(),
                });
            }
        }
    }

    Ok(FlagSchema { flags, lookup })
}

fn validate_spec(spec: &FlagSpec) -> Result<(), FlagSchemaError> {
    if let Some(bad) = spec.spellings().find(|s| !is_valid_flag_name(s)) {
        return Err(FlagSchemaError::InvalidName {
            name: bad.to_string(),
        });
    }

    if spec.arity == FlagArity::Zero && spec.value_type != ValueType::Boolean {
        return Err(FlagSchemaError::SwitchNotBoolean {
            flag: spec.name.clone(),
            declared: spec.value_type,
        });
    }

    match &spec.default {
        Some(_) if spec.required => Err(FlagSchemaError::RequiredWithDefault {
            flag: spec.name.clone(),
        }),
        Some(value) if !spec.value_type.accepts(value) => {
            Err(FlagSchemaError::DefaultTypeMismatch {
                flag: spec.name.clone(),
                expected: spec.value_type,
            })
        }
        _ => Ok(()),
    }
}

impl FlagSchema {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn flags(&self) -> &[FlagSpec] {
        &self.flags
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Look up a flag by name or alias.
    pub fn get(&self, spelling: &str) -> Option<&FlagSpec> {
        self.lookup.get(spelling).map(|&index| &self.flags[index])
    }

    /// True when the name or alias is declared.
    pub fn declares(&self, spelling: &str) -> bool {
        self.lookup.contains_key(spelling)
    }

    /// Usage fragment for help output; optional flags in brackets.
    pub fn synopsis(&self) -> String {
        self.flags
            .iter()
            .map(|spec| {
                if spec.is_required() {
                    spec.synopsis()
                } else {
                    format!("[{}]", spec.synopsis())
                }
            })
            .join(" ")
    }

    /// Separate positional words from flags using this schema's arities.
    ///
    /// A value-taking flag without an inline value consumes the following
    /// word. A single-dash token of several characters that is not itself
    /// declared expands to a bundle of switches when every character is a
    /// declared switch.
    pub fn split<'a>(&self, invocation: &'a Invocation) -> Split<'a> {
        let mut split = Split::default();
        let mut tokens = invocation.tokens().iter().peekable();

        while let Some(token) = tokens.next() {
            let flag = match token {
                Token::Word(word) | Token::Operand(word) => {
                    split.positionals.push(word);
                    continue;
                }
                Token::Flag(flag) => flag,
            };

            if let Some(bundle) = self.expand_bundle(flag.name.as_str(), flag.short) {
                split.flags.extend(bundle);
                continue;
            }

            let value = match (flag.value.as_deref(), self.get(&flag.name).map(FlagSpec::arity)) {
                (Some(inline), _) => Some(inline),
                (None, Some(FlagArity::One)) => match tokens.peek() {
                    Some(Token::Word(next)) => {
                        tokens.next();
                        Some(next.as_str())
                    }
                    _ => None,
                },
                (None, _) => None,
            };

            split.flags.push(RawFlag {
                spelled: flag.spelled(),
                name: &flag.name,
                value,
            });
        }

        split
    }

    fn expand_bundle<'a>(&self, name: &'a str, short: bool) -> Option<Vec<RawFlag<'a>>> {
        if !short || name.chars().count() < 2 || self.declares(name) {
            return None;
        }

        name.char_indices()
            .map(|(start, c)| {
                let single = &name[start..start + c.len_utf8()];
                self.get(single)
                    .filter(|spec| spec.arity == FlagArity::Zero)
                    .map(|_| RawFlag {
                        spelled: format!("-{single}"),
                        name: single,
                        value: None,
                    })
            })
            .collect()
    }

    /// Coerce raw flags into typed values, applying defaults.
    ///
    /// Absent switches bind to `false`; absent value flags bind to their
    /// default when declared and stay unbound otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownFlag`], [`DispatchError::DuplicateFlag`],
    /// [`DispatchError::FlagType`] or [`DispatchError::MissingRequiredFlag`].
    pub fn validate(&self, raw: &[RawFlag<'_>], command: &str) -> Result<BoundArguments, DispatchError> {
        let mut bound = BoundArguments::default();
        let mut seen = HashSet::new();

        for flag in raw {
            let &index = self
                .lookup
                .get(flag.name)
                .ok_or_else(|| DispatchError::UnknownFlag {
                    flag: flag.spelled.clone(),
                    command: command.to_string(),
                    known: self.flags.iter().map(FlagSpec::synopsis).collect(),
                })?;
            let spec = &self.flags[index];

            if !seen.insert(index) {
                return Err(DispatchError::DuplicateFlag {
                    flag: dashed(&spec.name),
                    command: command.to_string(),
                });
            }

            let value = match (spec.arity, flag.value) {
                (FlagArity::Zero, None) => Value::Boolean(true),
                (_, Some(raw_value)) => spec.value_type.coerce(raw_value).ok_or_else(|| {
                    DispatchError::FlagType {
                        flag: flag.spelled.clone(),
                        value: raw_value.to_string(),
                        expected: spec.value_type,
                    }
                })?,
                (FlagArity::One, None) => {
                    return Err(DispatchError::FlagType {
                        flag: flag.spelled.clone(),
                        value: String::new(),
                        expected: spec.value_type,
                    })
                }
            };

            bound.insert(spec.name.clone(), value);
        }

        for (index, spec) in self.flags.iter().enumerate() {
            if seen.contains(&index) {
                continue;
            }
            if spec.is_required() {
                return Err(DispatchError::MissingRequiredFlag {
                    flag: dashed(&spec.name),
                    command: command.to_string(),
                });
            }
            match (spec.declared_default(), spec.arity()) {
                (Some(default), _) => bound.insert(spec.name.clone(), default.clone()),
                (None, FlagArity::Zero) => bound.insert(spec.name.clone(), Value::Boolean(false)),
                (None, FlagArity::One) => {}
            }
        }

        Ok(bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_schema() -> FlagSchema {
        define_flags([
            FlagSpec::option("store", ValueType::String).alias("s"),
            FlagSpec::switch("ui").alias("u"),
        ])
        .unwrap_or_else(|e| panic!("schema should be valid: {e}"))
    }

    fn validate(schema: &FlagSchema, tokens: &[&str]) -> Result<BoundArguments, DispatchError> {
        let invocation = Invocation::new(tokens.iter().copied());
        let split = schema.split(&invocation);
        schema.validate(&split.flags, "codeflare run")
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let result = define_flags([
            FlagSpec::option("since", ValueType::String).alias("s"),
            FlagSpec::option("store", ValueType::String).alias("s"),
        ]);
        assert_eq!(
            result,
            Err(FlagSchemaError::DuplicateAlias {
                alias: "s".to_string()
            })
        );
    }

    #[test]
    fn test_alias_equal_to_other_name_rejected() {
        let result = define_flags([
            FlagSpec::switch("u"),
            FlagSpec::switch("ui").alias("u"),
        ]);
        assert!(matches!(result, Err(FlagSchemaError::DuplicateAlias { .. })));
    }

    #[test]
    fn test_required_with_default_rejected() {
        let result = define_flags([FlagSpec::option("store", ValueType::String)
            .required()
            .default_value("/tmp")]);
        assert_eq!(
            result,
            Err(FlagSchemaError::RequiredWithDefault {
                flag: "store".to_string()
            })
        );
    }

    #[test]
    fn test_default_type_mismatch_rejected() {
        let result = define_flags([FlagSpec::option("lines", ValueType::Number).default_value("ten")]);
        assert!(matches!(
            result,
            Err(FlagSchemaError::DefaultTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_switch_must_be_boolean() {
        let result = define_flags([FlagSpec::new("x", FlagArity::Zero, ValueType::Number)]);
        assert!(matches!(result, Err(FlagSchemaError::SwitchNotBoolean { .. })));
    }

    #[test]
    fn test_invalid_names_rejected() {
        for bad in ["", "-s", "a=b", "two words"] {
            assert!(
                matches!(
                    define_flags([FlagSpec::switch(bad)]),
                    Err(FlagSchemaError::InvalidName { .. })
                ),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn test_split_consumes_value_for_option() {
        let schema = run_schema();
        let invocation = Invocation::new(["run", "task", "-s", "/path/to/store", "-u"]);
        let split = schema.split(&invocation);
        assert_eq!(split.positionals, vec!["run", "task"]);
        assert_eq!(split.flags.len(), 2);
        assert_eq!(split.flags[0].value, Some("/path/to/store"));
        assert_eq!(split.flags[1].value, None);
    }

    #[test]
    fn test_split_switch_does_not_consume() {
        let schema = run_schema();
        let invocation = Invocation::new(["run", "-u", "task"]);
        assert_eq!(schema.split(&invocation).positionals, vec!["run", "task"]);
    }

    #[test]
    fn test_split_operand_never_consumed() {
        let schema = run_schema();
        let invocation = Invocation::new(["run", "-s", "--", "value"]);
        let split = schema.split(&invocation);
        assert_eq!(split.positionals, vec!["run", "value"]);
        assert_eq!(split.flags[0].value, None);
    }

    #[test]
    fn test_validate_binds_by_canonical_name() {
        let bound = validate(&run_schema(), &["-s", "/store", "--ui"])
            .unwrap_or_else(|e| panic!("should validate: {e}"));
        assert_eq!(bound.str("store"), Some("/store"));
        assert!(bound.flag("ui"));
        assert!(!bound.contains("s"));
    }

    #[test]
    fn test_unknown_flag_is_hard_error() {
        let result = validate(&run_schema(), &["-x"]);
        assert!(matches!(
            result,
            Err(DispatchError::UnknownFlag { ref flag, .. }) if flag == "-x"
        ));
    }

    #[test]
    fn test_absent_switch_is_false_and_absent_option_unbound() {
        let bound = validate(&run_schema(), &[]).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(bound.get("ui"), Some(&Value::Boolean(false)));
        assert!(!bound.contains("store"));
    }

    #[test]
    fn test_default_applied_when_absent() {
        let schema = define_flags([FlagSpec::option("lines", ValueType::Number).default_value(10.0)])
            .unwrap_or_else(|e| panic!("{e}"));
        let bound = validate(&schema, &[]).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(bound.number("lines"), Some(10.0));
    }

    #[test]
    fn test_missing_required_flag() {
        let schema = define_flags([FlagSpec::option("store", ValueType::String).required()])
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(
            validate(&schema, &[]),
            Err(DispatchError::MissingRequiredFlag {
                flag: "--store".to_string(),
                command: "codeflare run".to_string(),
            })
        );
    }

    #[test]
    fn test_type_error_on_bad_number() {
        let schema = define_flags([FlagSpec::option("lines", ValueType::Number)])
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(
            validate(&schema, &["--lines=ten"]),
            Err(DispatchError::FlagType {
                flag: "--lines".to_string(),
                value: "ten".to_string(),
                expected: ValueType::Number,
            })
        );
    }

    #[test]
    fn test_type_error_on_missing_value() {
        let result = validate(&run_schema(), &["--store"]);
        assert!(matches!(result, Err(DispatchError::FlagType { ref value, .. }) if value.is_empty()));
    }

    #[test]
    fn test_duplicate_flag_rejected() {
        let result = validate(&run_schema(), &["-u", "--ui"]);
        assert!(matches!(result, Err(DispatchError::DuplicateFlag { .. })));
    }

    #[test]
    fn test_switch_bundle_expands() {
        let schema = define_flags([FlagSpec::switch("u"), FlagSpec::switch("f")])
            .unwrap_or_else(|e| panic!("{e}"));
        let bound = validate(&schema, &["-uf"]).unwrap_or_else(|e| panic!("{e}"));
        assert!(bound.flag("u"));
        assert!(bound.flag("f"));
    }

    #[test]
    fn test_bundle_spelling_a_float_keyword_expands() {
        let schema = define_flags([
            FlagSpec::switch("i"),
            FlagSpec::switch("n"),
            FlagSpec::switch("f"),
        ])
        .unwrap_or_else(|e| panic!("{e}"));
        let bound = validate(&schema, &["-inf"]).unwrap_or_else(|e| panic!("{e}"));
        assert!(bound.flag("i") && bound.flag("n") && bound.flag("f"));
    }

    #[test]
    fn test_spec_accessors() {
        let spec = FlagSpec::option("lines", ValueType::Number)
            .alias("n")
            .default_value(10.0);
        assert_eq!(spec.name(), "lines");
        assert_eq!(spec.aliases(), ["n"]);
        assert_eq!(spec.value_type(), ValueType::Number);
        assert!(!spec.is_required());
        assert_eq!(spec.declared_default(), Some(&Value::Number(10.0)));
        assert!(FlagSpec::switch("ui").required().is_required());
    }

    #[test]
    fn test_bundle_with_unknown_member_is_unknown() {
        let schema = define_flags([FlagSpec::switch("u")]).unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            validate(&schema, &["-ux"]),
            Err(DispatchError::UnknownFlag { ref flag, .. }) if flag == "-ux"
        ));
    }

    #[test]
    fn test_boolean_option_coercion() {
        assert_eq!(ValueType::Boolean.coerce("YES"), Some(Value::Boolean(true)));
        assert_eq!(ValueType::Boolean.coerce("off"), Some(Value::Boolean(false)));
        assert_eq!(ValueType::Boolean.coerce("maybe"), None);
        assert_eq!(ValueType::Number.coerce("NaN"), None);
    }

    #[test]
    fn test_synopsis() {
        assert_eq!(run_schema().synopsis(), "[-s|--store <string>] [-u|--ui]");
    }
}
