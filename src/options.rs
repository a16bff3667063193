//! Option metadata and the conversion option container.
//!
//! Options are declared once as `OptionSpec` values. `ConversionOptions`
//! aggregates them, turns them into clap arguments, and holds the values
//! resolved from the environment and the command line. The conversion
//! pipeline consumes the resolved set.

use crate::registry::ErrorCode;
use crate::registry::codes::{CLI_CONFLICT, OPTION_BAD_ENVIRONMENT, OPTION_INVALID_VALUE};
use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use thiserror::Error;
use tracing::debug;

/// Environment override for the default target format.
pub const ENV_TARGET: &str = "SVG2VECTOR_TARGET";

/// Output formats the conversion pipeline can emit.
pub const TARGET_FORMATS: &[&str] = &["pdf", "eps", "emf", "svg"];

// Long help templates, keyed by fixed identifiers. `{app}` is replaced by the
// program name when rendered.
const LONG_DESCRIPTIONS: &[(&str, &str)] = &[
    (
        "text-as-shape",
        "If set, {app} converts every text element of the SVG into shapes before \
         writing the target format. The result no longer depends on fonts being \
         installed where it is viewed, but the text can no longer be selected or \
         searched.",
    ),
    (
        "target",
        "Selects the vector format {app} writes. Falls back to the value of \
         SVG2VECTOR_TARGET, then to pdf.",
    ),
    (
        "verbose",
        "Makes {app} log each step it takes to stderr.",
    ),
    ("quiet", "Suppresses everything {app} prints except errors."),
];

/// Long help template registered for `key`.
pub fn long_description(key: &str) -> Option<&'static str> {
    LONG_DESCRIPTIONS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, text)| *text)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
/// Value held by an option, or its default.
pub enum OptionValue {
    Flag(bool),
    Text(Cow<'static, str>),
    Unset,
}

impl OptionValue {
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            OptionValue::Flag(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OptionValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Declarative description of one command line option.
pub struct OptionSpec {
    long_name: &'static str,
    short_name: Option<char>,
    takes_argument: bool,
    value_name: Option<&'static str>,
    choices: &'static [&'static str],
    default_text: Option<&'static str>,
    short_description: &'static str,
    long_description_key: &'static str,
    conflicts_with: &'static [&'static str],
}

impl OptionSpec {
    /// A boolean switch, off unless given.
    pub const fn flag(
        long_name: &'static str,
        short_name: Option<char>,
        short_description: &'static str,
    ) -> Self {
        Self {
            long_name,
            short_name,
            takes_argument: false,
            value_name: None,
            choices: &[],
            default_text: None,
            short_description,
            long_description_key: long_name,
            conflicts_with: &[],
        }
    }

    /// An option that takes one argument.
    pub const fn value(
        long_name: &'static str,
        short_name: Option<char>,
        value_name: &'static str,
        short_description: &'static str,
    ) -> Self {
        Self {
            long_name,
            short_name,
            takes_argument: true,
            value_name: Some(value_name),
            choices: &[],
            default_text: None,
            short_description,
            long_description_key: long_name,
            conflicts_with: &[],
        }
    }

    pub const fn with_choices(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = choices;
        self
    }

    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default_text = Some(default);
        self
    }

    pub const fn with_conflicts(mut self, conflicts: &'static [&'static str]) -> Self {
        self.conflicts_with = conflicts;
        self
    }

    pub fn long_name(&self) -> &'static str {
        self.long_name
    }

    pub fn short_name(&self) -> Option<char> {
        self.short_name
    }

    pub fn takes_argument(&self) -> bool {
        self.takes_argument
    }

    /// Value used when neither the environment nor the command line sets one.
    pub fn default_value(&self) -> OptionValue {
        match (self.takes_argument, self.default_text) {
            (false, _) => OptionValue::Flag(false),
            (true, Some(text)) => OptionValue::Text(Cow::Borrowed(text)),
            (true, None) => OptionValue::Unset,
        }
    }

    pub fn short_description(&self) -> &'static str {
        self.short_description
    }

    pub fn choices(&self) -> &'static [&'static str] {
        self.choices
    }

    /// Long help with the program name substituted in.
    ///
    /// Falls back to the short description when no template is registered.
    pub fn render_long_description(&self, app: &str) -> String {
        match long_description(self.long_description_key) {
            Some(template) => template.replace("{app}", app),
            None => self.short_description.to_string(),
        }
    }

    fn to_arg(&self, app: &str) -> Arg {
        let mut arg = Arg::new(self.long_name)
            .long(self.long_name)
            .help(self.short_description)
            .long_help(self.render_long_description(app));
        if let Some(short) = self.short_name {
            arg = arg.short(short);
        }
        if self.takes_argument {
            arg = arg.action(ArgAction::Set);
            if let Some(value_name) = self.value_name {
                arg = arg.value_name(value_name);
            }
            if !self.choices.is_empty() {
                arg = arg.value_parser(PossibleValuesParser::new(self.choices.iter().copied()));
            }
        } else {
            arg = arg.action(ArgAction::SetTrue);
        }
        for other in self.conflicts_with {
            arg = arg.conflicts_with(*other);
        }
        arg
    }
}

/// Convert text to shapes during conversion (`--text-as-shape`, `-s`).
pub const TEXT_AS_SHAPE: OptionSpec =
    OptionSpec::flag("text-as-shape", Some('s'), "convert text to shapes");

pub const TARGET: OptionSpec =
    OptionSpec::value("target", Some('t'), "FORMAT", "target vector format")
        .with_choices(TARGET_FORMATS)
        .with_default("pdf");

pub const VERBOSE: OptionSpec = OptionSpec::flag("verbose", Some('v'), "log progress to stderr")
    .with_conflicts(&["quiet"]);

pub const QUIET: OptionSpec =
    OptionSpec::flag("quiet", Some('q'), "print errors only").with_conflicts(&["verbose"]);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("option --{0} is declared more than once")]
    DuplicateLongName(String),
    #[error("short option -{short} is used by both --{first} and --{second}")]
    DuplicateShortName {
        short: char,
        first: String,
        second: String,
    },
    #[error("unknown option '{0}'")]
    UnknownOption(String),
    #[error("option --{0} is a flag and takes no value")]
    NotAValueOption(String),
    #[error("option --{0} requires a value")]
    NotAFlag(String),
    #[error("invalid value '{value}' for --{option}; expected one of: {}", .choices.join(", "))]
    InvalidValue {
        option: String,
        value: String,
        choices: Vec<String>,
    },
    #[error("{variable}={value} is not usable: {reason}")]
    BadEnvironment {
        variable: String,
        value: String,
        reason: String,
    },
    #[error("--{0} and --{1} cannot be used together")]
    Conflict(String, String),
}

impl OptionsError {
    /// Exit code reported when this error ends the process.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            OptionsError::BadEnvironment { .. } => OPTION_BAD_ENVIRONMENT,
            OptionsError::Conflict(..) => CLI_CONFLICT,
            _ => OPTION_INVALID_VALUE,
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Ordered option declarations plus the values resolved for them.
pub struct ConversionOptions {
    specs: Vec<OptionSpec>,
    values: BTreeMap<&'static str, OptionValue>,
}

impl ConversionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The options of the `svg2vector` front end.
    pub fn standard() -> Self {
        let mut options = Self::new();
        for spec in [TEXT_AS_SHAPE, TARGET, VERBOSE, QUIET] {
            // The built-in set has unique names.
            let _ = options.add(spec);
        }
        options
    }

    /// Register an option, rejecting long or short names already in use.
    pub fn add(&mut self, spec: OptionSpec) -> Result<(), OptionsError> {
        if self.specs.iter().any(|s| s.long_name == spec.long_name) {
            return Err(OptionsError::DuplicateLongName(spec.long_name.to_string()));
        }
        if let Some(short) = spec.short_name {
            if let Some(existing) = self.specs.iter().find(|s| s.short_name == Some(short)) {
                return Err(OptionsError::DuplicateShortName {
                    short,
                    first: existing.long_name.to_string(),
                    second: spec.long_name.to_string(),
                });
            }
        }
        self.specs.push(spec);
        Ok(())
    }

    pub fn specs(&self) -> &[OptionSpec] {
        &self.specs
    }

    /// Look up an option by long name, or by a single-character short name.
    pub fn spec(&self, name: &str) -> Option<&OptionSpec> {
        let name = name.trim_start_matches('-');
        let mut chars = name.chars();
        let short = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        };
        self.specs
            .iter()
            .find(|s| s.long_name == name || (short.is_some() && s.short_name == short))
    }

    /// Set a flag value.
    pub fn set_flag(&mut self, name: &str, value: bool) -> Result<(), OptionsError> {
        let spec = self
            .spec(name)
            .ok_or_else(|| OptionsError::UnknownOption(name.to_string()))?;
        if spec.takes_argument {
            return Err(OptionsError::NotAFlag(spec.long_name.to_string()));
        }
        let long = spec.long_name;
        self.values.insert(long, OptionValue::Flag(value));
        Ok(())
    }

    /// Set the value of an argument-taking option, checking its choices.
    pub fn set_value(&mut self, name: &str, value: &str) -> Result<(), OptionsError> {
        let spec = self
            .spec(name)
            .ok_or_else(|| OptionsError::UnknownOption(name.to_string()))?;
        if !spec.takes_argument {
            return Err(OptionsError::NotAValueOption(spec.long_name.to_string()));
        }
        if !spec.choices.is_empty() && !spec.choices.contains(&value) {
            return Err(OptionsError::InvalidValue {
                option: spec.long_name.to_string(),
                value: value.to_string(),
                choices: spec.choices.iter().map(|c| c.to_string()).collect(),
            });
        }
        let long = spec.long_name;
        self.values
            .insert(long, OptionValue::Text(Cow::Owned(value.to_string())));
        Ok(())
    }

    /// Resolved value of an option: the explicit value, else its default.
    pub fn value(&self, name: &str) -> Option<OptionValue> {
        let spec = self.spec(name)?;
        Some(
            self.values
                .get(spec.long_name)
                .cloned()
                .unwrap_or_else(|| spec.default_value()),
        )
    }

    /// Whether a flag is switched on.
    pub fn is_set(&self, name: &str) -> bool {
        self.value(name)
            .and_then(|value| value.as_flag())
            .unwrap_or(false)
    }

    pub fn text_as_shape(&self) -> bool {
        self.is_set(TEXT_AS_SHAPE.long_name)
    }

    pub fn target(&self) -> Option<&str> {
        let spec = self.spec(TARGET.long_name)?;
        match self.values.get(spec.long_name) {
            Some(value) => value.as_text(),
            None => spec.default_text,
        }
    }

    /// Apply `SVG2VECTOR_TARGET` as the target fallback.
    ///
    /// Run after `apply_matches`: a target given on the command line wins and
    /// the variable is not inspected at all.
    pub fn apply_env(&mut self) -> Result<(), OptionsError> {
        self.apply_target_fallback(env::var_os(ENV_TARGET))
    }

    fn apply_target_fallback(&mut self, raw: Option<OsString>) -> Result<(), OptionsError> {
        if self.spec(TARGET.long_name).is_none() || self.values.contains_key(TARGET.long_name) {
            return Ok(());
        }
        let Some(raw) = raw else {
            return Ok(());
        };
        let raw = raw.into_string().map_err(|raw| OptionsError::BadEnvironment {
            variable: ENV_TARGET.to_string(),
            value: raw.to_string_lossy().into_owned(),
            reason: "value is not valid UTF-8".to_string(),
        })?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(());
        }
        self.set_value(TARGET.long_name, raw)
            .map_err(|err| OptionsError::BadEnvironment {
                variable: ENV_TARGET.to_string(),
                value: raw.to_string(),
                reason: err.to_string(),
            })?;
        debug!(target_format = raw, "target format taken from environment");
        Ok(())
    }

    /// Add one clap argument per registered option.
    pub fn augment(&self, command: Command, app: &str) -> Command {
        self.specs
            .iter()
            .fold(command, |command, spec| command.arg(spec.to_arg(app)))
    }

    /// Copy the options given on the command line into the container.
    ///
    /// Options absent from `matches` keep their current value.
    pub fn apply_matches(&mut self, matches: &ArgMatches) -> Result<(), OptionsError> {
        let specs = self.specs.clone();
        for spec in &specs {
            if spec.takes_argument {
                if let Some(value) = matches.get_one::<String>(spec.long_name) {
                    self.set_value(spec.long_name, value)?;
                }
            } else if matches.get_flag(spec.long_name) {
                self.set_flag(spec.long_name, true)?;
            }
        }
        for spec in &specs {
            for other in spec.conflicts_with {
                if self.is_set(spec.long_name) && self.is_set(other) {
                    return Err(OptionsError::Conflict(
                        spec.long_name.to_string(),
                        other.to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Every option with its resolved value, keyed by long name.
    pub fn resolved(&self) -> BTreeMap<&'static str, OptionValue> {
        self.specs
            .iter()
            .map(|spec| {
                let value = self
                    .values
                    .get(spec.long_name)
                    .cloned()
                    .unwrap_or_else(|| spec.default_value());
                (spec.long_name, value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<ConversionOptions, OptionsError> {
        let mut options = ConversionOptions::standard();
        let command = options.augment(Command::new("svg2vector"), "svg2vector");
        let matches = command
            .try_get_matches_from(std::iter::once("svg2vector").chain(args.iter().copied()))
            .unwrap();
        options.apply_matches(&matches)?;
        Ok(options)
    }

    #[test]
    fn text_as_shape_defaults_to_false() {
        let options = parse(&[]).unwrap();
        assert!(!options.text_as_shape());
        assert_eq!(options.target(), Some("pdf"));
    }

    #[test]
    fn text_as_shape_accepts_long_and_short_forms() {
        assert!(parse(&["--text-as-shape"]).unwrap().text_as_shape());
        assert!(parse(&["-s"]).unwrap().text_as_shape());
    }

    #[test]
    fn text_as_shape_metadata() {
        assert_eq!(TEXT_AS_SHAPE.long_name(), "text-as-shape");
        assert_eq!(TEXT_AS_SHAPE.short_name(), Some('s'));
        assert!(!TEXT_AS_SHAPE.takes_argument());
        assert_eq!(TEXT_AS_SHAPE.default_value(), OptionValue::Flag(false));
        let long = TEXT_AS_SHAPE.render_long_description("svg2vector");
        assert!(long.starts_with("If set, svg2vector converts"));
        assert!(!long.contains("{app}"));
    }

    #[test]
    fn standard_registers_every_option() {
        let options = ConversionOptions::standard();
        let names: Vec<_> = options.specs().iter().map(OptionSpec::long_name).collect();
        assert_eq!(names, vec!["text-as-shape", "target", "verbose", "quiet"]);
    }

    #[test]
    fn command_line_target_wins_over_fallback() {
        let mut options = parse(&["--target", "emf"]).unwrap();
        options
            .apply_target_fallback(Some(OsString::from("png")))
            .unwrap();
        assert_eq!(options.target(), Some("emf"));
    }

    #[test]
    fn fallback_applies_when_target_absent() {
        let mut options = parse(&[]).unwrap();
        options
            .apply_target_fallback(Some(OsString::from(" eps ")))
            .unwrap();
        assert_eq!(options.target(), Some("eps"));

        let mut options = parse(&[]).unwrap();
        let err = options
            .apply_target_fallback(Some(OsString::from("png")))
            .unwrap_err();
        assert!(matches!(err, OptionsError::BadEnvironment { .. }));
        assert_eq!(err.error_code(), OPTION_BAD_ENVIRONMENT);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_fallback_is_rejected() {
        use std::os::unix::ffi::OsStringExt;

        let mut options = ConversionOptions::standard();
        let err = options
            .apply_target_fallback(Some(OsString::from_vec(vec![b'p', 0xff, b'f'])))
            .unwrap_err();
        assert!(matches!(
            err,
            OptionsError::BadEnvironment { ref reason, .. } if reason.contains("UTF-8")
        ));
        assert_eq!(options.target(), Some("pdf"));
    }

    #[test]
    fn target_choice_is_checked() {
        let mut options = ConversionOptions::standard();
        let err = options.set_value("target", "png").unwrap_err();
        assert!(matches!(err, OptionsError::InvalidValue { .. }));
        assert_eq!(err.error_code(), OPTION_INVALID_VALUE);
        options.set_value("t", "emf").unwrap();
        assert_eq!(options.target(), Some("emf"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut options = ConversionOptions::standard();
        assert_eq!(
            options.add(TEXT_AS_SHAPE),
            Err(OptionsError::DuplicateLongName("text-as-shape".to_string()))
        );
        let clash = OptionSpec::flag("shapes", Some('s'), "clashing short name");
        assert!(matches!(
            options.add(clash),
            Err(OptionsError::DuplicateShortName { short: 's', .. })
        ));
    }

    #[test]
    fn spec_lookup_by_short_or_long() {
        let options = ConversionOptions::standard();
        assert_eq!(options.spec("-s").map(OptionSpec::long_name), Some("text-as-shape"));
        assert_eq!(options.spec("--quiet").map(OptionSpec::long_name), Some("quiet"));
        assert!(options.spec("x").is_none());
    }

    #[test]
    fn flags_and_values_are_not_interchangeable() {
        let mut options = ConversionOptions::standard();
        assert!(matches!(
            options.set_value("text-as-shape", "true"),
            Err(OptionsError::NotAValueOption(_))
        ));
        assert!(matches!(
            options.set_flag("target", true),
            Err(OptionsError::NotAFlag(_))
        ));
    }

    #[test]
    fn resolved_lists_every_option() {
        let options = parse(&["-s", "--target", "eps"]).unwrap();
        let resolved = options.resolved();
        assert_eq!(resolved["text-as-shape"], OptionValue::Flag(true));
        assert_eq!(resolved["target"], OptionValue::Text(Cow::Borrowed("eps")));
        assert_eq!(resolved["quiet"], OptionValue::Flag(false));
        assert_eq!(
            serde_json::to_value(&resolved).unwrap(),
            serde_json::json!({
                "quiet": false,
                "target": "eps",
                "text-as-shape": true,
                "verbose": false,
            })
        );
    }

    #[test]
    fn missing_template_falls_back_to_short_description() {
        let spec = OptionSpec::flag("dry-run", None, "do nothing");
        assert_eq!(spec.render_long_description("svg2vector"), "do nothing");
    }
}
