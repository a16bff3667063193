//! Concrete error codes allocated inside the registry categories.

use super::{CLI, Category, GENERAL, OPTIONS, OUTPUT, Registry, Violation};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// A named exit code owned by one category.
pub struct ErrorCode {
    name: &'static str,
    category: &'static str,
    code: i32,
    description: &'static str,
}

impl ErrorCode {
    pub const fn new(
        name: &'static str,
        category: &'static str,
        code: i32,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            category,
            code,
            description,
        }
    }

    /// Allocate the code `offset` steps into `category`.
    ///
    /// Out-of-range offsets still produce a code; the table check reports them.
    pub const fn in_category(
        category: Category,
        offset: i32,
        name: &'static str,
        description: &'static str,
    ) -> Self {
        Self::new(name, category.name(), category.start() - offset, description)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name of the owning category.
    pub fn category(&self) -> &'static str {
        self.category
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

pub const UNKNOWN: ErrorCode =
    ErrorCode::in_category(GENERAL, 0, "general.unknown", "unexpected failure");
pub const REGISTRY_INVALID: ErrorCode = ErrorCode::in_category(
    GENERAL,
    1,
    "general.registry-invalid",
    "the built-in error code registry failed its self-check",
);
pub const CLI_USAGE: ErrorCode = ErrorCode::in_category(
    CLI,
    0,
    "cli.usage",
    "unknown flag or malformed command line",
);
pub const CLI_CONFLICT: ErrorCode = ErrorCode::in_category(
    CLI,
    1,
    "cli.conflict",
    "flags that cannot be used together",
);
pub const OPTION_INVALID_VALUE: ErrorCode = ErrorCode::in_category(
    OPTIONS,
    0,
    "options.invalid-value",
    "an option value is not one of the accepted choices",
);
pub const OPTION_BAD_ENVIRONMENT: ErrorCode = ErrorCode::in_category(
    OPTIONS,
    1,
    "options.bad-environment",
    "an environment override holds an unusable value",
);
pub const OUTPUT_WRITE: ErrorCode = ErrorCode::in_category(
    OUTPUT,
    0,
    "output.write",
    "the output file could not be written",
);
pub const OUTPUT_DIRECTORY: ErrorCode = ErrorCode::in_category(
    OUTPUT,
    1,
    "output.directory",
    "the output directory does not exist",
);

/// Codes the command line front end can exit with.
pub const ERROR_CODES: &[ErrorCode] = &[
    UNKNOWN,
    REGISTRY_INVALID,
    CLI_USAGE,
    CLI_CONFLICT,
    OPTION_INVALID_VALUE,
    OPTION_BAD_ENVIRONMENT,
    OUTPUT_WRITE,
    OUTPUT_DIRECTORY,
];

/// Resolve a built-in code by number.
pub fn lookup(code: i32) -> Option<&'static ErrorCode> {
    ERROR_CODES.iter().find(|entry| entry.code == code)
}

/// Built-in codes owned by `category`, in table order.
pub fn codes_in<'a>(
    category: &'a Category,
    codes: &'a [ErrorCode],
) -> impl Iterator<Item = &'a ErrorCode> {
    codes.iter().filter(move |entry| entry.category == category.name())
}

/// Check a code table against a registry, reporting every problem.
pub fn violations(registry: &Registry, codes: &[ErrorCode]) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut names: BTreeSet<&str> = BTreeSet::new();
    let mut by_code: BTreeMap<i32, &str> = BTreeMap::new();

    for entry in codes {
        if !names.insert(entry.name) {
            violations.push(Violation::DuplicateCodeName {
                name: entry.name.to_string(),
            });
        }
        if entry.description.trim().is_empty() {
            violations.push(Violation::BlankCodeDescription {
                name: entry.name.to_string(),
            });
        }
        match registry.find(entry.category) {
            None => violations.push(Violation::UnknownCategory {
                name: entry.name.to_string(),
                category: entry.category.to_string(),
            }),
            Some(cat) if !cat.contains(entry.code) => {
                violations.push(Violation::CodeOutOfRange {
                    name: entry.name.to_string(),
                    code: entry.code,
                    category: cat.name().to_string(),
                    start: cat.start(),
                    end: cat.end(),
                })
            }
            Some(_) => {}
        }
        if let Some(first) = by_code.get(&entry.code) {
            violations.push(Violation::DuplicateCode {
                code: entry.code,
                first: first.to_string(),
                second: entry.name.to_string(),
            });
        } else {
            by_code.insert(entry.code, entry.name);
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_codes_sit_inside_their_categories() {
        assert!(violations(Registry::builtin(), ERROR_CODES).is_empty());
        assert_eq!(UNKNOWN.code(), -1);
        assert_eq!(REGISTRY_INVALID.code(), -2);
        assert_eq!(CLI_USAGE.code(), -10);
        assert_eq!(OUTPUT_WRITE.code(), -70);
    }

    #[test]
    fn lookup_by_number() {
        assert_eq!(lookup(-31).map(ErrorCode::name), Some("options.bad-environment"));
        assert!(lookup(-500).is_none());
    }

    #[test]
    fn reports_out_of_range_and_duplicates() {
        let registry = Registry::new(vec![Category::new("io", "io errors", -1, -3)]);
        let codes = [
            ErrorCode::new("io.read", "io", -1, "read failed"),
            ErrorCode::new("io.write", "io", -1, "write failed"),
            ErrorCode::new("io.far", "io", -4, "past the end"),
            ErrorCode::new("net.down", "net", -2, "no such category"),
            ErrorCode::new("io.read", "io", -3, " "),
        ];
        let found = violations(&registry, &codes);
        assert_eq!(
            found,
            vec![
                Violation::DuplicateCode {
                    code: -1,
                    first: "io.read".to_string(),
                    second: "io.write".to_string(),
                },
                Violation::CodeOutOfRange {
                    name: "io.far".to_string(),
                    code: -4,
                    category: "io".to_string(),
                    start: -1,
                    end: -3,
                },
                Violation::UnknownCategory {
                    name: "net.down".to_string(),
                    category: "net".to_string(),
                },
                Violation::DuplicateCodeName {
                    name: "io.read".to_string(),
                },
                Violation::BlankCodeDescription {
                    name: "io.read".to_string(),
                },
            ]
        );
    }

    #[test]
    fn codes_in_filters_by_category() {
        let names: Vec<_> = codes_in(&GENERAL, ERROR_CODES).map(ErrorCode::name).collect();
        assert_eq!(names, vec!["general.unknown", "general.registry-invalid"]);
    }
}
