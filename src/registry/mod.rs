//! Error-code category registry.
//!
//! Every failure the tool reports maps to a negative exit code, and every
//! code belongs to exactly one category. The built-in table is a `static`
//! and never changes at runtime; `Registry::new` exists so tooling and tests
//! can check arbitrary tables with the same rules.
//!
//! Validation is exhaustive: `violations` keeps scanning after the first
//! offender so a broken table reports every defect at once.

pub mod category;
pub mod codes;

pub use category::Category;
pub use codes::{ERROR_CODES, ErrorCode};

use std::borrow::Cow;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

pub const GENERAL: Category = Category::new(
    "general",
    "General application failures not tied to a specific stage",
    -1,
    -9,
);
pub const CLI: Category = Category::new(
    "cli",
    "Command line usage errors: unknown flags, missing or conflicting arguments",
    -10,
    -29,
);
pub const OPTIONS: Category = Category::new(
    "options",
    "Option and configuration errors: invalid values, unsupported targets, bad environment",
    -30,
    -49,
);
pub const INPUT: Category = Category::new(
    "input",
    "Input errors: missing, unreadable or malformed SVG documents",
    -50,
    -69,
);
pub const OUTPUT: Category = Category::new(
    "output",
    "Output errors: target files or directories that cannot be created or written",
    -70,
    -89,
);
pub const CONVERSION: Category = Category::new(
    "conversion",
    "Conversion errors raised while rewriting SVG into the target vector format",
    -90,
    -119,
);

/// Built-in categories in declaration order.
pub const CATEGORIES: &[Category] = &[GENERAL, CLI, OPTIONS, INPUT, OUTPUT, CONVERSION];

static BUILTIN: Registry = Registry {
    categories: Cow::Borrowed(CATEGORIES),
};

/// One broken invariant in a category table or error-code table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("category '{name}' has a blank description")]
    BlankDescription { name: String },
    #[error("category '{name}' starts at {start}; ranges must start below zero")]
    NonNegativeStart { name: String, start: i32 },
    #[error("category '{name}' ends at {end}; the end must be below its start {start}")]
    EmptyRange { name: String, start: i32, end: i32 },
    #[error("category name '{name}' is declared more than once")]
    DuplicateCategory { name: String },
    #[error("categories '{first}' and '{second}' both claim codes {high}..{low}")]
    Overlap {
        first: String,
        second: String,
        high: i32,
        low: i32,
    },
    #[error("error code '{name}' references unknown category '{category}'")]
    UnknownCategory { name: String, category: String },
    #[error("error code '{name}' ({code}) lies outside category '{category}' [{start}..{end}]")]
    CodeOutOfRange {
        name: String,
        code: i32,
        category: String,
        start: i32,
        end: i32,
    },
    #[error("error codes '{first}' and '{second}' share the number {code}")]
    DuplicateCode {
        code: i32,
        first: String,
        second: String,
    },
    #[error("error code name '{name}' is declared more than once")]
    DuplicateCodeName { name: String },
    #[error("error code '{name}' has a blank description")]
    BlankCodeDescription { name: String },
}

impl Violation {
    /// Codes claimed twice, for overlap violations.
    pub fn overlapping_codes(&self) -> Option<std::ops::RangeInclusive<i32>> {
        match self {
            Violation::Overlap { high, low, .. } => Some(*low..=*high),
            _ => None,
        }
    }
}

/// A category or code table that breaks at least one invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error code registry is ill-formed: {} violation(s)", .violations.len())]
pub struct RegistryInvariantViolation {
    pub violations: Vec<Violation>,
}

impl RegistryInvariantViolation {
    pub fn from_violations(violations: Vec<Violation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self { violations })
        }
    }
}

#[derive(Debug, Clone)]
/// Ordered, read-only collection of categories.
pub struct Registry {
    categories: Cow<'static, [Category]>,
}

impl Registry {
    /// The registry compiled into the binary.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    /// Wrap an arbitrary table. The table is not validated; call `validate`.
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories: Cow::Owned(categories),
        }
    }

    /// Categories in declaration order.
    pub fn values(&self) -> &[Category] {
        &self.categories
    }

    pub fn find(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|cat| cat.name() == name)
    }

    /// The first category (in declaration order) whose range holds `code`.
    pub fn category_of(&self, code: i32) -> Option<&Category> {
        self.categories.iter().find(|cat| cat.contains(code))
    }

    /// Every invariant violation, in declaration order.
    pub fn violations(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut names: BTreeSet<&str> = BTreeSet::new();

        for (idx, cat) in self.categories.iter().enumerate() {
            debug!(
                category = cat.name(),
                start = cat.start(),
                end = cat.end(),
                "checking category"
            );
            if !names.insert(cat.name()) {
                violations.push(Violation::DuplicateCategory {
                    name: cat.name().to_string(),
                });
            }
            if cat.description().trim().is_empty() {
                violations.push(Violation::BlankDescription {
                    name: cat.name().to_string(),
                });
            }
            if cat.start() >= 0 {
                violations.push(Violation::NonNegativeStart {
                    name: cat.name().to_string(),
                    start: cat.start(),
                });
            }
            if cat.end() >= cat.start() {
                violations.push(Violation::EmptyRange {
                    name: cat.name().to_string(),
                    start: cat.start(),
                    end: cat.end(),
                });
            }
            for earlier in &self.categories[..idx] {
                if let Some((high, low)) = earlier.shared_span(cat) {
                    violations.push(Violation::Overlap {
                        first: earlier.name().to_string(),
                        second: cat.name().to_string(),
                        high,
                        low,
                    });
                }
            }
        }

        violations
    }

    /// Fails with every violation found, or succeeds when the table is sound.
    pub fn validate(&self) -> Result<(), RegistryInvariantViolation> {
        RegistryInvariantViolation::from_violations(self.violations())
    }
}

/// Validate the built-in categories together with the built-in code table.
pub fn self_check() -> Result<(), RegistryInvariantViolation> {
    crate::check::check_tables(Registry::builtin(), ERROR_CODES)
}
