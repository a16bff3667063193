//! Registry self-check run by the binary before any action.

use crate::registry::codes;
use crate::registry::{ErrorCode, Registry, RegistryInvariantViolation};
use anyhow::{Context, Result};
use std::io::Write;
use tracing::error;

/// Validate a category table together with the code table allocated in it.
pub fn check_tables(
    registry: &Registry,
    codes: &[ErrorCode],
) -> Result<(), RegistryInvariantViolation> {
    let mut violations = registry.violations();
    violations.extend(codes::violations(registry, codes));
    RegistryInvariantViolation::from_violations(violations)
}

/// Startup gate: logs every violation and fails with the whole set.
pub fn startup_check(registry: &Registry, codes: &[ErrorCode]) -> Result<()> {
    if let Err(violation) = check_tables(registry, codes) {
        for v in &violation.violations {
            error!("{v}");
        }
        return Err(violation.into());
    }
    Ok(())
}

/// `--check-registry`: writes `PASS` with a summary, or `FAIL` and one line per
/// violation, then fails with the violations.
pub fn report_check(registry: &Registry, codes: &[ErrorCode], out: &mut impl Write) -> Result<()> {
    match check_tables(registry, codes) {
        Ok(()) => {
            writeln!(
                out,
                "error code registry: PASS ({} categories, {} codes)",
                registry.values().len(),
                codes.len()
            )
            .context("writing check result")?;
            Ok(())
        }
        Err(violation) => {
            writeln!(out, "error code registry: FAIL").context("writing check result")?;
            for v in &violation.violations {
                writeln!(out, "  - {v}").context("writing check result")?;
            }
            Err(violation.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_code;
    use crate::registry::codes::REGISTRY_INVALID;
    use crate::registry::{Category, ERROR_CODES};

    fn broken() -> (Registry, Vec<ErrorCode>) {
        let registry = Registry::new(vec![
            Category::new("io", "io errors", -1, -10),
            Category::new("net", "network errors", -5, -20),
        ]);
        let codes = vec![ErrorCode::new("io.far", "io", -30, "past the end")];
        (registry, codes)
    }

    #[test]
    fn builtin_tables_pass() {
        let mut out = Vec::new();
        report_check(Registry::builtin(), ERROR_CODES, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "error code registry: PASS (6 categories, 8 codes)\n");
        startup_check(Registry::builtin(), ERROR_CODES).unwrap();
    }

    #[test]
    fn broken_tables_list_every_violation() {
        let (registry, codes) = broken();
        let mut out = Vec::new();
        let err = report_check(&registry, &codes, &mut out).unwrap_err();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec![
                "error code registry: FAIL",
                "  - categories 'io' and 'net' both claim codes -5..-10",
                "  - error code 'io.far' (-30) lies outside category 'io' [-1..-10]",
            ]
        );
        assert_eq!(exit_code(&err), REGISTRY_INVALID);
    }

    #[test]
    fn startup_check_fails_with_registry_code() {
        let (registry, codes) = broken();
        let err = startup_check(&registry, &codes).unwrap_err();
        let violation = err
            .downcast_ref::<RegistryInvariantViolation>()
            .expect("typed violation");
        assert_eq!(violation.violations.len(), 2);
        assert_eq!(exit_code(&err), REGISTRY_INVALID);
    }
}
