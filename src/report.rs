//! Snapshot of the registry and its codes for listing and export.

use crate::registry::codes::codes_in;
use crate::registry::{ErrorCode, Registry};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;

/// Version marker written into exported reports.
pub const REPORT_SCHEMA_VERSION: &str = "svg2vector_error_codes_v1";

#[derive(Debug, Serialize)]
pub struct RegistryReport<'a> {
    pub schema_version: &'static str,
    pub categories: Vec<CategoryEntry<'a>>,
}

#[derive(Debug, Serialize)]
pub struct CategoryEntry<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub start: i32,
    pub end: i32,
    pub codes: Vec<&'a ErrorCode>,
}

impl<'a> RegistryReport<'a> {
    /// Group `codes` under the registry categories, in declaration order.
    pub fn build(registry: &'a Registry, codes: &'a [ErrorCode]) -> Self {
        let categories = registry
            .values()
            .iter()
            .map(|cat| CategoryEntry {
                name: cat.name(),
                description: cat.description(),
                start: cat.start(),
                end: cat.end(),
                codes: codes_in(cat, codes).collect(),
            })
            .collect();
        Self {
            schema_version: REPORT_SCHEMA_VERSION,
            categories,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serializing error code report")
    }

    /// Aligned plain-text table, one line per category followed by its codes.
    pub fn to_text(&self) -> String {
        let width = self
            .categories
            .iter()
            .flat_map(|cat| cat.codes.iter().map(|code| code.name().len()))
            .chain(self.categories.iter().map(|cat| cat.name.len()))
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for cat in &self.categories {
            let _ = writeln!(
                out,
                "{:<width$}  {:>6}..{:<6}  {}",
                cat.name, cat.start, cat.end, cat.description
            );
            for code in &cat.codes {
                let _ = writeln!(
                    out,
                    "  {:<w$}  {:>6}  {}",
                    code.name(),
                    code.code(),
                    code.description(),
                    w = width.saturating_sub(2)
                );
            }
        }
        out
    }
}
