//! Diagnostic rendering for the command line

use ariadne::{Color, Label, Report, ReportKind, Source};
use std::collections::BTreeSet;
use tsgd_typeck::{Diagnostic, Severity};
use crate::project::{BuildStep, ProjectModel};

/// Prints one diagnostic of `file`. With the source at hand the message is
/// shown as a labelled snippet; without it, as a single line.
pub fn render(file: &str, source: Option<&str>, diagnostic: &Diagnostic) {
    let Some(source) = source else {
        eprintln!("{}: {}", file, diagnostic);
        return;
    };

    let (line, column) = diagnostic.span.line_col(source);
    let start = char_offset(source, diagnostic.span.start);
    let end = char_offset(source, diagnostic.span.end).max(start);
    let (kind, color) = match diagnostic.severity {
        Severity::Error => (ReportKind::Error, Color::Red),
        Severity::Warning => (ReportKind::Warning, Color::Yellow),
    };

    let span = (file, start..end);
    let printed = Report::build(kind, span.clone())
        .with_code(diagnostic.code.as_str())
        .with_message(format!("{}:{}:{}: {}", file, line, column, diagnostic.message))
        .with_label(Label::new(span).with_message(&diagnostic.message).with_color(color))
        .finish()
        .eprint((file, Source::from(source)));
    if let Err(io_error) = printed {
        log::error!("failed to print diagnostic for {}: {}", file, io_error);
    }
}

/// Prints the current diagnostics of every asset. Returns the error count.
pub fn report_all(model: &ProjectModel) -> usize {
    let assets = model.assets_with_diagnostics();
    report_assets(model, assets.iter().map(String::as_str))
}

/// Prints the diagnostics of the assets touched by `steps`. Returns the
/// error count.
pub fn report_steps(model: &ProjectModel, steps: &[BuildStep]) -> usize {
    let touched: BTreeSet<&str> = steps
        .iter()
        .map(|step| match step {
            BuildStep::Synthesized(path) | BuildStep::Compiled(path) => path.as_str(),
        })
        .collect();
    report_assets(model, touched.into_iter())
}

fn report_assets<'a>(model: &ProjectModel, assets: impl Iterator<Item = &'a str>) -> usize {
    let mut errors = 0;
    for asset in assets {
        let diagnostics = model.diagnostics(asset);
        if diagnostics.is_empty() {
            continue;
        }
        let source = model.source_of(asset);
        for diagnostic in &diagnostics {
            render(asset, source.as_deref(), diagnostic);
            if diagnostic.is_error() {
                errors += 1;
            }
        }
    }
    errors
}

/// Character index of byte offset `byte`, which is what the snippet
/// renderer counts in.
fn char_offset(source: &str, byte: usize) -> usize {
    let byte = byte.min(source.len());
    source
        .get(..byte)
        .map_or(0, |prefix| prefix.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_offset() {
        let source = "let é = 1;";
        assert_eq!(char_offset(source, 4), 4);
        // Byte 7 is just past the two-byte `é`
        assert_eq!(char_offset(source, 7), 6);
        assert_eq!(char_offset(source, 100), source.chars().count());
        // Inside a multi-byte character
        assert_eq!(char_offset(source, 5), 0);
    }
}
