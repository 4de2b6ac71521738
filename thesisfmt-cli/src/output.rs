// Report rendering and output paths for the command line

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thesisfmt_core::{Location, ReportEnvelope, Severity};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("--output must be a directory when checking {0} inputs, found file {1}")]
    NotADirectory(usize, String),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where the report for `input` goes. With several inputs `output` names a
/// directory; with one it names the file itself.
pub fn output_path_for(
    input: &str,
    output: Option<&str>,
    input_count: usize,
    format: OutputFormat,
) -> Result<PathBuf, OutputError> {
    let stem = Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let file_name = format!("{stem}_thesisfmt.{}", format.extension());

    match output {
        Some(path) if input_count == 1 => Ok(PathBuf::from(path)),
        Some(dir) => {
            let dir = Path::new(dir);
            if dir.is_file() {
                return Err(OutputError::NotADirectory(
                    input_count,
                    dir.display().to_string(),
                ));
            }
            Ok(dir.join(file_name))
        }
        None => Ok(PathBuf::from(file_name)),
    }
}

pub fn render(envelope: &ReportEnvelope, format: OutputFormat) -> Result<String, OutputError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(envelope)?),
        OutputFormat::Text => Ok(render_text(envelope)),
    }
}

pub fn describe_location(location: &Location) -> String {
    match location {
        Location::Document => "document".to_string(),
        Location::Section { kind } => format!("section {}", kind.display_name()),
        Location::Paragraph { index } => format!("paragraph {index}"),
        Location::Span { start, end } => format!("paragraphs {start}-{end}"),
        Location::Table { index } => format!("table {}", index + 1),
    }
}

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "ERROR",
        Severity::Warning => "WARN ",
        Severity::Info => "INFO ",
    }
}

/// Plain-text report for terminals and quick reviews
pub fn render_text(envelope: &ReportEnvelope) -> String {
    let report = &envelope.report;
    let result = &report.result;
    let mut out = String::new();

    // Writing to a String can't fail
    let _ = writeln!(out, "Thesis format report: {}", envelope.source);
    let _ = writeln!(out, "Generated: {}", envelope.generated_at.to_rfc3339());
    let _ = writeln!(out, "Package sha256: {}", envelope.package_sha256);
    let _ = writeln!(out);
    let _ = writeln!(out, "Compliance score: {:.1}", result.compliance_score);
    let _ = writeln!(
        out,
        "Checks: {} passed, {} violations, {} total",
        result.passed_checks, result.violations, result.total_checks
    );

    let _ = writeln!(out, "\nSections:");
    for coverage in &result.zone_coverage {
        let mark = if coverage.found { "✓" } else { "✗" };
        let _ = writeln!(out, "  {mark} {}", coverage.section.display_name());
    }

    let counted: Vec<_> = result.category_counts.iter().filter(|c| c.count > 0).collect();
    if !counted.is_empty() {
        let _ = writeln!(out, "\nViolations by category:");
        for count in counted {
            let _ = writeln!(out, "  {:.<30} {}", count.label, count.count);
        }
    }

    if !result.findings.is_empty() {
        let _ = writeln!(out, "\nFindings:");
        for finding in &result.findings {
            let _ = writeln!(
                out,
                "  [{}] {} @ {}: {}",
                severity_tag(finding.severity),
                finding.rule_id,
                describe_location(&finding.location),
                finding.message
            );
            if let Some(snippet) = &finding.snippet {
                let _ = writeln!(out, "          \"{snippet}\"");
            }
        }
    }

    if !report.spelling_flags.is_empty() {
        let _ = writeln!(out, "\nSpelling ({} flagged):", report.spelling_flags.len());
        for flag in &report.spelling_flags {
            let _ = writeln!(out, "  paragraph {}: {}", flag.paragraph, flag.word);
        }
    }

    if !report.content_notes.is_empty() {
        let _ = writeln!(out, "\nContent notes:");
        for note in &report.content_notes {
            let _ = writeln!(out, "  {}: {}", note.section.display_name(), note.message);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use thesisfmt_core::{
        AnalysisResult, Category, Finding, FindingKind, Report, SectionCoverage, SectionKind,
        DocumentStatistics,
    };

    fn envelope() -> ReportEnvelope {
        let result = AnalysisResult {
            findings: vec![Finding {
                kind: FindingKind::Structural,
                location: Location::Section {
                    kind: SectionKind::Bibliography,
                },
                category: Category::Section,
                rule_id: "structure.required_section".to_string(),
                expected: "present".to_string(),
                actual: "missing".to_string(),
                severity: Severity::Error,
                message: "Bibliography section not found".to_string(),
                snippet: None,
            }],
            total_checks: 4,
            passed_checks: 3,
            violations: 1,
            compliance_score: 75.0,
            zone_coverage: vec![SectionCoverage {
                section: SectionKind::Bibliography,
                found: false,
                heading: None,
            }],
            category_counts: Vec::new(),
            zone_counts: Vec::new(),
            statistics: DocumentStatistics::default(),
        };
        ReportEnvelope::new("tez.docx", "abc".to_string(), "def".to_string(), Report::new(result))
    }

    #[test]
    fn test_text_report_lists_findings() {
        let text = render_text(&envelope());
        assert!(text.contains("Compliance score: 75.0"));
        assert!(text.contains("✗ Bibliography"));
        assert!(text.contains("Bibliography section not found"));
    }

    #[test]
    fn test_json_report_has_envelope_fields() {
        let json = render(&envelope(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["schema_version"], "1.0");
        assert_eq!(value["report"]["result"]["compliance_score"], 75.0);
    }

    #[test]
    fn test_output_paths() {
        let single = output_path_for("theses/tez.docx", None, 1, OutputFormat::Json).unwrap();
        assert_eq!(single, PathBuf::from("tez_thesisfmt.json"));

        let named = output_path_for("tez.docx", Some("out.txt"), 1, OutputFormat::Text).unwrap();
        assert_eq!(named, PathBuf::from("out.txt"));

        let many = output_path_for("a/tez.docx", Some("reports"), 3, OutputFormat::Text).unwrap();
        assert_eq!(many, PathBuf::from("reports/tez_thesisfmt.txt"));
    }
}
