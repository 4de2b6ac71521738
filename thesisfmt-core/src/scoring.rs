// Roll an evaluation up into the final AnalysisResult

use crate::rules::engine::Evaluation;
use crate::rules::structural::StructuralChecker;
use crate::segmentation::{word_count, Segmentation};
use crate::types::{
    AnalysisResult, Category, CategoryCount, Document, DocumentStatistics, ParagraphSource,
    SectionCoverage, Zone, ZoneCount,
};
use std::collections::BTreeSet;
use tracing::info;

/// `100 * (1 - violations / checks)`, clamped to 0..=100 and rounded to one
/// decimal. No checks means nothing failed.
pub fn compliance_score(violations: usize, total_checks: usize) -> f64 {
    if total_checks == 0 {
        return 100.0;
    }
    let raw = 100.0 * (1.0 - violations as f64 / total_checks as f64);
    (raw.clamp(0.0, 100.0) * 10.0).round() / 10.0
}

pub fn aggregate(
    evaluation: Evaluation,
    coverage: Vec<SectionCoverage>,
    zone_counts: Vec<ZoneCount>,
    statistics: DocumentStatistics,
) -> AnalysisResult {
    let Evaluation {
        findings,
        checks_performed,
    } = evaluation;
    let violations = findings.len();
    let passed_checks = checks_performed.saturating_sub(violations);
    let total_checks = checks_performed.max(violations);

    let category_counts = Category::ALL
        .iter()
        .map(|&category| CategoryCount {
            category,
            label: category.label().to_string(),
            count: findings.iter().filter(|f| f.category == category).count(),
        })
        .collect();

    let compliance_score = compliance_score(violations, total_checks);
    info!(
        "Score {:.1} ({} violations in {} checks)",
        compliance_score, violations, total_checks
    );

    AnalysisResult {
        findings,
        total_checks,
        passed_checks,
        violations,
        compliance_score,
        zone_coverage: coverage,
        category_counts,
        zone_counts,
        statistics,
    }
}

/// Counts reported alongside the score
pub fn collect_statistics(
    document: &Document,
    segmentation: &Segmentation,
    structural: &StructuralChecker,
) -> DocumentStatistics {
    let count_zone = |zone: Zone| segmentation.zones.iter().filter(|z| **z == zone).count();
    let footnotes: BTreeSet<i64> = document
        .paragraphs
        .iter()
        .filter_map(|p| match p.source {
            ParagraphSource::Footnote { note_id } => Some(note_id),
            _ => None,
        })
        .collect();

    DocumentStatistics {
        paragraphs: document.paragraphs.len(),
        non_blank_paragraphs: document.paragraphs.iter().filter(|p| !p.is_blank()).count(),
        tables: document.table_count(),
        table_captions: count_zone(Zone::TableCaption),
        figure_captions: count_zone(Zone::FigureCaption),
        footnotes: footnotes.len(),
        toc_entries: structural.toc_entries(document, segmentation).len(),
        abstract_word_counts: segmentation
            .spans(Zone::Abstract)
            .into_iter()
            .map(|(start, end)| {
                word_count(&segmentation.span_text(document, Zone::Abstract, start, end))
            })
            .collect(),
    }
}
