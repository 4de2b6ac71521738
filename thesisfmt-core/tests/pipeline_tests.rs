//! Pipeline tests: whole packages in, AnalysisResult out.
//!
//! Every fixture is built in memory (see `common`), starting from a style
//! sheet that already satisfies the default guide, so each test only
//! introduces the deviation it is about.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use thesisfmt_core::casefold::CaseFold;
use thesisfmt_core::report::{ContentNote, Report};
use thesisfmt_core::{
    AnalysisResult, Analyzer, Locale, Location, SectionKind, Severity, StyleGuideConfig, Zone,
};

// ============================================================================
// Helpers
// ============================================================================

fn analyzer() -> Analyzer {
    Analyzer::new(StyleGuideConfig::default()).unwrap()
}

fn analyze(builder: &DocxBuilder) -> AnalysisResult {
    analyzer().analyze_bytes(&builder.build()).unwrap()
}

fn count_rule(result: &AnalysisResult, rule_id: &str) -> usize {
    result.findings_for_rule(rule_id).count()
}

fn with_front(abstract_words: usize) -> DocxBuilder {
    DocxBuilder::new().extend(thesis_front(abstract_words))
}

// ============================================================================
// Segmentation boundaries
// ============================================================================

mod segmentation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn abstract_runs_from_ozet_to_introduction() {
        let builder = DocxBuilder::new()
            .push(para("T.C."))
            .push(para("ÖRNEK ÜNİVERSİTESİ"))
            .push(para("Tez Başlığı"))
            .push(heading("ÖZET"))
            .push(words(120))
            .push(words(90))
            .push(heading("1. GİRİŞ"))
            .push(para("Giriş metni."));

        let stages = analyzer().capture_stages(&builder.build()).unwrap();
        let zones = &stages.segmentation.zones;

        assert!(zones[..4].iter().all(|z| *z != Zone::Abstract));
        assert_eq!(zones[4], Zone::Abstract);
        assert_eq!(zones[5], Zone::Abstract);
        assert_eq!(zones[6], Zone::ChapterHeading);
        assert_eq!(zones[7], Zone::Body);
        assert_eq!(stages.result.statistics.abstract_word_counts, vec![210]);
    }

    #[test]
    fn lower_case_heading_is_folded_the_turkish_way() {
        let builder = DocxBuilder::new()
            .push(heading("giriş"))
            .push(para("Giriş metni."));
        let stages = analyzer().capture_stages(&builder.build()).unwrap();
        assert_eq!(
            stages.segmentation.boundaries[0].kind,
            SectionKind::Introduction
        );
        // Recognised, but still reported for not being in capitals
        assert_eq!(count_rule(&stages.result, "chapter.uppercase"), 1);
    }

    #[test]
    fn footnotes_and_page_numbers_get_their_zones() {
        let builder = with_front(220)
            .footnote("Dipnot açıklaması.")
            .page_number_footer();
        let stages = analyzer().capture_stages(&builder.build()).unwrap();
        let zones = &stages.segmentation.zones;
        let last = zones.len() - 1;

        assert_eq!(zones[last - 1], Zone::Footnote);
        assert_eq!(zones[last], Zone::PageNumber);
        assert_eq!(stages.result.statistics.footnotes, 1);

        let footnote_findings = stages
            .result
            .findings
            .iter()
            .filter(|f| f.rule_id.starts_with("footnote.") || f.rule_id.starts_with("page_number."))
            .count();
        assert_eq!(footnote_findings, 0);
    }
}

// ============================================================================
// Rule evaluation properties
// ============================================================================

mod rules {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn abstract_word_count_bounds_are_inclusive() {
        for (words, expected) in [(199, 1), (200, 0), (250, 0), (251, 1)] {
            let result = analyze(&with_front(words));
            assert_eq!(
                count_rule(&result, "abstract.word_count"),
                expected,
                "abstract of {words} words"
            );
        }
    }

    #[test]
    fn abstract_word_count_finding_covers_the_span() {
        let result = analyze(&with_front(251));
        let finding = result.findings_for_rule("abstract.word_count").next().unwrap();
        assert_eq!(finding.location, Location::Span { start: 4, end: 4 });
        assert_eq!(finding.expected, "200-250 words");
        assert_eq!(finding.actual, "251 words");
    }

    #[test]
    fn margin_within_tolerance_passes() {
        let result = analyze(&with_front(220).left_margin_twips(1672));
        assert_eq!(count_rule(&result, "page.margin.left"), 0);
    }

    #[test]
    fn margin_outside_tolerance_fails_once() {
        let result = analyze(&with_front(220).left_margin_twips(1644));
        let findings: Vec<_> = result
            .findings
            .iter()
            .filter(|f| f.rule_id.starts_with("page.margin."))
            .collect();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "page.margin.left");
        assert_eq!(findings[0].location, Location::Document);
        assert_eq!(findings[0].expected, "3 cm (±0.05)");
        assert_eq!(findings[0].actual, "2.9 cm");
    }

    #[test]
    fn caption_numbering_needs_chapter_and_sequence() {
        let good = analyze(
            &with_front(220)
                .push(para("Tablo 3.2: Başlık"))
                .push(table(&["hücre"])),
        );
        assert_eq!(count_rule(&good, "caption.numbering"), 0);

        let bad = analyze(
            &with_front(220)
                .push(para("Tablo 3: Başlık"))
                .push(table(&["hücre"])),
        );
        let findings: Vec<_> = bad.findings_for_rule("caption.numbering").collect();
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].location,
            Location::Paragraph {
                index: thesis_front(220).len()
            }
        );
    }

    #[test]
    fn caption_number_with_extra_level_fails() {
        let result = analyze(
            &with_front(220)
                .push(para("Tablo 3.2.1: Başlık"))
                .push(table(&["hücre"])),
        );
        assert_eq!(count_rule(&result, "caption.numbering"), 1);
    }

    #[test]
    fn table_inside_abstract_does_not_split_the_word_count() {
        let mut front = thesis_front(120);
        // after the first 120 words, before the keywords line
        front.splice(5..5, [table(&["hücre"]), words(110)]);
        let result = analyze(&DocxBuilder::new().extend(front));

        assert_eq!(count_rule(&result, "abstract.word_count"), 0);
        assert_eq!(result.statistics.abstract_word_counts[0], 230);
    }

    #[test]
    fn one_finding_per_violated_rule_per_paragraph() {
        let small_runs = r#"<w:p><w:r><w:rPr><w:sz w:val="20"/></w:rPr><w:t xml:space="preserve">Küçük </w:t></w:r><w:r><w:rPr><w:sz w:val="20"/></w:rPr><w:t xml:space="preserve">yazı </w:t></w:r><w:r><w:rPr><w:sz w:val="18"/></w:rPr><w:t>burada.</w:t></w:r></w:p>"#;
        let result = analyze(&with_front(220).push(small_runs));
        let sizes: Vec<_> = result.findings_for_rule("body.font_size").collect();
        assert_eq!(sizes.len(), 1);
        assert_eq!(sizes[0].actual, "10 pt");
    }

    #[test]
    fn size_within_tolerance_has_no_finding() {
        let close = r#"<w:p><w:r><w:rPr><w:sz w:val="23"/></w:rPr><w:t>Neredeyse on iki punto.</w:t></w:r></w:p>"#;
        let result = analyze(&with_front(220).push(close));
        assert_eq!(count_rule(&result, "body.font_size"), 0);
    }
}

// ============================================================================
// Structure and coverage
// ============================================================================

mod structure {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_bibliography_is_structural_only() {
        let result = analyze(&with_front(220).push(heading("2. SONUÇ")).push(para("Sonuç metni.")));

        let structural: Vec<_> = result.structural_findings().collect();
        assert_eq!(structural.len(), 1);
        assert_eq!(structural[0].message, "Bibliography section not found");
        assert_eq!(
            structural[0].location,
            Location::Section {
                kind: SectionKind::Bibliography
            }
        );
        assert!(result
            .findings
            .iter()
            .all(|f| !f.rule_id.starts_with("bibliography.")));

        let bibliography = result
            .zone_coverage
            .iter()
            .find(|c| c.section == SectionKind::Bibliography)
            .unwrap();
        assert!(!bibliography.found);
    }

    #[test]
    fn complete_thesis_covers_every_required_section() {
        let builder = with_front(220)
            .push(heading("2. SONUÇ"))
            .push(para("Sonuç metni."))
            .push(heading("KAYNAKÇA"))
            .push(para("Yılmaz, A. (2020). Tez Yazım Kılavuzu. Ankara: Yayınevi."));
        let result = analyze(&builder);

        assert!(result.zone_coverage.iter().all(|c| c.found));
        assert_eq!(result.structural_findings().count(), 0);
        assert_eq!(count_rule(&result, "bibliography.year"), 0);
        assert_eq!(count_rule(&result, "bibliography.author"), 0);
        assert_eq!(result.statistics.toc_entries, 3);
        assert_eq!(count_rule(&result, "toc.entry_missing"), 0);
        assert_eq!(count_rule(&result, "toc.heading_missing"), 0);
    }
}

// ============================================================================
// Aggregation
// ============================================================================

mod aggregation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn counts_are_consistent() {
        let result = analyze(&with_front(251).left_margin_twips(1644));
        assert_eq!(result.violations, result.findings.len());
        assert_eq!(result.total_checks, result.passed_checks + result.violations);
        let expected =
            (100.0 * (1.0 - result.violations as f64 / result.total_checks as f64) * 10.0).round()
                / 10.0;
        assert_eq!(result.compliance_score, expected);

        let by_category: usize = result.category_counts.iter().map(|c| c.count).sum();
        assert_eq!(by_category, result.violations);
    }

    #[test]
    fn results_are_deterministic() {
        let bytes = with_front(251)
            .left_margin_twips(1644)
            .push(para("Tablo 3: Başlık"))
            .footnote("Dipnot.")
            .build();
        let first = serde_json::to_string(&analyzer().analyze_bytes(&bytes).unwrap()).unwrap();
        let second = serde_json::to_string(&analyzer().analyze_bytes(&bytes).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn external_notes_leave_the_score_alone() {
        let result = analyze(&with_front(199));
        let score = result.compliance_score;

        let mut report = Report::new(result);
        report.merge_content_notes(vec![ContentNote {
            section: SectionKind::Abstract,
            severity: Severity::Warning,
            message: "Abstract does not state the method".to_string(),
        }]);

        assert_eq!(report.compliance_score(), score);
        assert_eq!(report.content_notes.len(), 1);
        assert_eq!(report.result.violations, report.result.findings.len());
    }

    #[test]
    fn turkish_fold_round_trips_dotted_letters() {
        let fold = CaseFold::new(Locale::Turkish);
        assert_eq!(fold.to_upper("giriş"), "GİRİŞ");
        assert_eq!(fold.to_lower("KILAVUZ"), "kılavuz");
    }
}
