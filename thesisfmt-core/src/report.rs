// Hand-off points for external collaborators and the report they feed into
//
// Content analysis and spell checking run outside the core. The core only
// exports the text they need and merges what they return. Nothing merged
// here changes the compliance score.

use crate::segmentation::Segmentation;
use crate::types::{AnalysisResult, Document, SectionKind, Severity, Zone};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: &str = "1.0";

/// Plain text of the sections a content reviewer reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneTexts {
    pub abstract_text: String,
    pub introduction_text: String,
    pub conclusion_text: String,
}

/// One word of body text, addressed by paragraph and word position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyToken {
    pub paragraph: usize,
    pub position: usize,
    pub text: String,
}

/// Observation returned by a content analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNote {
    pub section: SectionKind,
    pub severity: Severity,
    pub message: String,
}

/// Word a spell checker rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellingFlag {
    pub paragraph: usize,
    pub position: usize,
    pub word: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// Caller-side content review, e.g. a language model
pub trait ContentAnalyzer {
    fn analyze(&self, texts: &ZoneTexts) -> anyhow::Result<Vec<ContentNote>>;
}

/// Caller-side spell checking
pub trait SpellChecker {
    fn check(&self, tokens: &[BodyToken]) -> anyhow::Result<Vec<SpellingFlag>>;
}

fn section_text(
    document: &Document,
    segmentation: &Segmentation,
    kind: SectionKind,
    zone: Zone,
) -> String {
    let Some(range) = segmentation.section_range(kind) else {
        return String::new();
    };
    document
        .paragraphs
        .get(range)
        .unwrap_or_default()
        .iter()
        .filter(|p| !p.is_blank() && segmentation.zone(p.index) == Some(zone))
        .map(|p| p.text().trim().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn zone_texts(document: &Document, segmentation: &Segmentation) -> ZoneTexts {
    ZoneTexts {
        abstract_text: section_text(document, segmentation, SectionKind::Abstract, Zone::Abstract),
        introduction_text: section_text(
            document,
            segmentation,
            SectionKind::Introduction,
            Zone::Body,
        ),
        conclusion_text: section_text(document, segmentation, SectionKind::Conclusion, Zone::Body),
    }
}

/// Words of Body-zone paragraphs with surrounding punctuation removed.
/// Tokens without a letter (numbers, symbols) are left out.
pub fn body_tokens(document: &Document, segmentation: &Segmentation) -> Vec<BodyToken> {
    segmentation
        .paragraphs_in(document, Zone::Body)
        .flat_map(|p| {
            p.text()
                .split_whitespace()
                .enumerate()
                .filter_map(|(position, raw)| {
                    let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
                    word.chars().any(char::is_alphabetic).then(|| BodyToken {
                        paragraph: p.index,
                        position,
                        text: word.to_string(),
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Analysis result plus what external collaborators reported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub result: AnalysisResult,
    #[serde(default)]
    pub content_notes: Vec<ContentNote>,
    #[serde(default)]
    pub spelling_flags: Vec<SpellingFlag>,
}

impl Report {
    pub fn new(result: AnalysisResult) -> Self {
        Self {
            result,
            content_notes: Vec::new(),
            spelling_flags: Vec::new(),
        }
    }

    pub fn compliance_score(&self) -> f64 {
        self.result.compliance_score
    }

    pub fn merge_content_notes(&mut self, notes: Vec<ContentNote>) {
        self.content_notes.extend(notes);
    }

    /// Flags are kept in document order, duplicates dropped
    pub fn merge_spelling_flags(&mut self, flags: Vec<SpellingFlag>) {
        self.spelling_flags.extend(flags);
        self.spelling_flags
            .sort_by(|a, b| (a.paragraph, a.position).cmp(&(b.paragraph, b.position)));
        self.spelling_flags
            .dedup_by(|a, b| a.paragraph == b.paragraph && a.position == b.position);
    }

    /// Run a content analyzer over `texts` and merge its notes
    pub fn collect_content_notes(
        &mut self,
        analyzer: &dyn ContentAnalyzer,
        texts: &ZoneTexts,
    ) -> anyhow::Result<()> {
        let notes = analyzer.analyze(texts)?;
        self.merge_content_notes(notes);
        Ok(())
    }

    /// Run a spell checker over `tokens` and merge its flags
    pub fn collect_spelling_flags(
        &mut self,
        checker: &dyn SpellChecker,
        tokens: &[BodyToken],
    ) -> anyhow::Result<()> {
        let flags = checker.check(tokens)?;
        self.merge_spelling_flags(flags);
        Ok(())
    }
}

/// Report wrapped with provenance. `generated_at` is the only field that
/// differs between runs on the same input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEnvelope {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub package_sha256: String,
    pub config_hash: String,
    pub report: Report,
}

impl ReportEnvelope {
    pub fn new(source: &str, package_sha256: String, config_hash: String, report: Report) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            source: source.to_string(),
            package_sha256,
            config_hash,
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StyleGuideConfig;
    use crate::segmentation::Segmenter;
    use crate::types::{DocumentStatistics, Paragraph, Run};

    fn document(texts: &[&str]) -> Document {
        Document {
            paragraphs: texts
                .iter()
                .enumerate()
                .map(|(index, t)| Paragraph {
                    index,
                    runs: vec![Run {
                        text: t.to_string(),
                        ..Default::default()
                    }],
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn segment(doc: &Document) -> Segmentation {
        Segmenter::new(&StyleGuideConfig::default())
            .unwrap()
            .segment(doc)
    }

    fn empty_result(score: f64) -> AnalysisResult {
        AnalysisResult {
            findings: Vec::new(),
            total_checks: 10,
            passed_checks: 10,
            violations: 0,
            compliance_score: score,
            zone_coverage: Vec::new(),
            category_counts: Vec::new(),
            zone_counts: Vec::new(),
            statistics: DocumentStatistics::default(),
        }
    }

    struct FixedSpeller;

    impl SpellChecker for FixedSpeller {
        fn check(&self, tokens: &[BodyToken]) -> anyhow::Result<Vec<SpellingFlag>> {
            Ok(tokens
                .iter()
                .filter(|t| t.text == "yanlz")
                .map(|t| SpellingFlag {
                    paragraph: t.paragraph,
                    position: t.position,
                    word: t.text.clone(),
                    suggestions: vec!["yalnız".to_string()],
                })
                .collect())
        }
    }

    #[test]
    fn test_zone_texts() {
        let doc = document(&[
            "ÖZET",
            "Özet birinci.",
            "Anahtar Kelimeler: a, b, c",
            "1. GİRİŞ",
            "Giriş metni.",
            "2. SONUÇ",
            "Sonuç metni.",
        ]);
        let texts = zone_texts(&doc, &segment(&doc));
        assert_eq!(texts.abstract_text, "Özet birinci.");
        assert_eq!(texts.introduction_text, "Giriş metni.");
        assert_eq!(texts.conclusion_text, "Sonuç metni.");
    }

    #[test]
    fn test_body_tokens_skip_abstract_and_numbers() {
        let doc = document(&["ÖZET", "Özet metni.", "1. GİRİŞ", "Bu (yanlz) 2020 yılında."]);
        let tokens = body_tokens(&doc, &segment(&doc));
        let words: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(words, vec!["Bu", "yanlz", "yılında"]);
        assert_eq!(tokens[1].paragraph, 3);
        assert_eq!(tokens[1].position, 1);
    }

    #[test]
    fn test_merging_leaves_score_alone() {
        let doc = document(&["1. GİRİŞ", "Bu yanlz bir cümle."]);
        let tokens = body_tokens(&doc, &segment(&doc));

        let mut report = Report::new(empty_result(87.5));
        report.collect_spelling_flags(&FixedSpeller, &tokens).unwrap();
        report.merge_content_notes(vec![ContentNote {
            section: SectionKind::Introduction,
            severity: Severity::Info,
            message: "Research question is stated late".to_string(),
        }]);
        report.merge_spelling_flags(FixedSpeller.check(&tokens).unwrap());

        assert_eq!(report.compliance_score(), 87.5);
        assert_eq!(report.result.findings.len(), 0);
        assert_eq!(report.spelling_flags.len(), 1);
        assert_eq!(report.content_notes.len(), 1);
    }
}
