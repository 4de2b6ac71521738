// Checks over the document's shape rather than a single paragraph:
// required sections, caption numbering sequences and TOC consistency.

use super::engine::Evaluation;
use super::registry::{structural_ids, Rule, RuleRegistry};
use crate::casefold::CaseFold;
use crate::config::StyleGuideConfig;
use crate::error::ConfigError;
use crate::segmentation::patterns::{compile, keyword_alternation};
use crate::segmentation::Segmentation;
use crate::types::{Document, FindingKind, Location, SectionKind, Zone};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One numbered line of the table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub paragraph: usize,
    pub number: String,
    /// Upper-folded, whitespace collapsed
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct StructuralChecker {
    fold: CaseFold,
    caption_number: Regex,
    toc_entry: Regex,
    numbered_heading: Regex,
}

impl StructuralChecker {
    pub fn new(config: &StyleGuideConfig) -> Result<Self, ConfigError> {
        let fold = CaseFold::new(config.locale);
        let seg = &config.segmentation;
        let keywords: Vec<String> = seg
            .table_caption_keywords
            .iter()
            .chain(&seg.figure_caption_keywords)
            .cloned()
            .collect();
        Ok(Self {
            fold,
            caption_number: compile(
                "caption sequence",
                &format!(r"^{}\s+(\d+)\.\s*(\d+)", keyword_alternation(&fold, &keywords)),
            )?,
            toc_entry: compile(
                "toc entry",
                r"^(\d+(?:\.\d+)*)\.?\s+(.+?)(?:[\s.…]*\d+)?$",
            )?,
            numbered_heading: compile("numbered heading", r"^(\d+(?:\.\d+)*)\.?\s+(.+)$")?,
        })
    }

    pub fn check(
        &self,
        registry: &RuleRegistry,
        document: &Document,
        segmentation: &Segmentation,
        eval: &mut Evaluation,
    ) {
        let rule = |id: &str| registry.structural_rules().find(|r| r.id == id);

        if let Some(rule) = rule(structural_ids::REQUIRED_SECTION) {
            required_sections(rule, segmentation, eval);
        }
        if let Some(rule) = rule(structural_ids::CAPTION_SEQUENCE) {
            self.caption_sequences(rule, document, segmentation, eval);
        }
        let entry_rule = rule(structural_ids::TOC_ENTRY_MISSING);
        let heading_rule = rule(structural_ids::TOC_HEADING_MISSING);
        if entry_rule.is_some() || heading_rule.is_some() {
            self.toc_consistency(entry_rule, heading_rule, document, segmentation, eval);
        }
    }

    fn normalize(&self, title: &str) -> String {
        let upper = self.fold.to_upper(title);
        upper
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end_matches(['.', ':'])
            .to_string()
    }

    /// Numbered entries of the table of contents. Unnumbered lines (ÖZET,
    /// KAYNAKÇA) are not listed.
    pub fn toc_entries(&self, document: &Document, segmentation: &Segmentation) -> Vec<TocEntry> {
        segmentation
            .paragraphs_in(document, Zone::TableOfContents)
            .filter_map(|p| {
                let text = p.text();
                let caps = self.toc_entry.captures(text.trim())?;
                Some(TocEntry {
                    paragraph: p.index,
                    number: caps.get(1)?.as_str().to_string(),
                    title: self.normalize(caps.get(2)?.as_str()),
                })
            })
            .collect()
    }

    /// Numbered headings from the introduction onwards, as `(index, title)`
    fn numbered_headings(&self, document: &Document, segmentation: &Segmentation) -> Vec<(usize, String)> {
        let from = segmentation
            .first_boundary(SectionKind::Introduction)
            .map(|b| b.heading)
            .unwrap_or(0);
        document
            .paragraphs
            .iter()
            .filter(|p| p.index >= from && p.is_body())
            .filter(|p| {
                matches!(
                    segmentation.zone(p.index),
                    Some(Zone::ChapterHeading | Zone::Subheading)
                )
            })
            .filter_map(|p| {
                let text = p.text();
                let caps = self.numbered_heading.captures(text.trim())?;
                Some((p.index, self.normalize(caps.get(2)?.as_str())))
            })
            .collect()
    }

    /// Captions grouped by kind and chapter must count 1, 2, 3, ...
    fn caption_sequences(
        &self,
        rule: &Rule,
        document: &Document,
        segmentation: &Segmentation,
        eval: &mut Evaluation,
    ) {
        let mut groups: BTreeMap<(Zone, u32), Vec<(u32, usize)>> = BTreeMap::new();
        for zone in [Zone::TableCaption, Zone::FigureCaption] {
            for p in segmentation.paragraphs_in(document, zone) {
                let upper = self.fold.to_upper(p.text().trim());
                let Some(caps) = self.caption_number.captures(&upper) else {
                    continue;
                };
                let (Some(Ok(chapter)), Some(Ok(seq))) = (
                    caps.get(1).map(|m| m.as_str().parse::<u32>()),
                    caps.get(2).map(|m| m.as_str().parse::<u32>()),
                ) else {
                    continue;
                };
                groups.entry((zone, chapter)).or_default().push((seq, p.index));
            }
        }

        for ((zone, chapter), captions) in groups {
            let gap = captions
                .iter()
                .zip(1u32..)
                .find(|((seq, _), expected)| seq != expected);
            match gap {
                None => eval.pass(),
                Some(((seq, index), expected)) => {
                    let kind = if zone == Zone::TableCaption { "Table" } else { "Figure" };
                    let snippet = document.paragraphs.get(*index).map(|p| p.snippet(80));
                    eval.fail(
                        rule,
                        FindingKind::RuleViolation,
                        Location::Paragraph { index: *index },
                        format!("{chapter}.{expected}"),
                        format!("{chapter}.{seq}"),
                        format!(
                            "{kind} numbering in chapter {chapter} out of sequence: expected {chapter}.{expected}, found {chapter}.{seq}"
                        ),
                        snippet,
                    );
                }
            }
        }
    }

    /// Every TOC entry must match a heading and every numbered heading must
    /// be listed. Skipped when the table of contents has no numbered entries.
    fn toc_consistency(
        &self,
        entry_rule: Option<&Rule>,
        heading_rule: Option<&Rule>,
        document: &Document,
        segmentation: &Segmentation,
        eval: &mut Evaluation,
    ) {
        let entries = self.toc_entries(document, segmentation);
        if entries.is_empty() {
            return;
        }
        let headings = self.numbered_headings(document, segmentation);
        let heading_titles: BTreeSet<&str> = headings.iter().map(|(_, t)| t.as_str()).collect();
        let entry_titles: BTreeSet<&str> = entries.iter().map(|e| e.title.as_str()).collect();

        if let Some(rule) = entry_rule {
            for entry in &entries {
                if heading_titles.contains(entry.title.as_str()) {
                    eval.pass();
                } else {
                    eval.fail(
                        rule,
                        FindingKind::RuleViolation,
                        Location::Paragraph {
                            index: entry.paragraph,
                        },
                        "matching heading".to_string(),
                        "none".to_string(),
                        format!("Table of contents entry '{} {}' has no matching heading", entry.number, entry.title),
                        document.paragraphs.get(entry.paragraph).map(|p| p.snippet(80)),
                    );
                }
            }
        }

        if let Some(rule) = heading_rule {
            for (index, title) in &headings {
                if entry_titles.contains(title.as_str()) {
                    eval.pass();
                } else {
                    eval.fail(
                        rule,
                        FindingKind::RuleViolation,
                        Location::Paragraph { index: *index },
                        "listed in table of contents".to_string(),
                        "not listed".to_string(),
                        format!("Heading '{title}' is missing from the table of contents"),
                        document.paragraphs.get(*index).map(|p| p.snippet(80)),
                    );
                }
            }
        }
    }
}

fn required_sections(rule: &Rule, segmentation: &Segmentation, eval: &mut Evaluation) {
    for coverage in &segmentation.coverage {
        if coverage.found {
            eval.pass();
        } else {
            let name = coverage.section.display_name();
            eval.fail(
                rule,
                FindingKind::Structural,
                Location::Section {
                    kind: coverage.section,
                },
                "present".to_string(),
                "missing".to_string(),
                format!("{name} section not found"),
                None,
            );
        }
    }
}
