// Rule evaluation
//
// Order is fixed: document rules, paragraph rules in index order, zone-span
// rules, table rules, then structural checks. Every check attempted is
// counted and a failed check yields exactly one finding.

use super::registry::{Attribute, Quantifier, Rule, RuleRegistry, Value};
use super::structural::StructuralChecker;
use crate::casefold::{is_all_caps, CaseFold};
use crate::config::StyleGuideConfig;
use crate::error::ConfigError;
use crate::loader::props::round2;
use crate::segmentation::{word_count, Segmentation};
use crate::types::{
    Document, Finding, FindingKind, Location, Paragraph, Run, SectionKind, Zone,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Reported as the actual value when an attribute can't be determined
pub const UNRESOLVED: &str = "unresolved";

const SNIPPET_CHARS: usize = 80;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub findings: Vec<Finding>,
    pub checks_performed: usize,
}

impl Evaluation {
    /// Count one check of `rule` against `actual`. `None` means unresolved
    /// and always fails.
    pub fn check(
        &mut self,
        rule: &Rule,
        actual: Option<Value>,
        location: Location,
        snippet: Option<String>,
    ) {
        self.checks_performed += 1;
        let actual = match actual {
            Some(value) if rule.comparison.is_satisfied_by(&value) => return,
            Some(value) => rule.comparison.describe_actual(&value),
            None => UNRESOLVED.to_string(),
        };
        let expected = rule.comparison.describe_expected();
        self.findings.push(Finding {
            kind: FindingKind::RuleViolation,
            location,
            category: rule.category,
            rule_id: rule.id.to_string(),
            message: format!("{}: expected {expected}, found {actual}", rule.description),
            expected,
            actual,
            severity: rule.severity,
            snippet,
        });
    }

    /// Count a check that passed without a value to compare
    pub fn pass(&mut self) {
        self.checks_performed += 1;
    }

    /// Count a failed check with a purpose-written finding
    pub fn fail(
        &mut self,
        rule: &Rule,
        kind: FindingKind,
        location: Location,
        expected: String,
        actual: String,
        message: String,
        snippet: Option<String>,
    ) {
        self.checks_performed += 1;
        self.findings.push(Finding {
            kind,
            location,
            category: rule.category,
            rule_id: rule.id.to_string(),
            expected,
            actual,
            severity: rule.severity,
            message,
            snippet,
        });
    }
}

pub struct RuleEngine {
    registry: RuleRegistry,
    structural: StructuralChecker,
    fold: CaseFold,
    /// Lower-folded words allowed to stay lower-case in a title
    title_case_exceptions: Vec<String>,
    body_pt: f64,
    body_line_spacing: f64,
    heading_min_pt: f64,
}

impl RuleEngine {
    pub fn new(config: &StyleGuideConfig) -> Result<Self, ConfigError> {
        let fold = CaseFold::new(config.locale);
        Ok(Self {
            registry: RuleRegistry::from_config(config)?,
            structural: StructuralChecker::new(config)?,
            fold,
            title_case_exceptions: config
                .title_case_exceptions
                .iter()
                .map(|w| fold.to_lower(w.trim()))
                .collect(),
            body_pt: config.fonts.body_pt,
            body_line_spacing: config.spacing.body_line_spacing,
            heading_min_pt: config.fonts.chapter_heading_pt - config.fonts.size_tolerance_pt,
        })
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn structural(&self) -> &StructuralChecker {
        &self.structural
    }

    pub fn evaluate(&self, document: &Document, segmentation: &Segmentation) -> Evaluation {
        let mut eval = Evaluation::default();

        // 1. Document scope, once
        for rule in self.registry.document_rules() {
            eval.check(rule, self.document_value(rule.attribute, document), Location::Document, None);
        }

        // 2. Paragraph scope
        for paragraph in &document.paragraphs {
            if paragraph.is_blank() {
                continue;
            }
            let Some(zone) = segmentation.zone(paragraph.index) else {
                continue;
            };
            for rule in self.registry.rules_for(zone) {
                let location = Location::Paragraph {
                    index: paragraph.index,
                };
                let snippet = Some(paragraph.snippet(SNIPPET_CHARS));
                if rule.attribute.is_run_level() {
                    self.check_runs(&mut eval, rule, paragraph, location, snippet);
                } else {
                    let actual = self.paragraph_value(rule.attribute, paragraph, document, segmentation);
                    eval.check(rule, actual, location, snippet);
                }
            }
        }

        // 3. Zone spans
        for zone in Zone::ALL {
            for rule in self.registry.span_rules(zone) {
                for (start, end) in segmentation.spans(zone) {
                    let text = segmentation.span_text(document, zone, start, end);
                    eval.check(
                        rule,
                        Some(Value::Count(word_count(&text))),
                        Location::Span { start, end },
                        None,
                    );
                }
            }
        }

        // 4. Tables
        for table in 0..document.table_count() {
            for rule in self.registry.table_rules() {
                let actual = caption_above(document, segmentation, table).map(Value::Bool);
                eval.check(rule, actual, Location::Table { index: table }, None);
            }
        }

        // 5. Structure
        self.structural
            .check(&self.registry, document, segmentation, &mut eval);

        debug!(
            "Evaluated {} checks, {} findings",
            eval.checks_performed,
            eval.findings.len()
        );
        eval
    }

    fn check_runs(
        &self,
        eval: &mut Evaluation,
        rule: &Rule,
        paragraph: &Paragraph,
        location: Location,
        snippet: Option<String>,
    ) {
        let values: Vec<Option<Value>> = paragraph
            .text_runs()
            .filter(|run| !self.is_exempt(rule.attribute, run))
            .map(|run| run_value(rule.attribute, run))
            .collect();

        let satisfied = |v: &Option<Value>| {
            v.as_ref()
                .is_some_and(|value| rule.comparison.is_satisfied_by(value))
        };
        let chosen = match rule.quantifier {
            // First failing run reports; otherwise any run stands for all
            Quantifier::Every => values.iter().find(|v| !satisfied(*v)).or(values.first()),
            Quantifier::Any => values.iter().find(|v| satisfied(*v)).or(values.first()),
        };

        match chosen {
            Some(actual) => eval.check(rule, actual.clone(), location, snippet),
            // Only exempt runs: nothing to hold against the rule
            None => eval.pass(),
        }
    }

    fn is_exempt(&self, attribute: Attribute, run: &Run) -> bool {
        attribute == Attribute::FontFamily
            && run
                .format
                .font_family
                .as_deref()
                .is_some_and(|family| self.registry.is_exempt_family(family))
    }

    fn document_value(&self, attribute: Attribute, document: &Document) -> Option<Value> {
        let geometry = document.geometry();
        match attribute {
            Attribute::MarginTop => Some(Value::Number(geometry.margin_top_cm)),
            Attribute::MarginBottom => Some(Value::Number(geometry.margin_bottom_cm)),
            Attribute::MarginLeft => Some(Value::Number(geometry.margin_left_cm)),
            Attribute::MarginRight => Some(Value::Number(geometry.margin_right_cm)),
            Attribute::FooterDistance => Some(Value::Number(geometry.footer_distance_cm)),
            Attribute::DefaultFontFamily => document.defaults.font_family.clone().map(Value::Text),
            _ => None,
        }
    }

    fn paragraph_value(
        &self,
        attribute: Attribute,
        paragraph: &Paragraph,
        document: &Document,
        segmentation: &Segmentation,
    ) -> Option<Value> {
        let format = &paragraph.format;
        let value = match attribute {
            Attribute::Alignment => Value::Alignment(format.alignment),
            Attribute::LineSpacing => {
                Value::Number(round2(format.line_spacing.as_multiple(self.body_pt)))
            }
            Attribute::SpaceBefore => Value::Number(format.space_before_pt),
            Attribute::SpaceAfter => Value::Number(format.space_after_pt),
            Attribute::FirstLineIndent => Value::Number(format.first_line_indent_cm),
            Attribute::HangingIndent => Value::Number(format.hanging_indent_cm),
            Attribute::LeadSpace => {
                Value::Number(round2(self.lead_space(document, segmentation, paragraph.index)))
            }
            Attribute::Text => Value::Text(paragraph.text().trim().to_string()),
            Attribute::FoldedText => Value::Text(self.fold.to_upper(paragraph.text().trim())),
            Attribute::AllCaps => Value::Bool(is_all_caps(&paragraph.text())),
            Attribute::TitleCase => Value::Bool(self.is_title_case(&paragraph.text())),
            Attribute::KeywordCount => Value::Count(keyword_count(&paragraph.text())),
            Attribute::HeadingProfile => Value::Bool(self.has_heading_profile(paragraph)),
            _ => return None,
        };
        Some(value)
    }

    /// Every word capitalised except configured conjunctions; numbering skipped
    pub fn is_title_case(&self, text: &str) -> bool {
        let mut first = true;
        for word in text.split_whitespace() {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric());
            let Some(initial) = word.chars().next() else {
                continue;
            };
            if !initial.is_alphabetic() {
                continue;
            }
            let exempt = !first && self.title_case_exceptions.contains(&self.fold.to_lower(word));
            first = false;
            if !exempt && !initial.is_uppercase() {
                return false;
            }
        }
        true
    }

    fn has_heading_profile(&self, paragraph: &Paragraph) -> bool {
        let mut runs = paragraph.text_runs().peekable();
        runs.peek().is_some()
            && runs.all(|r| r.format.bold && r.format.font_size_pt >= self.heading_min_pt)
    }

    /// Space before the heading plus the blank lines above it. A title line
    /// directly under an ordinal chapter label shares the label's lead space.
    fn lead_space(&self, document: &Document, segmentation: &Segmentation, index: usize) -> f64 {
        let paragraphs = &document.paragraphs;
        let blank_body = |i: usize| paragraphs[i].is_body() && paragraphs[i].is_blank();
        let first_above = |i: usize| {
            let mut j = i;
            while j > 0 && blank_body(j - 1) {
                j -= 1;
            }
            j
        };

        // The title line opens no section of its own; its label does
        let mut start = index;
        let opens_section = segmentation.boundaries.iter().any(|b| b.heading == index);
        if !opens_section {
            if let Some(prev) = first_above(index).checked_sub(1) {
                let label = segmentation
                    .boundaries
                    .iter()
                    .any(|b| b.heading == prev && b.kind == SectionKind::Chapter);
                if label && paragraphs[prev].is_body() {
                    start = prev;
                }
            }
        }

        let blank_lines: f64 = paragraphs[first_above(start)..start]
            .iter()
            .map(|p| {
                let size = p.runs.first().map(|r| r.format.font_size_pt).unwrap_or(self.body_pt);
                let multiple = match p.runs.first() {
                    Some(_) => p.format.line_spacing.as_multiple(self.body_pt),
                    None => self.body_line_spacing,
                };
                size * multiple + p.format.space_before_pt + p.format.space_after_pt
            })
            .sum();
        paragraphs[start].format.space_before_pt + blank_lines
    }
}

fn run_value(attribute: Attribute, run: &Run) -> Option<Value> {
    let format = &run.format;
    match attribute {
        Attribute::FontFamily => format.font_family.clone().map(Value::Text),
        Attribute::FontSize => Some(Value::Number(format.font_size_pt)),
        Attribute::Bold => Some(Value::Bool(format.bold)),
        Attribute::Italic => Some(Value::Bool(format.italic)),
        _ => None,
    }
}

/// Items after the first colon, separated by commas or semicolons
pub fn keyword_count(text: &str) -> usize {
    match text.split_once(':') {
        Some((_, list)) => list
            .split([',', ';'])
            .filter(|k| !k.trim().trim_end_matches('.').trim().is_empty())
            .count(),
        None => 0,
    }
}

/// Whether the nearest non-blank paragraph above table `table` is its caption.
/// Another table in between means the caption belongs to that one.
fn caption_above(document: &Document, segmentation: &Segmentation, table: usize) -> Option<bool> {
    let first_cell = document
        .paragraphs
        .iter()
        .find(|p| p.table_index() == Some(table))?;
    let above = document.paragraphs[..first_cell.index]
        .iter()
        .rev()
        .find(|p| !p.is_blank());
    Some(above.is_some_and(|p| {
        p.table_index().is_none() && segmentation.zone(p.index) == Some(Zone::TableCaption)
    }))
}
