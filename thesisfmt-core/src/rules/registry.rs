// Declarative rule table
//
// Built once from a StyleGuideConfig and never mutated afterwards. A changed
// configuration means building a new registry.

use crate::casefold::CaseFold;
use crate::config::StyleGuideConfig;
use crate::error::ConfigError;
use crate::segmentation::patterns::{compile, keyword_alternation};
use crate::types::{Alignment, Category, Severity, Zone};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

/// Slack added to every numeric bound so values that round to the limit pass
pub const NUMERIC_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// Checked once per non-blank paragraph of the rule's zones
    Paragraph,
    /// Checked once per contiguous span of the zone
    ZoneSpan,
    /// Checked once per table
    Table,
    /// Checked once per document
    Document,
    /// Section presence, numbering sequences and contents consistency
    Structural,
}

/// Which runs of a paragraph a run-level rule must hold for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Every,
    Any,
}

/// Attribute path the rule reads its actual value from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    FontFamily,
    FontSize,
    Bold,
    Italic,
    Alignment,
    LineSpacing,
    SpaceBefore,
    SpaceAfter,
    FirstLineIndent,
    HangingIndent,
    /// Space before the paragraph plus the blank lines above it
    LeadSpace,
    /// Trimmed paragraph text
    Text,
    /// Trimmed text, upper-cased with the configured locale
    FoldedText,
    AllCaps,
    TitleCase,
    KeywordCount,
    /// Bold and at least chapter-heading size, i.e. formatted like a heading
    HeadingProfile,
    WordCount,
    CaptionAbove,
    MarginTop,
    MarginBottom,
    MarginLeft,
    MarginRight,
    FooterDistance,
    DefaultFontFamily,
    /// Outcome of a structural check
    Satisfied,
}

impl Attribute {
    pub fn path(&self) -> &'static str {
        match self {
            Attribute::FontFamily => "font.family",
            Attribute::FontSize => "font.size",
            Attribute::Bold => "font.bold",
            Attribute::Italic => "font.italic",
            Attribute::Alignment => "paragraph.alignment",
            Attribute::LineSpacing => "paragraph.line_spacing",
            Attribute::SpaceBefore => "paragraph.space_before",
            Attribute::SpaceAfter => "paragraph.space_after",
            Attribute::FirstLineIndent => "paragraph.first_line_indent",
            Attribute::HangingIndent => "paragraph.hanging_indent",
            Attribute::LeadSpace => "paragraph.lead_space",
            Attribute::Text => "text",
            Attribute::FoldedText => "text.folded",
            Attribute::AllCaps => "text.all_caps",
            Attribute::TitleCase => "text.title_case",
            Attribute::KeywordCount => "text.keyword_count",
            Attribute::HeadingProfile => "format.heading_profile",
            Attribute::WordCount => "span.word_count",
            Attribute::CaptionAbove => "table.caption_above",
            Attribute::MarginTop => "page.margin.top",
            Attribute::MarginBottom => "page.margin.bottom",
            Attribute::MarginLeft => "page.margin.left",
            Attribute::MarginRight => "page.margin.right",
            Attribute::FooterDistance => "page.footer_distance",
            Attribute::DefaultFontFamily => "defaults.font.family",
            Attribute::Satisfied => "structure",
        }
    }

    /// Read from each text run rather than from the paragraph
    pub fn is_run_level(&self) -> bool {
        matches!(
            self,
            Attribute::FontFamily | Attribute::FontSize | Attribute::Bold | Attribute::Italic
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Cm,
    Pt,
    /// Multiple of single line spacing
    Lines,
    Keywords,
    Words,
}

impl Unit {
    fn suffix(&self) -> &'static str {
        match self {
            Unit::Cm => " cm",
            Unit::Pt => " pt",
            Unit::Lines => "",
            Unit::Keywords => " keywords",
            Unit::Words => " words",
        }
    }
}

/// Actual or expected value of an attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Count(usize),
    Text(String),
    Alignment(Alignment),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", if *b { "yes" } else { "no" }),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Count(n) => write!(f, "{n}"),
            Value::Text(t) => f.write_str(t),
            Value::Alignment(a) => write!(f, "{a}"),
        }
    }
}

/// Up to two decimals, trailing zeros dropped
pub fn format_number(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[derive(Debug, Clone)]
pub enum Comparison {
    /// Flags, alignments and text. Text compares trimmed and ASCII case-insensitive.
    Equals(Value),
    /// Inclusive band; `max` may be infinite
    NumericRange {
        target: f64,
        min: f64,
        max: f64,
        unit: Unit,
    },
    /// Anchored regex, compiled once when the registry is built
    Pattern { regex: Regex, expect_match: bool },
    /// Inclusive bounds on the number of whitespace tokens
    WordCountRange { min: usize, max: usize },
}

impl Comparison {
    /// `target ± tolerance`
    pub fn around(target: f64, tolerance: f64, unit: Unit) -> Self {
        Comparison::NumericRange {
            target,
            min: target - tolerance,
            max: target + tolerance,
            unit,
        }
    }

    pub fn at_least(min: f64, unit: Unit) -> Self {
        Comparison::NumericRange {
            target: min,
            min,
            max: f64::INFINITY,
            unit,
        }
    }

    pub fn between(min: f64, max: f64, unit: Unit) -> Self {
        Comparison::NumericRange {
            target: (min + max) / 2.0,
            min,
            max,
            unit,
        }
    }

    pub fn is_satisfied_by(&self, actual: &Value) -> bool {
        match self {
            Comparison::Equals(expected) => match (expected, actual) {
                (Value::Text(e), Value::Text(a)) => e.trim().eq_ignore_ascii_case(a.trim()),
                (Value::Number(e), Value::Number(a)) => (e - a).abs() <= NUMERIC_EPSILON,
                (e, a) => e == a,
            },
            Comparison::NumericRange { min, max, .. } => {
                let value = match actual {
                    Value::Number(n) => *n,
                    Value::Count(n) => *n as f64,
                    _ => return false,
                };
                value >= min - NUMERIC_EPSILON && value <= max + NUMERIC_EPSILON
            }
            Comparison::Pattern {
                regex,
                expect_match,
            } => match actual {
                Value::Text(text) => regex.is_match(text.trim()) == *expect_match,
                _ => false,
            },
            Comparison::WordCountRange { min, max } => {
                let count = match actual {
                    Value::Count(n) => *n,
                    Value::Text(text) => text.split_whitespace().count(),
                    _ => return false,
                };
                (*min..=*max).contains(&count)
            }
        }
    }

    /// Human-readable expectation for findings
    pub fn describe_expected(&self) -> String {
        match self {
            Comparison::Equals(value) => value.to_string(),
            Comparison::NumericRange {
                target,
                min,
                max,
                unit,
            } => {
                let suffix = unit.suffix();
                if max.is_infinite() {
                    format!("at least {}{suffix}", format_number(*min))
                } else if *unit == Unit::Keywords {
                    format!("{}-{}{suffix}", format_number(*min), format_number(*max))
                } else if max - min <= NUMERIC_EPSILON {
                    format!("{}{suffix}", format_number(*target))
                } else {
                    format!(
                        "{}{suffix} (±{})",
                        format_number(*target),
                        format_number(max - target)
                    )
                }
            }
            Comparison::Pattern {
                regex,
                expect_match,
            } => {
                if *expect_match {
                    format!("matches {}", regex.as_str())
                } else {
                    format!("does not match {}", regex.as_str())
                }
            }
            Comparison::WordCountRange { min, max } => format!("{min}-{max} words"),
        }
    }

    /// Actual value rendered with the comparison's unit
    pub fn describe_actual(&self, actual: &Value) -> String {
        match (self, actual) {
            (Comparison::NumericRange { unit, .. }, Value::Number(_) | Value::Count(_)) => {
                format!("{actual}{}", unit.suffix())
            }
            (Comparison::WordCountRange { .. }, Value::Count(n)) => format!("{n} words"),
            _ => actual.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub id: &'static str,
    pub zones: Vec<Zone>,
    pub scope: RuleScope,
    pub attribute: Attribute,
    pub comparison: Comparison,
    pub quantifier: Quantifier,
    pub category: Category,
    pub severity: Severity,
    pub description: &'static str,
}

impl Rule {
    fn new(
        id: &'static str,
        scope: RuleScope,
        attribute: Attribute,
        comparison: Comparison,
        category: Category,
        severity: Severity,
        description: &'static str,
    ) -> Self {
        Self {
            id,
            zones: Vec::new(),
            scope,
            attribute,
            comparison,
            quantifier: Quantifier::Every,
            category,
            severity,
            description,
        }
    }

    fn paragraph(
        id: &'static str,
        zones: &[Zone],
        attribute: Attribute,
        comparison: Comparison,
        category: Category,
        severity: Severity,
        description: &'static str,
    ) -> Self {
        Self {
            zones: zones.to_vec(),
            ..Self::new(id, RuleScope::Paragraph, attribute, comparison, category, severity, description)
        }
    }

    fn any_run(mut self) -> Self {
        self.quantifier = Quantifier::Any;
        self
    }

    pub fn applies_to(&self, zone: Zone) -> bool {
        self.zones.contains(&zone)
    }
}

/// Ids of the structural checks, shared with the evaluator
pub mod structural_ids {
    pub const REQUIRED_SECTION: &str = "structure.required_section";
    pub const CAPTION_SEQUENCE: &str = "numbering.caption_sequence";
    pub const TOC_ENTRY_MISSING: &str = "toc.entry_missing";
    pub const TOC_HEADING_MISSING: &str = "toc.heading_missing";
}

/// Immutable, ordered rule table. `Send + Sync`, so one registry can serve
/// concurrent analyses.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
    by_zone: BTreeMap<Zone, Vec<usize>>,
    exempt_families: Vec<String>,
}

impl RuleRegistry {
    pub fn from_config(config: &StyleGuideConfig) -> Result<Self, ConfigError> {
        let rules = default_rules(config)?;

        let mut by_zone: BTreeMap<Zone, Vec<usize>> = BTreeMap::new();
        for (i, rule) in rules.iter().enumerate() {
            if rule.scope == RuleScope::Paragraph {
                for zone in &rule.zones {
                    by_zone.entry(*zone).or_default().push(i);
                }
            }
        }

        Ok(Self {
            rules,
            by_zone,
            exempt_families: config.fonts.exempt_families.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Paragraph rules for `zone`, in registry order
    pub fn rules_for(&self, zone: Zone) -> impl Iterator<Item = &Rule> {
        self.by_zone
            .get(&zone)
            .map(|ids| ids.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|&i| &self.rules[i])
    }

    pub fn span_rules(&self, zone: Zone) -> impl Iterator<Item = &Rule> {
        self.of_scope(RuleScope::ZoneSpan)
            .filter(move |r| r.applies_to(zone))
    }

    pub fn table_rules(&self) -> impl Iterator<Item = &Rule> {
        self.of_scope(RuleScope::Table)
    }

    pub fn document_rules(&self) -> impl Iterator<Item = &Rule> {
        self.of_scope(RuleScope::Document)
    }

    pub fn structural_rules(&self) -> impl Iterator<Item = &Rule> {
        self.of_scope(RuleScope::Structural)
    }

    fn of_scope(&self, scope: RuleScope) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.scope == scope)
    }

    /// Symbol and equation fonts skipped by font family rules
    pub fn is_exempt_family(&self, family: &str) -> bool {
        self.exempt_families
            .iter()
            .any(|f| f.trim().eq_ignore_ascii_case(family.trim()))
    }
}

/// Prefix a pattern with `^.*` unless it is already anchored
fn anchored(pattern: &str) -> String {
    if pattern.starts_with('^') {
        pattern.to_string()
    } else {
        format!("^.*{pattern}")
    }
}

fn default_rules(config: &StyleGuideConfig) -> Result<Vec<Rule>, ConfigError> {
    use Attribute as A;
    use Category as C;
    use Severity::{Error, Info, Warning};

    let page = &config.page;
    let fonts = &config.fonts;
    let spacing = &config.spacing;
    let indents = &config.indents;
    let limits = &config.abstract_limits;
    let fold = CaseFold::new(config.locale);

    let size = |pt: f64| Comparison::around(pt, fonts.size_tolerance_pt, Unit::Pt);
    let line = |multiple: f64| Comparison::around(multiple, spacing.line_spacing_tolerance, Unit::Lines);
    let gap = |pt: f64| Comparison::around(pt, spacing.spacing_tolerance_pt, Unit::Pt);
    let margin = |cm: f64| Comparison::around(cm, page.margin_tolerance_cm, Unit::Cm);
    let flag = |b: bool| Comparison::Equals(Value::Bool(b));
    let aligned = |a: Alignment| Comparison::Equals(Value::Alignment(a));

    let mut caption_keywords = config.segmentation.table_caption_keywords.clone();
    caption_keywords.extend(config.segmentation.figure_caption_keywords.iter().cloned());
    let caption_numbering = compile(
        "caption numbering",
        &format!(
            r"^{}\s+\d+\.\d+(?:\s*:|\.(?:\s|$)|\s)",
            keyword_alternation(&fold, &caption_keywords)
        ),
    )?;
    let bibliography_author = compile(
        "bibliography.author_pattern",
        &anchored(&config.bibliography.author_pattern),
    )?;
    let bibliography_year = compile(
        "bibliography.year_pattern",
        &anchored(&config.bibliography.year_pattern),
    )?;

    let text_zones: Vec<Zone> = Zone::ALL
        .iter()
        .copied()
        .filter(|z| !matches!(z, Zone::Cover | Zone::TableOfContents))
        .collect();
    let captions = [Zone::TableCaption, Zone::FigureCaption];

    let document = |id, attribute, comparison, category, description| {
        Rule::new(id, RuleScope::Document, attribute, comparison, category, Error, description)
    };

    let rules = vec![
        // ===== DOCUMENT =====
        document("page.margin.top", A::MarginTop, margin(page.margin_top_cm), C::Margin, "Top margin"),
        document("page.margin.bottom", A::MarginBottom, margin(page.margin_bottom_cm), C::Margin, "Bottom margin"),
        document("page.margin.left", A::MarginLeft, margin(page.margin_left_cm), C::Margin, "Left margin"),
        document("page.margin.right", A::MarginRight, margin(page.margin_right_cm), C::Margin, "Right margin"),
        Rule {
            severity: Warning,
            ..document(
                "page.footer_distance",
                A::FooterDistance,
                Comparison::around(page.footer_distance_cm, page.footer_distance_tolerance_cm, Unit::Cm),
                C::PageNumber,
                "Footer distance from page edge",
            )
        },
        Rule {
            severity: Warning,
            ..document(
                "font.default_family",
                A::DefaultFontFamily,
                Comparison::Equals(Value::Text(fonts.family.clone())),
                C::Font,
                "Default font of the document",
            )
        },
        // ===== EVERY TEXT ZONE =====
        Rule::paragraph("font.family", &text_zones, A::FontFamily, Comparison::Equals(Value::Text(fonts.family.clone())), C::Font, Error, "Font family"),
        // ===== BODY =====
        Rule::paragraph("body.font_size", &[Zone::Body], A::FontSize, size(fonts.body_pt), C::FontSize, Error, "Body text font size"),
        Rule::paragraph("body.alignment", &[Zone::Body], A::Alignment, aligned(Alignment::Justify), C::Paragraph, Warning, "Body text alignment"),
        Rule::paragraph("body.line_spacing", &[Zone::Body], A::LineSpacing, line(spacing.body_line_spacing), C::LineSpacing, Error, "Body text line spacing"),
        Rule::paragraph(
            "body.first_line_indent",
            &[Zone::Body],
            A::FirstLineIndent,
            Comparison::around(indents.first_line_cm, indents.first_line_tolerance_cm, Unit::Cm),
            C::Paragraph,
            Warning,
            "Body text first line indent",
        ),
        Rule::paragraph("body.space_before", &[Zone::Body], A::SpaceBefore, gap(spacing.paragraph_before_pt), C::Paragraph, Warning, "Space before body paragraph"),
        Rule::paragraph("body.space_after", &[Zone::Body], A::SpaceAfter, gap(spacing.paragraph_after_pt), C::Paragraph, Warning, "Space after body paragraph"),
        Rule::paragraph(
            "heading.unrecognized_format",
            &[Zone::Body],
            A::HeadingProfile,
            flag(false),
            C::Heading,
            Warning,
            "Paragraph formatted as a heading but not numbered or named like one",
        ),
        // ===== ABSTRACT =====
        Rule::paragraph("abstract.font_size", &[Zone::Abstract], A::FontSize, size(fonts.body_pt), C::FontSize, Error, "Abstract font size"),
        Rule::paragraph("abstract.line_spacing", &[Zone::Abstract], A::LineSpacing, line(spacing.body_line_spacing), C::LineSpacing, Error, "Abstract line spacing"),
        Rule {
            zones: vec![Zone::Abstract],
            ..Rule::new(
                "abstract.word_count",
                RuleScope::ZoneSpan,
                A::WordCount,
                Comparison::WordCountRange {
                    min: limits.min_words,
                    max: limits.max_words,
                },
                C::Abstract,
                Error,
                "Abstract length",
            )
        },
        Rule::paragraph(
            "abstract.keyword_count",
            &[Zone::Keywords],
            A::KeywordCount,
            Comparison::between(limits.min_keywords as f64, limits.max_keywords as f64, Unit::Keywords),
            C::Abstract,
            Warning,
            "Number of keywords",
        ),
        // ===== CHAPTER HEADINGS =====
        Rule::paragraph("chapter.font_size", &[Zone::ChapterHeading], A::FontSize, size(fonts.chapter_heading_pt), C::Heading, Error, "Chapter heading font size"),
        Rule::paragraph("chapter.bold", &[Zone::ChapterHeading], A::Bold, flag(true), C::Heading, Error, "Chapter heading bold"),
        Rule::paragraph("chapter.uppercase", &[Zone::ChapterHeading], A::AllCaps, flag(true), C::Heading, Error, "Chapter heading in capital letters"),
        Rule::paragraph("chapter.alignment", &[Zone::ChapterHeading], A::Alignment, aligned(Alignment::Center), C::Heading, Warning, "Chapter heading alignment"),
        Rule::paragraph(
            "chapter.lead_space",
            &[Zone::ChapterHeading],
            A::LeadSpace,
            Comparison::at_least(spacing.chapter_lead_space_pt, Unit::Pt),
            C::Heading,
            Warning,
            "White space above chapter heading",
        ),
        // ===== SUBHEADINGS =====
        Rule::paragraph("subheading.font_size", &[Zone::Subheading], A::FontSize, size(fonts.subheading_pt), C::Heading, Error, "Subheading font size"),
        Rule::paragraph("subheading.bold", &[Zone::Subheading], A::Bold, flag(true), C::Heading, Error, "Subheading bold"),
        Rule::paragraph(
            "subheading.first_line_indent",
            &[Zone::Subheading],
            A::FirstLineIndent,
            Comparison::around(indents.first_line_cm, indents.first_line_tolerance_cm, Unit::Cm),
            C::Heading,
            Warning,
            "Subheading first line indent",
        ),
        Rule::paragraph("subheading.space_before", &[Zone::Subheading], A::SpaceBefore, gap(spacing.paragraph_before_pt), C::Heading, Warning, "Space before subheading"),
        Rule::paragraph("subheading.space_after", &[Zone::Subheading], A::SpaceAfter, gap(spacing.paragraph_after_pt), C::Heading, Warning, "Space after subheading"),
        Rule::paragraph("subheading.title_case", &[Zone::Subheading], A::TitleCase, flag(true), C::Heading, Warning, "Subheading words capitalised"),
        // ===== CAPTIONS =====
        Rule::paragraph("caption.font_size", &captions, A::FontSize, size(fonts.caption_pt), C::FontSize, Error, "Caption font size"),
        Rule::paragraph(
            "caption.numbering",
            &captions,
            A::FoldedText,
            Comparison::Pattern {
                regex: caption_numbering,
                expect_match: true,
            },
            C::Numbering,
            Error,
            "Caption numbered as chapter.sequence",
        ),
        // ===== BLOCK QUOTES AND EPIGRAPHS =====
        Rule::paragraph("quote.font_size", &[Zone::BlockQuote], A::FontSize, size(fonts.block_quote_pt), C::FontSize, Error, "Block quote font size"),
        Rule::paragraph("quote.italic", &[Zone::BlockQuote], A::Italic, flag(true), C::Paragraph, Warning, "Block quote italic"),
        Rule::paragraph("quote.line_spacing", &[Zone::BlockQuote], A::LineSpacing, line(spacing.block_quote_line_spacing), C::LineSpacing, Warning, "Block quote line spacing"),
        Rule::paragraph("quote.alignment", &[Zone::BlockQuote], A::Alignment, aligned(Alignment::Justify), C::Paragraph, Warning, "Block quote alignment"),
        Rule::paragraph("epigraph.font_size", &[Zone::Epigraph], A::FontSize, size(fonts.epigraph_pt), C::FontSize, Warning, "Epigraph font size"),
        Rule::paragraph("epigraph.italic", &[Zone::Epigraph], A::Italic, flag(true), C::Paragraph, Warning, "Epigraph italic"),
        // ===== FOOTNOTES =====
        Rule::paragraph("footnote.font_size", &[Zone::Footnote], A::FontSize, size(fonts.footnote_pt), C::Footnote, Error, "Footnote font size"),
        Rule::paragraph("footnote.alignment", &[Zone::Footnote], A::Alignment, aligned(Alignment::Justify), C::Footnote, Warning, "Footnote alignment"),
        Rule::paragraph("footnote.line_spacing", &[Zone::Footnote], A::LineSpacing, line(spacing.footnote_line_spacing), C::Footnote, Warning, "Footnote line spacing"),
        Rule::paragraph("footnote.space_before", &[Zone::Footnote], A::SpaceBefore, gap(spacing.footnote_before_pt), C::Footnote, Info, "Space before footnote"),
        Rule::paragraph("footnote.space_after", &[Zone::Footnote], A::SpaceAfter, gap(spacing.footnote_after_pt), C::Footnote, Info, "Space after footnote"),
        // ===== BIBLIOGRAPHY =====
        Rule::paragraph(
            "bibliography.hanging_indent",
            &[Zone::Bibliography],
            A::HangingIndent,
            Comparison::around(indents.hanging_cm, indents.hanging_tolerance_cm, Unit::Cm),
            C::Reference,
            Warning,
            "Bibliography hanging indent",
        ),
        Rule::paragraph("bibliography.space_before", &[Zone::Bibliography], A::SpaceBefore, gap(spacing.bibliography_before_pt), C::Reference, Info, "Space before bibliography entry"),
        Rule::paragraph("bibliography.space_after", &[Zone::Bibliography], A::SpaceAfter, gap(spacing.bibliography_after_pt), C::Reference, Info, "Space after bibliography entry"),
        Rule::paragraph("bibliography.italic", &[Zone::Bibliography], A::Italic, flag(true), C::Reference, Info, "Work title in italics").any_run(),
        Rule::paragraph(
            "bibliography.year",
            &[Zone::Bibliography],
            A::Text,
            Comparison::Pattern {
                regex: bibliography_year,
                expect_match: true,
            },
            C::Reference,
            Warning,
            "Publication year in parentheses",
        ),
        Rule::paragraph(
            "bibliography.author",
            &[Zone::Bibliography],
            A::Text,
            Comparison::Pattern {
                regex: bibliography_author,
                expect_match: true,
            },
            C::Reference,
            Warning,
            "Entry starts with \"Surname, I.\"",
        ),
        // ===== TABLES =====
        Rule::paragraph("table.content_font_size", &[Zone::TableCell], A::FontSize, size(fonts.table_content_pt), C::Table, Warning, "Table content font size"),
        Rule::new("table.caption_above", RuleScope::Table, A::CaptionAbove, flag(true), C::Table, Warning, "Table caption placed above the table"),
        // ===== PAGE NUMBERS =====
        Rule::paragraph("page_number.font_size", &[Zone::PageNumber], A::FontSize, size(fonts.page_number_pt), C::PageNumber, Warning, "Page number font size"),
        Rule::paragraph("page_number.alignment", &[Zone::PageNumber], A::Alignment, aligned(Alignment::Center), C::PageNumber, Warning, "Page number alignment"),
        // ===== STRUCTURE =====
        Rule::new(structural_ids::REQUIRED_SECTION, RuleScope::Structural, A::Satisfied, flag(true), C::Section, Error, "Required section present"),
        Rule::new(structural_ids::CAPTION_SEQUENCE, RuleScope::Structural, A::Satisfied, flag(true), C::Numbering, Warning, "Captions numbered 1..n within each chapter"),
        Rule::new(structural_ids::TOC_ENTRY_MISSING, RuleScope::Structural, A::Satisfied, flag(true), C::Heading, Warning, "Table of contents entry has a matching heading"),
        Rule::new(structural_ids::TOC_HEADING_MISSING, RuleScope::Structural, A::Satisfied, flag(true), C::Heading, Warning, "Numbered heading listed in the table of contents"),
    ];

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RuleRegistry {
        RuleRegistry::from_config(&StyleGuideConfig::default()).unwrap()
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = registry();
        let mut ids: Vec<&str> = registry.iter().map(|r| r.id).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_rules_for_zone_keep_registry_order() {
        let registry = registry();
        let ids: Vec<&str> = registry.rules_for(Zone::Body).map(|r| r.id).collect();
        assert_eq!(ids[0], "font.family");
        assert_eq!(ids[1], "body.font_size");
        assert!(ids.contains(&"heading.unrecognized_format"));
        assert!(registry.rules_for(Zone::Cover).next().is_none());
        assert_eq!(registry.document_rules().count(), 6);
        assert_eq!(registry.span_rules(Zone::Abstract).count(), 1);
        assert_eq!(registry.table_rules().count(), 1);
    }

    #[test]
    fn test_numeric_band_is_inclusive() {
        let cmp = Comparison::around(3.0, 0.05, Unit::Cm);
        assert!(cmp.is_satisfied_by(&Value::Number(2.95)));
        assert!(cmp.is_satisfied_by(&Value::Number(3.05)));
        assert!(!cmp.is_satisfied_by(&Value::Number(2.9)));
        assert_eq!(cmp.describe_expected(), "3 cm (±0.05)");
        assert_eq!(cmp.describe_actual(&Value::Number(2.9)), "2.9 cm");
    }

    #[test]
    fn test_word_count_range() {
        let cmp = Comparison::WordCountRange { min: 200, max: 250 };
        assert!(!cmp.is_satisfied_by(&Value::Count(199)));
        assert!(cmp.is_satisfied_by(&Value::Count(200)));
        assert!(cmp.is_satisfied_by(&Value::Count(250)));
        assert!(!cmp.is_satisfied_by(&Value::Count(251)));
        assert!(cmp.is_satisfied_by(&Value::Text("kelime ".repeat(220))));
    }

    #[test]
    fn test_text_equality_is_trimmed_and_case_insensitive() {
        let cmp = Comparison::Equals(Value::Text("Times New Roman".to_string()));
        assert!(cmp.is_satisfied_by(&Value::Text(" times new roman ".to_string())));
        assert!(!cmp.is_satisfied_by(&Value::Text("Arial".to_string())));
        assert!(!cmp.is_satisfied_by(&Value::Bool(true)));
    }

    #[test]
    fn test_caption_numbering_pattern() {
        let registry = registry();
        let rule = registry.get("caption.numbering").unwrap();
        assert!(rule.comparison.is_satisfied_by(&Value::Text("TABLO 3.2: BAŞLIK".to_string())));
        assert!(!rule.comparison.is_satisfied_by(&Value::Text("TABLO 3: BAŞLIK".to_string())));
        assert!(rule.comparison.is_satisfied_by(&Value::Text("ŞEKİL 1.4. AKIŞ".to_string())));
        // The second number must end where the number ends
        assert!(!rule.comparison.is_satisfied_by(&Value::Text("TABLO 3.2.1: BAŞLIK".to_string())));
        assert!(!rule.comparison.is_satisfied_by(&Value::Text("TABLO 3.2A: BAŞLIK".to_string())));
    }

    #[test]
    fn test_bibliography_patterns_are_anchored() {
        let registry = registry();
        let author = &registry.get("bibliography.author").unwrap().comparison;
        let year = &registry.get("bibliography.year").unwrap().comparison;
        let entry = Value::Text("Yılmaz, A. (2020). Tez yazımı. Ankara: Yayınevi.".to_string());
        assert!(author.is_satisfied_by(&entry));
        assert!(year.is_satisfied_by(&entry));
        let loose = Value::Text("A. Yılmaz, Tez yazımı, 2020.".to_string());
        assert!(!author.is_satisfied_by(&loose));
        assert!(!year.is_satisfied_by(&loose));
    }

    #[test]
    fn test_invalid_bibliography_pattern() {
        let mut config = StyleGuideConfig::default();
        config.bibliography.year_pattern = "(".to_string();
        assert!(matches!(
            RuleRegistry::from_config(&config),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RuleRegistry>();
    }
}
