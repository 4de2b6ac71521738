use crate::loader::styles::StyleSheet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The schema version stamped on every report envelope.
/// Bump this when the output shape changes.
pub const SCHEMA_VERSION: &str = "0.1.0";

// ===== DOCUMENT MODEL =====
// Produced once by the loader and read-only for the rest of the pipeline.
// Lengths are stored in centimetres, font sizes and paragraph spacing in points.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Map a `w:jc` value onto the four alignments the style guide cares about
    pub fn from_ooxml(val: &str) -> Option<Self> {
        match val {
            "left" | "start" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" | "end" => Some(Self::Right),
            "both" | "distribute" | "thaiDistribute" | "lowKashida" | "mediumKashida"
            | "highKashida" => Some(Self::Justify),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "justify",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "value", rename_all = "snake_case")]
pub enum LineSpacing {
    /// `lineRule="auto"`: a multiple of single spacing
    Multiple(f64),
    /// `lineRule="exact"`, in points
    Exact(f64),
    /// `lineRule="atLeast"`, in points
    AtLeast(f64),
}

impl Default for LineSpacing {
    fn default() -> Self {
        Self::Multiple(1.0)
    }
}

impl LineSpacing {
    /// Express the spacing as a multiple. Fixed point values are measured
    /// against `base_pt`, the configured body font size.
    pub fn as_multiple(&self, base_pt: f64) -> f64 {
        match *self {
            Self::Multiple(m) => m,
            Self::Exact(pt) | Self::AtLeast(pt) => {
                if base_pt > 0.0 {
                    pt / base_pt
                } else {
                    1.0
                }
            }
        }
    }
}

/// Effective run formatting after every inheritance layer has been merged
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunFormatting {
    /// `None` when no layer names a font and the theme can't resolve one
    pub font_family: Option<String>,
    pub font_size_pt: f64,
    pub bold: bool,
    pub italic: bool,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    pub format: RunFormatting,
}

impl Run {
    pub fn has_visible_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Numbering {
    pub num_id: u32,
    pub level: u8,
}

/// Effective paragraph formatting
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParagraphFormatting {
    pub alignment: Alignment,
    pub line_spacing: LineSpacing,
    pub space_before_pt: f64,
    pub space_after_pt: f64,
    pub first_line_indent_cm: f64,
    pub hanging_indent_cm: f64,
    pub left_indent_cm: f64,
    pub right_indent_cm: f64,
    pub numbering: Option<Numbering>,
    pub outline_level: Option<u8>,
}

/// Which package part a paragraph was read from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "part", rename_all = "snake_case")]
pub enum ParagraphSource {
    #[default]
    Body,
    TableCell { table: usize },
    Footnote { note_id: i64 },
    Footer { part_name: String },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paragraph {
    /// Stable zero-based position used in every finding
    pub index: usize,
    pub source: ParagraphSource,
    pub style_id: Option<String>,
    pub style_name: Option<String>,
    pub runs: Vec<Run>,
    pub format: ParagraphFormatting,
    /// Set when the paragraph holds a PAGE field
    pub has_page_field: bool,
}

impl Paragraph {
    /// Text of all runs joined in order, so words split across runs reassemble
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| !r.has_visible_text())
    }

    /// Runs that carry something other than whitespace
    pub fn text_runs(&self) -> impl Iterator<Item = &Run> {
        self.runs.iter().filter(|r| r.has_visible_text())
    }

    pub fn is_body(&self) -> bool {
        matches!(self.source, ParagraphSource::Body)
    }

    pub fn table_index(&self) -> Option<usize> {
        match self.source {
            ParagraphSource::TableCell { table } => Some(table),
            _ => None,
        }
    }

    /// Short excerpt for reports, cut on a character boundary
    pub fn snippet(&self, max_chars: usize) -> String {
        let text = self.text();
        let trimmed = text.trim();
        if trimmed.chars().count() <= max_chars {
            trimmed.to_string()
        } else {
            let cut: String = trimmed.chars().take(max_chars).collect();
            format!("{cut}...")
        }
    }
}

/// Page geometry of one section (`w:sectPr`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub margin_top_cm: f64,
    pub margin_bottom_cm: f64,
    pub margin_left_cm: f64,
    pub margin_right_cm: f64,
    pub footer_distance_cm: f64,
    pub page_width_cm: f64,
    pub page_height_cm: f64,
}

impl Default for PageGeometry {
    /// Word's A4 template values, used for attributes a `w:sectPr` leaves out
    fn default() -> Self {
        Self {
            margin_top_cm: 2.5,
            margin_bottom_cm: 2.5,
            margin_left_cm: 2.5,
            margin_right_cm: 2.5,
            footer_distance_cm: 1.25,
            page_width_cm: 21.0,
            page_height_cm: 29.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentDefaults {
    pub font_family: Option<String>,
    pub font_size_pt: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Body and table-cell paragraphs in document order, then footnotes, then footers
    pub paragraphs: Vec<Paragraph>,
    /// One entry per `w:sectPr`, in document order
    pub sections: Vec<PageGeometry>,
    pub defaults: DocumentDefaults,
    pub styles: StyleSheet,
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Geometry of the first section; a package without `w:sectPr` gets Word's defaults
    pub fn geometry(&self) -> PageGeometry {
        self.sections.first().cloned().unwrap_or_default()
    }

    pub fn table_count(&self) -> usize {
        self.paragraphs
            .iter()
            .filter_map(|p| p.table_index())
            .max()
            .map(|max| max + 1)
            .unwrap_or(0)
    }
}

// ===== SEGMENTATION =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Cover,
    Abstract,
    Keywords,
    TableOfContents,
    ChapterHeading,
    Subheading,
    Body,
    BlockQuote,
    Epigraph,
    TableCaption,
    FigureCaption,
    TableCell,
    Footnote,
    Bibliography,
    PageNumber,
    Uncategorized,
}

impl Zone {
    pub const ALL: [Zone; 16] = [
        Zone::Cover,
        Zone::Abstract,
        Zone::Keywords,
        Zone::TableOfContents,
        Zone::ChapterHeading,
        Zone::Subheading,
        Zone::Body,
        Zone::BlockQuote,
        Zone::Epigraph,
        Zone::TableCaption,
        Zone::FigureCaption,
        Zone::TableCell,
        Zone::Footnote,
        Zone::Bibliography,
        Zone::PageNumber,
        Zone::Uncategorized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Cover => "cover",
            Zone::Abstract => "abstract",
            Zone::Keywords => "keywords",
            Zone::TableOfContents => "table_of_contents",
            Zone::ChapterHeading => "chapter_heading",
            Zone::Subheading => "subheading",
            Zone::Body => "body",
            Zone::BlockQuote => "block_quote",
            Zone::Epigraph => "epigraph",
            Zone::TableCaption => "table_caption",
            Zone::FigureCaption => "figure_caption",
            Zone::TableCell => "table_cell",
            Zone::Footnote => "footnote",
            Zone::Bibliography => "bibliography",
            Zone::PageNumber => "page_number",
            Zone::Uncategorized => "uncategorized",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Major thesis sections recognised from their headings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Abstract,
    ForeignAbstract,
    TableOfContents,
    FrontList,
    FrontMatter,
    Introduction,
    Chapter,
    Conclusion,
    Bibliography,
    Appendix,
}

impl SectionKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            SectionKind::Abstract => "Abstract (Özet)",
            SectionKind::ForeignAbstract => "Foreign-language abstract",
            SectionKind::TableOfContents => "Table of contents",
            SectionKind::FrontList => "List of tables/figures",
            SectionKind::FrontMatter => "Front matter",
            SectionKind::Introduction => "Introduction",
            SectionKind::Chapter => "Chapter",
            SectionKind::Conclusion => "Conclusion",
            SectionKind::Bibliography => "Bibliography",
            SectionKind::Appendix => "Appendix",
        }
    }
}

// ===== FINDINGS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Margin,
    Font,
    FontSize,
    LineSpacing,
    Paragraph,
    Heading,
    Table,
    Figure,
    Abstract,
    Reference,
    Section,
    Numbering,
    Footnote,
    PageNumber,
}

impl Category {
    pub const ALL: [Category; 14] = [
        Category::Margin,
        Category::Font,
        Category::FontSize,
        Category::LineSpacing,
        Category::Paragraph,
        Category::Heading,
        Category::Table,
        Category::Figure,
        Category::Abstract,
        Category::Reference,
        Category::Section,
        Category::Numbering,
        Category::Footnote,
        Category::PageNumber,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Margin => "Margins",
            Category::Font => "Font family",
            Category::FontSize => "Font size",
            Category::LineSpacing => "Line spacing",
            Category::Paragraph => "Paragraph layout",
            Category::Heading => "Headings",
            Category::Table => "Tables",
            Category::Figure => "Figures",
            Category::Abstract => "Abstract",
            Category::Reference => "Bibliography",
            Category::Section => "Required sections",
            Category::Numbering => "Numbering",
            Category::Footnote => "Footnotes",
            Category::PageNumber => "Page numbers",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// An expected section was not found
    Structural,
    RuleViolation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Location {
    Document,
    Section { kind: SectionKind },
    Paragraph { index: usize },
    /// Inclusive paragraph range of a zone span
    Span { start: usize, end: usize },
    Table { index: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub location: Location,
    pub category: Category,
    pub rule_id: String,
    pub expected: String,
    pub actual: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

// ===== ANALYSIS RESULT =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionCoverage {
    pub section: SectionKind,
    pub found: bool,
    /// Index of the heading paragraph that opened the section
    pub heading: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: Category,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneCount {
    pub zone: Zone,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentStatistics {
    pub paragraphs: usize,
    pub non_blank_paragraphs: usize,
    pub tables: usize,
    pub table_captions: usize,
    pub figure_captions: usize,
    pub footnotes: usize,
    /// Numbered table-of-contents lines
    pub toc_entries: usize,
    /// Word count of each abstract span, in document order
    pub abstract_word_counts: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub findings: Vec<Finding>,
    pub total_checks: usize,
    pub passed_checks: usize,
    pub violations: usize,
    /// `100 * (1 - violations / total_checks)`, clamped and rounded to one decimal
    pub compliance_score: f64,
    pub zone_coverage: Vec<SectionCoverage>,
    pub category_counts: Vec<CategoryCount>,
    pub zone_counts: Vec<ZoneCount>,
    pub statistics: DocumentStatistics,
}

impl AnalysisResult {
    pub fn findings_in(&self, category: Category) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.category == category)
    }

    pub fn findings_for_rule<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a Finding> {
        self.findings.iter().filter(move |f| f.rule_id == rule_id)
    }

    pub fn structural_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.kind == FindingKind::Structural)
    }
}
