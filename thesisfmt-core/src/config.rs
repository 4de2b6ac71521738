use crate::error::ConfigError;
use crate::types::SectionKind;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Locale used for case-insensitive matching of headings and keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    /// Turkish dotted/dotless I rules
    #[default]
    #[serde(rename = "tr")]
    Turkish,
    /// Unicode default case mapping
    #[serde(rename = "invariant")]
    Invariant,
}

/// Style guide the document is checked against.
///
/// Every field has a default taken from the institution's thesis writing
/// guide, so a YAML file only needs the values it wants to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleGuideConfig {
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub fonts: FontConfig,
    #[serde(default)]
    pub spacing: SpacingConfig,
    #[serde(default)]
    pub indents: IndentConfig,
    #[serde(default, rename = "abstract")]
    pub abstract_limits: AbstractConfig,
    #[serde(default)]
    pub segmentation: SegmentationConfig,
    #[serde(default)]
    pub bibliography: BibliographyConfig,
    /// Words allowed to stay lower-case inside a title-cased subheading
    #[serde(default = "default_title_case_exceptions")]
    pub title_case_exceptions: Vec<String>,
}

impl Default for StyleGuideConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            page: PageConfig::default(),
            fonts: FontConfig::default(),
            spacing: SpacingConfig::default(),
            indents: IndentConfig::default(),
            abstract_limits: AbstractConfig::default(),
            segmentation: SegmentationConfig::default(),
            bibliography: BibliographyConfig::default(),
            title_case_exceptions: default_title_case_exceptions(),
        }
    }
}

fn default_title_case_exceptions() -> Vec<String> {
    ["ve", "veya", "ya", "da", "de", "ile", "and", "or", "the", "a", "an", "of", "in", "for"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub margin_top_cm: f64,
    pub margin_bottom_cm: f64,
    pub margin_left_cm: f64,
    pub margin_right_cm: f64,
    /// Allowed deviation for every margin, absorbs twip rounding
    pub margin_tolerance_cm: f64,
    /// Distance from the page edge to the footer holding the page number
    pub footer_distance_cm: f64,
    pub footer_distance_tolerance_cm: f64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            margin_top_cm: 3.0,
            margin_bottom_cm: 3.0,
            margin_left_cm: 3.0,
            margin_right_cm: 3.0,
            margin_tolerance_cm: 0.05,
            footer_distance_cm: 1.25,
            footer_distance_tolerance_cm: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub family: String,
    /// Fonts used for symbols and equations, never reported as wrong
    pub exempt_families: Vec<String>,
    pub body_pt: f64,
    pub footnote_pt: f64,
    pub block_quote_pt: f64,
    pub epigraph_pt: f64,
    pub chapter_heading_pt: f64,
    pub subheading_pt: f64,
    pub caption_pt: f64,
    pub table_content_pt: f64,
    pub page_number_pt: f64,
    pub size_tolerance_pt: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "Times New Roman".to_string(),
            exempt_families: ["Symbol", "Wingdings", "Cambria Math", "Webdings", "MS Mincho"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            body_pt: 12.0,
            footnote_pt: 10.0,
            block_quote_pt: 11.0,
            epigraph_pt: 11.0,
            chapter_heading_pt: 14.0,
            subheading_pt: 12.0,
            caption_pt: 12.0,
            table_content_pt: 11.0,
            page_number_pt: 10.0,
            size_tolerance_pt: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacingConfig {
    pub body_line_spacing: f64,
    pub footnote_line_spacing: f64,
    pub block_quote_line_spacing: f64,
    pub line_spacing_tolerance: f64,
    pub paragraph_before_pt: f64,
    pub paragraph_after_pt: f64,
    pub footnote_before_pt: f64,
    pub footnote_after_pt: f64,
    pub bibliography_before_pt: f64,
    pub bibliography_after_pt: f64,
    pub spacing_tolerance_pt: f64,
    /// Minimum white space above a chapter heading (space before plus blank lines)
    pub chapter_lead_space_pt: f64,
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self {
            body_line_spacing: 1.5,
            footnote_line_spacing: 1.0,
            block_quote_line_spacing: 1.0,
            line_spacing_tolerance: 0.1,
            paragraph_before_pt: 6.0,
            paragraph_after_pt: 6.0,
            footnote_before_pt: 0.0,
            footnote_after_pt: 0.0,
            bibliography_before_pt: 3.0,
            bibliography_after_pt: 3.0,
            spacing_tolerance_pt: 1.1,
            chapter_lead_space_pt: 80.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndentConfig {
    pub first_line_cm: f64,
    pub first_line_tolerance_cm: f64,
    /// Hanging indent of bibliography entries
    pub hanging_cm: f64,
    pub hanging_tolerance_cm: f64,
    /// Left and right indent from which a paragraph counts as a block quote
    pub block_quote_min_cm: f64,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            first_line_cm: 1.25,
            first_line_tolerance_cm: 0.2,
            hanging_cm: 1.0,
            hanging_tolerance_cm: 0.2,
            block_quote_min_cm: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AbstractConfig {
    pub min_words: usize,
    pub max_words: usize,
    pub min_keywords: usize,
    pub max_keywords: usize,
}

impl Default for AbstractConfig {
    fn default() -> Self {
        Self {
            min_words: 200,
            max_words: 250,
            min_keywords: 3,
            max_keywords: 5,
        }
    }
}

/// Patterns that drive zone segmentation.
///
/// Heading patterns are matched against the upper-cased text (with the
/// configured locale), so they are written in upper case. `[İI]` covers both
/// a Turkish upper-cased `i` and a literal ASCII `I` typed by the author.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    pub headings: HeadingPatterns,
    pub table_caption_keywords: Vec<String>,
    pub figure_caption_keywords: Vec<String>,
    /// Line that closes an abstract ("Anahtar Kelimeler: ...")
    pub keywords_line_pattern: String,
    /// Longer paragraphs are never treated as headings
    pub max_heading_chars: usize,
    /// Cover pages end here even when no front-matter heading was seen
    pub max_cover_paragraphs: usize,
    /// Front matter paragraphs at least this long are checked as body text
    pub front_matter_body_min_chars: usize,
    /// Sections whose absence is reported as a structural finding
    pub required_sections: Vec<SectionKind>,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            headings: HeadingPatterns::default(),
            table_caption_keywords: vec!["Tablo".to_string(), "Table".to_string()],
            figure_caption_keywords: vec!["Şekil".to_string(), "Figure".to_string()],
            keywords_line_pattern: r"^(ANAHTAR KEL[İI]MELER|KEY ?WORDS)\s*:".to_string(),
            max_heading_chars: 120,
            max_cover_paragraphs: 40,
            front_matter_body_min_chars: 150,
            required_sections: vec![
                SectionKind::Abstract,
                SectionKind::ForeignAbstract,
                SectionKind::TableOfContents,
                SectionKind::Introduction,
                SectionKind::Conclusion,
                SectionKind::Bibliography,
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingPatterns {
    pub abstract_heading: Vec<String>,
    pub foreign_abstract: Vec<String>,
    pub table_of_contents: Vec<String>,
    /// Lists of tables, figures and abbreviations
    pub front_lists: Vec<String>,
    /// Other named front matter pages (preface, ethics statement, ...)
    pub front_matter: Vec<String>,
    pub introduction: Vec<String>,
    pub conclusion: Vec<String>,
    pub bibliography: Vec<String>,
    pub appendix: Vec<String>,
    /// "BİRİNCİ BÖLÜM" style headings, followed by a separate title line
    pub ordinal_chapter: Vec<String>,
}

fn patterns(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for HeadingPatterns {
    fn default() -> Self {
        Self {
            abstract_heading: patterns(&[r"^ÖZET$"]),
            foreign_abstract: patterns(&[r"^ABSTRACT$"]),
            table_of_contents: patterns(&[r"^[İI]ÇİNDEK[İI]LER$", r"^(TABLE OF )?CONTENTS$"]),
            front_lists: patterns(&[
                r"^TABLOLAR L[İI]STES[İI]$",
                r"^ŞEK[İI]LLER L[İI]STES[İI]$",
                r"^S[İI]MGELER VE KISALTMALAR( L[İI]STES[İI])?$",
                r"^KISALTMALAR( L[İI]STES[İI])?$",
                r"^L[İI]ST OF (TABLES|F[İI]GURES|ABBREV[İI]AT[İI]ONS)$",
            ]),
            front_matter: patterns(&[
                r"^ÖN ?SÖZ$",
                r"^TEŞEKKÜR$",
                r"^B[İI]L[İI]MSEL ET[İI]ĞE UYGUNLUK( SAYFASI)?$",
                r"^ET[İI]K KURUL ONAYI$",
                r"^TEZ ÖZGÜNLÜK SAYFASI$",
                r"^KILAVUZA UYGUNLUK( SAYFASI)?$",
                r"^KABUL VE ONAY( TUTANAĞI| SAYFASI)?$",
                r"^ÖZGEÇM[İI]Ş$",
            ]),
            introduction: patterns(&[r"^(\d+\.?\s+)?G[İI]R[İI]Ş$", r"^(\d+\.?\s+)?INTRODUCT[İI]ON$"]),
            conclusion: patterns(&[
                r"^(\d+\.?\s+)?SONUÇ( VE ÖNER[İI]LER)?$",
                r"^(\d+\.?\s+)?SONUÇLAR$",
                r"^(\d+\.?\s+)?CONCLUS[İI]ONS?$",
            ]),
            bibliography: patterns(&[r"^(KAYNAKÇA|KAYNAKLAR|REFERENCES|B[İI]BL[İI]OGRAPHY)$"]),
            appendix: patterns(&[r"^EKLER$", r"^EK[\s\-]*\d+", r"^APPEND[İI]X"]),
            ordinal_chapter: patterns(&[
                r"^(B[İI]R[İI]NC[İI]|[İI]K[İI]NC[İI]|ÜÇÜNCÜ|DÖRDÜNCÜ|BEŞ[İI]NC[İI]|ALTINCI|YED[İI]NC[İI]|SEK[İI]Z[İI]NC[İI]|DOKUZUNCU|ONUNCU)\s+BÖLÜM$",
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BibliographyConfig {
    /// An entry must start with "Surname, I."
    pub author_pattern: String,
    /// An entry must carry a publication year in parentheses
    pub year_pattern: String,
}

impl Default for BibliographyConfig {
    fn default() -> Self {
        Self {
            author_pattern: r"^\p{Lu}[\p{L}'’\-]+(\s\p{Lu}[\p{L}'’\-]+)*,\s*\p{Lu}\.".to_string(),
            year_pattern: r"\(\d{4}[a-z]?\)".to_string(),
        }
    }
}

impl StyleGuideConfig {
    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> std::result::Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config: StyleGuideConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                warn!("Failed to load config from {p}, using defaults: {e}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject bounds and tolerances that can never be satisfied
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let abs = &self.abstract_limits;
        if abs.min_words > abs.max_words {
            return Err(ConfigError::InvalidValue {
                field: "abstract.min_words".to_string(),
                reason: format!("{} is above max_words {}", abs.min_words, abs.max_words),
            });
        }
        if abs.min_keywords > abs.max_keywords {
            return Err(ConfigError::InvalidValue {
                field: "abstract.min_keywords".to_string(),
                reason: format!("{} is above max_keywords {}", abs.min_keywords, abs.max_keywords),
            });
        }

        let tolerances = [
            ("page.margin_tolerance_cm", self.page.margin_tolerance_cm),
            ("page.footer_distance_tolerance_cm", self.page.footer_distance_tolerance_cm),
            ("fonts.size_tolerance_pt", self.fonts.size_tolerance_pt),
            ("spacing.line_spacing_tolerance", self.spacing.line_spacing_tolerance),
            ("spacing.spacing_tolerance_pt", self.spacing.spacing_tolerance_pt),
            ("indents.first_line_tolerance_cm", self.indents.first_line_tolerance_cm),
            ("indents.hanging_tolerance_cm", self.indents.hanging_tolerance_cm),
        ];
        for (field, value) in tolerances {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("tolerance must be a non-negative number, got {value}"),
                });
            }
        }
        Ok(())
    }
}
