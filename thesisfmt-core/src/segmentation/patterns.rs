// Compiled text patterns used to recognise headings, captions and keyword lines

use crate::casefold::{is_all_caps, CaseFold};
use crate::config::{HeadingPatterns, SegmentationConfig};
use crate::error::ConfigError;
use crate::types::{SectionKind, Zone};
use regex::Regex;

/// Compile one configured pattern, naming the config field on failure
pub fn compile(field: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        field: field.to_string(),
        source,
    })
}

fn compile_all(field: &str, patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .enumerate()
        .map(|(i, p)| compile(&format!("{field}[{i}]"), p))
        .collect()
}

/// Alternation of upper-folded caption keywords, e.g. `(?:TABLO|TABLE)`
pub fn keyword_alternation(fold: &CaseFold, keywords: &[String]) -> String {
    let escaped: Vec<String> = keywords
        .iter()
        .map(|k| regex::escape(&fold.to_upper(k.trim())))
        .collect();
    format!("(?:{})", escaped.join("|"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberedHeading {
    /// 1 for `3.`, 2 for `3.1`, ...
    pub level: usize,
}

#[derive(Debug, Clone)]
pub struct HeadingMatcher {
    fold: CaseFold,
    named: Vec<(SectionKind, Vec<Regex>)>,
    numbered: Regex,
    keywords_line: Regex,
    table_caption: Regex,
    figure_caption: Regex,
    max_heading_chars: usize,
}

impl HeadingMatcher {
    pub fn new(config: &SegmentationConfig, fold: CaseFold) -> Result<Self, ConfigError> {
        let HeadingPatterns {
            abstract_heading,
            foreign_abstract,
            table_of_contents,
            front_lists,
            front_matter,
            introduction,
            conclusion,
            bibliography,
            appendix,
            ordinal_chapter,
        } = &config.headings;

        // Order matters: the first kind whose pattern matches wins
        let named = vec![
            (SectionKind::Abstract, compile_all("segmentation.headings.abstract_heading", abstract_heading)?),
            (SectionKind::ForeignAbstract, compile_all("segmentation.headings.foreign_abstract", foreign_abstract)?),
            (SectionKind::TableOfContents, compile_all("segmentation.headings.table_of_contents", table_of_contents)?),
            (SectionKind::FrontList, compile_all("segmentation.headings.front_lists", front_lists)?),
            (SectionKind::FrontMatter, compile_all("segmentation.headings.front_matter", front_matter)?),
            (SectionKind::Introduction, compile_all("segmentation.headings.introduction", introduction)?),
            (SectionKind::Conclusion, compile_all("segmentation.headings.conclusion", conclusion)?),
            (SectionKind::Bibliography, compile_all("segmentation.headings.bibliography", bibliography)?),
            (SectionKind::Appendix, compile_all("segmentation.headings.appendix", appendix)?),
            (SectionKind::Chapter, compile_all("segmentation.headings.ordinal_chapter", ordinal_chapter)?),
        ];

        let table_keywords = keyword_alternation(&fold, &config.table_caption_keywords);
        let figure_keywords = keyword_alternation(&fold, &config.figure_caption_keywords);
        // A number followed by a separator or the end of the line. "Tablo 3'te" is prose.
        let caption_tail = r"\s*\d+(?:\.\s*\d+)*(?:\s*[:.\-–—]|\s*$)";

        Ok(Self {
            fold,
            named,
            numbered: compile("numbered heading", r"^(\d+(?:\.\d+)*)\.?\s+(\S.*)$")?,
            keywords_line: compile(
                "segmentation.keywords_line_pattern",
                &config.keywords_line_pattern,
            )?,
            table_caption: compile(
                "segmentation.table_caption_keywords",
                &format!("^{table_keywords}{caption_tail}"),
            )?,
            figure_caption: compile(
                "segmentation.figure_caption_keywords",
                &format!("^{figure_keywords}{caption_tail}"),
            )?,
            max_heading_chars: config.max_heading_chars,
        })
    }

    pub fn fold(&self) -> &CaseFold {
        &self.fold
    }

    fn short_enough(&self, text: &str) -> bool {
        text.chars().count() <= self.max_heading_chars
    }

    /// Section opened by a named heading (ÖZET, GİRİŞ, BİRİNCİ BÖLÜM, ...)
    pub fn named_section(&self, text: &str) -> Option<SectionKind> {
        let text = text.trim();
        if !self.short_enough(text) {
            return None;
        }
        let upper = self.fold.to_upper(text);
        self.named
            .iter()
            .find(|(_, patterns)| patterns.iter().any(|re| re.is_match(&upper)))
            .map(|(kind, _)| *kind)
    }

    /// `3.`, `3.1 Title`, ... The title must start with an upper-case letter
    /// and must not end like a sentence.
    pub fn numbered_heading(&self, text: &str) -> Option<NumberedHeading> {
        let text = text.trim();
        if !self.short_enough(text) || text.ends_with('.') {
            return None;
        }
        let caps = self.numbered.captures(text)?;
        let title = caps.get(2)?.as_str();
        let first = title.chars().next()?;
        if !(first.is_alphabetic() && first.is_uppercase()) {
            return None;
        }
        let level = caps.get(1)?.as_str().split('.').count();
        Some(NumberedHeading { level })
    }

    /// Short all-caps line with at least three letters
    pub fn all_caps_heading(&self, text: &str) -> bool {
        let text = text.trim();
        self.short_enough(text)
            && text.chars().filter(|c| c.is_alphabetic()).count() >= 3
            && is_all_caps(text)
    }

    pub fn caption_zone(&self, text: &str) -> Option<Zone> {
        let upper = self.fold.to_upper(text.trim());
        if self.table_caption.is_match(&upper) {
            Some(Zone::TableCaption)
        } else if self.figure_caption.is_match(&upper) {
            Some(Zone::FigureCaption)
        } else {
            None
        }
    }

    pub fn is_keywords_line(&self, text: &str) -> bool {
        self.keywords_line.is_match(&self.fold.to_upper(text.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Locale, StyleGuideConfig};

    fn matcher() -> HeadingMatcher {
        let config = StyleGuideConfig::default();
        HeadingMatcher::new(&config.segmentation, CaseFold::new(Locale::Turkish)).unwrap()
    }

    #[test]
    fn test_named_sections_are_case_insensitive() {
        let m = matcher();
        assert_eq!(m.named_section("ÖZET"), Some(SectionKind::Abstract));
        assert_eq!(m.named_section("Özet"), Some(SectionKind::Abstract));
        assert_eq!(m.named_section("1. GİRİŞ"), Some(SectionKind::Introduction));
        assert_eq!(m.named_section("giriş"), Some(SectionKind::Introduction));
        assert_eq!(m.named_section("İçindekiler"), Some(SectionKind::TableOfContents));
        assert_eq!(m.named_section("KAYNAKÇA"), Some(SectionKind::Bibliography));
        assert_eq!(m.named_section("References"), Some(SectionKind::Bibliography));
        assert_eq!(m.named_section("İKİNCİ BÖLÜM"), Some(SectionKind::Chapter));
        assert_eq!(m.named_section("Giriş bölümünde yöntem anlatılır"), None);
    }

    #[test]
    fn test_numbered_headings() {
        let m = matcher();
        assert_eq!(m.numbered_heading("1. GİRİŞ"), Some(NumberedHeading { level: 1 }));
        assert_eq!(m.numbered_heading("2.3 Yöntem"), Some(NumberedHeading { level: 2 }));
        assert_eq!(m.numbered_heading("2.3.1. Veri Seti"), Some(NumberedHeading { level: 3 }));
        assert_eq!(m.numbered_heading("3. sınıf öğrencileri"), None);
        assert_eq!(m.numbered_heading("2019 yılında yapılan"), None);
        assert_eq!(m.numbered_heading("1. Yılmaz, A. (2020). Kitap."), None);
    }

    #[test]
    fn test_captions_detected_loosely() {
        let m = matcher();
        assert_eq!(m.caption_zone("Tablo 3.2: Başlık"), Some(Zone::TableCaption));
        assert_eq!(m.caption_zone("Tablo 3: Başlık"), Some(Zone::TableCaption));
        assert_eq!(m.caption_zone("Şekil 1.4. Akış"), Some(Zone::FigureCaption));
        assert_eq!(m.caption_zone("Figure 2.1: Flow"), Some(Zone::FigureCaption));
        assert_eq!(m.caption_zone("Tablo 3'te görüldüğü gibi"), None);
    }

    #[test]
    fn test_keywords_line() {
        let m = matcher();
        assert!(m.is_keywords_line("Anahtar Kelimeler: tez, biçim, denetim"));
        assert!(m.is_keywords_line("Keywords: thesis, format"));
        assert!(!m.is_keywords_line("Anahtar fikir şudur"));
    }

    #[test]
    fn test_invalid_pattern_names_field() {
        let mut config = StyleGuideConfig::default();
        config.segmentation.headings.bibliography = vec!["^(KAYNAK".to_string()];
        let err = HeadingMatcher::new(&config.segmentation, CaseFold::default()).unwrap_err();
        match err {
            ConfigError::InvalidPattern { field, .. } => {
                assert_eq!(field, "segmentation.headings.bibliography[0]")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
