// Zone assignment as a single forward fold over the paragraphs

use super::patterns::HeadingMatcher;
use super::{Boundary, Segmentation};
use crate::casefold::CaseFold;
use crate::config::StyleGuideConfig;
use crate::error::ConfigError;
use crate::types::{
    Alignment, Document, Paragraph, ParagraphSource, SectionCoverage, SectionKind, Zone,
};
use tracing::debug;

/// Part of the thesis the fold is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Cover,
    FrontMatter,
    Abstract,
    TableOfContents,
    Main,
    Bibliography,
}

impl Region {
    /// Zone for blank paragraphs, which never move the fold
    fn default_zone(self) -> Zone {
        match self {
            Region::Cover => Zone::Cover,
            Region::FrontMatter => Zone::Uncategorized,
            Region::Abstract => Zone::Abstract,
            Region::TableOfContents => Zone::TableOfContents,
            Region::Main => Zone::Body,
            Region::Bibliography => Zone::Bibliography,
        }
    }
}

/// Accumulator threaded through [`Segmenter::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentState {
    pub region: Region,
    /// Set after "BİRİNCİ BÖLÜM"; the next line is the chapter title
    pub awaiting_chapter_title: bool,
    /// Non-blank body paragraphs seen so far
    pub seen: usize,
    /// Section opened by the paragraph just stepped over
    pub opened: Option<SectionKind>,
}

impl Default for SegmentState {
    fn default() -> Self {
        Self {
            region: Region::Cover,
            awaiting_chapter_title: false,
            seen: 0,
            opened: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Segmenter {
    matcher: HeadingMatcher,
    max_cover_paragraphs: usize,
    front_matter_body_min_chars: usize,
    block_quote_min_cm: f64,
    required_sections: Vec<SectionKind>,
}

impl Segmenter {
    pub fn new(config: &StyleGuideConfig) -> Result<Self, ConfigError> {
        let fold = CaseFold::new(config.locale);
        Ok(Self {
            matcher: HeadingMatcher::new(&config.segmentation, fold)?,
            max_cover_paragraphs: config.segmentation.max_cover_paragraphs,
            front_matter_body_min_chars: config.segmentation.front_matter_body_min_chars,
            block_quote_min_cm: config.indents.block_quote_min_cm,
            required_sections: config.segmentation.required_sections.clone(),
        })
    }

    pub fn matcher(&self) -> &HeadingMatcher {
        &self.matcher
    }

    pub fn segment(&self, document: &Document) -> Segmentation {
        let (_, zones, boundaries) = document.paragraphs.iter().fold(
            (
                SegmentState::default(),
                Vec::with_capacity(document.paragraphs.len()),
                Vec::new(),
            ),
            |(state, mut zones, mut boundaries), paragraph| {
                let (next, zone) = self.step(state, paragraph);
                if let Some(kind) = next.opened {
                    boundaries.push(Boundary {
                        kind,
                        heading: paragraph.index,
                    });
                }
                zones.push(zone);
                (next, zones, boundaries)
            },
        );

        let coverage = self
            .required_sections
            .iter()
            .map(|&section| {
                let heading = boundaries
                    .iter()
                    .find(|b: &&Boundary| b.kind == section)
                    .map(|b| b.heading);
                SectionCoverage {
                    section,
                    found: heading.is_some(),
                    heading,
                }
            })
            .collect();

        let segmentation = Segmentation {
            zones,
            boundaries,
            coverage,
        };
        debug!(
            "Segmented {} paragraphs into {} sections",
            segmentation.zones.len(),
            segmentation.boundaries.len()
        );
        segmentation
    }

    /// Classify one paragraph. Pure: the result depends only on the state
    /// and the paragraph.
    pub fn step(&self, state: SegmentState, paragraph: &Paragraph) -> (SegmentState, Zone) {
        let mut next = SegmentState {
            opened: None,
            ..state
        };

        match &paragraph.source {
            ParagraphSource::TableCell { .. } => return (next, Zone::TableCell),
            ParagraphSource::Footnote { .. } => return (next, Zone::Footnote),
            ParagraphSource::Footer { .. } if paragraph.has_page_field => {
                return (next, Zone::PageNumber)
            }
            ParagraphSource::Footer { .. } => return (next, Zone::Uncategorized),
            ParagraphSource::Body => {}
        }

        if paragraph.is_blank() {
            return (next, state.region.default_zone());
        }

        next.seen += 1;
        if next.region == Region::Cover && next.seen > self.max_cover_paragraphs {
            next.region = Region::FrontMatter;
        }

        let text = paragraph.text();
        let m = &self.matcher;

        if let Some(kind) = m.named_section(&text) {
            next.opened = Some(kind);
            next.awaiting_chapter_title = kind == SectionKind::Chapter;
            next.region = match kind {
                SectionKind::Abstract | SectionKind::ForeignAbstract => Region::Abstract,
                SectionKind::TableOfContents | SectionKind::FrontList => Region::TableOfContents,
                SectionKind::FrontMatter => Region::FrontMatter,
                SectionKind::Bibliography => Region::Bibliography,
                SectionKind::Introduction
                | SectionKind::Chapter
                | SectionKind::Conclusion
                | SectionKind::Appendix => Region::Main,
            };
            return (next, Zone::ChapterHeading);
        }

        match next.region {
            Region::Cover => (next, Zone::Cover),
            Region::TableOfContents => (next, Zone::TableOfContents),
            Region::Abstract => {
                if m.is_keywords_line(&text) {
                    next.region = Region::FrontMatter;
                    (next, Zone::Keywords)
                } else if m.numbered_heading(&text).is_some_and(|h| h.level == 1) {
                    next.region = Region::Main;
                    next.opened = Some(SectionKind::Chapter);
                    (next, Zone::ChapterHeading)
                } else if m.all_caps_heading(&text) {
                    next.region = Region::FrontMatter;
                    (next, Zone::ChapterHeading)
                } else {
                    (next, Zone::Abstract)
                }
            }
            Region::FrontMatter => {
                if m.is_keywords_line(&text) {
                    (next, Zone::Keywords)
                } else if m.numbered_heading(&text).is_some_and(|h| h.level == 1) {
                    next.region = Region::Main;
                    next.opened = Some(SectionKind::Chapter);
                    (next, Zone::ChapterHeading)
                } else if m.all_caps_heading(&text) {
                    (next, Zone::ChapterHeading)
                } else if self.is_front_matter_body(paragraph, &text) {
                    (next, Zone::Body)
                } else {
                    (next, Zone::Uncategorized)
                }
            }
            Region::Bibliography => {
                if m.numbered_heading(&text).is_some_and(|h| h.level == 1) {
                    next.region = Region::Main;
                    next.opened = Some(SectionKind::Chapter);
                    (next, Zone::ChapterHeading)
                } else if m.all_caps_heading(&text) {
                    next.region = Region::Main;
                    (next, Zone::ChapterHeading)
                } else {
                    (next, Zone::Bibliography)
                }
            }
            Region::Main => {
                if next.awaiting_chapter_title {
                    next.awaiting_chapter_title = false;
                    return (next, Zone::ChapterHeading);
                }
                if let Some(zone) = m.caption_zone(&text) {
                    return (next, zone);
                }
                match m.numbered_heading(&text) {
                    Some(h) if h.level == 1 => {
                        next.opened = Some(SectionKind::Chapter);
                        (next, Zone::ChapterHeading)
                    }
                    Some(_) => (next, Zone::Subheading),
                    None if m.all_caps_heading(&text) => (next, Zone::ChapterHeading),
                    None if self.is_block_quote(paragraph) => (next, Zone::BlockQuote),
                    None if paragraph.format.alignment == Alignment::Right => {
                        (next, Zone::Epigraph)
                    }
                    None => (next, Zone::Body),
                }
            }
        }
    }

    fn is_block_quote(&self, paragraph: &Paragraph) -> bool {
        let f = &paragraph.format;
        f.left_indent_cm + 1e-9 >= self.block_quote_min_cm
            && f.right_indent_cm + 1e-9 >= self.block_quote_min_cm
    }

    /// Long, left or justified prose on front pages (preface, acknowledgements)
    fn is_front_matter_body(&self, paragraph: &Paragraph, text: &str) -> bool {
        !matches!(
            paragraph.format.alignment,
            Alignment::Center | Alignment::Right
        ) && text.trim().chars().count() >= self.front_matter_body_min_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Run, RunFormatting};

    fn para(index: usize, text: &str) -> Paragraph {
        Paragraph {
            index,
            runs: vec![Run {
                text: text.to_string(),
                format: RunFormatting::default(),
            }],
            ..Default::default()
        }
    }

    fn zones_of(texts: &[&str]) -> Vec<Zone> {
        let segmenter = Segmenter::new(&StyleGuideConfig::default()).unwrap();
        let document = Document {
            paragraphs: texts.iter().enumerate().map(|(i, t)| para(i, t)).collect(),
            ..Default::default()
        };
        segmenter.segment(&document).zones
    }

    #[test]
    fn test_step_is_pure() {
        let segmenter = Segmenter::new(&StyleGuideConfig::default()).unwrap();
        let p = para(0, "ÖZET");
        let first = segmenter.step(SegmentState::default(), &p);
        let second = segmenter.step(SegmentState::default(), &p);
        assert_eq!(first, second);
        assert_eq!(first.0.region, Region::Abstract);
        assert_eq!(first.0.opened, Some(SectionKind::Abstract));
    }

    #[test]
    fn test_cover_until_first_named_heading() {
        let zones = zones_of(&["T.C.", "ÜNİVERSİTESİ", "Tez Başlığı", "ÖZET", "Metin"]);
        assert_eq!(zones[..3], [Zone::Cover, Zone::Cover, Zone::Cover]);
        assert_eq!(zones[3], Zone::ChapterHeading);
        assert_eq!(zones[4], Zone::Abstract);
    }

    #[test]
    fn test_blank_paragraphs_take_region_zone() {
        let zones = zones_of(&["ÖZET", "", "Metin", "1. GİRİŞ", "", "Gövde metni burada."]);
        assert_eq!(zones[1], Zone::Abstract);
        assert_eq!(zones[4], Zone::Body);
    }

    #[test]
    fn test_ordinal_chapter_title_line() {
        let zones = zones_of(&[
            "ÖZET",
            "Özet metni.",
            "BİRİNCİ BÖLÜM",
            "",
            "Kuramsal Çerçeve",
            "Bu bölümde kavramlar tartışılır.",
        ]);
        assert_eq!(zones[2], Zone::ChapterHeading);
        assert_eq!(zones[3], Zone::Body);
        assert_eq!(zones[4], Zone::ChapterHeading);
        assert_eq!(zones[5], Zone::Body);
    }

    #[test]
    fn test_main_text_zones() {
        let zones = zones_of(&[
            "1. GİRİŞ",
            "1.1. Amaç",
            "Tablo 1.1: Katılımcılar",
            "Şekil 1.1: Model",
            "Normal bir paragraf.",
        ]);
        assert_eq!(
            zones,
            vec![
                Zone::ChapterHeading,
                Zone::Subheading,
                Zone::TableCaption,
                Zone::FigureCaption,
                Zone::Body
            ]
        );
    }

    #[test]
    fn test_bibliography_runs_to_next_top_level_heading() {
        let zones = zones_of(&[
            "KAYNAKÇA",
            "Yılmaz, A. (2020). Kitap. Ankara: Yayınevi.",
            "EKLER",
            "Ek metin.",
        ]);
        assert_eq!(zones[1], Zone::Bibliography);
        assert_eq!(zones[2], Zone::ChapterHeading);
        assert_eq!(zones[3], Zone::Body);
    }
}
