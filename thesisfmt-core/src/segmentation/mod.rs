// Structural segmentation: one zone per paragraph, plus section boundaries

pub mod patterns;
pub mod segmenter;

pub use patterns::HeadingMatcher;
pub use segmenter::{Region, SegmentState, Segmenter};

use crate::types::{Document, Paragraph, SectionCoverage, SectionKind, Zone, ZoneCount};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// First paragraph of a major section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    pub kind: SectionKind,
    /// Index of the heading paragraph
    pub heading: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    /// Parallel to `Document::paragraphs`
    pub zones: Vec<Zone>,
    pub boundaries: Vec<Boundary>,
    pub coverage: Vec<SectionCoverage>,
}

impl Segmentation {
    pub fn zone(&self, index: usize) -> Option<Zone> {
        self.zones.get(index).copied()
    }

    /// Inclusive `(start, end)` ranges of consecutive paragraphs in `zone`.
    /// Tables and captions inside a span do not split it.
    pub fn spans(&self, zone: Zone) -> Vec<(usize, usize)> {
        let mut spans = Vec::new();
        let mut open: Option<(usize, usize)> = None;
        for (index, z) in self.zones.iter().enumerate() {
            if *z == zone {
                open = Some(open.map_or((index, index), |(start, _)| (start, index)));
            } else if !is_floating(*z) {
                spans.extend(open.take());
            }
        }
        spans.extend(open);
        spans
    }

    /// Text of the `zone` paragraphs in `start..=end`, joined with a space
    pub fn span_text(&self, document: &Document, zone: Zone, start: usize, end: usize) -> String {
        document
            .paragraphs
            .get(start..=end)
            .unwrap_or_default()
            .iter()
            .filter(|p| self.zone(p.index) == Some(zone))
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn first_boundary(&self, kind: SectionKind) -> Option<&Boundary> {
        self.boundaries.iter().find(|b| b.kind == kind)
    }

    /// Paragraphs after the first `kind` heading, up to the next section heading
    pub fn section_range(&self, kind: SectionKind) -> Option<Range<usize>> {
        let position = self.boundaries.iter().position(|b| b.kind == kind)?;
        let start = self.boundaries[position].heading + 1;
        let end = self
            .boundaries
            .get(position + 1)
            .map(|b| b.heading)
            .unwrap_or(self.zones.len());
        Some(start..end.max(start))
    }

    /// Paragraph counts per zone, in zone order, zero counts omitted
    pub fn zone_counts(&self) -> Vec<ZoneCount> {
        Zone::ALL
            .iter()
            .map(|&zone| ZoneCount {
                zone,
                count: self.zones.iter().filter(|z| **z == zone).count(),
            })
            .filter(|zc| zc.count > 0)
            .collect()
    }

    /// Paragraphs of `document` carrying `zone`, in index order
    pub fn paragraphs_in<'a>(
        &'a self,
        document: &'a Document,
        zone: Zone,
    ) -> impl Iterator<Item = &'a Paragraph> + 'a {
        document
            .paragraphs
            .iter()
            .filter(move |p| self.zone(p.index) == Some(zone))
    }
}

/// Whitespace-separated tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Tables and captions float inside the text around them
fn is_floating(zone: Zone) -> bool {
    matches!(zone, Zone::TableCell | Zone::TableCaption | Zone::FigureCaption)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segmentation(zones: Vec<Zone>) -> Segmentation {
        Segmentation {
            zones,
            boundaries: vec![
                Boundary {
                    kind: SectionKind::Abstract,
                    heading: 0,
                },
                Boundary {
                    kind: SectionKind::Introduction,
                    heading: 3,
                },
            ],
            coverage: Vec::new(),
        }
    }

    #[test]
    fn test_spans_are_maximal_runs() {
        let seg = segmentation(vec![
            Zone::ChapterHeading,
            Zone::Abstract,
            Zone::Abstract,
            Zone::ChapterHeading,
            Zone::Abstract,
        ]);
        assert_eq!(seg.spans(Zone::Abstract), vec![(1, 2), (4, 4)]);
        assert!(seg.spans(Zone::Bibliography).is_empty());
    }

    #[test]
    fn test_tables_do_not_split_spans() {
        let seg = segmentation(vec![
            Zone::ChapterHeading,
            Zone::Abstract,
            Zone::TableCell,
            Zone::TableCell,
            Zone::Abstract,
            Zone::Keywords,
        ]);
        assert_eq!(seg.spans(Zone::Abstract), vec![(1, 4)]);

        let paragraphs = ["ÖZET", "bir iki", "hücre", "hücre", "üç", "Anahtar"]
            .iter()
            .enumerate()
            .map(|(index, text)| Paragraph {
                index,
                runs: vec![crate::types::Run {
                    text: text.to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            })
            .collect();
        let document = Document {
            paragraphs,
            ..Default::default()
        };
        assert_eq!(seg.span_text(&document, Zone::Abstract, 1, 4), "bir iki üç");
    }

    #[test]
    fn test_section_range_ends_at_next_boundary() {
        let seg = segmentation(vec![Zone::Body; 6]);
        assert_eq!(seg.section_range(SectionKind::Abstract), Some(1..3));
        assert_eq!(seg.section_range(SectionKind::Introduction), Some(4..6));
        assert_eq!(seg.section_range(SectionKind::Conclusion), None);
    }

    #[test]
    fn test_zone_counts_follow_zone_order() {
        let seg = segmentation(vec![Zone::Body, Zone::Cover, Zone::Body]);
        let counts = seg.zone_counts();
        assert_eq!(counts[0].zone, Zone::Cover);
        assert_eq!(counts[1], ZoneCount { zone: Zone::Body, count: 2 });
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("  bir iki\tüç\ndört "), 4);
        assert_eq!(word_count(""), 0);
    }
}
