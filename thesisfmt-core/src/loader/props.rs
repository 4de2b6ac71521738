// Formatting layers
//
// A layer holds only what one source (direct formatting, a style, the
// document defaults) sets explicitly. Resolution stacks layers from most to
// least specific and takes each attribute from the first layer that has it.

use super::xml::{check_val_off, get_attr, parse_measure};
use crate::types::{Alignment, LineSpacing};
use quick_xml::events::BytesStart;
use serde::{Deserialize, Serialize};

pub const TWIPS_PER_INCH: f64 = 1440.0;
pub const CM_PER_INCH: f64 = 2.54;

/// Twentieths of a point to centimetres, rounded to 2 decimals
pub fn twips_to_cm(twips: f64) -> f64 {
    round2(twips / TWIPS_PER_INCH * CM_PER_INCH)
}

pub fn twips_to_pt(twips: f64) -> f64 {
    twips / 20.0
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Font named by `w:rFonts`, either directly or through the theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FontRef {
    Named(String),
    /// `minorHAnsi`, `majorAscii`, ...
    Theme(String),
}

/// First-line offset. Word treats first-line and hanging indent as one setting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "cm", rename_all = "snake_case")]
pub enum FirstLine {
    Indent(f64),
    Hanging(f64),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunProps {
    pub font: Option<FontRef>,
    pub size_half_points: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub language: Option<String>,
}

impl RunProps {
    /// Fill every unset attribute from `lower`
    pub fn or(&self, lower: &RunProps) -> RunProps {
        RunProps {
            font: self.font.clone().or_else(|| lower.font.clone()),
            size_half_points: self.size_half_points.or(lower.size_half_points),
            bold: self.bold.or(lower.bold),
            italic: self.italic.or(lower.italic),
            language: self.language.clone().or_else(|| lower.language.clone()),
        }
    }

    /// Apply one child element of a `w:rPr`. Returns false for elements it ignores.
    pub fn apply(&mut self, e: &BytesStart) -> bool {
        match e.name().as_ref() {
            b"w:rFonts" => {
                let named = get_attr(e, b"w:ascii").or_else(|| get_attr(e, b"w:hAnsi"));
                let themed = get_attr(e, b"w:asciiTheme").or_else(|| get_attr(e, b"w:hAnsiTheme"));
                if let Some(name) = named {
                    self.font = Some(FontRef::Named(name));
                } else if let Some(theme) = themed {
                    self.font = Some(FontRef::Theme(theme));
                }
                true
            }
            b"w:sz" => {
                if let Some(v) = get_attr(e, b"w:val").and_then(|v| v.trim().parse::<f64>().ok()) {
                    self.size_half_points = Some(v);
                }
                true
            }
            b"w:b" => {
                self.bold = Some(!check_val_off(e));
                true
            }
            b"w:i" => {
                self.italic = Some(!check_val_off(e));
                true
            }
            b"w:lang" => {
                if let Some(v) = get_attr(e, b"w:val") {
                    self.language = Some(v);
                }
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParaProps {
    pub alignment: Option<Alignment>,
    pub line_spacing: Option<LineSpacing>,
    pub space_before_pt: Option<f64>,
    pub space_after_pt: Option<f64>,
    pub first_line: Option<FirstLine>,
    pub left_indent_cm: Option<f64>,
    pub right_indent_cm: Option<f64>,
    pub num_id: Option<u32>,
    pub num_level: Option<u8>,
    pub outline_level: Option<u8>,
}

impl ParaProps {
    pub fn or(&self, lower: &ParaProps) -> ParaProps {
        ParaProps {
            alignment: self.alignment.or(lower.alignment),
            line_spacing: self.line_spacing.or(lower.line_spacing),
            space_before_pt: self.space_before_pt.or(lower.space_before_pt),
            space_after_pt: self.space_after_pt.or(lower.space_after_pt),
            first_line: self.first_line.or(lower.first_line),
            left_indent_cm: self.left_indent_cm.or(lower.left_indent_cm),
            right_indent_cm: self.right_indent_cm.or(lower.right_indent_cm),
            num_id: self.num_id.or(lower.num_id),
            num_level: self.num_level.or(lower.num_level),
            outline_level: self.outline_level.or(lower.outline_level),
        }
    }

    /// Apply one child element of a `w:pPr`. Returns false for elements it ignores.
    pub fn apply(&mut self, e: &BytesStart) -> bool {
        match e.name().as_ref() {
            b"w:jc" => {
                if let Some(a) = get_attr(e, b"w:val").and_then(|v| Alignment::from_ooxml(&v)) {
                    self.alignment = Some(a);
                }
                true
            }
            b"w:spacing" => {
                if let Some(tw) = get_attr(e, b"w:before").and_then(|v| parse_measure(&v)) {
                    self.space_before_pt = Some(twips_to_pt(tw));
                }
                if let Some(tw) = get_attr(e, b"w:after").and_then(|v| parse_measure(&v)) {
                    self.space_after_pt = Some(twips_to_pt(tw));
                }
                if let Some(line) = get_attr(e, b"w:line").and_then(|v| parse_measure(&v)) {
                    let rule = get_attr(e, b"w:lineRule").unwrap_or_else(|| "auto".to_string());
                    self.line_spacing = Some(match rule.as_str() {
                        "exact" => LineSpacing::Exact(twips_to_pt(line)),
                        "atLeast" => LineSpacing::AtLeast(twips_to_pt(line)),
                        _ => LineSpacing::Multiple((line / 240.0 * 100.0).round() / 100.0),
                    });
                }
                true
            }
            b"w:ind" => {
                let left = get_attr(e, b"w:left").or_else(|| get_attr(e, b"w:start"));
                if let Some(tw) = left.and_then(|v| parse_measure(&v)) {
                    self.left_indent_cm = Some(twips_to_cm(tw));
                }
                let right = get_attr(e, b"w:right").or_else(|| get_attr(e, b"w:end"));
                if let Some(tw) = right.and_then(|v| parse_measure(&v)) {
                    self.right_indent_cm = Some(twips_to_cm(tw));
                }
                if let Some(tw) = get_attr(e, b"w:hanging").and_then(|v| parse_measure(&v)) {
                    self.first_line = Some(FirstLine::Hanging(twips_to_cm(tw)));
                } else if let Some(tw) = get_attr(e, b"w:firstLine").and_then(|v| parse_measure(&v)) {
                    self.first_line = Some(FirstLine::Indent(twips_to_cm(tw)));
                }
                true
            }
            b"w:numId" => {
                self.num_id = get_attr(e, b"w:val").and_then(|v| v.parse().ok());
                true
            }
            b"w:ilvl" => {
                self.num_level = get_attr(e, b"w:val").and_then(|v| v.parse().ok());
                true
            }
            b"w:outlineLvl" => {
                self.outline_level = get_attr(e, b"w:val").and_then(|v| v.parse().ok());
                true
            }
            _ => false,
        }
    }
}

/// Merge layers ordered from most to least specific
pub fn merge_run_layers<'a>(layers: impl IntoIterator<Item = &'a RunProps>) -> RunProps {
    layers
        .into_iter()
        .fold(RunProps::default(), |acc, layer| acc.or(layer))
}

pub fn merge_para_layers<'a>(layers: impl IntoIterator<Item = &'a ParaProps>) -> ParaProps {
    layers
        .into_iter()
        .fold(ParaProps::default(), |acc, layer| acc.or(layer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twips_conversion_rounds() {
        assert_eq!(twips_to_cm(1701.0), 3.0);
        assert_eq!(twips_to_cm(1672.0), 2.95);
        assert_eq!(twips_to_cm(1644.0), 2.9);
        assert_eq!(twips_to_pt(120.0), 6.0);
    }

    #[test]
    fn test_merge_takes_each_attribute_from_first_setter() {
        let direct = RunProps {
            bold: Some(true),
            ..Default::default()
        };
        let style = RunProps {
            size_half_points: Some(28.0),
            bold: Some(false),
            ..Default::default()
        };
        let defaults = RunProps {
            font: Some(FontRef::Named("Times New Roman".to_string())),
            size_half_points: Some(24.0),
            ..Default::default()
        };
        let merged = merge_run_layers([&direct, &style, &defaults]);
        assert_eq!(merged.bold, Some(true));
        assert_eq!(merged.size_half_points, Some(28.0));
        assert_eq!(merged.font, Some(FontRef::Named("Times New Roman".to_string())));
        assert_eq!(merged.italic, None);
    }

    #[test]
    fn test_hanging_overrides_inherited_first_line() {
        let direct = ParaProps {
            first_line: Some(FirstLine::Hanging(1.0)),
            ..Default::default()
        };
        let style = ParaProps {
            first_line: Some(FirstLine::Indent(1.25)),
            alignment: Some(Alignment::Justify),
            ..Default::default()
        };
        let merged = merge_para_layers([&direct, &style]);
        assert_eq!(merged.first_line, Some(FirstLine::Hanging(1.0)));
        assert_eq!(merged.alignment, Some(Alignment::Justify));
    }
}
