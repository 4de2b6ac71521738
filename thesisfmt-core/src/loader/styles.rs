// Style table (`word/styles.xml`) and theme fonts (`word/theme/theme1.xml`)

use super::props::{FontRef, ParaProps, RunProps};
use super::xml::{get_attr, is_skipped_container};
use crate::error::LoadResult;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Longest `basedOn` chain followed before giving up
const MAX_STYLE_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleKind {
    #[default]
    Paragraph,
    Character,
    Table,
    Numbering,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleDef {
    pub id: String,
    pub name: Option<String>,
    pub kind: StyleKind,
    pub based_on: Option<String>,
    pub is_default: bool,
    pub run: RunProps,
    pub para: ParaProps,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeFonts {
    pub major: Option<String>,
    pub minor: Option<String>,
}

/// Every named style plus the document defaults. Never mutated after loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSheet {
    pub styles: BTreeMap<String, StyleDef>,
    pub run_defaults: RunProps,
    pub para_defaults: ParaProps,
    pub theme: ThemeFonts,
}

impl StyleSheet {
    pub fn get(&self, id: &str) -> Option<&StyleDef> {
        self.styles.get(id)
    }

    /// Style used by paragraphs without a `w:pStyle`
    pub fn default_paragraph_style(&self) -> Option<&str> {
        self.styles
            .values()
            .find(|s| s.is_default && s.kind == StyleKind::Paragraph)
            .map(|s| s.id.as_str())
    }

    /// The style followed by its `basedOn` ancestors, most specific first.
    /// Unknown ids end the chain and cycles are cut.
    pub fn chain(&self, id: &str) -> Vec<&StyleDef> {
        let mut chain = Vec::new();
        let mut seen = BTreeSet::new();
        let mut next = Some(id);
        while let Some(current) = next {
            if chain.len() >= MAX_STYLE_DEPTH || !seen.insert(current) {
                break;
            }
            match self.styles.get(current) {
                Some(style) => {
                    chain.push(style);
                    next = style.based_on.as_deref();
                }
                None => break,
            }
        }
        chain
    }

    pub fn display_name(&self, id: &str) -> Option<String> {
        self.get(id).and_then(|s| s.name.clone())
    }

    /// Resolve a font reference to a family name
    pub fn font_name(&self, font: &FontRef) -> Option<String> {
        match font {
            FontRef::Named(name) => Some(name.clone()),
            FontRef::Theme(theme) if theme.starts_with("major") => self.theme.major.clone(),
            FontRef::Theme(theme) if theme.starts_with("minor") => self.theme.minor.clone(),
            FontRef::Theme(_) => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Target {
    None,
    RunDefaults,
    ParaDefaults,
    StyleRun,
    StylePara,
}

/// Parse `word/styles.xml`
pub fn parse_styles(xml: &str) -> LoadResult<StyleSheet> {
    let mut sheet = StyleSheet::default();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut skip_depth = 0usize;
    let mut in_r_default = false;
    let mut in_p_default = false;
    let mut target = Target::None;
    let mut current: Option<StyleDef> = None;

    loop {
        buf.clear();
        let (e, empty) = match reader.read_event_into(&mut buf)? {
            Event::Start(e) => (e.into_owned(), false),
            Event::Empty(e) => (e.into_owned(), true),
            Event::End(e) => {
                let name = e.name();
                let name = name.as_ref();
                if is_skipped_container(name) {
                    skip_depth = skip_depth.saturating_sub(1);
                } else if skip_depth == 0 {
                    match name {
                        b"w:rPrDefault" => in_r_default = false,
                        b"w:pPrDefault" => in_p_default = false,
                        b"w:rPr" | b"w:pPr" => target = Target::None,
                        b"w:style" => {
                            if let Some(style) = current.take() {
                                sheet.styles.insert(style.id.clone(), style);
                            }
                        }
                        _ => {}
                    }
                }
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        let name = e.name();
        let name = name.as_ref();
        if is_skipped_container(name) {
            if !empty {
                skip_depth += 1;
            }
        } else if skip_depth == 0 {
            match name {
                b"w:rPrDefault" if !empty => in_r_default = true,
                b"w:pPrDefault" if !empty => in_p_default = true,
                b"w:style" => {
                    let style = start_style(&e);
                    if empty {
                        sheet.styles.insert(style.id.clone(), style);
                    } else {
                        current = Some(style);
                    }
                }
                b"w:rPr" if !empty => {
                    target = if current.is_some() {
                        Target::StyleRun
                    } else if in_r_default {
                        Target::RunDefaults
                    } else {
                        Target::None
                    };
                }
                b"w:pPr" if !empty => {
                    target = if current.is_some() {
                        Target::StylePara
                    } else if in_p_default {
                        Target::ParaDefaults
                    } else {
                        Target::None
                    };
                }
                b"w:name" => {
                    if let Some(style) = current.as_mut() {
                        style.name = get_attr(&e, b"w:val");
                    }
                }
                b"w:basedOn" => {
                    if let Some(style) = current.as_mut() {
                        style.based_on = get_attr(&e, b"w:val");
                    }
                }
                _ => match target {
                    Target::RunDefaults => {
                        sheet.run_defaults.apply(&e);
                    }
                    Target::ParaDefaults => {
                        sheet.para_defaults.apply(&e);
                    }
                    Target::StyleRun => {
                        if let Some(style) = current.as_mut() {
                            style.run.apply(&e);
                        }
                    }
                    Target::StylePara => {
                        if let Some(style) = current.as_mut() {
                            style.para.apply(&e);
                        }
                    }
                    Target::None => {}
                },
            }
        }
    }

    Ok(sheet)
}

fn start_style(e: &BytesStart) -> StyleDef {
    let kind = match get_attr(e, b"w:type").as_deref() {
        Some("character") => StyleKind::Character,
        Some("table") => StyleKind::Table,
        Some("numbering") => StyleKind::Numbering,
        _ => StyleKind::Paragraph,
    };
    StyleDef {
        id: get_attr(e, b"w:styleId").unwrap_or_default(),
        kind,
        is_default: matches!(get_attr(e, b"w:default").as_deref(), Some("1") | Some("true")),
        ..Default::default()
    }
}

/// Parse the latin typefaces of the theme's major and minor font schemes
pub fn parse_theme(xml: &str) -> LoadResult<ThemeFonts> {
    let mut fonts = ThemeFonts::default();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut in_major = false;
    let mut in_minor = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"a:majorFont" => in_major = true,
                b"a:minorFont" => in_minor = true,
                _ => {}
            },
            Event::Empty(e) if e.name().as_ref() == b"a:latin" => {
                let typeface = get_attr(&e, b"typeface").filter(|t| !t.is_empty());
                if in_major && fonts.major.is_none() {
                    fonts.major = typeface;
                } else if in_minor && fonts.minor.is_none() {
                    fonts.minor = typeface;
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"a:majorFont" => in_major = false,
                b"a:minorFont" => in_minor = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(fonts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::props::FirstLine;
    use crate::types::Alignment;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults>
    <w:rPrDefault><w:rPr><w:rFonts w:asciiTheme="minorHAnsi"/><w:sz w:val="22"/></w:rPr></w:rPrDefault>
    <w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault>
  </w:docDefaults>
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:pPr><w:jc w:val="both"/><w:ind w:firstLine="709"/></w:pPr>
    <w:rPr><w:rFonts w:ascii="Times New Roman" w:hAnsi="Times New Roman"/><w:sz w:val="24"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="heading 1"/>
    <w:basedOn w:val="Normal"/>
    <w:pPr><w:jc w:val="center"/><w:outlineLvl w:val="0"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="28"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Loop">
    <w:basedOn w:val="Loop"/>
  </w:style>
</w:styles>"#;

    #[test]
    fn test_parse_styles_and_defaults() {
        let sheet = parse_styles(STYLES).unwrap();
        assert_eq!(sheet.default_paragraph_style(), Some("Normal"));
        assert_eq!(sheet.run_defaults.size_half_points, Some(22.0));
        assert_eq!(sheet.run_defaults.font, Some(FontRef::Theme("minorHAnsi".to_string())));
        assert_eq!(sheet.para_defaults.space_after_pt, Some(8.0));

        let heading = sheet.get("Heading1").unwrap();
        assert_eq!(heading.name.as_deref(), Some("heading 1"));
        assert_eq!(heading.based_on.as_deref(), Some("Normal"));
        assert_eq!(heading.run.bold, Some(true));
        assert_eq!(heading.para.alignment, Some(Alignment::Center));
        assert_eq!(heading.para.outline_level, Some(0));

        let normal = sheet.get("Normal").unwrap();
        assert_eq!(normal.para.first_line, Some(FirstLine::Indent(1.25)));
    }

    #[test]
    fn test_chain_follows_based_on_and_stops_on_cycle() {
        let sheet = parse_styles(STYLES).unwrap();
        let ids: Vec<&str> = sheet.chain("Heading1").iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["Heading1", "Normal"]);
        assert_eq!(sheet.chain("Loop").len(), 1);
        assert!(sheet.chain("Missing").is_empty());
    }

    #[test]
    fn test_parse_theme_fonts() {
        let theme = r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:themeElements><a:fontScheme name="Office">
            <a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/></a:majorFont>
            <a:minorFont><a:latin typeface="Calibri"/></a:minorFont>
        </a:fontScheme></a:themeElements></a:theme>"#;
        let fonts = parse_theme(theme).unwrap();
        assert_eq!(fonts.major.as_deref(), Some("Calibri Light"));
        assert_eq!(fonts.minor.as_deref(), Some("Calibri"));
    }
}
