// Streaming walker for parts that hold paragraphs:
// word/document.xml, word/footnotes.xml and word/footer*.xml

use super::props::{twips_to_cm, ParaProps, RunProps};
use super::resolve::{resolve_paragraph, resolve_run};
use super::styles::StyleSheet;
use super::xml::{get_attr, is_page_field, is_skipped_container, parse_measure};
use crate::error::LoadResult;
use crate::types::{PageGeometry, Paragraph, ParagraphSource, Run};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartKind {
    Body,
    Footnotes,
    Footer(String),
}

#[derive(Debug, Default)]
pub struct PartContent {
    /// Paragraphs in part order; `index` is assigned once all parts are joined
    pub paragraphs: Vec<Paragraph>,
    pub sections: Vec<PageGeometry>,
    pub saw_body: bool,
}

#[derive(Debug, Default)]
struct RawRun {
    props: RunProps,
    char_style: Option<String>,
    text: String,
}

#[derive(Debug, Default)]
struct RawParagraph {
    props: ParaProps,
    style_id: Option<String>,
    runs: Vec<RawRun>,
    has_page_field: bool,
}

struct PartWalker<'a> {
    sheet: &'a StyleSheet,
    kind: PartKind,
    out: PartContent,
    skip_depth: usize,
    table_depth: usize,
    next_table: usize,
    current_table: Option<usize>,
    para: Option<RawParagraph>,
    run: Option<RawRun>,
    in_ppr: bool,
    in_mark_rpr: bool,
    in_run_rpr: bool,
    in_text: bool,
    in_instr: bool,
    section: Option<PageGeometry>,
    note_id: Option<i64>,
    skip_note: bool,
}

pub fn parse_part(xml: &str, kind: PartKind, sheet: &StyleSheet) -> LoadResult<PartContent> {
    let mut walker = PartWalker::new(sheet, kind);
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => walker.open(&e),
            Event::Empty(e) => {
                walker.open(&e);
                walker.close(e.name().as_ref());
            }
            Event::End(e) => walker.close(e.name().as_ref()),
            Event::Text(t) => {
                if walker.wants_text() {
                    let text = t.unescape()?;
                    walker.text(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(walker.out)
}

impl<'a> PartWalker<'a> {
    fn new(sheet: &'a StyleSheet, kind: PartKind) -> Self {
        Self {
            sheet,
            kind,
            out: PartContent::default(),
            skip_depth: 0,
            table_depth: 0,
            next_table: 0,
            current_table: None,
            para: None,
            run: None,
            in_ppr: false,
            in_mark_rpr: false,
            in_run_rpr: false,
            in_text: false,
            in_instr: false,
            section: None,
            note_id: None,
            skip_note: false,
        }
    }

    fn wants_text(&self) -> bool {
        self.skip_depth == 0 && (self.in_text || self.in_instr)
    }

    fn open(&mut self, e: &BytesStart) {
        let name = e.name();
        let name = name.as_ref();
        if is_skipped_container(name) {
            self.skip_depth += 1;
            return;
        }
        if self.skip_depth > 0 {
            return;
        }

        match name {
            b"w:body" => self.out.saw_body = true,
            b"w:footnote" => {
                self.note_id = get_attr(e, b"w:id").and_then(|v| v.parse().ok());
                self.skip_note = matches!(
                    get_attr(e, b"w:type").as_deref(),
                    Some("separator") | Some("continuationSeparator") | Some("continuationNotice")
                );
            }
            b"w:tbl" => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.current_table = Some(self.next_table);
                    self.next_table += 1;
                }
            }
            b"w:p" => {
                self.para = Some(RawParagraph::default());
                self.run = None;
            }
            b"w:sectPr" => self.section = Some(PageGeometry::default()),
            b"w:pgMar" => {
                if let Some(section) = self.section.as_mut() {
                    apply_page_margins(section, e);
                }
            }
            b"w:pgSz" => {
                if let Some(section) = self.section.as_mut() {
                    if let Some(w) = get_attr(e, b"w:w").and_then(|v| parse_measure(&v)) {
                        section.page_width_cm = twips_to_cm(w);
                    }
                    if let Some(h) = get_attr(e, b"w:h").and_then(|v| parse_measure(&v)) {
                        section.page_height_cm = twips_to_cm(h);
                    }
                }
            }
            _ if self.section.is_some() => {}
            b"w:pPr" if self.para.is_some() && self.run.is_none() => self.in_ppr = true,
            b"w:r" if self.para.is_some() => self.run = Some(RawRun::default()),
            b"w:rPr" => {
                if self.run.is_some() {
                    self.in_run_rpr = true;
                } else if self.in_ppr {
                    self.in_mark_rpr = true;
                }
            }
            b"w:t" if self.run.is_some() => self.in_text = true,
            b"w:tab" if !self.in_run_rpr => self.push_run_text("\t"),
            b"w:br" | b"w:cr" if !self.in_run_rpr => self.push_run_text(" "),
            b"w:noBreakHyphen" => self.push_run_text("-"),
            b"w:instrText" => self.in_instr = true,
            b"w:fldSimple" => {
                let is_page = get_attr(e, b"w:instr").is_some_and(|i| is_page_field(&i));
                if let (true, Some(para)) = (is_page, self.para.as_mut()) {
                    para.has_page_field = true;
                }
            }
            b"w:pStyle" if self.in_ppr && !self.in_mark_rpr => {
                if let Some(para) = self.para.as_mut() {
                    para.style_id = get_attr(e, b"w:val");
                }
            }
            b"w:rStyle" if self.in_run_rpr => {
                if let Some(run) = self.run.as_mut() {
                    run.char_style = get_attr(e, b"w:val");
                }
            }
            _ => {
                if self.in_run_rpr {
                    if let Some(run) = self.run.as_mut() {
                        run.props.apply(e);
                    }
                } else if self.in_ppr && !self.in_mark_rpr {
                    if let Some(para) = self.para.as_mut() {
                        para.props.apply(e);
                    }
                }
            }
        }
    }

    fn close(&mut self, name: &[u8]) {
        if is_skipped_container(name) {
            self.skip_depth = self.skip_depth.saturating_sub(1);
            return;
        }
        if self.skip_depth > 0 {
            return;
        }

        match name {
            b"w:t" => self.in_text = false,
            b"w:instrText" => self.in_instr = false,
            b"w:rPr" => {
                if self.in_run_rpr {
                    self.in_run_rpr = false;
                } else {
                    self.in_mark_rpr = false;
                }
            }
            b"w:pPr" => {
                self.in_ppr = false;
                self.in_mark_rpr = false;
            }
            b"w:r" => {
                if let (Some(run), Some(para)) = (self.run.take(), self.para.as_mut()) {
                    para.runs.push(run);
                }
                self.in_run_rpr = false;
                self.in_text = false;
            }
            b"w:p" => self.finish_paragraph(),
            b"w:tbl" => {
                self.table_depth = self.table_depth.saturating_sub(1);
                if self.table_depth == 0 {
                    self.current_table = None;
                }
            }
            b"w:sectPr" => {
                if let Some(section) = self.section.take() {
                    self.out.sections.push(section);
                }
            }
            b"w:footnote" => {
                self.note_id = None;
                self.skip_note = false;
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_text {
            self.push_run_text(text);
        } else if self.in_instr && is_page_field(text) {
            if let Some(para) = self.para.as_mut() {
                para.has_page_field = true;
            }
        }
    }

    fn push_run_text(&mut self, text: &str) {
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }

    fn finish_paragraph(&mut self) {
        let Some(raw) = self.para.take() else {
            return;
        };
        self.run = None;
        self.in_ppr = false;
        self.in_mark_rpr = false;
        self.in_run_rpr = false;
        self.in_text = false;
        if self.skip_note {
            return;
        }

        let source = match &self.kind {
            PartKind::Body => match self.current_table {
                Some(table) => ParagraphSource::TableCell { table },
                None => ParagraphSource::Body,
            },
            PartKind::Footnotes => ParagraphSource::Footnote {
                note_id: self.note_id.unwrap_or_default(),
            },
            PartKind::Footer(part_name) => ParagraphSource::Footer {
                part_name: part_name.clone(),
            },
        };

        let sheet = self.sheet;
        let style_id = raw
            .style_id
            .clone()
            .or_else(|| sheet.default_paragraph_style().map(str::to_string));
        let format = resolve_paragraph(&raw.props, style_id.as_deref(), sheet);
        let runs = raw
            .runs
            .into_iter()
            .filter(|r| !r.text.is_empty())
            .map(|r| Run {
                format: resolve_run(&r.props, r.char_style.as_deref(), style_id.as_deref(), sheet),
                text: r.text,
            })
            .collect();

        self.out.paragraphs.push(Paragraph {
            index: 0,
            source,
            style_name: style_id.as_deref().and_then(|id| sheet.display_name(id)),
            style_id,
            runs,
            format,
            has_page_field: raw.has_page_field,
        });
    }
}

fn apply_page_margins(section: &mut PageGeometry, e: &BytesStart) {
    let read = |key: &[u8]| {
        get_attr(e, key)
            .and_then(|v| parse_measure(&v))
            .map(|tw| twips_to_cm(tw.abs()))
    };
    if let Some(cm) = read(b"w:top") {
        section.margin_top_cm = cm;
    }
    if let Some(cm) = read(b"w:bottom") {
        section.margin_bottom_cm = cm;
    }
    if let Some(cm) = read(b"w:left").or_else(|| read(b"w:start")) {
        section.margin_left_cm = cm;
    }
    if let Some(cm) = read(b"w:right").or_else(|| read(b"w:end")) {
        section.margin_right_cm = cm;
    }
    if let Some(cm) = read(b"w:footer") {
        section.footer_distance_cm = cm;
    }
}
