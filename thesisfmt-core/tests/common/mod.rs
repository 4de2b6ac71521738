//! In-memory `.docx` fixtures shared by the integration tests.
//!
//! Packages are assembled with `zip::ZipWriter` so no binary fixtures live
//! on disk. The default style sheet matches the institutional guide, so a
//! fixture only violates what a test puts in on purpose.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Times New Roman 12pt, 1.5 lines, 6pt before and after, justified, 1.25cm first line
pub const COMPLIANT_STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:docDefaults>
    <w:rPrDefault><w:rPr><w:rFonts w:ascii="Times New Roman" w:hAnsi="Times New Roman"/><w:sz w:val="24"/></w:rPr></w:rPrDefault>
    <w:pPrDefault><w:pPr><w:spacing w:before="120" w:after="120" w:line="360" w:lineRule="auto"/></w:pPr></w:pPrDefault>
  </w:docDefaults>
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal">
    <w:name w:val="Normal"/>
    <w:pPr><w:jc w:val="both"/><w:ind w:firstLine="709"/></w:pPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="heading 1"/>
    <w:basedOn w:val="Normal"/>
    <w:pPr><w:jc w:val="center"/><w:spacing w:before="1680"/><w:ind w:firstLine="0"/><w:outlineLvl w:val="0"/></w:pPr>
    <w:rPr><w:b/><w:sz w:val="28"/></w:rPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading2">
    <w:name w:val="heading 2"/>
    <w:basedOn w:val="Normal"/>
    <w:pPr><w:outlineLvl w:val="1"/></w:pPr>
    <w:rPr><w:b/></w:rPr>
  </w:style>
  <w:style w:type="character" w:styleId="Strong">
    <w:name w:val="Strong"/>
    <w:rPr><w:b/></w:rPr>
  </w:style>
</w:styles>"#;

pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Plain paragraph inheriting everything from the style sheet
pub fn para(text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape(text)
    )
}

pub fn styled_para(style: &str, text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="{style}"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape(text)
    )
}

pub fn heading(text: &str) -> String {
    styled_para("Heading1", text)
}

pub fn subheading(text: &str) -> String {
    styled_para("Heading2", text)
}

pub fn blank() -> String {
    "<w:p/>".to_string()
}

/// Paragraph of `count` words
pub fn words(count: usize) -> String {
    para(&vec!["kelime"; count].join(" "))
}

pub fn table(cells: &[&str]) -> String {
    let row: String = cells
        .iter()
        .map(|c| format!("<w:tc>{}</w:tc>", styled_cell(c)))
        .collect();
    format!("<w:tbl><w:tr>{row}</w:tr></w:tbl>")
}

fn styled_cell(text: &str) -> String {
    format!(
        r#"<w:p><w:r><w:rPr><w:sz w:val="22"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape(text)
    )
}

#[derive(Debug, Clone)]
pub struct DocxBuilder {
    body: Vec<String>,
    styles: Option<String>,
    footnotes: Vec<String>,
    footer: Option<String>,
    /// top, right, bottom, left, footer in twips
    margins: [u32; 5],
}

impl Default for DocxBuilder {
    fn default() -> Self {
        Self {
            body: Vec::new(),
            styles: Some(COMPLIANT_STYLES.to_string()),
            footnotes: Vec::new(),
            footer: None,
            margins: [1701, 1701, 1701, 1701, 709],
        }
    }
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, xml: impl Into<String>) -> Self {
        self.body.push(xml.into());
        self
    }

    pub fn extend<I: IntoIterator<Item = String>>(mut self, xml: I) -> Self {
        self.body.extend(xml);
        self
    }

    pub fn styles(mut self, styles: Option<&str>) -> Self {
        self.styles = styles.map(str::to_string);
        self
    }

    pub fn left_margin_twips(mut self, twips: u32) -> Self {
        self.margins[3] = twips;
        self
    }

    pub fn footnote(mut self, text: &str) -> Self {
        self.footnotes.push(text.to_string());
        self
    }

    pub fn page_number_footer(mut self) -> Self {
        self.footer = Some(format!(
            r#"<w:ftr xmlns:w="{W_NS}"><w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:sz w:val="20"/></w:rPr><w:fldChar w:fldCharType="begin"/></w:r><w:r><w:instrText xml:space="preserve"> PAGE </w:instrText></w:r><w:r><w:fldChar w:fldCharType="end"/></w:r><w:r><w:rPr><w:sz w:val="20"/></w:rPr><w:t>1</w:t></w:r></w:p></w:ftr>"#
        ));
        self
    }

    pub fn document_xml(&self) -> String {
        let [top, right, bottom, left, footer] = self.margins;
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{}<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="{top}" w:right="{right}" w:bottom="{bottom}" w:left="{left}" w:header="709" w:footer="{footer}" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
            self.body.concat()
        )
    }

    fn footnotes_xml(&self) -> Option<String> {
        if self.footnotes.is_empty() {
            return None;
        }
        let notes: String = self
            .footnotes
            .iter()
            .enumerate()
            .map(|(i, text)| {
                format!(
                    r#"<w:footnote w:id="{}"><w:p><w:pPr><w:spacing w:before="0" w:after="0" w:line="240" w:lineRule="auto"/><w:ind w:firstLine="0"/></w:pPr><w:r><w:rPr><w:sz w:val="20"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p></w:footnote>"#,
                    i + 1,
                    escape(text)
                )
            })
            .collect();
        Some(format!(
            r#"<w:footnotes xmlns:w="{W_NS}"><w:footnote w:type="separator" w:id="-1"><w:p><w:r><w:separator/></w:r></w:p></w:footnote>{notes}</w:footnotes>"#
        ))
    }

    pub fn build(&self) -> Vec<u8> {
        let mut entries: Vec<(&str, String)> = vec![
            ("[Content_Types].xml", r#"<?xml version="1.0"?><Types/>"#.to_string()),
            ("word/document.xml", self.document_xml()),
        ];
        if let Some(styles) = &self.styles {
            entries.push(("word/styles.xml", styles.clone()));
        }
        if let Some(notes) = self.footnotes_xml() {
            entries.push(("word/footnotes.xml", notes));
        }
        if let Some(footer) = &self.footer {
            entries.push(("word/footer1.xml", footer.clone()));
        }
        package(&entries)
    }
}

pub fn package<S: AsRef<str>>(entries: &[(&str, S)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(content.as_ref().as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Cover page, abstract with keywords, TOC and an introduction
pub fn thesis_front(abstract_words: usize) -> Vec<String> {
    vec![
        para("T.C."),
        para("ÖRNEK ÜNİVERSİTESİ"),
        para("Tez Başlığı"),
        heading("ÖZET"),
        words(abstract_words),
        para("Anahtar Kelimeler: tez, biçim, denetim"),
        heading("ABSTRACT"),
        words(220),
        para("Keywords: thesis, format, check"),
        heading("İÇİNDEKİLER"),
        para("1. GİRİŞ ........ 1"),
        para("1.1. Araştırmanın Amacı ........ 2"),
        para("2. SONUÇ ........ 5"),
        heading("1. GİRİŞ"),
        subheading("1.1. Araştırmanın Amacı"),
        para("Bu çalışma tez biçim denetimini ele alır."),
    ]
}
