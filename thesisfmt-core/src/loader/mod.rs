// Document loading for .docx packages
//
// Loading happens in two steps so each boundary can be inspected:
// 1. Package -> XML parts (zip handling only)
// 2. XML parts -> Document (streaming parse plus formatting resolution)

pub mod document_xml;
pub mod props;
pub mod resolve;
pub mod styles;
mod xml;

use crate::error::{LoadError, LoadResult};
use crate::types::{Document, DocumentMetadata};
use document_xml::{parse_part, PartKind};
use quick_xml::events::Event;
use quick_xml::Reader;
use resolve::resolve_defaults;
use serde::Serialize;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use styles::{parse_styles, parse_theme};
use tracing::{debug, info};
use zip::result::ZipError;
use zip::ZipArchive;

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const STYLES_PART: &str = "word/styles.xml";
pub const THEME_PART: &str = "word/theme/theme1.xml";
pub const FOOTNOTES_PART: &str = "word/footnotes.xml";
pub const CORE_PROPERTIES_PART: &str = "docProps/core.xml";

/// Raw XML of every part the checker reads
#[derive(Debug, Clone, Default, Serialize)]
pub struct PackageParts {
    pub document: String,
    pub styles: Option<String>,
    pub theme: Option<String>,
    pub footnotes: Option<String>,
    /// `(part name, xml)` sorted by part name
    pub footers: Vec<(String, String)>,
    pub core_properties: Option<String>,
}

/// Loader trait - turns package bytes into a resolved Document
///
/// Either a complete Document comes back or an error does; callers never see
/// a partially loaded document.
pub trait Loader: Send + Sync {
    /// Step 1: unpack the XML parts
    fn read_package(&self, bytes: &[u8]) -> LoadResult<PackageParts>;

    /// Step 2: parse parts into paragraphs, runs and page geometry
    fn parse_parts(&self, parts: &PackageParts) -> LoadResult<Document>;

    /// Both steps in sequence
    fn load(&self, bytes: &[u8]) -> LoadResult<Document> {
        let parts = self.read_package(bytes)?;
        self.parse_parts(&parts)
    }

    fn load_file(&self, input: &Path) -> LoadResult<Document> {
        let bytes = std::fs::read(input)?;
        self.load(&bytes)
    }

    /// Loader name for logging
    fn name(&self) -> &str;

    fn supports_file_type(&self, path: &Path) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocxLoader;

impl DocxLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Loader for DocxLoader {
    fn read_package(&self, bytes: &[u8]) -> LoadResult<PackageParts> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        let document = read_entry(&mut archive, DOCUMENT_PART)?.ok_or_else(|| {
            LoadError::UnsupportedFormat(format!("package has no {DOCUMENT_PART}"))
        })?;

        let mut footer_names: Vec<String> = archive
            .file_names()
            .filter(|name| is_footer_part(name))
            .map(str::to_string)
            .collect();
        footer_names.sort();

        let mut footers = Vec::with_capacity(footer_names.len());
        for name in footer_names {
            if let Some(xml) = read_entry(&mut archive, &name)? {
                footers.push((name, xml));
            }
        }

        let parts = PackageParts {
            document,
            styles: read_entry(&mut archive, STYLES_PART)?,
            theme: read_entry(&mut archive, THEME_PART)?,
            footnotes: read_entry(&mut archive, FOOTNOTES_PART)?,
            footers,
            core_properties: read_entry(&mut archive, CORE_PROPERTIES_PART)?,
        };
        debug!(
            "Read package: {} entries, styles={}, footnotes={}, footers={}",
            archive.len(),
            parts.styles.is_some(),
            parts.footnotes.is_some(),
            parts.footers.len()
        );
        Ok(parts)
    }

    fn parse_parts(&self, parts: &PackageParts) -> LoadResult<Document> {
        let mut sheet = match parts.styles.as_deref() {
            Some(xml) => parse_styles(xml)?,
            None => Default::default(),
        };
        if let Some(xml) = parts.theme.as_deref() {
            sheet.theme = parse_theme(xml)?;
        }

        let body = parse_part(&parts.document, PartKind::Body, &sheet)?;
        if !body.saw_body {
            return Err(LoadError::UnsupportedFormat(format!(
                "{DOCUMENT_PART} has no w:body"
            )));
        }

        let mut paragraphs = body.paragraphs;
        if let Some(xml) = parts.footnotes.as_deref() {
            paragraphs.extend(parse_part(xml, PartKind::Footnotes, &sheet)?.paragraphs);
        }
        for (name, xml) in &parts.footers {
            paragraphs.extend(parse_part(xml, PartKind::Footer(name.clone()), &sheet)?.paragraphs);
        }
        for (index, paragraph) in paragraphs.iter_mut().enumerate() {
            paragraph.index = index;
        }

        let metadata = match parts.core_properties.as_deref() {
            Some(xml) => parse_core_properties(xml)?,
            None => DocumentMetadata::default(),
        };

        info!(
            "Loaded document: {} paragraphs, {} sections, {} styles",
            paragraphs.len(),
            body.sections.len(),
            sheet.styles.len()
        );

        Ok(Document {
            paragraphs,
            sections: body.sections,
            defaults: resolve_defaults(&sheet),
            styles: sheet,
            metadata,
        })
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("docx"))
            .unwrap_or(false)
    }
}

/// Read a zip entry as UTF-8. A missing entry is `None`, a corrupt one an error.
fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> LoadResult<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| LoadError::MalformedPackage(format!("Failed to read {name}: {e}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| LoadError::MalformedPackage(format!("{name} is not valid UTF-8")))?;

    Ok(Some(text.trim_start_matches('\u{feff}').to_string()))
}

fn is_footer_part(name: &str) -> bool {
    name.strip_prefix("word/footer")
        .and_then(|rest| rest.strip_suffix(".xml"))
        .is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()))
}

fn parse_core_properties(xml: &str) -> LoadResult<DocumentMetadata> {
    let mut metadata = DocumentMetadata::default();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut field: Option<&'static str> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                field = match e.name().as_ref() {
                    b"dc:title" => Some("title"),
                    b"dc:creator" => Some("creator"),
                    b"dc:language" => Some("language"),
                    _ => None,
                };
            }
            Event::Text(t) => {
                let value = t.unescape()?.trim().to_string();
                match field {
                    Some("title") => metadata.title = Some(value),
                    Some("creator") => metadata.creator = Some(value),
                    Some("language") => metadata.language = Some(value),
                    _ => {}
                }
            }
            Event::End(_) => field = None,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(metadata)
}
