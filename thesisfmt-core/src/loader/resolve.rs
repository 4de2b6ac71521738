// Effective formatting resolution
//
// Run layers, most specific first:
//   direct rPr > character style chain > paragraph style chain > docDefaults
// Paragraph layers:
//   direct pPr > paragraph style chain > docDefaults

use super::props::{merge_para_layers, merge_run_layers, FirstLine, ParaProps, RunProps};
use super::styles::StyleSheet;
use crate::types::{DocumentDefaults, Numbering, ParagraphFormatting, RunFormatting};
use std::iter;

/// Size Word uses when no layer sets `w:sz`
pub const IMPLICIT_FONT_SIZE_PT: f64 = 10.0;

pub fn resolve_run(
    direct: &RunProps,
    char_style: Option<&str>,
    para_style: Option<&str>,
    sheet: &StyleSheet,
) -> RunFormatting {
    let char_chain = char_style.map(|id| sheet.chain(id)).unwrap_or_default();
    let para_chain = para_style.map(|id| sheet.chain(id)).unwrap_or_default();

    let layers = iter::once(direct)
        .chain(char_chain.into_iter().map(|s| &s.run))
        .chain(para_chain.into_iter().map(|s| &s.run))
        .chain(iter::once(&sheet.run_defaults));
    let merged = merge_run_layers(layers);

    RunFormatting {
        font_family: merged.font.as_ref().and_then(|f| sheet.font_name(f)),
        font_size_pt: merged
            .size_half_points
            .map(|hp| hp / 2.0)
            .unwrap_or(IMPLICIT_FONT_SIZE_PT),
        bold: merged.bold.unwrap_or(false),
        italic: merged.italic.unwrap_or(false),
        language: merged.language,
    }
}

pub fn resolve_paragraph(
    direct: &ParaProps,
    para_style: Option<&str>,
    sheet: &StyleSheet,
) -> ParagraphFormatting {
    let para_chain = para_style.map(|id| sheet.chain(id)).unwrap_or_default();

    let layers = iter::once(direct)
        .chain(para_chain.into_iter().map(|s| &s.para))
        .chain(iter::once(&sheet.para_defaults));
    let merged = merge_para_layers(layers);

    let (first_line_indent_cm, hanging_indent_cm) = match merged.first_line {
        Some(FirstLine::Indent(cm)) => (cm, 0.0),
        Some(FirstLine::Hanging(cm)) => (0.0, cm),
        None => (0.0, 0.0),
    };

    // numId 0 removes numbering inherited from a style
    let numbering = merged
        .num_id
        .filter(|id| *id != 0)
        .map(|num_id| Numbering {
            num_id,
            level: merged.num_level.unwrap_or(0),
        });

    ParagraphFormatting {
        alignment: merged.alignment.unwrap_or_default(),
        line_spacing: merged.line_spacing.unwrap_or_default(),
        space_before_pt: merged.space_before_pt.unwrap_or(0.0),
        space_after_pt: merged.space_after_pt.unwrap_or(0.0),
        first_line_indent_cm,
        hanging_indent_cm,
        left_indent_cm: merged.left_indent_cm.unwrap_or(0.0),
        right_indent_cm: merged.right_indent_cm.unwrap_or(0.0),
        numbering,
        outline_level: merged.outline_level,
    }
}

/// Font a run gets when nothing but the default paragraph style applies
pub fn resolve_defaults(sheet: &StyleSheet) -> DocumentDefaults {
    let run = resolve_run(
        &RunProps::default(),
        None,
        sheet.default_paragraph_style(),
        sheet,
    );
    let explicit_size = sheet
        .default_paragraph_style()
        .map(|id| sheet.chain(id))
        .unwrap_or_default()
        .iter()
        .any(|s| s.run.size_half_points.is_some())
        || sheet.run_defaults.size_half_points.is_some();

    DocumentDefaults {
        font_family: run.font_family,
        font_size_pt: explicit_size.then_some(run.font_size_pt),
    }
}
