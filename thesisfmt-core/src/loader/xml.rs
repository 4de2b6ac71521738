// Small helpers shared by the part parsers

use quick_xml::events::BytesStart;

/// Extract an attribute value by its qualified key
#[inline]
pub fn get_attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .find(|a| a.as_ref().ok().map(|x| x.key.as_ref()) == Some(key))
        .and_then(Result::ok)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Check if w:val is explicitly "0", "false" or "off" (toggle switched off)
#[inline]
pub fn check_val_off(e: &BytesStart) -> bool {
    matches!(
        get_attr(e, b"w:val").as_deref(),
        Some("0") | Some("false") | Some("off")
    )
}

/// Parse a measurement into twips. Transitional documents use bare twips,
/// strict ones may carry a unit suffix.
pub fn parse_measure(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(split);
    let value: f64 = number.parse().ok()?;
    let twips = match unit {
        "" => value,
        "pt" => value * 20.0,
        "in" => value * 1440.0,
        "cm" => value * 1440.0 / 2.54,
        "mm" => value * 144.0 / 2.54,
        "pc" | "pi" => value * 240.0,
        _ => return None,
    };
    Some(twips)
}

/// Elements whose content never belongs to the paragraph being read:
/// text boxes, alternate-content fallbacks and revision history.
pub fn is_skipped_container(name: &[u8]) -> bool {
    matches!(
        name,
        b"w:txbxContent"
            | b"mc:Fallback"
            | b"w:pPrChange"
            | b"w:rPrChange"
            | b"w:sectPrChange"
            | b"w:tblPrChange"
            | b"w:moveFrom"
            | b"w:tblStylePr"
    )
}

/// First word of a field instruction, e.g. `PAGE` in ` PAGE \* MERGEFORMAT `
pub fn is_page_field(instr: &str) -> bool {
    instr.split_whitespace().next() == Some("PAGE")
}
