// Locale-aware case operations
//
// Rust's `to_uppercase`/`to_lowercase` follow the Unicode default mapping,
// which turns `i` into `I` and `İ` into `i̇`. Turkish text needs the
// dotted/dotless pairs kept apart, so the fold is picked from config.

use crate::config::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaseFold {
    locale: Locale,
}

impl CaseFold {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn to_upper(&self, text: &str) -> String {
        match self.locale {
            Locale::Turkish => {
                let mut out = String::with_capacity(text.len());
                for c in text.chars() {
                    match c {
                        'i' => out.push('İ'),
                        'ı' => out.push('I'),
                        _ => out.extend(c.to_uppercase()),
                    }
                }
                out
            }
            Locale::Invariant => text.to_uppercase(),
        }
    }

    pub fn to_lower(&self, text: &str) -> String {
        match self.locale {
            Locale::Turkish => {
                let mut out = String::with_capacity(text.len());
                for c in text.chars() {
                    match c {
                        'I' => out.push('ı'),
                        'İ' => out.push('i'),
                        _ => out.extend(c.to_lowercase()),
                    }
                }
                out
            }
            Locale::Invariant => text.to_lowercase(),
        }
    }

    pub fn eq_ignore_case(&self, a: &str, b: &str) -> bool {
        self.to_upper(a) == self.to_upper(b)
    }
}

/// True when the text has letters and none of them is lower-case.
/// `char::is_lowercase` already knows `ı` and `i` are both lower-case.
pub fn is_all_caps(text: &str) -> bool {
    let mut letters = 0;
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        if c.is_lowercase() {
            return false;
        }
        letters += 1;
    }
    letters > 0
}
