//! Display-string localization.
//!
//! Keys are the English source strings (`"no data"`, the metric label, the
//! map title). A [`Localizer`] returns the text to show for a key; unknown
//! keys fall back to the key itself.

use anyhow::{Context, Result};
use num_format::Locale;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Key for the word(s) shown when a region has no value.
pub const NO_DATA: &str = "no data";

pub trait Localizer {
    fn translate(&self, key: &str) -> String;

    /// Decimal separator used when printing values.
    fn decimal_separator(&self) -> char {
        '.'
    }
}

/// Returns every key unchanged (English source strings).
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLocalizer;

impl Localizer for IdentityLocalizer {
    fn translate(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Map a user-provided locale tag to a `num_format::Locale` and its decimal separator char.
///
/// Supported tags (case-insensitive): `en`, `us`, `en_US`, `de`, `de_DE`, `german`,
/// `fr`, `es`, `it`, `pt`, `nl`. Defaults to English.
pub fn map_locale(tag: &str) -> (&'static Locale, char) {
    let locale: &'static Locale = match tag.to_lowercase().replace('-', "_").as_str() {
        "de" | "de_de" | "german" => &Locale::de,
        "fr" | "fr_fr" => &Locale::fr,
        "es" | "es_es" => &Locale::es,
        "it" | "it_it" => &Locale::it,
        "pt" | "pt_pt" | "pt_br" => &Locale::pt,
        "nl" | "nl_nl" => &Locale::nl,
        _ => &Locale::en,
    };
    let sep = locale.decimal().chars().next().unwrap_or('.');
    (locale, sep)
}

/// A locale tag plus a key -> text table.
#[derive(Debug, Clone)]
pub struct Catalog {
    tag: String,
    decimal: char,
    entries: HashMap<String, String>,
}

impl Catalog {
    pub fn new(tag: &str) -> Self {
        let (_, decimal) = map_locale(tag);
        Self {
            tag: tag.to_string(),
            decimal,
            entries: HashMap::new(),
        }
    }

    pub fn with_entries<K, V>(tag: &str, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut c = Self::new(tag);
        c.entries
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        c
    }

    /// Load a flat JSON object `{ "<key>": "<text>", ... }`.
    pub fn from_json_file(tag: &str, path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read translations: {:?}", path))?;
        let entries: HashMap<String, String> =
            serde_json::from_str(&content).context("Failed to parse translations JSON")?;
        Ok(Self::with_entries(tag, entries))
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl Localizer for Catalog {
    fn translate(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    fn decimal_separator(&self) -> char {
        self.decimal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_tags_map_to_separators() {
        assert_eq!(map_locale("de_DE").1, ',');
        assert_eq!(map_locale("pt-BR").1, ',');
        assert_eq!(map_locale("en").1, '.');
        assert_eq!(map_locale("unknown").1, '.');
    }

    #[test]
    fn catalog_falls_back_to_key() {
        let c = Catalog::with_entries("fr", [(NO_DATA, "pas de données")]);
        assert_eq!(c.translate(NO_DATA), "pas de données");
        assert_eq!(c.translate("Bed net usage"), "Bed net usage");
        assert_eq!(c.decimal_separator(), ',');
        assert_eq!(c.tag(), "fr");
    }
}
