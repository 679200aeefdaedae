//! Display-string catalogs for the supported locales.
//!
//! Catalogs are embedded at build time and parsed once. Lookups use dotted
//! keys such as `analyze.loading.stages.fetch`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "es")]
    Es,
}

#[derive(Debug, thiserror::Error)]
#[error("Unsupported locale")]
pub struct UnsupportedLocale(pub String);

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::PtBr, Locale::Es];

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::PtBr => "pt-BR",
            Locale::Es => "es",
        }
    }

    /// Map a language tag to the closest supported locale by prefix.
    ///
    /// ```
    /// use cpc_i18n::Locale;
    ///
    /// assert_eq!(Locale::negotiate("pt-PT"), Locale::PtBr);
    /// assert_eq!(Locale::negotiate("es-MX"), Locale::Es);
    /// assert_eq!(Locale::negotiate("fr"), Locale::En);
    /// ```
    pub fn negotiate(tag: &str) -> Locale {
        let tag = tag.trim();
        if tag.starts_with("pt") {
            Locale::PtBr
        } else if tag.starts_with("es") {
            Locale::Es
        } else {
            Locale::En
        }
    }

    /// Pick a locale from an `Accept-Language` header value.
    ///
    /// Only the first tag counts; quality weights are ignored.
    pub fn from_accept_language(header: &str) -> Locale {
        let first = header
            .split(',')
            .next()
            .and_then(|t| t.split(';').next())
            .unwrap_or_default();
        Locale::negotiate(first)
    }

    /// Explicit choice wins if supported, then `Accept-Language`, then `en`.
    pub fn resolve(explicit: Option<&str>, accept_language: Option<&str>) -> Locale {
        if let Some(locale) = explicit.and_then(|raw| raw.parse().ok()) {
            return locale;
        }
        accept_language
            .map(Locale::from_accept_language)
            .unwrap_or_default()
    }

    pub fn catalog(self) -> &'static Value {
        match self {
            Locale::En => &EN,
            Locale::PtBr => &PT_BR,
            Locale::Es => &ES,
        }
    }
}

impl FromStr for Locale {
    type Err = UnsupportedLocale;

    /// Exact match only; use [`Locale::negotiate`] for prefix matching.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| UnsupportedLocale(s.to_string()))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static EN: LazyLock<Value> = LazyLock::new(|| parse_catalog("en", include_str!("../locales/en.json")));
static PT_BR: LazyLock<Value> =
    LazyLock::new(|| parse_catalog("pt-BR", include_str!("../locales/pt-BR.json")));
static ES: LazyLock<Value> = LazyLock::new(|| parse_catalog("es", include_str!("../locales/es.json")));

fn parse_catalog(name: &str, raw: &str) -> Value {
    match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(locale = name, error = %e, "i18n.catalog.invalid");
            Value::Object(Default::default())
        }
    }
}

/// Resolve a dotted key to its string in `locale`.
///
/// ```
/// use cpc_i18n::{lookup, Locale};
///
/// assert_eq!(lookup(Locale::Es, "language.label"), Some("Idioma"));
/// assert_eq!(lookup(Locale::En, "no.such.key"), None);
/// ```
pub fn lookup(locale: Locale, key: &str) -> Option<&'static str> {
    key.split('.')
        .try_fold(locale.catalog(), |node, part| node.get(part))
        .and_then(Value::as_str)
}

/// Like [`lookup`], falling back to English and then to the key itself.
pub fn translate(locale: Locale, key: &str) -> String {
    lookup(locale, key)
        .or_else(|| lookup(Locale::En, key))
        .map(str::to_string)
        .unwrap_or_else(|| {
            tracing::debug!(locale = %locale, key, "i18n.missing");
            key.to_string()
        })
}

/// Every dotted leaf key of a catalog, sorted.
pub fn leaf_keys(catalog: &Value) -> Vec<String> {
    fn walk(prefix: &str, node: &Value, out: &mut Vec<String>) {
        match node {
            Value::Object(map) => {
                for (k, v) in map {
                    let path = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    walk(&path, v, out);
                }
            }
            _ => out.push(prefix.to_string()),
        }
    }
    let mut out = Vec::new();
    walk("", catalog, &mut out);
    out.sort();
    out
}
