//! Dictionary profiles and marker tables, loaded from YAML.
//!
//! The built-in `schema/dictionaries.yaml` is compiled into the binary and
//! parsed once; `--schema` points at a replacement file with the same shape.
//! Profiles are plain values handed to the parser, never read from globals
//! inside it.

use crate::dialect::Dialect;
use crate::error::{Result, ScanError};
use crate::script::Script;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::warn;

const BUILTIN_SCHEMA: &str = include_str!("../schema/dictionaries.yaml");

static BUILTIN: OnceCell<Schema> = OnceCell::new();

// === Schema YAML structures ===

#[derive(Debug, Deserialize)]
struct SchemaFile {
    dictionaries: Vec<ProfileConfig>,
}

#[derive(Debug, Deserialize)]
struct ProfileConfig {
    slug: String,
    title: String,
    short_name: String,
    year: u16,
    #[serde(default)]
    author: Option<String>,
    dialect: Dialect,
    headword_script: Script,
    gloss_script: Script,
    headword_language: Language,
    gloss_language: Language,
    #[serde(default)]
    start_at: Option<usize>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    grammar: Vec<MarkerClass>,
    #[serde(default)]
    etymology: Vec<MarkerClass>,
    #[serde(default)]
    citations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MarkerClass {
    code: String,
    variants: Vec<String>,
}

/// Language of a row's content, as dictpress names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Malayalam,
}

impl Language {
    pub fn name(self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Malayalam => "malayalam",
        }
    }

    /// Search tokenizer available for this language, if any.
    pub fn tokenizer(self) -> Option<&'static str> {
        match self {
            Language::English => Some("english"),
            Language::Malayalam => None,
        }
    }
}

/// What a marker canonicalizes to when the table has no entry for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Keep the raw marker as the canonical value (grammar tags).
    Raw,
    /// Use an empty canonical value (etymology languages).
    Empty,
}

/// Closed mapping from printed markers to canonical tags.
#[derive(Debug, Clone)]
pub struct MarkerTable {
    map: HashMap<String, String>,
    fallback: Fallback,
}

impl MarkerTable {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>, fallback: Fallback) -> Self {
        Self {
            map: entries.into_iter().collect(),
            fallback,
        }
    }

    fn from_classes(
        classes: Vec<MarkerClass>,
        fallback: Fallback,
        table: &str,
        slug: &str,
    ) -> Self {
        let mut map = HashMap::new();
        for class in classes {
            for variant in class.variants {
                if let Some(previous) = map.insert(variant.clone(), class.code.clone()) {
                    warn!(
                        "{} {} marker {:?} maps to both {:?} and {:?}; keeping the latter",
                        slug, table, variant, previous, class.code
                    );
                }
            }
        }
        Self::new(map, fallback)
    }

    /// Canonicalizes a raw marker. Empty markers yield `None`.
    pub fn resolve(&self, raw: &str) -> Option<crate::model::Marker> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let marker = match self.map.get(raw) {
            Some(canonical) => crate::model::Marker {
                raw: raw.to_string(),
                canonical: canonical.clone(),
                mapped: true,
            },
            None => crate::model::Marker {
                raw: raw.to_string(),
                canonical: match self.fallback {
                    Fallback::Raw => raw.to_string(),
                    Fallback::Empty => String::new(),
                },
                mapped: false,
            },
        };
        Some(marker)
    }
}

/// How citation markers are searched for in sense text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CitationMatch {
    /// Marker must not be preceded by a letter or digit.
    #[default]
    WordBoundary,
    /// Plain substring search, as the legacy converter did.
    Substring,
}

/// One dictionary's configuration: scripts, thresholds and marker tables.
#[derive(Debug, Clone)]
pub struct Profile {
    pub slug: String,
    pub title: String,
    pub short_name: String,
    pub year: u16,
    pub author: Option<String>,
    pub dialect: Dialect,
    pub headword_script: Script,
    pub gloss_script: Script,
    pub headword_language: Language,
    pub gloss_language: Language,
    /// First page (TEI), line (plain) or record (XDXF) that belongs to the body.
    pub start_at: Option<usize>,
    pub tags: Vec<String>,
    pub grammar: MarkerTable,
    pub etymology: MarkerTable,
    pub citations: Vec<String>,
    pub citation_match: CitationMatch,
}

impl Profile {
    fn from_config(config: ProfileConfig) -> Self {
        let grammar =
            MarkerTable::from_classes(config.grammar, Fallback::Raw, "grammar", &config.slug);
        let etymology =
            MarkerTable::from_classes(config.etymology, Fallback::Empty, "etymology", &config.slug);
        Self {
            slug: config.slug,
            title: config.title,
            short_name: config.short_name,
            year: config.year,
            author: config.author,
            dialect: config.dialect,
            headword_script: config.headword_script,
            gloss_script: config.gloss_script,
            headword_language: config.headword_language,
            gloss_language: config.gloss_language,
            start_at: config.start_at,
            tags: config.tags,
            grammar,
            etymology,
            citations: config.citations,
            citation_match: CitationMatch::default(),
        }
    }

    /// Headword and gloss share a script (a monolingual dictionary).
    pub fn is_monolingual(&self) -> bool {
        self.headword_script == self.gloss_script
    }

    pub fn with_citation_match(mut self, mode: CitationMatch) -> Self {
        self.citation_match = mode;
        self
    }

    pub fn with_start_at(mut self, start_at: Option<usize>) -> Self {
        self.start_at = start_at;
        self
    }
}

/// All known dictionary profiles.
#[derive(Debug, Clone)]
pub struct Schema {
    profiles: Vec<Profile>,
}

impl Schema {
    /// Parses a schema document.
    pub fn parse(contents: &str) -> Result<Self> {
        let file: SchemaFile = serde_yaml::from_str(contents)
            .map_err(|e| ScanError::Schema(format!("failed to parse schema YAML: {}", e)))?;

        let mut seen = HashSet::new();
        for config in &file.dictionaries {
            if !seen.insert(config.slug.clone()) {
                return Err(ScanError::Schema(format!(
                    "dictionary {:?} is defined twice",
                    config.slug
                )));
            }
        }

        Ok(Self {
            profiles: file.dictionaries.into_iter().map(Profile::from_config).collect(),
        })
    }

    /// Loads a schema file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ScanError::Schema(format!("failed to read schema file {:?}: {}", path, e))
        })?;
        Self::parse(&contents)
    }

    /// The schema compiled into the crate, parsed on first use.
    pub fn builtin() -> Result<&'static Schema> {
        BUILTIN.get_or_try_init(|| Schema::parse(BUILTIN_SCHEMA))
    }

    pub fn profile(&self, slug: &str) -> Result<&Profile> {
        self.profiles.iter().find(|p| p.slug == slug).ok_or_else(|| {
            let known: Vec<&str> = self.slugs().collect();
            ScanError::Schema(format!(
                "unknown dictionary {:?} (known: {})",
                slug,
                known.join(", ")
            ))
        })
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.slug.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_schema_has_all_dictionaries() {
        let schema = Schema::builtin().unwrap();
        let slugs: Vec<&str> = schema.slugs().collect();
        assert_eq!(slugs, vec!["bailey", "gundert", "stv"]);
    }

    #[test]
    fn builtin_profiles_match_their_dialects() {
        let schema = Schema::builtin().unwrap();
        assert_eq!(schema.profile("bailey").unwrap().dialect, Dialect::Plain);
        assert_eq!(schema.profile("gundert").unwrap().dialect, Dialect::Tei);
        assert_eq!(schema.profile("stv").unwrap().dialect, Dialect::Xdxf);
        assert_eq!(schema.profile("gundert").unwrap().start_at, Some(23));
        assert!(schema.profile("stv").unwrap().is_monolingual());
        assert!(!schema.profile("bailey").unwrap().is_monolingual());
    }

    #[test]
    fn unknown_profile_is_a_schema_error() {
        let schema = Schema::builtin().unwrap();
        let err = schema.profile("webster").unwrap_err();
        assert!(err.to_string().contains("webster"));
        assert!(err.to_string().contains("gundert"));
    }

    #[test]
    fn grammar_falls_back_to_raw() {
        let schema = Schema::builtin().unwrap();
        let bailey = schema.profile("bailey").unwrap();

        let mapped = bailey.grammar.resolve("v. a").unwrap();
        assert_eq!(mapped.canonical, "verb-transitive");
        assert!(mapped.mapped);

        let unmapped = bailey.grammar.resolve("v. imp").unwrap();
        assert_eq!(unmapped.canonical, "v. imp");
        assert!(!unmapped.mapped);
    }

    #[test]
    fn etymology_falls_back_to_empty() {
        let schema = Schema::builtin().unwrap();
        let gundert = schema.profile("gundert").unwrap();

        let mapped = gundert.etymology.resolve("S.").unwrap();
        assert_eq!(mapped.canonical, "sanskrit");
        assert!(mapped.mapped);

        let unmapped = gundert.etymology.resolve("Tdbh.").unwrap();
        assert_eq!(unmapped.canonical, "");
        assert!(!unmapped.mapped);
    }

    #[test]
    fn marker_equal_to_its_canonical_form_is_still_mapped() {
        let table = MarkerTable::new(
            vec![("noun".to_string(), "noun".to_string())],
            Fallback::Raw,
        );
        let marker = table.resolve("noun").unwrap();
        assert_eq!(marker.raw, marker.canonical);
        assert!(marker.mapped);
    }

    #[test]
    fn empty_marker_resolves_to_none() {
        let table = MarkerTable::new(Vec::new(), Fallback::Raw);
        assert!(table.resolve("  ").is_none());
    }

    #[test]
    fn duplicate_slugs_are_rejected() {
        let yaml = r#"
dictionaries:
  - slug: x
    title: X
    short_name: X
    year: 1900
    dialect: plain
    headword_script: latin
    gloss_script: malayalam
    headword_language: english
    gloss_language: malayalam
  - slug: x
    title: X
    short_name: X
    year: 1900
    dialect: plain
    headword_script: latin
    gloss_script: malayalam
    headword_language: english
    gloss_language: malayalam
"#;
        assert!(matches!(Schema::parse(yaml), Err(ScanError::Schema(_))));
    }

    #[test]
    fn malformed_yaml_is_a_schema_error() {
        assert!(matches!(
            Schema::parse("dictionaries: [ {slug: 1"),
            Err(ScanError::Schema(_))
        ));
    }
}
