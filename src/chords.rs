//! Chord diagrams: definition parsing, the global chord library and the
//! per-run registry of defined and used chords.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use log::warn;
use regex::Regex;
use thiserror::Error;

use crate::error::{Error, Result};
use crate::model::{ChordDef, Fret};

const BUILTIN_CHORDS: &str = include_str!("../data/chords.json");

static PARENS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\(.*\)").expect("valid regex"));
static TRAILING_SLASHES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\s*/\s*)*$").expect("valid regex"));

/// Chord symbols that never get a diagram.
const NO_DIAGRAM: [&str; 4] = ["N.C.", "%", "-", ""];

/// Why a `{define}` was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefineError {
    #[error("expected 'base-fret N frets ...', got '{0}'")]
    Shape(String),
    #[error("bad base fret '{0}'")]
    BaseFret(String),
    #[error("bad fret '{0}'")]
    Fret(String),
}

impl ChordDef {
    /// Build a definition from the words after the chord name, e.g.
    /// `["base-fret", "1", "frets", "x", "3", "2", "0", "1", "0"]`.
    pub fn from_define<S: AsRef<str>>(name: &str, spec: &[S]) -> std::result::Result<Self, DefineError> {
        let words: Vec<&str> = spec.iter().map(AsRef::as_ref).collect();
        let [keyword, base, frets_kw, frets @ ..] = words.as_slice() else {
            return Err(DefineError::Shape(words.join(" ")));
        };
        if !keyword.eq_ignore_ascii_case("base-fret") || !frets_kw.eq_ignore_ascii_case("frets") || frets.is_empty() {
            return Err(DefineError::Shape(words.join(" ")));
        }

        let base_fret = base
            .parse::<u8>()
            .map_err(|_| DefineError::BaseFret(base.to_string()))?;
        let strings = frets
            .iter()
            .map(|f| match *f {
                "-" | "x" | "X" => Ok(Fret::Muted),
                other => other
                    .parse::<u8>()
                    .map(Fret::At)
                    .map_err(|_| DefineError::Fret(other.to_string())),
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(ChordDef {
            name: name.to_string(),
            base_fret,
            strings,
        })
    }
}

/// Strip `(annotations)` and trailing `/` strokes from a chord symbol.
///
/// A real slash chord such as `C/G` is left alone.
pub fn normalize_chord_name(raw: &str) -> String {
    let without_parens = PARENS_RE.replace_all(raw, "");
    let trimmed = TRAILING_SLASHES_RE.replace(&without_parens, "");
    trimmed.trim().to_string()
}

// ═══════════════════════════════════════════════════════════════════════
// ChordLibrary
// ═══════════════════════════════════════════════════════════════════════

/// Read-only set of known chord diagrams.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChordLibrary {
    chords: BTreeMap<String, ChordDef>,
}

impl ChordLibrary {
    /// The chords compiled into the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CHORDS, "<builtin>")
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, &path.display().to_string())
    }

    /// Parse `{"NAME": "base-fret N frets ..."}`.
    pub fn from_json(text: &str, origin: &str) -> Result<Self> {
        let library_error = |message: String| Error::ChordLibrary {
            name: origin.to_string(),
            message,
        };
        let entries: BTreeMap<String, String> =
            serde_json::from_str(text).map_err(|e| library_error(e.to_string()))?;

        let mut library = Self {
            chords: BTreeMap::new(),
        };
        for (name, spec) in entries {
            let words: Vec<&str> = spec.split_whitespace().collect();
            let def = ChordDef::from_define(&name, &words).map_err(|e| library_error(format!("{name}: {e}")))?;
            library.insert(def);
        }
        Ok(library)
    }

    /// Add or replace one definition, keyed by its name.
    pub fn insert(&mut self, def: ChordDef) {
        self.chords.insert(def.name.clone(), def);
    }

    /// Add every chord of `other`, replacing same-named entries.
    pub fn merge(&mut self, other: ChordLibrary) {
        self.chords.extend(other.chords);
    }

    pub fn get(&self, name: &str) -> Option<&ChordDef> {
        self.chords.get(name)
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ChordRegistry
// ═══════════════════════════════════════════════════════════════════════

/// Known chords plus song-local definitions and the chords used since the
/// last diagram flush.
#[derive(Debug, Clone, Default)]
pub struct ChordRegistry {
    global: ChordLibrary,
    local: BTreeMap<String, ChordDef>,
    /// Normalized names in first-use order, no duplicates
    used: Vec<String>,
}

impl ChordRegistry {
    pub fn new(global: ChordLibrary) -> Self {
        Self {
            global,
            local: BTreeMap::new(),
            used: Vec::new(),
        }
    }

    /// Forget the local definitions of the previous song.
    pub fn new_song(&mut self) {
        self.local.clear();
    }

    /// Register a `{define}`, shadowing the global entry until the next song.
    pub fn define<S: AsRef<str>>(&mut self, name: &str, spec: &[S]) -> std::result::Result<(), DefineError> {
        let def = ChordDef::from_define(name, spec)?;
        self.local.insert(name.to_string(), def);
        Ok(())
    }

    /// Local definition first, then the global library.
    pub fn lookup(&self, name: &str) -> Option<&ChordDef> {
        self.local.get(name).or_else(|| self.global.get(name))
    }

    /// Record a chord symbol as seen in a line.
    pub fn use_chord(&mut self, raw: &str) {
        let name = normalize_chord_name(raw);
        if NO_DIAGRAM.contains(&name.as_str()) || self.used.contains(&name) {
            return;
        }
        if self.lookup(&name).is_none() {
            warn!("unknown chord: {name}");
        }
        self.used.push(name);
    }

    /// Chords used since the last flush, in first-use order.
    pub fn used(&self) -> &[String] {
        &self.used
    }

    /// Drain the used set in diagram order (reverse alphabetical).
    pub fn take_flush_order(&mut self) -> Vec<String> {
        let mut names = std::mem::take(&mut self.used);
        names.sort_unstable_by(|a, b| b.cmp(a));
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn words(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    #[test]
    fn parses_a_define() {
        let def = ChordDef::from_define("Bm", &words("base-fret 2 frets x 1 3 3 2 1")).unwrap();
        assert_eq!(def.base_fret, 2);
        assert!(def.is_barre());
        assert_eq!(def.strings[0], Fret::Muted);
        assert_eq!(def.strings[2], Fret::At(3));
        assert_eq!(def.strings.len(), 6);
    }

    #[test]
    fn rejects_malformed_defines() {
        assert!(matches!(
            ChordDef::from_define("C", &words("frets x 3 2 0 1 0")),
            Err(DefineError::Shape(_))
        ));
        assert_eq!(
            ChordDef::from_define("C", &words("base-fret one frets x 3 2 0 1 0")),
            Err(DefineError::BaseFret("one".into()))
        );
        assert_eq!(
            ChordDef::from_define("C", &words("base-fret 1 frets x 3 q 0 1 0")),
            Err(DefineError::Fret("q".into()))
        );
        assert!(ChordDef::from_define("C", &words("base-fret 1 frets")).is_err());
    }

    #[test]
    fn normalizes_names() {
        assert_eq!(normalize_chord_name("Am (optional)"), "Am");
        assert_eq!(normalize_chord_name("C / /"), "C");
        assert_eq!(normalize_chord_name("G/"), "G");
        assert_eq!(normalize_chord_name("C/G"), "C/G");
    }

    #[test]
    fn builtin_library_loads() {
        let lib = ChordLibrary::builtin().unwrap();
        assert!(lib.len() > 40);
        assert_eq!(lib.get("C").map(|c| c.base_fret), Some(1));
        assert!(lib.get("Bb").is_some());
        assert!(lib.get("A#").is_some());
    }

    #[test]
    fn bad_library_entry_is_an_error() {
        let err = ChordLibrary::from_json(r#"{"C": "frets x 3 2 0 1 0"}"#, "mine.json").unwrap_err();
        assert!(matches!(err, Error::ChordLibrary { .. }));
    }

    #[test]
    fn used_set_dedups_and_skips_markers() {
        let mut reg = ChordRegistry::new(ChordLibrary::builtin().unwrap());
        for c in ["C", "G", "C", "N.C.", "%", "-", "", "Am (x2)", "Unknown7"] {
            reg.use_chord(c);
        }
        assert_eq!(reg.used(), &["C", "G", "Am", "Unknown7"]);
        assert_eq!(reg.take_flush_order(), vec!["Unknown7", "G", "C", "Am"]);
        assert!(reg.used().is_empty());
    }

    #[test]
    fn local_definitions_shadow_until_next_song() {
        let mut reg = ChordRegistry::new(ChordLibrary::builtin().unwrap());
        let global = reg.lookup("D").cloned().unwrap();
        reg.define("D", &words("base-fret 5 frets x 1 3 3 3 1")).unwrap();
        assert_eq!(reg.lookup("D").map(|d| d.base_fret), Some(5));
        reg.new_song();
        assert_eq!(reg.lookup("D"), Some(&global));
    }
}
