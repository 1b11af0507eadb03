//! Stylesheets — JSON role tables resolved eagerly into [`Styles`].
//!
//! A sheet maps role names (`title`, `chord`, `chordbox`, ...) to partial
//! attribute sets. Missing attributes are looked up along the role's
//! ancestor chain, which ends at `default`. The built-in sheet is always the
//! bottom layer; user sheets are overlaid attribute by attribute.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::surface::{Align, Color, FontFamily, FontSpec};

const BUILTIN_SHEET: &str = include_str!("../data/base.json");

/// A role entry as written in a stylesheet file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rise: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
}

/// `1.2` or `"120%"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scale {
    Factor(f64),
    Text(String),
}

impl Scale {
    fn factor(&self) -> Option<f64> {
        match self {
            Scale::Factor(f) => Some(*f),
            Scale::Text(s) => match s.trim().strip_suffix('%') {
                Some(pct) => pct.trim().parse::<f64>().ok().map(|p| p * 0.01),
                None => s.trim().parse().ok(),
            },
        }
    }
}

impl RawStyle {
    /// Attribute-wise overlay: values set in `top` win.
    fn overlay(&mut self, top: RawStyle) {
        macro_rules! take {
            ($($field:ident),*) => {
                $( if top.$field.is_some() { self.$field = top.$field; } )*
            };
        }
        take!(inherit, font, weight, style, font_size, line_height, rise, indent, color, align, scale, margin);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// StyleSheet
// ═══════════════════════════════════════════════════════════════════════

/// Unresolved role table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleSheet {
    roles: BTreeMap<String, RawStyle>,
}

impl StyleSheet {
    /// The sheet compiled into the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_SHEET, Path::new("<builtin>"))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    pub fn from_json(text: &str, origin: &Path) -> Result<Self> {
        serde_json::from_str(text).map_err(|source| Error::StyleSheet {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Overlay `other` on top of this sheet.
    pub fn merge(&mut self, other: StyleSheet) {
        for (role, raw) in other.roles {
            self.roles.entry(role).or_default().overlay(raw);
        }
    }

    /// Resolve every role the renderer uses.
    pub fn resolve(&self) -> Result<Styles> {
        Ok(Styles {
            margin: self.lookup("songsheet", "margin", |r| r.margin)?,
            title: self.style("title")?,
            subtitle: self.style("subtitle")?,
            comment: self.style("comment")?,
            line: self.style("line")?,
            chord: self.style("chord")?,
            tab: self.style("tab")?,
            chorus: self.style("chorus")?,
            blank: self.style("blank")?,
            chordbox: self.style("chordbox")?,
            chordbox_marks: self.style("chordbox-marks")?,
            page_number: self.style("page-number")?,
            filename: self.style("filename")?,
        })
    }

    /// Roles to search for `role`, nearest first.
    fn chain<'a>(&'a self, role: &'a str) -> Result<Vec<&'a str>> {
        let mut chain: Vec<&'a str> = Vec::new();
        let mut current = Some(role);
        while let Some(name) = current {
            if chain.contains(&name) {
                return Err(Error::BadStyle {
                    role: role.to_string(),
                    attr: "inherit",
                    value: name.to_string(),
                });
            }
            chain.push(name);
            current = match self.roles.get(name).and_then(|r| r.inherit.as_deref()) {
                Some(parent) => Some(parent),
                None => builtin_parent(name),
            };
        }
        Ok(chain)
    }

    fn lookup<T>(&self, role: &str, attr: &'static str, get: impl Fn(&RawStyle) -> Option<T>) -> Result<T> {
        self.chain(role)?
            .into_iter()
            .filter_map(|name| self.roles.get(name))
            .find_map(get)
            .ok_or_else(|| Error::MissingStyle {
                role: role.to_string(),
                attr,
            })
    }

    fn style(&self, role: &str) -> Result<Style> {
        let bad = |attr: &'static str, value: &str| Error::BadStyle {
            role: role.to_string(),
            attr,
            value: value.to_string(),
        };

        let font_name = self.lookup(role, "font", |r| r.font.clone())?;
        let (family, named_bold, named_italic) = parse_font(&font_name).ok_or_else(|| bad("font", &font_name))?;

        let weight = self.lookup(role, "weight", |r| r.weight.clone())?;
        let bold = match weight.trim().to_ascii_lowercase().as_str() {
            "bold" => true,
            "normal" => named_bold,
            _ => return Err(bad("weight", &weight)),
        };

        let slant = self.lookup(role, "style", |r| r.style.clone())?;
        let italic = match slant.trim().to_ascii_lowercase().as_str() {
            "italic" | "oblique" => true,
            "normal" => named_italic,
            _ => return Err(bad("style", &slant)),
        };

        let size = self.lookup(role, "font-size", |r| r.font_size)?;
        if size <= 0.0 {
            return Err(bad("font-size", &size.to_string()));
        }

        let color = self.lookup(role, "color", |r| r.color.clone())?;
        let color = Color::parse(&color).ok_or_else(|| bad("color", &color))?;

        let align = self.lookup(role, "align", |r| r.align.clone())?;
        let align = Align::parse(&align).ok_or_else(|| bad("align", &align))?;

        let scale = self.lookup(role, "scale", |r| r.scale.clone())?;
        let scale = scale.factor().filter(|f| *f > 0.0).ok_or_else(|| {
            let text = match &scale {
                Scale::Factor(f) => f.to_string(),
                Scale::Text(s) => s.clone(),
            };
            bad("scale", &text)
        })?;

        Ok(Style {
            font: FontSpec {
                family,
                bold,
                italic,
                size,
            },
            line_height: self.lookup(role, "line-height", |r| r.line_height)?,
            rise: self.lookup(role, "rise", |r| r.rise)?,
            indent: self.lookup(role, "indent", |r| r.indent)?,
            color,
            align,
            scale,
        })
    }
}

fn builtin_parent(role: &str) -> Option<&'static str> {
    match role {
        "default" => None,
        "subtitle" => Some("title"),
        "chorus" | "blank" => Some("line"),
        "chordbox-marks" => Some("chordbox"),
        "filename" => Some("page-number"),
        _ => Some("default"),
    }
}

/// Family plus the weight/slant implied by a full standard font name.
fn parse_font(name: &str) -> Option<(FontFamily, bool, bool)> {
    let lower = name.trim().to_ascii_lowercase();
    let (base, variant) = lower.split_once('-').unwrap_or((lower.as_str(), ""));
    let family = match base {
        "helvetica" | "arial" | "sans" => FontFamily::Helvetica,
        "times" | "serif" => FontFamily::Times,
        "courier" | "mono" | "monospace" => FontFamily::Courier,
        _ => return None,
    };
    let (bold, italic) = match variant {
        "" | "roman" | "serif" => (false, false),
        "bold" => (true, false),
        "oblique" | "italic" => (false, true),
        "boldoblique" | "bolditalic" => (true, true),
        _ => return None,
    };
    Some((family, bold, italic))
}

// ═══════════════════════════════════════════════════════════════════════
// Resolved styles
// ═══════════════════════════════════════════════════════════════════════

/// Fully resolved attributes of one role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Style {
    pub font: FontSpec,
    pub line_height: f64,
    pub rise: f64,
    pub indent: f64,
    pub color: Color,
    pub align: Align,
    pub scale: f64,
}

/// Every role the renderer reads, resolved once per run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Styles {
    /// Page margin unit of the songsheet
    pub margin: f64,
    pub title: Style,
    pub subtitle: Style,
    pub comment: Style,
    pub line: Style,
    pub chord: Style,
    pub tab: Style,
    pub chorus: Style,
    pub blank: Style,
    pub chordbox: Style,
    pub chordbox_marks: Style,
    pub page_number: Style,
    pub filename: Style,
}

impl Styles {
    /// Resolve the built-in sheet.
    pub fn builtin() -> Result<Self> {
        StyleSheet::builtin()?.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sheet(json: &str) -> StyleSheet {
        StyleSheet::from_json(json, Path::new("test.json")).unwrap()
    }

    #[test]
    fn builtin_sheet_resolves() {
        let styles = Styles::builtin().unwrap();
        assert_eq!(styles.margin, 50.0);
        assert_eq!(styles.line.font.family, FontFamily::Times);
        assert!(styles.title.font.bold);
        assert_eq!(styles.title.align, Align::Center);
        assert!(styles.chord.rise > 0.0);
        assert_eq!(styles.chordbox.scale, 1.0);
        // chorus falls back to line for everything but the indent
        assert_eq!(styles.chorus.font, styles.line.font);
        assert!(styles.chorus.indent > 0.0);
    }

    #[test]
    fn overlay_changes_single_attributes() {
        let mut base = StyleSheet::builtin().unwrap();
        base.merge(sheet(r#"{"chord": {"color": "red", "scale": "150%"}}"#));
        let styles = base.resolve().unwrap();
        assert_eq!(styles.chord.color, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(styles.chord.scale, 1.5);
        assert!(styles.chord.font.bold);
    }

    #[test]
    fn explicit_inherit_is_followed() {
        let mut base = StyleSheet::builtin().unwrap();
        base.merge(sheet(r#"{"comment": {"inherit": "tab", "style": "normal", "color": "black"}}"#));
        let styles = base.resolve().unwrap();
        assert_eq!(styles.comment.font.family, FontFamily::Courier);
    }

    #[test]
    fn full_font_names_set_the_variant() {
        assert_eq!(parse_font("Helvetica-BoldOblique"), Some((FontFamily::Helvetica, true, true)));
        assert_eq!(parse_font("Times-Roman"), Some((FontFamily::Times, false, false)));
        assert_eq!(parse_font("Monospace"), Some((FontFamily::Courier, false, false)));
        assert_eq!(parse_font("Comic Sans"), None);
    }

    #[test]
    fn missing_attribute_is_reported() {
        let err = sheet(r#"{"default": {"font": "Times"}, "songsheet": {"margin": 10}}"#)
            .resolve()
            .unwrap_err();
        assert!(matches!(err, Error::MissingStyle { attr: "weight", .. }), "{err}");
    }

    #[test]
    fn bad_values_are_reported() {
        let mut base = StyleSheet::builtin().unwrap();
        base.merge(sheet(r#"{"title": {"align": "justify"}}"#));
        let err = base.resolve().unwrap_err();
        assert!(matches!(err, Error::BadStyle { attr: "align", .. }), "{err}");
    }

    #[test]
    fn inheritance_cycles_are_rejected() {
        let mut base = StyleSheet::builtin().unwrap();
        base.merge(sheet(r#"{"line": {"inherit": "chorus"}}"#));
        let err = base.resolve().unwrap_err();
        assert!(matches!(err, Error::BadStyle { attr: "inherit", .. }), "{err}");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = StyleSheet::from_json(r#"{"title": {"colour": "red"}}"#, Path::new("x.json")).unwrap_err();
        assert!(matches!(err, Error::StyleSheet { .. }));
    }
}
