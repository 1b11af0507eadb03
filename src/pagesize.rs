//! Page size descriptions: `A4`, `letter`, `210mm x 297mm`, `8.5 by 11in`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static DIMENSIONS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?) ?(cm|in|pt|i|mm|pica)? ?(?:x|by) ?(\d+(?:\.\d+)?) ?(cm|in|pt|i|mm|pica)?$")
        .expect("valid regex")
});

/// Points per unit.
fn unit_factor(unit: &str) -> f64 {
    match unit.to_ascii_lowercase().as_str() {
        "in" | "i" => 72.0,
        "cm" => 72.0 / 2.54,
        "mm" => 72.0 / 25.4,
        "pica" => 12.0,
        _ => 1.0,
    }
}

fn named(name: &str) -> Option<(f64, f64)> {
    let mm = |w: f64, h: f64| (w * 72.0 / 25.4, h * 72.0 / 25.4);
    let size = match name.to_ascii_uppercase().as_str() {
        "A3" => mm(297.0, 420.0),
        "A4" => mm(210.0, 297.0),
        "A5" => mm(148.0, 210.0),
        "A6" => mm(105.0, 148.0),
        "B4" => mm(250.0, 353.0),
        "B5" => mm(176.0, 250.0),
        "LETTER" => (612.0, 792.0),
        "LEGAL" => (612.0, 1008.0),
        "TABLOID" | "ELEVENSEVENTEEN" => (792.0, 1224.0),
        _ => return None,
    };
    Some(size)
}

/// Width and height in points.
pub fn parse(descr: &str) -> Result<(f64, f64)> {
    let descr = descr.trim();
    if let Some(size) = named(descr) {
        return Ok(size);
    }

    let caps = DIMENSIONS_RE
        .captures(descr)
        .ok_or_else(|| Error::PageSize(descr.to_string()))?;
    let number = |i: usize| -> Result<f64> {
        caps[i]
            .parse::<f64>()
            .map_err(|_| Error::PageSize(descr.to_string()))
    };
    let height_unit = caps.get(4).map_or(1.0, |m| unit_factor(m.as_str()));
    let width_unit = caps.get(2).map_or(height_unit, |m| unit_factor(m.as_str()));
    let size = (number(1)? * width_unit, number(3)? * height_unit);
    if size.0 <= 0.0 || size.1 <= 0.0 {
        return Err(Error::PageSize(descr.to_string()));
    }
    Ok(size)
}
