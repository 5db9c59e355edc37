//! Units and numeric quantities.
//!
//! The unit table maps every accepted spelling to a canonical token and a unit
//! class. The quantity helpers evaluate amount strings ("1½", "1 1/2", "2-3")
//! to a number so ingredient lists can be ordered by size.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Broad family a unit belongs to, used when ordering ingredients by size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitClass {
    Weight,
    Count,
    Volume,
    SmallVolume,
    Length,
}

impl UnitClass {
    /// Sort priority: weight > whole-count > volume > small-volume > length.
    pub fn priority(self) -> f64 {
        match self {
            UnitClass::Weight => 5.0,
            UnitClass::Count => 4.0,
            UnitClass::Volume => 3.0,
            UnitClass::SmallVolume => 2.0,
            UnitClass::Length => 1.0,
        }
    }
}

/// A recognized unit and all of its spellings.
#[derive(Debug)]
pub struct UnitDef {
    /// Token written into parsed amounts ("Tbsp", "g", "cups").
    pub canonical: &'static str,
    pub class: UnitClass,
    /// Multiplier into the class base unit (grams, millilitres, items, centimetres).
    pub base_factor: f64,
    aliases: &'static [&'static str],
}

const fn unit(
    canonical: &'static str,
    class: UnitClass,
    base_factor: f64,
    aliases: &'static [&'static str],
) -> UnitDef {
    UnitDef {
        canonical,
        class,
        base_factor,
        aliases,
    }
}

static UNITS: &[UnitDef] = &[
    // Small volume
    unit(
        "tsp",
        UnitClass::SmallVolume,
        5.0,
        &["teaspoons", "teaspoon", "tsps", "tsp", "ts"],
    ),
    unit(
        "Tbsp",
        UnitClass::SmallVolume,
        15.0,
        &[
            "tablespoons",
            "tablespoon",
            "tblsp",
            "tbsps",
            "tbsp",
            "tbs",
            "tbl",
        ],
    ),
    unit("pinch", UnitClass::SmallVolume, 0.3, &["pinch"]),
    unit("pinches", UnitClass::SmallVolume, 0.3, &["pinches"]),
    unit("dash", UnitClass::SmallVolume, 0.6, &["dash"]),
    unit("dashes", UnitClass::SmallVolume, 0.6, &["dashes"]),
    unit("drop", UnitClass::SmallVolume, 0.05, &["drop"]),
    unit("drops", UnitClass::SmallVolume, 0.05, &["drops"]),
    unit(
        "barspoon",
        UnitClass::SmallVolume,
        5.0,
        &["barspoons", "barspoon", "bar spoons", "bar spoon"],
    ),
    // Volume
    unit("cups", UnitClass::Volume, 240.0, &["cups"]),
    unit("cup", UnitClass::Volume, 240.0, &["cup", "c"]),
    unit(
        "fl oz",
        UnitClass::Volume,
        30.0,
        &["fluid ounces", "fluid ounce", "fl. oz", "fl oz", "floz"],
    ),
    unit(
        "ml",
        UnitClass::Volume,
        1.0,
        &["milliliters", "milliliter", "millilitres", "millilitre", "ml"],
    ),
    unit(
        "cl",
        UnitClass::Volume,
        10.0,
        &["centiliters", "centiliter", "centilitres", "centilitre", "cl"],
    ),
    unit(
        "L",
        UnitClass::Volume,
        1000.0,
        &["liters", "liter", "litres", "litre", "l"],
    ),
    unit("pt", UnitClass::Volume, 473.0, &["pints", "pint", "pt"]),
    unit("qt", UnitClass::Volume, 946.0, &["quarts", "quart", "qt"]),
    unit("gal", UnitClass::Volume, 3785.0, &["gallons", "gallon", "gal"]),
    // Weight
    unit("oz", UnitClass::Weight, 28.35, &["ounces", "ounce", "oz"]),
    unit("lb", UnitClass::Weight, 453.6, &["pounds", "pound", "lbs", "lb"]),
    unit("g", UnitClass::Weight, 1.0, &["grams", "gram", "gr", "g"]),
    unit(
        "kg",
        UnitClass::Weight,
        1000.0,
        &["kilograms", "kilogram", "kilos", "kilo", "kg"],
    ),
    unit(
        "mg",
        UnitClass::Weight,
        0.001,
        &["milligrams", "milligram", "mg"],
    ),
    // Whole counts
    unit("clove", UnitClass::Count, 1.0, &["clove"]),
    unit("cloves", UnitClass::Count, 1.0, &["cloves"]),
    unit("can", UnitClass::Count, 1.0, &["can"]),
    unit("cans", UnitClass::Count, 1.0, &["cans"]),
    unit("slice", UnitClass::Count, 1.0, &["slice"]),
    unit("slices", UnitClass::Count, 1.0, &["slices"]),
    unit("stick", UnitClass::Count, 1.0, &["stick"]),
    unit("sticks", UnitClass::Count, 1.0, &["sticks"]),
    unit("piece", UnitClass::Count, 1.0, &["piece"]),
    unit("pieces", UnitClass::Count, 1.0, &["pieces"]),
    unit("sprig", UnitClass::Count, 1.0, &["sprig"]),
    unit("sprigs", UnitClass::Count, 1.0, &["sprigs"]),
    unit("stalk", UnitClass::Count, 1.0, &["stalk"]),
    unit("stalks", UnitClass::Count, 1.0, &["stalks"]),
    unit("bunch", UnitClass::Count, 1.0, &["bunch"]),
    unit("bunches", UnitClass::Count, 1.0, &["bunches"]),
    unit("head", UnitClass::Count, 1.0, &["head"]),
    unit("heads", UnitClass::Count, 1.0, &["heads"]),
    unit("package", UnitClass::Count, 1.0, &["package", "pkg"]),
    unit("packages", UnitClass::Count, 1.0, &["packages", "pkgs"]),
    unit("jar", UnitClass::Count, 1.0, &["jar"]),
    unit("jars", UnitClass::Count, 1.0, &["jars"]),
    unit("bottle", UnitClass::Count, 1.0, &["bottle"]),
    unit("bottles", UnitClass::Count, 1.0, &["bottles"]),
    unit("handful", UnitClass::Count, 1.0, &["handful"]),
    unit("handfuls", UnitClass::Count, 1.0, &["handfuls"]),
    unit("leaves", UnitClass::Count, 1.0, &["leaves"]),
    // Length
    unit("inch", UnitClass::Length, 2.54, &["inch"]),
    unit("inches", UnitClass::Length, 2.54, &["inches"]),
    unit("cm", UnitClass::Length, 1.0, &["centimeters", "centimetres", "cm"]),
    unit("mm", UnitClass::Length, 0.1, &["millimeters", "millimetres", "mm"]),
];

/// Every alias paired with its unit, longest first so "tablespoons" wins over "tbs".
static ALIASES_SORTED: LazyLock<Vec<(&'static str, &'static UnitDef)>> = LazyLock::new(|| {
    let mut aliases: Vec<(&'static str, &'static UnitDef)> = UNITS
        .iter()
        .flat_map(|def| def.aliases.iter().map(move |alias| (*alias, def)))
        .collect();
    aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
    aliases
});

/// Look up a unit by one of its spellings (case-insensitive).
pub fn lookup_unit(token: &str) -> Option<&'static UnitDef> {
    let token = token.trim().trim_end_matches('.');
    match token {
        "T" => return find_canonical("Tbsp"),
        "t" => return find_canonical("tsp"),
        _ => {}
    }
    ALIASES_SORTED
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(token))
        .map(|(_, def)| *def)
}

/// Look up a unit by its canonical token.
pub fn find_canonical(canonical: &str) -> Option<&'static UnitDef> {
    UNITS.iter().find(|def| def.canonical == canonical)
}

/// Match a unit at the start of `s`.
///
/// Returns the unit and the number of bytes consumed, including one trailing
/// abbreviation period. The alias must end at a word boundary.
pub fn match_unit_prefix(s: &str) -> Option<(&'static UnitDef, usize)> {
    // Single-letter T/t are case-sensitive: tablespoon vs teaspoon.
    for (letter, canonical) in [("T", "Tbsp"), ("t", "tsp")] {
        if let Some(rest) = s.strip_prefix(letter) {
            if ends_word(rest) {
                return find_canonical(canonical).map(|def| (def, consumed(s, letter.len())));
            }
        }
    }

    for (alias, def) in ALIASES_SORTED.iter() {
        let Some(head) = s.get(..alias.len()) else {
            continue;
        };
        if head.eq_ignore_ascii_case(alias) && ends_word(&s[alias.len()..]) {
            return Some((def, consumed(s, alias.len())));
        }
    }
    None
}

fn ends_word(rest: &str) -> bool {
    rest.chars().next().is_none_or(|c| !c.is_alphanumeric())
}

fn consumed(s: &str, alias_len: usize) -> usize {
    if s[alias_len..].starts_with('.') {
        alias_len + 1
    } else {
        alias_len
    }
}

/// Aliases safe to canonicalize anywhere after a number (multi-letter ones plus "g").
pub(crate) fn normalizable_aliases() -> Vec<&'static str> {
    ALIASES_SORTED
        .iter()
        .map(|(alias, _)| *alias)
        .filter(|alias| alias.len() > 1 || *alias == "g")
        .collect()
}

/// Unicode vulgar fractions and their values.
const FRACTION_GLYPHS: &[(char, u32, u32)] = &[
    ('½', 1, 2),
    ('⅓', 1, 3),
    ('⅔', 2, 3),
    ('¼', 1, 4),
    ('¾', 3, 4),
    ('⅕', 1, 5),
    ('⅖', 2, 5),
    ('⅗', 3, 5),
    ('⅘', 4, 5),
    ('⅙', 1, 6),
    ('⅚', 5, 6),
    ('⅛', 1, 8),
    ('⅜', 3, 8),
    ('⅝', 5, 8),
    ('⅞', 7, 8),
];

/// All fraction glyph characters, for building character classes.
pub const FRACTION_CHARS: &str = "½⅓⅔¼¾⅕⅖⅗⅘⅙⅚⅛⅜⅝⅞";

/// Numeric value of a unicode fraction glyph.
pub fn glyph_value(c: char) -> Option<f64> {
    FRACTION_GLYPHS
        .iter()
        .find(|(glyph, _, _)| *glyph == c)
        .map(|(_, num, den)| f64::from(*num) / f64::from(*den))
}

/// Unicode glyph for an ASCII fraction, if one exists.
pub fn fraction_glyph(numerator: &str, denominator: &str) -> Option<char> {
    let num: u32 = numerator.parse().ok()?;
    let den: u32 = denominator.parse().ok()?;
    FRACTION_GLYPHS
        .iter()
        .find(|(_, n, d)| *n == num && *d == den)
        .map(|(glyph, _, _)| *glyph)
}

fn is_quantity_char(c: char) -> bool {
    c.is_ascii_digit()
        || glyph_value(c).is_some()
        || matches!(c, '.' | '/' | ' ' | '-' | '–' | '—' | '\u{2044}')
}

/// Evaluate the leading quantity of an amount string.
///
/// Handles:
/// - Integers and decimals: "8" → 8.0, "2.5" → 2.5
/// - Fractions: "1/2" → 0.5, "½" → 0.5
/// - Mixed numbers: "1 1/2", "1½", "1-1/2" → 1.5
/// - Ranges use the higher bound: "6-8" → 8.0, "1 to 2" → 2.0
///
/// Any trailing unit text is ignored ("1½ tsp" → 1.5).
pub fn parse_quantity(amount: &str) -> Option<f64> {
    let amount = amount.trim();
    if let Some((low, high)) = amount.split_once(" to ") {
        return match (parse_quantity(low), parse_quantity(high)) {
            (Some(l), Some(h)) => Some(l.max(h)),
            (l, h) => l.or(h),
        };
    }

    let numeric: String = amount.chars().take_while(|c| is_quantity_char(*c)).collect();
    let numeric = numeric
        .replace('\u{2044}', "/")
        .trim()
        .trim_end_matches(['-', '–', '—'])
        .trim()
        .to_string();
    if numeric.is_empty() {
        return None;
    }

    if let Some((idx, sep)) = numeric
        .char_indices()
        .find(|(_, c)| matches!(c, '-' | '–' | '—'))
    {
        let left = numeric[..idx].trim();
        let right = numeric[idx + sep.len_utf8()..].trim();
        if left.is_empty() {
            return parse_single(right);
        }
        // "1-1/2" is a mixed number, not a range
        if sep == '-' && right.contains('/') && !left.contains(' ') && !left.contains('/') {
            return Some(parse_single(left)? + parse_single(right)?);
        }
        return match (parse_single(left), parse_single(right)) {
            (Some(l), Some(r)) => Some(l.max(r)),
            (l, r) => l.or(r),
        };
    }

    parse_single(&numeric)
}

/// Sum the whitespace-separated numeric tokens: "1 1/2" → 1.5.
fn parse_single(s: &str) -> Option<f64> {
    let mut total = 0.0;
    let mut any = false;
    for token in s.split_whitespace() {
        total += parse_token(token)?;
        any = true;
    }
    any.then_some(total)
}

fn parse_token(token: &str) -> Option<f64> {
    let mut chars = token.chars();
    if let Some(last) = chars.next_back() {
        if let Some(frac) = glyph_value(last) {
            let whole = chars.as_str();
            if whole.is_empty() {
                return Some(frac);
            }
            return whole.parse::<f64>().ok().map(|w| w + frac);
        }
    }
    if let Some((num, den)) = token.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den == 0.0 {
            return None;
        }
        return Some(num / den);
    }
    token.parse().ok()
}
