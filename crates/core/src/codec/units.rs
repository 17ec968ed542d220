//! Unit-suffix and special-value tables.
//!
//! [`UNITS`] maps the SCPI suffix mnemonics (`MV`, `KHZ`, `MOHM`, ...) onto a
//! physical quantity and a multiplier into that quantity's base unit.
//! [`SPECIAL_NUMBERS`] is the default set of named numeric values accepted
//! wherever a number may be given (`MIN`, `MAX`, `DEF`, ...).

/// Physical quantity carried by a numeric parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
#[allow(missing_docs)]
pub enum Unit {
    /// No suffix was given.
    #[default]
    None,
    Volt,
    Amper,
    Ohm,
    Hertz,
    Celsius,
    Second,
    Meter,
    Gray,
    Becquerel,
    Mole,
    Degree,
    Grade,
    Radian,
    Revolution,
    Steradian,
    Sievert,
    Farad,
    Coulomb,
    Siemens,
    Electronvolt,
    Joule,
    Newton,
    Lux,
    Henry,
    AstronomicUnit,
    Inch,
    Foot,
    Parsec,
    Mile,
    NauticalMile,
    Lumen,
    Candela,
    Weber,
    Tesla,
    AtomicMass,
    Kilogram,
    Watt,
    Dbm,
    Atmosphere,
    InchOfMercury,
    MmOfMercury,
    Pascal,
    Torr,
    Bar,
    Decibel,
    /// Ratios such as `PCT` and `PPM`.
    Unitless,
    Fahrenheit,
    Kelvin,
    Day,
    Year,
    Stokes,
    Poise,
    Liter,
}

/// One suffix mnemonic and its conversion into the base unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitDef {
    /// Suffix text, upper case.
    pub name: &'static str,
    /// Quantity the suffix belongs to.
    pub unit: Unit,
    /// Factor that converts a value in this suffix into the base unit.
    pub mult: f64,
}

const fn def(name: &'static str, unit: Unit, mult: f64) -> UnitDef {
    UnitDef { name, unit, mult }
}

/// Every recognised unit suffix. Lookup is exact and case-insensitive, so
/// `MA` (milliampere) and `MAJ` (megajoule) never collide.
pub static UNITS: &[UnitDef] = &[
    // Ionizing radiation
    def("GY", Unit::Gray, 1.0),
    def("BQ", Unit::Becquerel, 1.0),
    def("MOL", Unit::Mole, 1.0),
    def("NSV", Unit::Sievert, 1e-9),
    def("USV", Unit::Sievert, 1e-6),
    def("MSV", Unit::Sievert, 1e-3),
    def("SV", Unit::Sievert, 1.0),
    def("KSV", Unit::Sievert, 1e3),
    def("MASV", Unit::Sievert, 1e6),
    // Energy and mass at atomic scale
    def("EV", Unit::Electronvolt, 1.0),
    def("KEV", Unit::Electronvolt, 1e3),
    def("MAEV", Unit::Electronvolt, 1e6),
    def("GEV", Unit::Electronvolt, 1e9),
    def("TEV", Unit::Electronvolt, 1e12),
    def("U", Unit::AtomicMass, 1.0),
    // Angles
    def("DEG", Unit::Degree, 1.0),
    def("GON", Unit::Grade, 1.0),
    def("MNT", Unit::Degree, 1.0 / 60.0),
    def("RAD", Unit::Radian, 1.0),
    def("SEC", Unit::Degree, 1.0 / 3600.0),
    def("REV", Unit::Revolution, 1.0),
    def("RS", Unit::Steradian, 1.0),
    // Electrical
    def("PF", Unit::Farad, 1e-12),
    def("NF", Unit::Farad, 1e-9),
    def("UF", Unit::Farad, 1e-6),
    def("MF", Unit::Farad, 1e-3),
    def("F", Unit::Farad, 1.0),
    def("UA", Unit::Amper, 1e-6),
    def("MA", Unit::Amper, 1e-3),
    def("A", Unit::Amper, 1.0),
    def("KA", Unit::Amper, 1e3),
    def("UV", Unit::Volt, 1e-6),
    def("MV", Unit::Volt, 1e-3),
    def("V", Unit::Volt, 1.0),
    def("KV", Unit::Volt, 1e3),
    def("OHM", Unit::Ohm, 1.0),
    def("KOHM", Unit::Ohm, 1e3),
    def("MOHM", Unit::Ohm, 1e6),
    def("UH", Unit::Henry, 1e-6),
    def("MH", Unit::Henry, 1e-3),
    def("H", Unit::Henry, 1.0),
    def("C", Unit::Coulomb, 1.0),
    def("USIE", Unit::Siemens, 1e-6),
    def("MSIE", Unit::Siemens, 1e-3),
    def("SIE", Unit::Siemens, 1.0),
    // Mechanical
    def("J", Unit::Joule, 1.0),
    def("KJ", Unit::Joule, 1e3),
    def("MAJ", Unit::Joule, 1e6),
    def("N", Unit::Newton, 1.0),
    def("KN", Unit::Newton, 1e3),
    def("ATM", Unit::Atmosphere, 1.0),
    def("INHG", Unit::InchOfMercury, 1.0),
    def("MMHG", Unit::MmOfMercury, 1.0),
    def("TORR", Unit::Torr, 1.0),
    def("BAR", Unit::Bar, 1.0),
    def("PAL", Unit::Pascal, 1.0),
    def("KPAL", Unit::Pascal, 1e3),
    def("MAPAL", Unit::Pascal, 1e6),
    def("ST", Unit::Stokes, 1.0),
    def("P", Unit::Poise, 1.0),
    def("L", Unit::Liter, 1.0),
    def("MG", Unit::Kilogram, 1e-6),
    def("G", Unit::Kilogram, 1e-3),
    def("KG", Unit::Kilogram, 1.0),
    def("TNE", Unit::Kilogram, 1000.0),
    // Frequency
    def("HZ", Unit::Hertz, 1.0),
    def("KHZ", Unit::Hertz, 1e3),
    def("MHZ", Unit::Hertz, 1e6),
    def("GHZ", Unit::Hertz, 1e9),
    // Length
    def("ASU", Unit::AstronomicUnit, 1.0),
    def("PRS", Unit::Parsec, 1.0),
    def("IN", Unit::Inch, 1.0),
    def("FT", Unit::Foot, 1.0),
    def("MI", Unit::Mile, 1.0),
    def("NAMI", Unit::NauticalMile, 1.0),
    def("NM", Unit::Meter, 1e-9),
    def("UM", Unit::Meter, 1e-6),
    def("MM", Unit::Meter, 1e-3),
    def("M", Unit::Meter, 1.0),
    def("KM", Unit::Meter, 1e3),
    // Light and magnetism
    def("LX", Unit::Lux, 1.0),
    def("LM", Unit::Lumen, 1.0),
    def("CD", Unit::Candela, 1.0),
    def("WB", Unit::Weber, 1.0),
    def("NT", Unit::Tesla, 1e-9),
    def("UT", Unit::Tesla, 1e-6),
    def("MT", Unit::Tesla, 1e-3),
    def("T", Unit::Tesla, 1.0),
    // Power and ratios
    def("W", Unit::Watt, 1.0),
    def("DBM", Unit::Dbm, 1.0),
    def("DBMW", Unit::Dbm, 1.0),
    def("DB", Unit::Decibel, 1.0),
    def("PCT", Unit::Unitless, 1e-2),
    def("PPM", Unit::Unitless, 1e-6),
    // Temperature
    def("CEL", Unit::Celsius, 1.0),
    def("FAR", Unit::Fahrenheit, 1.0),
    def("K", Unit::Kelvin, 1.0),
    // Time
    def("PS", Unit::Second, 1e-12),
    def("NS", Unit::Second, 1e-9),
    def("US", Unit::Second, 1e-6),
    def("MS", Unit::Second, 1e-3),
    def("S", Unit::Second, 1.0),
    def("MIN", Unit::Second, 60.0),
    def("HR", Unit::Second, 3600.0),
    def("D", Unit::Day, 1.0),
    def("ANN", Unit::Year, 1.0),
];

/// Find the table entry for a suffix, ignoring ASCII case.
pub fn lookup_unit(suffix: &[u8]) -> Option<&'static UnitDef> {
    UNITS
        .iter()
        .find(|d| d.name.as_bytes().eq_ignore_ascii_case(suffix))
}

/// Base-unit suffix for a quantity (the first entry with multiplier 1).
pub fn unit_name(unit: Unit) -> Option<&'static str> {
    UNITS
        .iter()
        .find(|d| d.unit == unit && d.mult == 1.0)
        .map(|d| d.name)
}

// ── Named values ────────────────────────────────────────────────────────

/// A `{name, tag}` pair for choice parameters and named numeric values.
///
/// `name` follows the mixed-case abbreviation convention: the upper-case
/// prefix is the short form, the full text is the long form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceDef {
    /// Mixed-case mnemonic, e.g. `"MINimum"`.
    pub name: &'static str,
    /// Value reported when the mnemonic is matched.
    pub tag: i32,
}

/// Tags of the default named numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
#[non_exhaustive]
#[allow(missing_docs)]
pub enum SpecialNumber {
    Minimum = 1,
    Maximum,
    Default,
    Up,
    Down,
    Nan,
    Infinity,
    NegativeInfinity,
    Auto,
}

impl SpecialNumber {
    /// Map a tag from [`SPECIAL_NUMBERS`] back onto the enum.
    pub fn from_tag(tag: i32) -> Option<Self> {
        Some(match tag {
            1 => Self::Minimum,
            2 => Self::Maximum,
            3 => Self::Default,
            4 => Self::Up,
            5 => Self::Down,
            6 => Self::Nan,
            7 => Self::Infinity,
            8 => Self::NegativeInfinity,
            9 => Self::Auto,
            _ => return None,
        })
    }
}

/// Default named numeric values.
pub static SPECIAL_NUMBERS: &[ChoiceDef] = &[
    ChoiceDef { name: "MINimum", tag: SpecialNumber::Minimum as i32 },
    ChoiceDef { name: "MAXimum", tag: SpecialNumber::Maximum as i32 },
    ChoiceDef { name: "DEFault", tag: SpecialNumber::Default as i32 },
    ChoiceDef { name: "UP", tag: SpecialNumber::Up as i32 },
    ChoiceDef { name: "DOWN", tag: SpecialNumber::Down as i32 },
    ChoiceDef { name: "NAN", tag: SpecialNumber::Nan as i32 },
    ChoiceDef { name: "INFinity", tag: SpecialNumber::Infinity as i32 },
    ChoiceDef { name: "NINF", tag: SpecialNumber::NegativeInfinity as i32 },
    ChoiceDef { name: "AUTO", tag: SpecialNumber::Auto as i32 },
];

/// Find the first tag whose mnemonic `text` abbreviates (any leading part
/// of the long form, in any case).
pub fn lookup_choice(table: &[ChoiceDef], text: &[u8]) -> Option<i32> {
    table
        .iter()
        .find(|c| crate::grammar::pattern::mnemonic_matches(c.name, text))
        .map(|c| c.tag)
}

/// Full mnemonic for a tag, if the table has one.
pub fn choice_name(table: &[ChoiceDef], tag: i32) -> Option<&'static str> {
    table.iter().find(|c| c.tag == tag).map(|c| c.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_and_exact() {
        assert_eq!(lookup_unit(b"mv").map(|d| d.mult), Some(1e-3));
        assert_eq!(lookup_unit(b"KHz").map(|d| d.unit), Some(Unit::Hertz));
        assert!(lookup_unit(b"MVV").is_none());
        assert!(lookup_unit(b"").is_none());
    }

    #[test]
    fn milli_and_mega_prefixes_do_not_collide() {
        assert_eq!(lookup_unit(b"MA").map(|d| (d.unit, d.mult)), Some((Unit::Amper, 1e-3)));
        assert_eq!(lookup_unit(b"MAJ").map(|d| (d.unit, d.mult)), Some((Unit::Joule, 1e6)));
        assert_eq!(lookup_unit(b"MOHM").map(|d| d.mult), Some(1e6));
    }

    #[test]
    fn base_unit_names() {
        assert_eq!(unit_name(Unit::Volt), Some("V"));
        assert_eq!(unit_name(Unit::Kilogram), Some("KG"));
        assert_eq!(unit_name(Unit::Dbm), Some("DBM"));
        assert_eq!(unit_name(Unit::None), None);
    }

    #[test]
    fn every_quantity_in_table_has_a_base_name() {
        for d in UNITS {
            if d.unit != Unit::Unitless {
                assert!(unit_name(d.unit).is_some(), "{:?} has no base entry", d.unit);
            }
        }
    }

    #[test]
    fn special_values_abbreviate() {
        assert_eq!(lookup_choice(SPECIAL_NUMBERS, b"min"), Some(SpecialNumber::Minimum as i32));
        assert_eq!(lookup_choice(SPECIAL_NUMBERS, b"MAXIMUM"), Some(SpecialNumber::Maximum as i32));
        assert_eq!(lookup_choice(SPECIAL_NUMBERS, b"def"), Some(SpecialNumber::Default as i32));
        assert_eq!(lookup_choice(SPECIAL_NUMBERS, b"inf"), Some(SpecialNumber::Infinity as i32));
        assert_eq!(lookup_choice(SPECIAL_NUMBERS, b"maxi"), None);
    }

    #[test]
    fn special_tag_round_trip() {
        for c in SPECIAL_NUMBERS {
            let s = SpecialNumber::from_tag(c.tag).unwrap();
            assert_eq!(s as i32, c.tag);
            assert_eq!(choice_name(SPECIAL_NUMBERS, c.tag), Some(c.name));
        }
        assert_eq!(SpecialNumber::from_tag(0), None);
    }
}
