//! Field-level value conversion.
//!
//! [`FromField`] and [`ToField`] are the crate's conversion registry: an
//! open, statically dispatched set of types that can be parsed from and
//! formatted into single CSV fields. Parsing is culture-aware: grouped
//! digits are accepted and the configured decimal separator is honored.
//! An empty field maps to `None` for `Option` targets.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::{self, Write as _};

use arrayvec::ArrayString;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

/// The number formatting conventions used when parsing and formatting
/// fields.
///
/// Only the pieces that matter to delimited text are modeled: the decimal
/// separator and the digit grouping separator. Parsing accepts grouped
/// digits; formatting never emits groups.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Culture {
    decimal_separator: char,
    group_separator: char,
}

impl Culture {
    /// The invariant culture: `.` decimal separator, `,` grouping.
    pub const fn invariant() -> Culture {
        Culture { decimal_separator: '.', group_separator: ',' }
    }

    /// A culture with explicit separators.
    pub const fn new(decimal_separator: char, group_separator: char) -> Culture {
        Culture { decimal_separator, group_separator }
    }

    /// Look up a culture by its IETF-style tag.
    ///
    /// Only the conventions are looked up, so tags with the same separators
    /// map to the same culture. Unknown tags return `None`.
    pub fn for_tag(tag: &str) -> Option<Culture> {
        match tag {
            "" | "C" | "en-US" | "en-GB" | "en-AU" | "ja-JP" | "ko-KR" | "zh-CN" => {
                Some(Culture::invariant())
            }
            "de-DE" | "de-AT" | "es-ES" | "it-IT" | "nl-NL" | "pt-BR" => {
                Some(Culture::new(',', '.'))
            }
            "fr-FR" | "sv-SE" | "nb-NO" | "fi-FI" | "cs-CZ" | "pl-PL" => {
                Some(Culture::new(',', '\u{a0}'))
            }
            "de-CH" | "fr-CH" | "it-CH" => Some(Culture::new('.', '\u{2019}')),
            _ => None,
        }
    }

    /// The decimal separator.
    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    /// The digit grouping separator.
    pub fn group_separator(&self) -> char {
        self.group_separator
    }

    /// Normalize a culture-formatted number into the form `str::parse`
    /// accepts: grouping stripped, decimal separator mapped to `.`.
    fn normalize<'a>(&self, field: &'a str) -> Cow<'a, str> {
        let plain = self.decimal_separator == '.' || !field.contains(self.decimal_separator);
        if plain && !field.contains(self.group_separator) {
            return Cow::Borrowed(field);
        }
        let mut cleaned = String::with_capacity(field.len());
        for ch in field.chars() {
            if ch == self.group_separator {
                continue;
            }
            cleaned.push(if ch == self.decimal_separator { '.' } else { ch });
        }
        Cow::Owned(cleaned)
    }
}

impl Default for Culture {
    fn default() -> Culture {
        Culture::invariant()
    }
}

/// An error produced when a field cannot be converted to a value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConvertError {
    target: &'static str,
    message: String,
}

impl ConvertError {
    /// Create a conversion error for the named target type.
    pub fn new(target: &'static str, message: impl Into<String>) -> ConvertError {
        ConvertError { target, message: message.into() }
    }

    /// The name of the type the conversion was aiming for.
    pub fn target(&self) -> &'static str {
        self.target
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "cannot convert to {}: {}", self.target, self.message)
    }
}

impl StdError for ConvertError {}

/// Types that can be parsed from a single CSV field.
///
/// This is the conversion registry of the crate, expressed as a trait so the
/// set of convertible types is open and dispatch is static. An empty field
/// maps to `None` for `Option<T>` targets.
pub trait FromField: Sized {
    /// Parse a value from the raw field contents.
    fn from_field(field: &str, culture: &Culture) -> Result<Self, ConvertError>;
}

/// Types that can be formatted into a single CSV field.
///
/// Implementations write directly into the destination; the writer hands in
/// a stack buffer first and falls back to a pooled heap buffer when a value
/// overflows it. `None` values write nothing, which emits an empty field.
pub trait ToField {
    /// Format this value into `dst`.
    fn format_field(&self, dst: &mut dyn fmt::Write, culture: &Culture) -> fmt::Result;

    /// Format this value into an owned string.
    fn to_field(&self, culture: &Culture) -> String {
        let mut out = String::new();
        self.format_field(&mut out, culture)
            .expect("formatting into a String never fails");
        out
    }
}

impl FromField for String {
    fn from_field(field: &str, _culture: &Culture) -> Result<String, ConvertError> {
        Ok(field.to_string())
    }
}

impl FromField for bool {
    fn from_field(field: &str, _culture: &Culture) -> Result<bool, ConvertError> {
        // `1`/`0` are accepted unconditionally, independent of culture.
        if field.eq_ignore_ascii_case("true") || field == "1" {
            Ok(true)
        } else if field.eq_ignore_ascii_case("false") || field == "0" {
            Ok(false)
        } else {
            Err(ConvertError::new("bool", format!("unrecognized value {:?}", field)))
        }
    }
}

impl FromField for char {
    fn from_field(field: &str, _culture: &Culture) -> Result<char, ConvertError> {
        let mut chars = field.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(ch),
            _ => Err(ConvertError::new(
                "char",
                format!("expected exactly one character, got {:?}", field),
            )),
        }
    }
}

macro_rules! from_field_number {
    ($($ty:ty),*) => {
        $(
            impl FromField for $ty {
                fn from_field(field: &str, culture: &Culture) -> Result<$ty, ConvertError> {
                    culture
                        .normalize(field)
                        .parse()
                        .map_err(|err| ConvertError::new(
                            stringify!($ty),
                            format!("{} in {:?}", err, field),
                        ))
                }
            }
        )*
    };
}

from_field_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl FromField for NaiveDate {
    fn from_field(field: &str, _culture: &Culture) -> Result<NaiveDate, ConvertError> {
        field
            .parse()
            .map_err(|err| ConvertError::new("date", format!("{} in {:?}", err, field)))
    }
}

impl FromField for NaiveTime {
    fn from_field(field: &str, _culture: &Culture) -> Result<NaiveTime, ConvertError> {
        field
            .parse()
            .map_err(|err| ConvertError::new("time", format!("{} in {:?}", err, field)))
    }
}

impl FromField for NaiveDateTime {
    fn from_field(field: &str, _culture: &Culture) -> Result<NaiveDateTime, ConvertError> {
        // ISO-8601 with a `T`, or the common space-separated variant.
        field
            .parse()
            .or_else(|_| NaiveDateTime::parse_from_str(field, "%Y-%m-%d %H:%M:%S%.f"))
            .map_err(|err| ConvertError::new("datetime", format!("{} in {:?}", err, field)))
    }
}

impl FromField for DateTime<FixedOffset> {
    fn from_field(field: &str, _culture: &Culture) -> Result<DateTime<FixedOffset>, ConvertError> {
        DateTime::parse_from_rfc3339(field)
            .map_err(|err| ConvertError::new("datetime", format!("{} in {:?}", err, field)))
    }
}

impl FromField for Uuid {
    fn from_field(field: &str, _culture: &Culture) -> Result<Uuid, ConvertError> {
        Uuid::parse_str(field)
            .map_err(|err| ConvertError::new("uuid", format!("{} in {:?}", err, field)))
    }
}

impl<T: FromField> FromField for Option<T> {
    fn from_field(field: &str, culture: &Culture) -> Result<Option<T>, ConvertError> {
        if field.is_empty() {
            Ok(None)
        } else {
            T::from_field(field, culture).map(Some)
        }
    }
}

impl ToField for str {
    fn format_field(&self, dst: &mut dyn fmt::Write, _culture: &Culture) -> fmt::Result {
        dst.write_str(self)
    }
}

impl ToField for String {
    fn format_field(&self, dst: &mut dyn fmt::Write, culture: &Culture) -> fmt::Result {
        self.as_str().format_field(dst, culture)
    }
}

impl ToField for bool {
    fn format_field(&self, dst: &mut dyn fmt::Write, _culture: &Culture) -> fmt::Result {
        dst.write_str(if *self { "true" } else { "false" })
    }
}

impl ToField for char {
    fn format_field(&self, dst: &mut dyn fmt::Write, _culture: &Culture) -> fmt::Result {
        dst.write_char(*self)
    }
}

macro_rules! to_field_int {
    ($($ty:ty),*) => {
        $(
            impl ToField for $ty {
                fn format_field(&self, dst: &mut dyn fmt::Write, _culture: &Culture) -> fmt::Result {
                    write!(dst, "{}", self)
                }
            }
        )*
    };
}

to_field_int!(i8, i16, i32, i64, u8, u16, u32, u64);

macro_rules! to_field_float {
    ($($ty:ty),*) => {
        $(
            impl ToField for $ty {
                fn format_field(&self, dst: &mut dyn fmt::Write, culture: &Culture) -> fmt::Result {
                    let mut tmp = ArrayString::<40>::new();
                    write!(tmp, "{}", self)?;
                    if culture.decimal_separator() == '.' {
                        return dst.write_str(&tmp);
                    }
                    for ch in tmp.chars() {
                        dst.write_char(if ch == '.' {
                            culture.decimal_separator()
                        } else {
                            ch
                        })?;
                    }
                    Ok(())
                }
            }
        )*
    };
}

to_field_float!(f32, f64);

impl ToField for NaiveDate {
    fn format_field(&self, dst: &mut dyn fmt::Write, _culture: &Culture) -> fmt::Result {
        write!(dst, "{}", self)
    }
}

impl ToField for NaiveTime {
    fn format_field(&self, dst: &mut dyn fmt::Write, _culture: &Culture) -> fmt::Result {
        write!(dst, "{}", self)
    }
}

impl ToField for NaiveDateTime {
    fn format_field(&self, dst: &mut dyn fmt::Write, _culture: &Culture) -> fmt::Result {
        write!(dst, "{}", self.format("%Y-%m-%dT%H:%M:%S%.f"))
    }
}

impl ToField for DateTime<FixedOffset> {
    fn format_field(&self, dst: &mut dyn fmt::Write, _culture: &Culture) -> fmt::Result {
        dst.write_str(&self.to_rfc3339())
    }
}

impl ToField for Uuid {
    fn format_field(&self, dst: &mut dyn fmt::Write, _culture: &Culture) -> fmt::Result {
        write!(dst, "{}", self)
    }
}

impl<T: ToField> ToField for Option<T> {
    fn format_field(&self, dst: &mut dyn fmt::Write, culture: &Culture) -> fmt::Result {
        match *self {
            Some(ref value) => value.format_field(dst, culture),
            None => Ok(()),
        }
    }
}

impl<'a, T: ToField + ?Sized> ToField for &'a T {
    fn format_field(&self, dst: &mut dyn fmt::Write, culture: &Culture) -> fmt::Result {
        (**self).format_field(dst, culture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INV: Culture = Culture::invariant();

    #[test]
    fn bool_accepts_case_insensitive_names_and_digits() {
        assert_eq!(bool::from_field("TRUE", &INV), Ok(true));
        assert_eq!(bool::from_field("False", &INV), Ok(false));
        assert_eq!(bool::from_field("1", &INV), Ok(true));
        assert_eq!(bool::from_field("0", &INV), Ok(false));
        assert!(bool::from_field("yes", &INV).is_err());
    }

    #[test]
    fn integers_accept_group_separators() {
        assert_eq!(i64::from_field("1,234,567", &INV), Ok(1_234_567));
        assert_eq!(u32::from_field("42", &INV), Ok(42));
        assert!(i8::from_field("1000", &INV).is_err());
    }

    #[test]
    fn floats_honor_the_culture_decimal_separator() {
        let de = Culture::for_tag("de-DE").unwrap();
        assert_eq!(f64::from_field("1.234,5", &de), Ok(1234.5));
        assert_eq!(f64::from_field("3.25", &INV), Ok(3.25));

        assert_eq!((1234.5f64).to_field(&de), "1234,5");
        assert_eq!((3.25f64).to_field(&INV), "3.25");
    }

    #[test]
    fn empty_field_is_none_for_options() {
        assert_eq!(Option::<i32>::from_field("", &INV), Ok(None));
        assert_eq!(Option::<i32>::from_field("7", &INV), Ok(Some(7)));
        assert!(Option::<i32>::from_field("x", &INV).is_err());
    }

    #[test]
    fn char_requires_exactly_one_character() {
        assert_eq!(char::from_field("ß", &INV), Ok('ß'));
        assert!(char::from_field("", &INV).is_err());
        assert!(char::from_field("ab", &INV).is_err());
    }

    #[test]
    fn datetime_accepts_t_and_space_separators() {
        let a = NaiveDateTime::from_field("2024-02-29T08:30:00", &INV).unwrap();
        let b = NaiveDateTime::from_field("2024-02-29 08:30:00", &INV).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn date_and_uuid_round_trip() {
        let date = NaiveDate::from_field("2021-12-01", &INV).unwrap();
        assert_eq!(date.to_field(&INV), "2021-12-01");

        let id = Uuid::from_field("67e55044-10b1-426f-9247-bb680e5fe0c8", &INV).unwrap();
        assert_eq!(id.to_field(&INV), "67e55044-10b1-426f-9247-bb680e5fe0c8");
    }

    #[test]
    fn unknown_culture_tag_is_none() {
        assert!(Culture::for_tag("tlh-QO").is_none());
        assert_eq!(Culture::for_tag(""), Some(Culture::invariant()));
    }
}
