use std::error::Error as StdError;
use std::fmt;

use csvflow_core::Row;
use serde::de::{
    DeserializeOwned, DeserializeSeed, Deserializer, Error as SerdeError, IntoDeserializer,
    Visitor,
};

use crate::convert::{ConvertError, Culture, FromField};
use crate::error::{Error, ErrorKind, Position};
use crate::options::Options;

use self::DeserializeErrorKind as DEK;

/// Deserialize the given row into a record.
///
/// When `headers` is present, struct access is presented as a map keyed by
/// header names, so fields resolve by name regardless of column order.
/// Without headers, access is positional.
pub(crate) fn deserialize_row<D: DeserializeOwned>(
    row: &Row,
    headers: Option<&[String]>,
    options: &Options,
) -> crate::error::Result<D> {
    let mut de = DeRow { row, headers, culture: &options.culture, field: 0 };
    D::deserialize(&mut de).map_err(|err| {
        let field = err.field().unwrap_or(0);
        Error::new(ErrorKind::Deserialize {
            pos: Position::new(row.row_index(), row.line_number(), field),
            err,
        })
    })
}

struct DeRow<'r> {
    row: &'r Row<'r>,
    headers: Option<&'r [String]>,
    culture: &'r Culture,
    field: usize,
}

impl<'r> DeRow<'r> {
    /// Returns an error corresponding to the most recently extracted field.
    fn error(&self, kind: DeserializeErrorKind) -> DeserializeError {
        DeserializeError {
            field: Some(self.field.saturating_sub(1) as u64),
            kind,
        }
    }

    /// Extracts the next field from the underlying row.
    fn next_field(&mut self) -> Result<&'r str, DeserializeError> {
        match self.row.get(self.field) {
            Some(field) => {
                self.field += 1;
                Ok(field)
            }
            None => Err(DeserializeError { field: None, kind: DEK::UnexpectedEndOfRow }),
        }
    }

    /// Peeks at the next field from the underlying row.
    fn peek_field(&self) -> Option<&'r str> {
        self.row.get(self.field)
    }

    /// Extracts and converts the next field.
    fn parse<T: FromField>(&mut self) -> Result<T, DeserializeError> {
        let field = self.next_field()?;
        T::from_field(field, self.culture).map_err(|err| self.error(DEK::Convert(err)))
    }
}

macro_rules! deserialize_converted {
    ($method:ident, $visit:ident, $ty:ty) => {
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
            let value: $ty = self.parse()?;
            visitor.$visit(value)
        }
    };
}

impl<'de, 'a, 'r: 'de> Deserializer<'de> for &'a mut DeRow<'r> {
    type Error = DeserializeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let field = self.next_field()?;
        if field == "true" {
            visitor.visit_bool(true)
        } else if field == "false" {
            visitor.visit_bool(false)
        } else if let Ok(n) = field.parse::<u64>() {
            visitor.visit_u64(n)
        } else if let Ok(n) = field.parse::<i64>() {
            visitor.visit_i64(n)
        } else if let Ok(n) = field.parse::<f64>() {
            visitor.visit_f64(n)
        } else {
            visitor.visit_str(field)
        }
    }

    deserialize_converted!(deserialize_bool, visit_bool, bool);
    deserialize_converted!(deserialize_i8, visit_i8, i8);
    deserialize_converted!(deserialize_i16, visit_i16, i16);
    deserialize_converted!(deserialize_i32, visit_i32, i32);
    deserialize_converted!(deserialize_i64, visit_i64, i64);
    deserialize_converted!(deserialize_u8, visit_u8, u8);
    deserialize_converted!(deserialize_u16, visit_u16, u16);
    deserialize_converted!(deserialize_u32, visit_u32, u32);
    deserialize_converted!(deserialize_u64, visit_u64, u64);
    deserialize_converted!(deserialize_f32, visit_f32, f32);
    deserialize_converted!(deserialize_f64, visit_f64, f64);
    deserialize_converted!(deserialize_char, visit_char, char);

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let field = self.next_field()?;
        visitor.visit_str(field)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let field = self.next_field()?;
        visitor.visit_bytes(field.as_bytes())
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let field = self.next_field()?;
        visitor.visit_byte_buf(field.as_bytes().to_vec())
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.peek_field() {
            None => visitor.visit_none(),
            Some(field) if field.is_empty() => {
                self.field += 1;
                visitor.visit_none()
            }
            Some(_) => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_seq(self)
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_seq(self)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_seq(self)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        if self.headers.is_none() {
            visitor.visit_seq(self)
        } else {
            visitor.visit_map(self)
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        if self.headers.is_none() {
            visitor.visit_seq(self)
        } else {
            visitor.visit_map(self)
        }
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        let field = self.next_field()?;
        // Variant names match case-insensitively; hand serde the canonical
        // spelling so the derived impl recognizes it.
        let variant = variants
            .iter()
            .copied()
            .find(|v| v.eq_ignore_ascii_case(field))
            .unwrap_or(field);
        visitor.visit_enum(variant.into_deserializer())
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(self.error(DEK::Unsupported("deserialize_identifier".to_string())))
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        // Read and drop the next field. This is reached, e.g., for a header
        // column that doesn't exist in the destination struct.
        let _ = self.next_field()?;
        visitor.visit_unit()
    }
}

impl<'de, 'a, 'r: 'de> serde::de::SeqAccess<'de> for &'a mut DeRow<'r> {
    type Error = DeserializeError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Self::Error> {
        if self.peek_field().is_none() {
            Ok(None)
        } else {
            seed.deserialize(&mut **self).map(Some)
        }
    }
}

impl<'de, 'a, 'r: 'de> serde::de::MapAccess<'de> for &'a mut DeRow<'r> {
    type Error = DeserializeError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        let headers = match self.headers {
            Some(headers) => headers,
            None => return Ok(None),
        };
        // Keys and values advance in lockstep; the map ends when either the
        // headers or the row run out.
        if self.field >= headers.len() || self.peek_field().is_none() {
            return Ok(None);
        }
        let name = headers[self.field].as_str();
        seed.deserialize(name.into_deserializer()).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(
        &mut self,
        seed: V,
    ) -> Result<V::Value, Self::Error> {
        seed.deserialize(&mut **self)
    }
}

/// An error that occurred while deserializing a row into a record.
#[derive(Clone, Debug, PartialEq)]
pub struct DeserializeError {
    field: Option<u64>,
    kind: DeserializeErrorKind,
}

/// The specific kind of a deserialization error.
#[derive(Clone, Debug, PartialEq)]
pub enum DeserializeErrorKind {
    /// A catch-all for deserialization errors reported by serde.
    Message(String),
    /// A deserializer method this format cannot support.
    Unsupported(String),
    /// A field was requested past the end of the row.
    UnexpectedEndOfRow,
    /// A field could not be converted to the requested type.
    Convert(ConvertError),
}

impl DeserializeError {
    /// Return the field index (starting at 0) of this error, if available.
    pub fn field(&self) -> Option<u64> {
        self.field
    }

    /// Return the underlying error kind.
    pub fn kind(&self) -> &DeserializeErrorKind {
        &self.kind
    }
}

impl SerdeError for DeserializeError {
    fn custom<T: fmt::Display>(msg: T) -> DeserializeError {
        DeserializeError { field: None, kind: DEK::Message(msg.to_string()) }
    }
}

impl StdError for DeserializeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self.kind {
            DEK::Convert(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(field) = self.field {
            write!(f, "field {}: {}", field, self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

impl fmt::Display for DeserializeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DEK::Message(ref msg) => write!(f, "{}", msg),
            DEK::Unsupported(ref which) => {
                write!(f, "unsupported deserializer method: {}", which)
            }
            DEK::UnexpectedEndOfRow => write!(f, "expected field, but got end of row"),
            DEK::Convert(ref err) => err.fmt(f),
        }
    }
}
