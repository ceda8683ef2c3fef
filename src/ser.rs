use std::fmt;

use serde::ser::{self, Serialize, Serializer};

use crate::error::{Error, ErrorKind, Result};
use crate::output::CharWrite;
use crate::writer::Writer;

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Error {
        Error::new(ErrorKind::Serialize(msg.to_string()))
    }
}

/// Serialize `value` as the fields of the current record.
///
/// The record separator is not written; the caller closes the record.
pub(crate) fn serialize_fields<W: CharWrite, S: Serialize + ?Sized>(
    wtr: &mut Writer<W>,
    value: &S,
) -> Result<()> {
    value.serialize(&mut SeRecord { wtr })
}

/// Collect the header row `value` implies: the field names of a struct, or
/// `None` for anything without named members.
pub(crate) fn header_names<S: Serialize + ?Sized>(value: &S) -> Result<Option<Vec<&'static str>>> {
    let mut collector = SeHeader { names: Vec::new(), is_struct: false };
    value.serialize(&mut collector)?;
    if collector.is_struct {
        Ok(Some(collector.names))
    } else {
        Ok(None)
    }
}

struct SeRecord<'w, W: CharWrite> {
    wtr: &'w mut Writer<W>,
}

impl<'a, 'w, W: CharWrite> Serializer for &'a mut SeRecord<'w, W> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = ser::Impossible<(), Error>;
    type SerializeMap = ser::Impossible<(), Error>;
    type SerializeStruct = Self;
    type SerializeStructVariant = ser::Impossible<(), Error>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.wtr.write_field_value(&v)
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.wtr.write_field_value(&v)
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.wtr.write_field_value(&v)
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.wtr.write_field_value(&v)
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.wtr.write_field_value(&v)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.wtr.write_field_value(&v)
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.wtr.write_field_value(&v)
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.wtr.write_field_value(&v)
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.wtr.write_field_value(&v)
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.wtr.write_field_value(&v)
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.wtr.write_field_value(&v)
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.wtr.write_field_value(&v)
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.wtr.write_field(v)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<()> {
        Err(ser::Error::custom("serializing byte slices into CSV is not supported"))
    }

    fn serialize_none(self) -> Result<()> {
        self.wtr.write_field("")
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.wtr.write_field("")
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.wtr.write_field("")
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.wtr.write_field(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<()> {
        Err(ser::Error::custom("serializing enum newtype variants into CSV is not supported"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(ser::Error::custom("serializing enum tuple variants into CSV is not supported"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(ser::Error::custom("serializing maps into CSV rows is not supported"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(ser::Error::custom("serializing enum struct variants into CSV is not supported"))
    }
}

impl<'a, 'w, W: CharWrite> ser::SerializeSeq for &'a mut SeRecord<'w, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'w, W: CharWrite> ser::SerializeTuple for &'a mut SeRecord<'w, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'w, W: CharWrite> ser::SerializeTupleStruct for &'a mut SeRecord<'w, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, 'w, W: CharWrite> ser::SerializeStruct for &'a mut SeRecord<'w, W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _key: &'static str, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

/// A serializer that records struct field names instead of values.
struct SeHeader {
    names: Vec<&'static str>,
    is_struct: bool,
}

impl<'a> Serializer for &'a mut SeHeader {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _v: bool) -> Result<()> {
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Result<()> {
        Ok(())
    }

    fn serialize_i16(self, _v: i16) -> Result<()> {
        Ok(())
    }

    fn serialize_i32(self, _v: i32) -> Result<()> {
        Ok(())
    }

    fn serialize_i64(self, _v: i64) -> Result<()> {
        Ok(())
    }

    fn serialize_u8(self, _v: u8) -> Result<()> {
        Ok(())
    }

    fn serialize_u16(self, _v: u16) -> Result<()> {
        Ok(())
    }

    fn serialize_u32(self, _v: u32) -> Result<()> {
        Ok(())
    }

    fn serialize_u64(self, _v: u64) -> Result<()> {
        Ok(())
    }

    fn serialize_f32(self, _v: f32) -> Result<()> {
        Ok(())
    }

    fn serialize_f64(self, _v: f64) -> Result<()> {
        Ok(())
    }

    fn serialize_char(self, _v: char) -> Result<()> {
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Result<()> {
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<()> {
        Ok(())
    }

    fn serialize_none(self) -> Result<()> {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<()> {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<()> {
        Ok(())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(self)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        self.is_struct = true;
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(self)
    }
}

impl<'a> ser::SerializeSeq for &'a mut SeHeader {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeTuple for &'a mut SeHeader {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleStruct for &'a mut SeHeader {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeTupleVariant for &'a mut SeHeader {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeMap for &'a mut SeHeader {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, _key: &T) -> Result<()> {
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeStruct for &'a mut SeHeader {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, _value: &T) -> Result<()> {
        self.names.push(key);
        Ok(())
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a> ser::SerializeStructVariant for &'a mut SeHeader {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _key: &'static str, _value: &T) -> Result<()> {
        Ok(())
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::header_names;

    #[test]
    fn struct_field_names_become_headers() {
        #[derive(Serialize)]
        struct Row {
            id: u32,
            name: String,
        }

        let names = header_names(&Row { id: 1, name: "x".to_string() }).unwrap();
        assert_eq!(names, Some(vec!["id", "name"]));
    }

    #[test]
    fn tuples_have_no_headers() {
        let names = header_names(&(1, "x")).unwrap();
        assert_eq!(names, None);
    }
}
