//! Tagged-variant values for dynamically-typed callers.
//!
//! The reflection-driven layer upstream hands the codec values whose static
//! type is unknown until run time. Rather than threading dynamic casts
//! through every primitive path, such a value arrives as a [`Value`], is
//! converted once to the declared wire type with [`Value::coerce`], and then
//! flows through the same strongly-typed codec as everything else.

use crate::{
    buffer::{ReadBuffer, WriteBuffer},
    codec::{Codec, NULL_MARKER, PRESENT_MARKER},
    error::Error,
    types::text::Utf16Char,
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Names one wire type, as declared by the metadata layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    Decimal,
    Char,
    Text,
    Timestamp,
    OffsetTimestamp,
    Duration,
    Date,
    Time,
    Uuid,
}

impl Kind {
    pub const fn name(&self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::U8 => "u8",
            Kind::I8 => "i8",
            Kind::U16 => "u16",
            Kind::I16 => "i16",
            Kind::U32 => "u32",
            Kind::I32 => "i32",
            Kind::U64 => "u64",
            Kind::I64 => "i64",
            Kind::F32 => "f32",
            Kind::F64 => "f64",
            Kind::Decimal => "decimal",
            Kind::Char => "char",
            Kind::Text => "text",
            Kind::Timestamp => "timestamp",
            Kind::OffsetTimestamp => "offset timestamp",
            Kind::Duration => "duration",
            Kind::Date => "date",
            Kind::Time => "time",
            Kind::Uuid => "uuid",
        }
    }

    /// The encoded width, or `None` for the variable-width text kind.
    pub const fn width(&self) -> Option<usize> {
        match self {
            Kind::Bool | Kind::U8 | Kind::I8 => Some(1),
            Kind::U16 | Kind::I16 | Kind::Char => Some(2),
            Kind::U32 | Kind::I32 | Kind::F32 | Kind::Date => Some(4),
            Kind::U64 | Kind::I64 | Kind::F64 | Kind::Timestamp | Kind::Duration | Kind::Time => {
                Some(8)
            }
            Kind::OffsetTimestamp => Some(10),
            Kind::Decimal | Kind::Uuid => Some(16),
            Kind::Text => None,
        }
    }
}

/// One value of any supported wire type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Char(Utf16Char),
    Text(String),
    Timestamp(NaiveDateTime),
    OffsetTimestamp(DateTime<FixedOffset>),
    Duration(TimeDelta),
    Date(NaiveDate),
    Time(NaiveTime),
    Uuid(Uuid),
}

macro_rules! impl_from_value {
    ($variant:ident, $type:ty) => {
        impl From<$type> for Value {
            fn from(value: $type) -> Self {
                Value::$variant(value)
            }
        }
    };
}

impl_from_value!(Bool, bool);
impl_from_value!(U8, u8);
impl_from_value!(I8, i8);
impl_from_value!(U16, u16);
impl_from_value!(I16, i16);
impl_from_value!(U32, u32);
impl_from_value!(I32, i32);
impl_from_value!(U64, u64);
impl_from_value!(I64, i64);
impl_from_value!(F32, f32);
impl_from_value!(F64, f64);
impl_from_value!(Decimal, Decimal);
impl_from_value!(Char, Utf16Char);
impl_from_value!(Text, String);
impl_from_value!(Timestamp, NaiveDateTime);
impl_from_value!(OffsetTimestamp, DateTime<FixedOffset>);
impl_from_value!(Duration, TimeDelta);
impl_from_value!(Date, NaiveDate);
impl_from_value!(Time, NaiveTime);
impl_from_value!(Uuid, Uuid);

impl Value {
    pub const fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::U8(_) => Kind::U8,
            Value::I8(_) => Kind::I8,
            Value::U16(_) => Kind::U16,
            Value::I16(_) => Kind::I16,
            Value::U32(_) => Kind::U32,
            Value::I32(_) => Kind::I32,
            Value::U64(_) => Kind::U64,
            Value::I64(_) => Kind::I64,
            Value::F32(_) => Kind::F32,
            Value::F64(_) => Kind::F64,
            Value::Decimal(_) => Kind::Decimal,
            Value::Char(_) => Kind::Char,
            Value::Text(_) => Kind::Text,
            Value::Timestamp(_) => Kind::Timestamp,
            Value::OffsetTimestamp(_) => Kind::OffsetTimestamp,
            Value::Duration(_) => Kind::Duration,
            Value::Date(_) => Kind::Date,
            Value::Time(_) => Kind::Time,
            Value::Uuid(_) => Kind::Uuid,
        }
    }

    /// The exact number of encoded bytes this value produces.
    pub fn size(&self) -> usize {
        match self {
            Value::Bool(v) => v.size(),
            Value::U8(v) => v.size(),
            Value::I8(v) => v.size(),
            Value::U16(v) => v.size(),
            Value::I16(v) => v.size(),
            Value::U32(v) => v.size(),
            Value::I32(v) => v.size(),
            Value::U64(v) => v.size(),
            Value::I64(v) => v.size(),
            Value::F32(v) => v.size(),
            Value::F64(v) => v.size(),
            Value::Decimal(v) => v.size(),
            Value::Char(v) => v.size(),
            Value::Text(v) => v.size(),
            Value::Timestamp(v) => v.size(),
            Value::OffsetTimestamp(v) => v.size(),
            Value::Duration(v) => v.size(),
            Value::Date(v) => v.size(),
            Value::Time(v) => v.size(),
            Value::Uuid(v) => v.size(),
        }
    }

    /// Converts this value to the declared wire kind: identity, checked
    /// integer narrowing/widening, float width changes, or char/u16
    /// reinterpretation. Anything else is [`Error::Cast`].
    pub fn coerce(self, kind: Kind) -> Result<Value, Error> {
        if self.kind() == kind {
            return Ok(self);
        }
        let mismatch = Error::Cast {
            from: self.kind().name(),
            to: kind.name(),
        };
        if let Some(n) = self.as_integer() {
            return Self::from_integer(n, kind).ok_or(mismatch);
        }
        match (self, kind) {
            (Value::F32(v), Kind::F64) => Ok(Value::F64(v as f64)),
            (Value::F64(v), Kind::F32) => Ok(Value::F32(v as f32)),
            _ => Err(mismatch),
        }
    }

    // The numeric reading of integer-family variants.
    fn as_integer(&self) -> Option<i128> {
        match self {
            Value::U8(v) => Some(*v as i128),
            Value::I8(v) => Some(*v as i128),
            Value::U16(v) => Some(*v as i128),
            Value::I16(v) => Some(*v as i128),
            Value::U32(v) => Some(*v as i128),
            Value::I32(v) => Some(*v as i128),
            Value::U64(v) => Some(*v as i128),
            Value::I64(v) => Some(*v as i128),
            Value::Char(v) => Some(u16::from(*v) as i128),
            _ => None,
        }
    }

    fn from_integer(n: i128, kind: Kind) -> Option<Value> {
        match kind {
            Kind::U8 => u8::try_from(n).ok().map(Value::U8),
            Kind::I8 => i8::try_from(n).ok().map(Value::I8),
            Kind::U16 => u16::try_from(n).ok().map(Value::U16),
            Kind::I16 => i16::try_from(n).ok().map(Value::I16),
            Kind::U32 => u32::try_from(n).ok().map(Value::U32),
            Kind::I32 => i32::try_from(n).ok().map(Value::I32),
            Kind::U64 => u64::try_from(n).ok().map(Value::U64),
            Kind::I64 => i64::try_from(n).ok().map(Value::I64),
            Kind::Char => u16::try_from(n).ok().map(|unit| Value::Char(unit.into())),
            Kind::F32 => Some(Value::F32(n as f32)),
            Kind::F64 => Some(Value::F64(n as f64)),
            _ => None,
        }
    }
}

impl ReadBuffer {
    /// Decodes one bare scalar of a kind chosen at run time.
    pub fn read_value(&mut self, kind: Kind) -> Result<Value, Error> {
        if self.tripped() {
            let required = self.measure_kind(kind, self.position())?;
            return Err(Error::Incomplete { required });
        }
        self.decode_value(kind)
    }

    /// Decodes one nullable scalar of a kind chosen at run time. Sentinel
    /// semantics match [`ReadBuffer::read_nullable`].
    pub fn read_nullable_value(
        &mut self,
        kind: Kind,
        null_flags: bool,
    ) -> Result<Option<Value>, Error> {
        if self.tripped() {
            let required = if null_flags {
                self.measure_nullable_kind(kind, self.position())?
            } else {
                self.measure_kind(kind, self.position())?
            };
            return Err(Error::Incomplete { required });
        }
        if !null_flags {
            return self.decode_value(kind).map(Some);
        }
        let total = self.measure_nullable_kind(kind, self.position())?;
        self.require(total)?;
        let start = self.position();
        let marker = self.peek(1)?[0];
        self.advance(1);
        if marker == NULL_MARKER {
            return Ok(None);
        }
        match self.decode_value(kind) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                self.rewind(start);
                Err(err.deepen(1))
            }
        }
    }

    /// Decodes `count` elements of a kind chosen at run time, with the same
    /// one-shot bounds check as [`ReadBuffer::read_array`].
    pub fn read_value_array(&mut self, kind: Kind, count: usize) -> Result<Vec<Value>, Error> {
        let total = match kind.width() {
            Some(width) => width
                .checked_mul(count)
                .expect("collection size overflows usize"),
            None => {
                let mut total = 0usize;
                for _ in 0..count {
                    total += self
                        .measure_kind(kind, self.position() + total)
                        .map_err(|err| err.deepen(total))?;
                }
                total
            }
        };
        self.require(total)?;
        let start = self.position();
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            match self.decode_value(kind) {
                Ok(value) => items.push(value),
                Err(err) => {
                    let consumed = self.position() - start;
                    self.rewind(start);
                    return Err(err.deepen(consumed));
                }
            }
        }
        Ok(items)
    }

    fn decode_value(&mut self, kind: Kind) -> Result<Value, Error> {
        Ok(match kind {
            Kind::Bool => Value::Bool(bool::read(self)?),
            Kind::U8 => Value::U8(u8::read(self)?),
            Kind::I8 => Value::I8(i8::read(self)?),
            Kind::U16 => Value::U16(u16::read(self)?),
            Kind::I16 => Value::I16(i16::read(self)?),
            Kind::U32 => Value::U32(u32::read(self)?),
            Kind::I32 => Value::I32(i32::read(self)?),
            Kind::U64 => Value::U64(u64::read(self)?),
            Kind::I64 => Value::I64(i64::read(self)?),
            Kind::F32 => Value::F32(f32::read(self)?),
            Kind::F64 => Value::F64(f64::read(self)?),
            Kind::Decimal => Value::Decimal(Decimal::read(self)?),
            Kind::Char => Value::Char(Utf16Char::read(self)?),
            Kind::Text => Value::Text(String::read(self)?),
            Kind::Timestamp => Value::Timestamp(NaiveDateTime::read(self)?),
            Kind::OffsetTimestamp => Value::OffsetTimestamp(DateTime::<FixedOffset>::read(self)?),
            Kind::Duration => Value::Duration(TimeDelta::read(self)?),
            Kind::Date => Value::Date(NaiveDate::read(self)?),
            Kind::Time => Value::Time(NaiveTime::read(self)?),
            Kind::Uuid => Value::Uuid(Uuid::read(self)?),
        })
    }

    fn measure_kind(&self, kind: Kind, at: usize) -> Result<usize, Error> {
        match kind.width() {
            Some(width) => Ok(width),
            None => String::measure(self, at),
        }
    }

    fn measure_nullable_kind(&self, kind: Kind, at: usize) -> Result<usize, Error> {
        let Some(marker) = self.byte_at(at) else {
            return Err(Error::Incomplete { required: 1 });
        };
        if marker == NULL_MARKER {
            return Ok(1);
        }
        match self.measure_kind(kind, at + 1) {
            Ok(width) => Ok(1 + width),
            Err(err) => Err(err.deepen(1)),
        }
    }
}

impl WriteBuffer<'_> {
    /// Encodes one bare scalar held as a [`Value`].
    pub fn write_value(&mut self, value: &Value) -> Result<(), Error> {
        self.ensure(value.size())?;
        self.emit_value(value);
        Ok(())
    }

    /// Converts `value` to the declared wire kind, then encodes it.
    pub fn write_cast(&mut self, value: Value, kind: Kind) -> Result<(), Error> {
        self.write_value(&value.coerce(kind)?)
    }

    /// Encodes one nullable scalar held as a [`Value`]. Sentinel semantics
    /// match [`WriteBuffer::write_nullable`].
    pub fn write_nullable_value(
        &mut self,
        value: Option<&Value>,
        null_flags: bool,
    ) -> Result<(), Error> {
        if !null_flags {
            return match value {
                Some(inner) => self.write_value(inner),
                None => Ok(()),
            };
        }
        let total = 1 + value.map(Value::size).unwrap_or(0);
        self.ensure(total)?;
        match value {
            Some(inner) => {
                self.claim(1)[0] = PRESENT_MARKER;
                self.emit_value(inner);
            }
            None => self.claim(1)[0] = NULL_MARKER,
        }
        Ok(())
    }

    /// Converts each element of a run-time-typed sequence to the declared
    /// element kind, then encodes the run under one capacity check.
    pub fn write_value_array(&mut self, values: &[Value], kind: Kind) -> Result<(), Error> {
        let coerced = values
            .iter()
            .map(|value| value.clone().coerce(kind))
            .collect::<Result<Vec<_>, _>>()?;
        let total: usize = coerced.iter().map(Value::size).sum();
        self.ensure(total)?;
        for value in &coerced {
            self.emit_value(value);
        }
        Ok(())
    }

    fn emit_value(&mut self, value: &Value) {
        match value {
            Value::Bool(v) => v.write(self),
            Value::U8(v) => v.write(self),
            Value::I8(v) => v.write(self),
            Value::U16(v) => v.write(self),
            Value::I16(v) => v.write(self),
            Value::U32(v) => v.write(self),
            Value::I32(v) => v.write(self),
            Value::U64(v) => v.write(self),
            Value::I64(v) => v.write(self),
            Value::F32(v) => v.write(self),
            Value::F64(v) => v.write(self),
            Value::Decimal(v) => v.write(self),
            Value::Char(v) => v.write(self),
            Value::Text(v) => v.write(self),
            Value::Timestamp(v) => v.write(self),
            Value::OffsetTimestamp(v) => v.write(self),
            Value::Duration(v) => v.write(self),
            Value::Date(v) => v.write(self),
            Value::Time(v) => v.write(self),
            Value::Uuid(v) => v.write(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BufferPool;
    use bytes::Bytes;

    #[test]
    fn test_coerce_identity_and_narrowing() {
        assert_eq!(
            Value::U64(300).coerce(Kind::U16).unwrap(),
            Value::U16(300)
        );
        assert_eq!(Value::I32(-5).coerce(Kind::I64).unwrap(), Value::I64(-5));
        assert_eq!(
            Value::Text("x".into()).coerce(Kind::Text).unwrap(),
            Value::Text("x".into())
        );
        assert_eq!(
            Value::U16(0x41).coerce(Kind::Char).unwrap(),
            Value::Char(Utf16Char(0x41))
        );
        assert_eq!(
            Value::I32(7).coerce(Kind::F64).unwrap(),
            Value::F64(7.0)
        );
    }

    #[test]
    fn test_coerce_rejects_lossy_and_unrelated() {
        assert_eq!(
            Value::U64(70_000).coerce(Kind::U16),
            Err(Error::Cast {
                from: "u64",
                to: "u16"
            })
        );
        assert_eq!(
            Value::I8(-1).coerce(Kind::U8),
            Err(Error::Cast {
                from: "i8",
                to: "u8"
            })
        );
        assert_eq!(
            Value::Text("x".into()).coerce(Kind::U32),
            Err(Error::Cast {
                from: "text",
                to: "u32"
            })
        );
    }

    #[test]
    fn test_value_round_trip() {
        let values = [
            Value::Bool(true),
            Value::I32(-42),
            Value::F64(2.5),
            Value::Text("dyn".into()),
            Value::Uuid(Uuid::from_bytes([9; 16])),
        ];
        let pool = BufferPool::new();
        let mut writer = WriteBuffer::pooled(&pool, 8);
        for value in &values {
            writer.write_value(value).unwrap();
        }
        let mut reader = ReadBuffer::new(writer.freeze());
        for value in &values {
            assert_eq!(reader.read_value(value.kind()).unwrap(), *value);
        }
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_cast_then_encode() {
        let pool = BufferPool::new();
        let mut writer = WriteBuffer::pooled(&pool, 8);
        writer.write_cast(Value::U64(0x1234), Kind::U16).unwrap();
        let encoded = writer.freeze();
        assert_eq!(&encoded[..], &[0x34, 0x12]);
    }

    #[test]
    fn test_value_array_coerces_elements() {
        // A heterogeneous run declared as i32 on the wire.
        let values = [Value::U8(1), Value::I64(-2), Value::U16(3)];
        let pool = BufferPool::new();
        let mut writer = WriteBuffer::pooled(&pool, 4);
        writer.write_value_array(&values, Kind::I32).unwrap();
        let mut reader = ReadBuffer::new(writer.freeze());
        assert_eq!(
            reader.read_value_array(Kind::I32, 3).unwrap(),
            vec![Value::I32(1), Value::I32(-2), Value::I32(3)]
        );
    }

    #[test]
    fn test_nullable_value() {
        let pool = BufferPool::new();
        let mut writer = WriteBuffer::pooled(&pool, 16);
        writer
            .write_nullable_value(Some(&Value::Text("hi".into())), true)
            .unwrap();
        writer.write_nullable_value(None, true).unwrap();
        let encoded = writer.freeze();

        let mut reader = ReadBuffer::new(encoded.clone());
        assert_eq!(
            reader.read_nullable_value(Kind::Text, true).unwrap(),
            Some(Value::Text("hi".into()))
        );
        assert_eq!(reader.read_nullable_value(Kind::Text, true).unwrap(), None);

        // Truncated inside the payload: marker stays unconsumed.
        let mut reader = ReadBuffer::new(encoded.slice(..6));
        assert_eq!(
            reader.read_nullable_value(Kind::Text, true),
            Err(Error::Incomplete { required: 7 })
        );
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_value_array_is_atomic() {
        let mut reader = ReadBuffer::new(Bytes::from_static(&[1, 2, 3, 4, 5]));
        assert_eq!(
            reader.read_value_array(Kind::U32, 2),
            Err(Error::Incomplete { required: 8 })
        );
        assert_eq!(reader.position(), 0);
    }
}
