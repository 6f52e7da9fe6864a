//! Codec implementations for calendar and duration types.
//!
//! Calendar values travel as their underlying tick count (one tick = 100 ns)
//! or day number, not as any formatted representation:
//!
//! - timestamp: i64 ticks since 0001-01-01T00:00:00
//! - offset timestamp: i64 ticks of the local clock time, then an i16 offset
//!   in whole minutes (10 bytes total)
//! - duration: i64 ticks
//! - date: i32 day number, 0001-01-01 = day 0
//! - time-of-day: i64 ticks since midnight
//!
//! Encoding truncates sub-tick (< 100 ns) precision toward zero; values at
//! tick resolution round-trip exactly. Values whose tick count does not fit
//! an i64 are a caller error and panic, mirroring the oversize-length
//! contract of the text codec. Decoded ticks that cannot inhabit the target
//! type surface [`Error::OutOfRange`].

use crate::{
    buffer::{ReadBuffer, WriteBuffer},
    codec::Codec,
    error::Error,
};
use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
    Timelike,
};

const TICKS_PER_SECOND: i64 = 10_000_000;
const NANOS_PER_TICK: i64 = 100;
const TICKS_PER_DAY: i64 = 86_400 * TICKS_PER_SECOND;
const SECONDS_PER_MINUTE: i32 = 60;

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .expect("calendar epoch")
        .and_hms_opt(0, 0, 0)
        .expect("calendar epoch")
}

fn delta_to_ticks(delta: TimeDelta, label: &'static str) -> Result<i64, Error> {
    let subsec_ticks = (delta.subsec_nanos() as i64) / NANOS_PER_TICK;
    delta
        .num_seconds()
        .checked_mul(TICKS_PER_SECOND)
        .and_then(|ticks| ticks.checked_add(subsec_ticks))
        .ok_or(Error::OutOfRange(label))
}

fn ticks_to_delta(ticks: i64) -> TimeDelta {
    let seconds = ticks.div_euclid(TICKS_PER_SECOND);
    let subsec = ticks.rem_euclid(TICKS_PER_SECOND);
    TimeDelta::seconds(seconds) + TimeDelta::nanoseconds(subsec * NANOS_PER_TICK)
}

fn timestamp_ticks(value: &NaiveDateTime) -> Result<i64, Error> {
    delta_to_ticks(value.signed_duration_since(epoch()), "timestamp")
}

fn timestamp_from_ticks(ticks: i64) -> Result<NaiveDateTime, Error> {
    epoch()
        .checked_add_signed(ticks_to_delta(ticks))
        .ok_or(Error::OutOfRange("timestamp"))
}

impl Codec for NaiveDateTime {
    const WIDTH: Option<usize> = Some(8);

    #[inline]
    fn size(&self) -> usize {
        8
    }

    #[inline]
    fn measure(_: &ReadBuffer, _: usize) -> Result<usize, Error> {
        Ok(8)
    }

    fn read(buf: &mut ReadBuffer) -> Result<Self, Error> {
        let ticks = i64::from_le_bytes(buf.peek(8)?.try_into().expect("tick width"));
        let value = timestamp_from_ticks(ticks)?;
        buf.advance(8);
        Ok(value)
    }

    fn write(&self, buf: &mut WriteBuffer<'_>) {
        let ticks = timestamp_ticks(self).expect("timestamp outside tick range");
        buf.claim(8).copy_from_slice(&ticks.to_le_bytes());
    }
}

impl Codec for DateTime<FixedOffset> {
    const WIDTH: Option<usize> = Some(10);

    #[inline]
    fn size(&self) -> usize {
        10
    }

    #[inline]
    fn measure(_: &ReadBuffer, _: usize) -> Result<usize, Error> {
        Ok(10)
    }

    fn read(buf: &mut ReadBuffer) -> Result<Self, Error> {
        let raw = buf.peek(10)?;
        let ticks = i64::from_le_bytes(raw[..8].try_into().expect("tick width"));
        let minutes = i16::from_le_bytes(raw[8..].try_into().expect("offset width"));
        let offset = FixedOffset::east_opt(minutes as i32 * SECONDS_PER_MINUTE)
            .ok_or(Error::OutOfRange("utc offset"))?;
        let local = timestamp_from_ticks(ticks)?;
        let value = offset
            .from_local_datetime(&local)
            .single()
            .ok_or(Error::OutOfRange("timestamp"))?;
        buf.advance(10);
        Ok(value)
    }

    fn write(&self, buf: &mut WriteBuffer<'_>) {
        // The tick count is the local clock reading; the offset restores UTC.
        let ticks = timestamp_ticks(&self.naive_local()).expect("timestamp outside tick range");
        let minutes = (self.offset().local_minus_utc() / SECONDS_PER_MINUTE) as i16;
        buf.claim(8).copy_from_slice(&ticks.to_le_bytes());
        buf.claim(2).copy_from_slice(&minutes.to_le_bytes());
    }
}

impl Codec for TimeDelta {
    const WIDTH: Option<usize> = Some(8);

    #[inline]
    fn size(&self) -> usize {
        8
    }

    #[inline]
    fn measure(_: &ReadBuffer, _: usize) -> Result<usize, Error> {
        Ok(8)
    }

    fn read(buf: &mut ReadBuffer) -> Result<Self, Error> {
        let ticks = i64::from_le_bytes(buf.peek(8)?.try_into().expect("tick width"));
        buf.advance(8);
        Ok(ticks_to_delta(ticks))
    }

    fn write(&self, buf: &mut WriteBuffer<'_>) {
        let ticks = delta_to_ticks(*self, "duration").expect("duration outside tick range");
        buf.claim(8).copy_from_slice(&ticks.to_le_bytes());
    }
}

impl Codec for NaiveDate {
    const WIDTH: Option<usize> = Some(4);

    #[inline]
    fn size(&self) -> usize {
        4
    }

    #[inline]
    fn measure(_: &ReadBuffer, _: usize) -> Result<usize, Error> {
        Ok(4)
    }

    fn read(buf: &mut ReadBuffer) -> Result<Self, Error> {
        let day = i32::from_le_bytes(buf.peek(4)?.try_into().expect("day width"));
        let value = day
            .checked_add(1)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .ok_or(Error::OutOfRange("date"))?;
        buf.advance(4);
        Ok(value)
    }

    fn write(&self, buf: &mut WriteBuffer<'_>) {
        let day = self.num_days_from_ce() - 1;
        buf.claim(4).copy_from_slice(&day.to_le_bytes());
    }
}

impl Codec for NaiveTime {
    const WIDTH: Option<usize> = Some(8);

    #[inline]
    fn size(&self) -> usize {
        8
    }

    #[inline]
    fn measure(_: &ReadBuffer, _: usize) -> Result<usize, Error> {
        Ok(8)
    }

    fn read(buf: &mut ReadBuffer) -> Result<Self, Error> {
        let ticks = i64::from_le_bytes(buf.peek(8)?.try_into().expect("tick width"));
        if !(0..TICKS_PER_DAY).contains(&ticks) {
            return Err(Error::OutOfRange("time of day"));
        }
        let seconds = (ticks / TICKS_PER_SECOND) as u32;
        let nanos = ((ticks % TICKS_PER_SECOND) * NANOS_PER_TICK) as u32;
        let value = NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos)
            .ok_or(Error::OutOfRange("time of day"))?;
        buf.advance(8);
        Ok(value)
    }

    fn write(&self, buf: &mut WriteBuffer<'_>) {
        let nanos = self.nanosecond();
        // A leap-second reading has no tick representation within the day.
        assert!(nanos < 1_000_000_000, "leap second not representable");
        let ticks = self.num_seconds_from_midnight() as i64 * TICKS_PER_SECOND
            + nanos as i64 / NANOS_PER_TICK;
        buf.claim(8).copy_from_slice(&ticks.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BufferPool, ReadBuffer, WriteBuffer};

    fn round_trip<T: Codec + PartialEq + std::fmt::Debug>(value: T) {
        let pool = BufferPool::new();
        let mut writer = WriteBuffer::pooled(&pool, 16);
        writer.write(&value).unwrap();
        let mut reader = ReadBuffer::new(writer.freeze());
        assert_eq!(reader.read::<T>().unwrap(), value);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_timestamp_round_trip() {
        round_trip(epoch());
        round_trip(
            NaiveDate::from_ymd_opt(2024, 5, 17)
                .unwrap()
                .and_hms_micro_opt(13, 45, 30, 123_400)
                .unwrap(),
        );
        round_trip(NaiveDate::from_ymd_opt(9999, 12, 31).unwrap().and_hms_opt(23, 59, 59).unwrap());
    }

    #[test]
    fn test_timestamp_tick_layout() {
        // One second past the epoch is exactly ten million ticks.
        let pool = BufferPool::new();
        let mut writer = WriteBuffer::pooled(&pool, 8);
        let value = epoch() + TimeDelta::seconds(1);
        writer.write(&value).unwrap();
        let encoded = writer.freeze();
        assert_eq!(
            i64::from_le_bytes(encoded[..].try_into().unwrap()),
            TICKS_PER_SECOND
        );
    }

    #[test]
    fn test_offset_timestamp() {
        let offset = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let value = NaiveDate::from_ymd_opt(2031, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
            .and_local_timezone(offset)
            .unwrap();
        let pool = BufferPool::new();
        let mut writer = WriteBuffer::pooled(&pool, 10);
        writer.write(&value).unwrap();
        let encoded = writer.freeze();
        assert_eq!(encoded.len(), 10);
        // Offset minutes land after the tick count.
        assert_eq!(
            i16::from_le_bytes(encoded[8..].try_into().unwrap()),
            5 * 60 + 30
        );
        let mut reader = ReadBuffer::new(encoded);
        let decoded = reader.read::<DateTime<FixedOffset>>().unwrap();
        assert_eq!(decoded, value);
        assert_eq!(decoded.offset(), value.offset());
    }

    #[test]
    fn test_duration_round_trip() {
        round_trip(TimeDelta::zero());
        round_trip(TimeDelta::seconds(-90) + TimeDelta::nanoseconds(700));
        round_trip(TimeDelta::days(40_000));
    }

    #[test]
    fn test_date() {
        let pool = BufferPool::new();
        let mut writer = WriteBuffer::pooled(&pool, 4);
        writer.write(&NaiveDate::from_ymd_opt(1, 1, 1).unwrap()).unwrap();
        assert_eq!(writer.written(), &[0, 0, 0, 0]);
        round_trip(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        round_trip(NaiveDate::MAX);
    }

    #[test]
    fn test_time_of_day() {
        round_trip(NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        round_trip(NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap());

        // A tick count of a full day or more is not a time of day.
        let pool = BufferPool::new();
        let mut writer = WriteBuffer::pooled(&pool, 8);
        writer.write(&TICKS_PER_DAY).unwrap();
        let mut reader = ReadBuffer::new(writer.freeze());
        assert_eq!(
            reader.read::<NaiveTime>(),
            Err(Error::OutOfRange("time of day"))
        );
        assert_eq!(reader.position(), 0);
    }
}
