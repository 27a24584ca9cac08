//! GNSS and cell based location reports.
//!
//! Two report layouts exist. A76XX, SIM7600 and SIM7670 answer
//! `AT+CGNSSINFO` with
//!
//! ```text
//! +CGNSSINFO: <mode>,<sat counts...>,<lat>,<N/S>,<lon>,<E/W>,<ddmmyy>,<hhmmss.ss>,<alt>,<speed>,<course>,<PDOP>,<HDOP>,<VDOP>[,<sats used>]
//! ```
//!
//! where the number of per-constellation satellite counts depends on the
//! firmware. SIM7000 answers `AT+CGNSINF` with a fixed 21 field layout.
//! A report without a fix has every field empty and parses to a
//! [`ParsedFix`] whose fields are all `None`.

pub mod geo;

use crate::parse::{fields_after, Field, Fields, ParseError, SplitError};

pub use crate::command::gnss::types::GnssMode;

const KNOTS_TO_KMH: f32 = 1.852;

/// Date and time in UTC as reported by the receiver or the network.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UtcDateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: f32,
}

/// Satellites in view per constellation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Satellites {
    pub gps: Option<u8>,
    pub glonass: Option<u8>,
    pub galileo: Option<u8>,
    pub beidou: Option<u8>,
}

/// One GNSS location report. Fields the receiver left empty are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParsedFix {
    /// Fix mode, 2 for a 2D and 3 for a 3D fix
    pub mode: Option<u8>,
    /// Decimal degrees, negative south of the equator
    pub latitude: Option<f64>,
    /// Decimal degrees, negative west of Greenwich
    pub longitude: Option<f64>,
    /// Metres above mean sea level
    pub altitude: Option<f32>,
    pub speed_kmh: Option<f32>,
    /// Degrees from true north
    pub course: Option<f32>,
    pub satellites: Satellites,
    pub satellites_in_view: Option<u8>,
    pub satellites_used: Option<u8>,
    pub utc: Option<UtcDateTime>,
    pub pdop: Option<f32>,
    pub hdop: Option<f32>,
    pub vdop: Option<f32>,
}

impl ParsedFix {
    pub fn has_fix(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Parse an `AT+CGNSSINFO` response.
    pub fn from_cgnssinfo(text: &str) -> Result<Self, ParseError> {
        let fields = fields(text, "+CGNSSINFO:")?;
        if fields.all_empty() {
            return Ok(Self::default());
        }

        let mut fix = Self {
            mode: fields.parse(0)?,
            ..Self::default()
        };

        // Satellite counts sit between the mode and the latitude
        let Some(lat) = hemisphere_quartet(&fields) else {
            return Ok(fix);
        };

        let mut counts: heapless::Vec<Option<u8>, 4> = heapless::Vec::new();
        for i in 1..lat {
            if counts.push(fields.parse(i)?).is_err() {
                break;
            }
        }
        fix.satellites = match counts.as_slice() {
            [gps] => Satellites {
                gps: *gps,
                ..Satellites::default()
            },
            [gps, beidou] => Satellites {
                gps: *gps,
                beidou: *beidou,
                ..Satellites::default()
            },
            [gps, glonass, beidou] => Satellites {
                gps: *gps,
                glonass: *glonass,
                beidou: *beidou,
                ..Satellites::default()
            },
            [gps, glonass, galileo, beidou] => Satellites {
                gps: *gps,
                glonass: *glonass,
                galileo: *galileo,
                beidou: *beidou,
            },
            _ => Satellites::default(),
        };

        fix.latitude = coordinate(&fields, lat, 90.0)?;
        fix.longitude = coordinate(&fields, lat + 2, 180.0)?;

        // Some firmware leaves an empty slot before the date
        let mut date = lat + 4;
        if fields.value(date).is_none() && fields.value(date + 1).map_or(false, is_ddmmyy) {
            date += 1;
        }

        fix.utc = date_time(fields.get(date), fields.get(date + 1))?;
        fix.altitude = fields.parse(date + 2)?;
        fix.speed_kmh = fields
            .parse::<f32>(date + 3)?
            .map(|knots| knots * KNOTS_TO_KMH);
        fix.course = fields.parse(date + 4)?;
        fix.pdop = fields.parse(date + 5)?;
        fix.hdop = fields.parse(date + 6)?;
        fix.vdop = fields.parse(date + 7)?;
        fix.satellites_used = fields.parse(date + 8)?;

        Ok(fix)
    }

    /// Parse a SIM7000 `AT+CGNSINF` response.
    pub fn from_cgnsinf(text: &str) -> Result<Self, ParseError> {
        let fields = fields(text, "+CGNSINF:")?;
        if fields.len() < 15 {
            return Err(ParseError::FieldCountMismatch {
                expected: 21,
                found: fields.len(),
            });
        }

        // <run status>,<fix status>,<utc>,<lat>,<lon>,<alt>,<speed>,<course>,
        // <fix mode>,,<HDOP>,<PDOP>,<VDOP>,,<GPS in view>,<GNSS used>,<GLONASS in view>,...
        let fixed = fields.parse::<u8>(1)? == Some(1);
        let mut fix = Self {
            mode: fields.parse(8)?,
            utc: compact_date_time(fields.get(2))?,
            altitude: fields.parse(5)?,
            speed_kmh: fields.parse(6)?,
            course: fields.parse(7)?,
            hdop: fields.parse(10)?,
            pdop: fields.parse(11)?,
            vdop: fields.parse(12)?,
            satellites_used: fields.parse(15)?,
            ..Self::default()
        };
        fix.satellites.gps = fields.parse(14)?;
        fix.satellites.glonass = fields.parse(16)?;
        fix.satellites_in_view = [fix.satellites.gps, fix.satellites.glonass]
            .iter()
            .flatten()
            .copied()
            .reduce(|a, b| a.saturating_add(b));

        if fixed {
            fix.latitude = fields.parse(3)?;
            fix.longitude = fields.parse(4)?;
        }

        Ok(fix)
    }
}

/// Cell tower based location from `AT+CLBS`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LbsLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres
    pub accuracy: Option<f32>,
    pub utc: Option<UtcDateTime>,
}

impl LbsLocation {
    /// Parse a `+CLBS: 0,<lat>,<lon>,<acc>[,<yyyy/mm/dd>,<hh:mm:ss>]`
    /// response. A non-zero location code means the network had no answer
    /// and yields `Ok(None)`.
    pub fn from_clbs(text: &str) -> Result<Option<Self>, ParseError> {
        let fields = fields(text, "+CLBS:")?;
        match fields.parse::<u8>(0)? {
            Some(0) => {}
            code => {
                debug!("No cell location, code {:?}", code);
                return Ok(None);
            }
        }

        let (Some(latitude), Some(longitude)) = (fields.parse(1)?, fields.parse(2)?) else {
            return Err(ParseError::FieldCountMismatch {
                expected: 4,
                found: fields.len(),
            });
        };

        let utc = match (fields.value(4), fields.value(5)) {
            (Some(date), Some(time)) => Some(slashed_date_time(date, time, 4)?),
            _ => None,
        };

        Ok(Some(Self {
            latitude,
            longitude,
            accuracy: fields.parse(3)?,
            utc,
        }))
    }
}

fn fields<'a>(text: &'a str, prefix: &str) -> Result<Fields<'a>, ParseError> {
    fields_after(text, prefix).map_err(|e| match e {
        SplitError::PrefixNotFound => ParseError::PrefixNotFound,
        SplitError::TooMany(found) => ParseError::FieldCountMismatch {
            expected: crate::parse::MAX_FIELDS,
            found,
        },
    })
}

/// Index of the latitude in a `<lat>,<N/S>,<lon>,<E/W>` run.
fn hemisphere_quartet(fields: &Fields<'_>) -> Option<usize> {
    (1..fields.len().saturating_sub(3)).find(|&i| {
        matches!(fields.value(i + 1), Some("N" | "S")) && matches!(fields.value(i + 3), Some("E" | "W"))
    })
}

/// Signed decimal degrees from a value and its hemisphere indicator.
///
/// Older firmware reports the NMEA style `ddmm.mmmm` / `dddmm.mmmm` format,
/// recognised by four or more integer digits or a value beyond `limit`.
fn coordinate(fields: &Fields<'_>, index: usize, limit: f64) -> Result<Option<f64>, ParseError> {
    let Some(value) = fields.parse::<f64>(index)? else {
        return Ok(None);
    };
    let integer_digits = fields
        .value(index)
        .map(|raw| {
            raw.trim_start_matches(['+', '-'])
                .bytes()
                .take_while(u8::is_ascii_digit)
                .count()
        })
        .unwrap_or(0);
    let degrees = if integer_digits >= 4 || value.abs() > limit {
        let whole = libm::trunc(value / 100.0);
        whole + (value - whole * 100.0) / 60.0
    } else {
        value
    };
    Ok(Some(match fields.value(index + 1) {
        Some("S" | "W") => -degrees,
        _ => degrees,
    }))
}

fn is_ddmmyy(s: &str) -> bool {
    s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit())
}

fn digits<T: core::str::FromStr>(s: &str, range: core::ops::Range<usize>) -> Option<T> {
    s.get(range)?.parse().ok()
}

/// `ddmmyy` and `hhmmss.ss`.
fn date_time(date: Option<Field<'_>>, time: Option<Field<'_>>) -> Result<Option<UtcDateTime>, ParseError> {
    let (Some(date), Some(time)) = (date, time) else {
        return Ok(None);
    };
    let (Some(d), Some(t)) = (date.value(), time.value()) else {
        return Ok(None);
    };

    let parsed = (|| {
        Some(UtcDateTime {
            day: digits(d, 0..2)?,
            month: digits(d, 2..4)?,
            year: 2000 + digits::<u16>(d, 4..6)?,
            hour: digits(t, 0..2)?,
            minute: digits(t, 2..4)?,
            second: t.get(4..)?.parse().ok()?,
        })
    })();

    parsed
        .map(Some)
        .ok_or(ParseError::InvalidField { index: date.index() })
}

/// `yyyyMMddhhmmss.sss`.
fn compact_date_time(field: Option<Field<'_>>) -> Result<Option<UtcDateTime>, ParseError> {
    let Some(field) = field else {
        return Ok(None);
    };
    let Some(s) = field.value() else {
        return Ok(None);
    };

    let parsed = (|| {
        Some(UtcDateTime {
            year: digits(s, 0..4)?,
            month: digits(s, 4..6)?,
            day: digits(s, 6..8)?,
            hour: digits(s, 8..10)?,
            minute: digits(s, 10..12)?,
            second: s.get(12..)?.parse().ok()?,
        })
    })();

    parsed
        .map(Some)
        .ok_or(ParseError::InvalidField { index: field.index() })
}

/// `yyyy/mm/dd` and `hh:mm:ss`.
fn slashed_date_time(date: &str, time: &str, index: usize) -> Result<UtcDateTime, ParseError> {
    let mut d = date.split('/').map(str::parse::<u16>);
    let mut t = time.split(':').map(str::parse::<f32>);

    let parsed = (|| {
        Some(UtcDateTime {
            year: d.next()?.ok()?,
            month: u8::try_from(d.next()?.ok()?).ok()?,
            day: u8::try_from(d.next()?.ok()?).ok()?,
            hour: t.next()?.ok()? as u8,
            minute: t.next()?.ok()? as u8,
            second: t.next()?.ok()?,
        })
    })();

    parsed.ok_or(ParseError::InvalidField { index })
}
