//! Comma separated AT response parsing.
//!
//! Information responses share one shape: a `+NAME:` prefix at the start of a
//! line, followed by comma separated fields, any of which may be empty.
//!
//! ```text
//! +CGNSSINFO: 2,04,00,21.xxxxx,N,114.xxxxxxxx,E,020924,094145.00,-34.0,1.403,,6.9,6.8,1.0,03
//! ```
//!
//! An empty field is reported as `None`, never as zero.

use core::str::FromStr;

use heapless::Vec;

use crate::transport::Response;

/// Most fields a single response line may carry.
pub const MAX_FIELDS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// No line starts with the expected prefix
    PrefixNotFound,
    FieldCountMismatch { expected: usize, found: usize },
    /// Field `index` is not empty but does not convert to the requested type
    InvalidField { index: usize },
    /// The response is not valid UTF-8
    NotText,
}

/// One field of a response line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    index: usize,
    raw: &'a str,
}

impl<'a> Field<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// The field text as received, quotes included.
    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// The field text, or `None` for an empty field.
    pub fn value(&self) -> Option<&'a str> {
        if self.raw.is_empty() {
            None
        } else {
            Some(self.raw)
        }
    }

    /// The field text with surrounding double quotes removed.
    pub fn unquoted(&self) -> &'a str {
        self.raw
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(self.raw)
    }

    /// Convert the field, `Ok(None)` when it is empty.
    pub fn parse<T: FromStr>(&self) -> Result<Option<T>, ParseError> {
        match self.value() {
            None => Ok(None),
            Some(v) => v
                .parse()
                .map(Some)
                .map_err(|_| ParseError::InvalidField { index: self.index }),
        }
    }
}

/// The fields of one response line, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fields<'a>(Vec<Field<'a>, MAX_FIELDS>);

impl<'a> Fields<'a> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Field<'a>> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field<'a>> {
        self.0.iter()
    }

    /// Text of field `index`, `None` when empty or absent.
    pub fn value(&self, index: usize) -> Option<&'a str> {
        self.get(index).and_then(|f| f.value())
    }

    /// Convert field `index`, `Ok(None)` when empty or absent.
    pub fn parse<T: FromStr>(&self, index: usize) -> Result<Option<T>, ParseError> {
        match self.get(index) {
            Some(field) => field.parse(),
            None => Ok(None),
        }
    }

    /// Whether every field is empty, as in a GNSS report without a fix.
    pub fn all_empty(&self) -> bool {
        self.0.iter().all(Field::is_empty)
    }
}

impl<'a> core::ops::Index<usize> for Fields<'a> {
    type Output = Field<'a>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Extract exactly `field_count` fields from the line of `response` starting
/// with `prefix`.
pub fn parse_csv<'r, const N: usize>(
    response: &'r Response<N>,
    prefix: &str,
    field_count: usize,
) -> Result<Fields<'r>, ParseError> {
    let text = response.text().map_err(|_| ParseError::NotText)?;
    parse_csv_str(text, prefix, field_count)
}

/// Text variant of [`parse_csv`].
///
/// One extra empty field produced by a trailing comma is dropped.
pub fn parse_csv_str<'a>(
    text: &'a str,
    prefix: &str,
    field_count: usize,
) -> Result<Fields<'a>, ParseError> {
    let mut fields = fields_after(text, prefix).map_err(|err| match err {
        SplitError::PrefixNotFound => ParseError::PrefixNotFound,
        SplitError::TooMany(found) => ParseError::FieldCountMismatch {
            expected: field_count,
            found,
        },
    })?;

    let found = fields.len();
    if found == field_count + 1 && fields.0.last().map_or(false, Field::is_empty) {
        fields.0.pop();
    } else if found != field_count {
        return Err(ParseError::FieldCountMismatch {
            expected: field_count,
            found,
        });
    }

    Ok(fields)
}

#[derive(Debug, PartialEq)]
pub(crate) enum SplitError {
    PrefixNotFound,
    TooMany(usize),
}

/// All fields of the first line starting with `prefix`, whatever their count.
pub(crate) fn fields_after<'a>(text: &'a str, prefix: &str) -> Result<Fields<'a>, SplitError> {
    let rest = text
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(prefix))
        .ok_or(SplitError::PrefixNotFound)?;

    split(rest.trim())
}

fn split(line: &str) -> Result<Fields<'_>, SplitError> {
    let mut fields = Vec::new();
    let mut count = 0;
    let mut start = 0;
    let mut quoted = false;

    let mut push = |start: usize, end: usize, count: &mut usize| {
        let field = Field {
            index: *count,
            raw: line[start..end].trim(),
        };
        *count += 1;
        // Keep counting past capacity so the error reports the real total
        fields.push(field).is_ok()
    };

    let mut overflow = false;
    for (i, b) in line.bytes().enumerate() {
        match b {
            b'"' => quoted = !quoted,
            b',' if !quoted => {
                overflow |= !push(start, i, &mut count);
                start = i + 1;
            }
            _ => {}
        }
    }
    overflow |= !push(start, line.len(), &mut count);

    if overflow {
        Err(SplitError::TooMany(count))
    } else {
        Ok(Fields(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Command, Terminator};

    const NO_DATE_FIX: &str =
        "+CGNSSINFO: 1,04,,,21.123456,N,114.123456,E,,210924,094145.00,,,,,,,";

    #[test]
    fn empty_fields_are_none() {
        let fields = parse_csv_str(NO_DATE_FIX, "+CGNSSINFO:", 17).unwrap();
        assert_eq!(fields.len(), 17);
        assert_eq!(fields[4].as_str(), "21.123456");
        assert_eq!(fields[2].as_str(), "");
        assert_eq!(fields[2].value(), None);
        assert_eq!(fields[2].parse::<u8>(), Ok(None));
        assert_eq!(fields.parse::<f64>(4), Ok(Some(21.123456)));
        assert_eq!(fields.parse::<u8>(1), Ok(Some(4)));
    }

    #[test]
    fn from_response() {
        let cmd = Command::new("AT+CGNSSINFO").unwrap();
        let mut raw = [0u8; 128];
        let text = b"AT+CGNSSINFO\r\n\r\n";
        raw[..text.len()].copy_from_slice(text);
        let mut len = text.len();
        raw[len..len + NO_DATE_FIX.len()].copy_from_slice(NO_DATE_FIX.as_bytes());
        len += NO_DATE_FIX.len();
        raw[len..len + 8].copy_from_slice(b"\r\n\r\nOK\r\n");
        len += 8;

        let response: Response<128> =
            Response::from_parts(&cmd, &raw[..len], Some(Terminator::OK)).unwrap();
        let fields = parse_csv(&response, "+CGNSSINFO:", 17).unwrap();
        assert_eq!(fields.value(6), Some("114.123456"));
    }

    #[test]
    fn prefix_must_start_a_line() {
        assert_eq!(
            parse_csv_str("ERROR +CSQ: 1,2\r\n", "+CSQ:", 2),
            Err(ParseError::PrefixNotFound)
        );
        assert_eq!(
            parse_csv_str("AT+CSQ\r\n+CSQ: 21,99\r\nOK\r\n", "+CSQ:", 2)
                .unwrap()
                .value(0),
            Some("21")
        );
    }

    #[test]
    fn field_count_mismatch() {
        assert_eq!(
            parse_csv_str("+CSQ: 21,99", "+CSQ:", 3),
            Err(ParseError::FieldCountMismatch {
                expected: 3,
                found: 2
            })
        );
        // Only an empty trailing field is forgiven
        assert_eq!(
            parse_csv_str("+CSQ: 21,99,5", "+CSQ:", 2),
            Err(ParseError::FieldCountMismatch {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn quoted_commas() {
        let fields = parse_csv_str(
            "+CGDCONT: 1,\"IP\",\"internet,apn\",\"0.0.0.0\",0,0",
            "+CGDCONT:",
            6,
        )
        .unwrap();
        assert_eq!(fields[2].as_str(), "\"internet,apn\"");
        assert_eq!(fields[2].unquoted(), "internet,apn");
        assert_eq!(fields[1].unquoted(), "IP");
    }

    #[test]
    fn invalid_field() {
        let fields = parse_csv_str("+CSQ: x,99", "+CSQ:", 2).unwrap();
        assert_eq!(
            fields.parse::<u8>(0),
            Err(ParseError::InvalidField { index: 0 })
        );
    }

    #[test]
    fn too_many_fields() {
        let line = "+X: ,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,,";
        assert_eq!(
            parse_csv_str(line, "+X:", 4),
            Err(ParseError::FieldCountMismatch {
                expected: 4,
                found: 40
            })
        );
    }

    #[test]
    fn no_fix_record() {
        let fields = fields_after("+CGNSSINFO: ,,,,,,,,", "+CGNSSINFO:").unwrap();
        assert_eq!(fields.len(), 9);
        assert!(fields.all_empty());
    }
}
