//! Results of the built-in HTTP(S) client.

use crate::parse::{parse_csv_str, ParseError};

pub use crate::command::http::types::HttpMethod;

/// Longest URL accepted by `+HTTPPARA`.
pub const MAX_URL_LEN: usize = 200;

/// Outcome of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HttpResponse {
    /// HTTP status, or a 7xx code for failures inside the modem (e.g. 706
    /// for a DNS error)
    pub status: u16,
    /// Body length announced by the modem
    pub content_length: usize,
    /// Body bytes copied into the caller's buffer
    pub read: usize,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body did not fit into the caller's buffer.
    pub fn is_truncated(&self) -> bool {
        self.read < self.content_length
    }
}

/// `+HTTPACTION: <method>,<status>,<length>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ActionResult {
    pub status: u16,
    pub length: usize,
}

impl ActionResult {
    pub fn from_line(line: &str) -> Result<Self, ParseError> {
        let fields = parse_csv_str(line, "+HTTPACTION:", 3)?;
        match (fields.parse(1)?, fields.parse(2)?) {
            (Some(status), Some(length)) => Ok(Self { status, length }),
            (None, _) => Err(ParseError::InvalidField { index: 1 }),
            (_, None) => Err(ParseError::InvalidField { index: 2 }),
        }
    }
}

/// Data of one `+HTTPREAD` answer.
///
/// The payload runs from the `+HTTPREAD: <len>` header to the closing
/// `+HTTPREAD: 0` line, which is the transaction's terminator.
pub(crate) fn read_chunk(payload: &[u8]) -> Result<&[u8], ParseError> {
    const HEADER: &[u8] = b"+HTTPREAD:";

    let start = payload
        .windows(HEADER.len())
        .position(|w| w == HEADER)
        .ok_or(ParseError::PrefixNotFound)?;
    let rest = &payload[start + HEADER.len()..];
    let line_end = rest
        .iter()
        .position(|&b| b == b'\n')
        .ok_or(ParseError::InvalidField { index: 0 })?;

    let len: usize = core::str::from_utf8(&rest[..line_end])
        .map_err(|_| ParseError::NotText)?
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidField { index: 0 })?;

    let data = &rest[line_end + 1..];
    if data.len() < len {
        warn!("+HTTPREAD announced {} bytes, got {}", len, data.len());
        return Err(ParseError::FieldCountMismatch {
            expected: len,
            found: data.len(),
        });
    }
    Ok(&data[..len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_result() {
        assert_eq!(
            ActionResult::from_line("+HTTPACTION: 0,200,17"),
            Ok(ActionResult {
                status: 200,
                length: 17
            })
        );
        assert_eq!(
            ActionResult::from_line("+HTTPACTION: 1,706,0").map(|r| r.status),
            Ok(706)
        );
        assert_eq!(
            ActionResult::from_line("+HTTPACTION: 0,,0"),
            Err(ParseError::InvalidField { index: 1 })
        );
    }

    #[test]
    fn chunk_keeps_body_lines() {
        let payload = b"\r\nOK\r\n\r\n+HTTPREAD: 11\r\nOK\r\n{\"a\":1}\r\n";
        assert_eq!(read_chunk(payload), Ok(&b"OK\r\n{\"a\":1}"[..]));
    }

    #[test]
    fn short_chunk() {
        let payload = b"\r\nOK\r\n\r\n+HTTPREAD: 40\r\nabc\r\n";
        assert_eq!(
            read_chunk(payload),
            Err(ParseError::FieldCountMismatch {
                expected: 40,
                found: 5
            })
        );
        assert_eq!(read_chunk(b"\r\nOK\r\n"), Err(ParseError::PrefixNotFound));
    }

    #[test]
    fn status_classes() {
        let response = HttpResponse {
            status: 404,
            content_length: 100,
            read: 64,
        };
        assert!(!response.is_success());
        assert!(response.is_truncated());
    }
}
