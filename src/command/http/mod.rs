//! ### HTTP(S) client
//!
//! The built-in client of the A76XX, SIM7600 and SIM7670 series. It needs an
//! open network (`+NETOPEN`). A request is one `+HTTPINIT` ... `+HTTPTERM`
//! session: parameters are set with `+HTTPPARA`, a request body is uploaded
//! with `+HTTPDATA`, and `+HTTPACTION` performs the request. The result is
//! reported later as `+HTTPACTION: <method>,<status>,<length>` and the
//! response body is fetched with `+HTTPREAD`. `https://` URLs use SSL
//! context 0 without further setup.
pub mod types;

use super::NoResponse;
use atat::atat_derive::AtatCmd;
use types::*;

/// Start HTTP service +HTTPINIT
#[derive(Clone, AtatCmd)]
#[at_cmd("+HTTPINIT", NoResponse, timeout_ms = 5000)]
pub struct HttpInit;

/// Stop HTTP service +HTTPTERM
#[derive(Clone, AtatCmd)]
#[at_cmd("+HTTPTERM", NoResponse, timeout_ms = 5000)]
pub struct HttpTerm;

/// Set HTTP parameter value +HTTPPARA
///
/// `param` is one of `URL`, `CONNECTTO`, `RECVTO`, `CONTENT`, `ACCEPT`,
/// `SSLCFG`, `USERDATA` or `READMODE`.
#[derive(Clone, AtatCmd)]
#[at_cmd("+HTTPPARA", NoResponse)]
pub struct SetHttpParameter<'a> {
    #[at_arg(position = 0, len = 10)]
    pub param: &'a str,
    #[at_arg(position = 1, len = 200)]
    pub value: &'a str,
}

/// Input HTTP data +HTTPDATA
///
/// Answers `DOWNLOAD`, then expects `size` bytes within `time` seconds.
#[derive(Clone, AtatCmd)]
#[at_cmd("+HTTPDATA", NoResponse)]
pub struct HttpData {
    #[at_arg(position = 0)]
    pub size: usize,
    #[at_arg(position = 1)]
    pub time: u16,
}

/// HTTP method action +HTTPACTION
///
/// `OK` only acknowledges the request. The final result arrives with the
/// `+HTTPACTION:` result code once the server answered.
#[derive(Clone, AtatCmd)]
#[at_cmd("+HTTPACTION", NoResponse, timeout_ms = 120000)]
pub struct HttpAction {
    #[at_arg(position = 0)]
    pub method: HttpMethod,
}

/// Read the HTTP response body +HTTPREAD
///
/// Answers `OK`, then `+HTTPREAD: <len>`, `<len>` bytes of data and a closing
/// `+HTTPREAD: 0`.
#[derive(Clone, AtatCmd)]
#[at_cmd("+HTTPREAD", NoResponse, timeout_ms = 10000)]
pub struct HttpRead {
    #[at_arg(position = 0)]
    pub offset: usize,
    #[at_arg(position = 1)]
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use atat::AtatCmd;

    #[test]
    fn http_parameter() {
        let mut buf = [0u8; 256];
        let len = SetHttpParameter {
            param: "URL",
            value: "https://httpbin.org/get",
        }
        .write(&mut buf);
        assert_eq!(
            &buf[..len],
            b"AT+HTTPPARA=\"URL\",\"https://httpbin.org/get\"\r\n"
        );
    }

    #[test]
    fn http_action_and_read() {
        let mut buf = [0u8; 32];
        let len = HttpAction {
            method: HttpMethod::Post,
        }
        .write(&mut buf);
        assert_eq!(&buf[..len], b"AT+HTTPACTION=1\r\n");

        let len = HttpRead {
            offset: 0,
            size: 512,
        }
        .write(&mut buf);
        assert_eq!(&buf[..len], b"AT+HTTPREAD=0,512\r\n");

        let len = HttpData { size: 36, time: 10 }.write(&mut buf);
        assert_eq!(&buf[..len], b"AT+HTTPDATA=36,10\r\n");
    }
}
