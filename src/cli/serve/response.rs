//! HTTP response handlers.
//!
//! Byte serving for resolved files: conditional requests
//! (`If-None-Match`, `If-Modified-Since`), single byte ranges and HEAD.
//! Multi-range requests are answered with the whole file.

use crate::fileserver::{ALLOW, ContentType, ResolveError, ServedFile};
use crate::utils::date::DateTimeUtc;
use anyhow::{Result, anyhow};
use std::io::{Read, Seek, SeekFrom};
use tiny_http::{Header, Request, Response, StatusCode};

/// How to answer a request for an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// 304, the client copy is current.
    NotModified,
    /// 200 with the whole file.
    Full,
    /// 206 with the inclusive byte range.
    Partial { start: u64, end: u64 },
    /// 416, the range lies outside the file.
    Unsatisfiable,
}

/// Request headers that affect byte serving.
#[derive(Debug, Default, Clone, Copy)]
pub struct Conditions<'a> {
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
    pub range: Option<&'a str>,
}

impl<'a> Conditions<'a> {
    pub fn from_request(request: &'a Request) -> Self {
        let mut conditions = Self::default();
        for h in request.headers() {
            let value = Some(h.value.as_str());
            match h.field.as_str().as_str().to_ascii_lowercase().as_str() {
                "if-none-match" => conditions.if_none_match = value,
                "if-modified-since" => conditions.if_modified_since = value,
                "range" => conditions.range = value,
                _ => {}
            }
        }
        conditions
    }

    /// Decide the response for a file with the given validators.
    pub fn plan(&self, etag: &str, modified: i64, size: u64) -> Plan {
        // If-None-Match takes precedence over If-Modified-Since
        let not_modified = match self.if_none_match {
            Some(value) => etag_matches(value, etag),
            None => self
                .if_modified_since
                .and_then(DateTimeUtc::parse_http)
                .is_some_and(|since| modified <= since.to_unix()),
        };
        if not_modified {
            return Plan::NotModified;
        }

        match self.range.map(|r| parse_range(r, size)) {
            Some(RangeSpec::Satisfiable(start, end)) => Plan::Partial { start, end },
            Some(RangeSpec::Unsatisfiable) => Plan::Unsatisfiable,
            Some(RangeSpec::Ignore) | None => Plan::Full,
        }
    }
}

/// Weak comparison against an `If-None-Match` list.
fn etag_matches(header: &str, etag: &str) -> bool {
    let etag = etag.trim_start_matches("W/");
    header.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || candidate.trim_start_matches("W/") == etag
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeSpec {
    Satisfiable(u64, u64),
    Unsatisfiable,
    /// Malformed or multi-range: serve the whole file.
    Ignore,
}

/// Parse a `Range` header value such as `bytes=0-499`.
fn parse_range(value: &str, size: u64) -> RangeSpec {
    let Some(ranges) = value.trim().strip_prefix("bytes=") else {
        return RangeSpec::Ignore;
    };
    if ranges.contains(',') {
        return RangeSpec::Ignore;
    }
    let Some((first, last)) = ranges.trim().split_once('-') else {
        return RangeSpec::Ignore;
    };

    match (first.trim(), last.trim()) {
        // "-500": last 500 bytes
        ("", suffix) => match suffix.parse::<u64>() {
            Ok(0) => RangeSpec::Unsatisfiable,
            Ok(_) if size == 0 => RangeSpec::Unsatisfiable,
            Ok(n) => RangeSpec::Satisfiable(size.saturating_sub(n), size - 1),
            Err(_) => RangeSpec::Ignore,
        },
        // "500-": from 500 to the end
        (start, "") => match start.parse::<u64>() {
            Ok(start) if start >= size => RangeSpec::Unsatisfiable,
            Ok(start) => RangeSpec::Satisfiable(start, size - 1),
            Err(_) => RangeSpec::Ignore,
        },
        // "0-499"
        (start, end) => match (start.parse::<u64>(), end.parse::<u64>()) {
            (Ok(start), Ok(end)) if start > end => RangeSpec::Ignore,
            (Ok(start), Ok(_)) if start >= size => RangeSpec::Unsatisfiable,
            (Ok(start), Ok(end)) => RangeSpec::Satisfiable(start, end.min(size - 1)),
            _ => RangeSpec::Ignore,
        },
    }
}

/// Respond with a resolved file.
pub fn respond_file(request: Request, served: ServedFile) -> Result<()> {
    let ServedFile {
        info,
        mut file,
        etag,
        content_type,
        ..
    } = served;

    let modified = info.unix_modified();
    let plan = Conditions::from_request(&request).plan(&etag, modified, info.size);

    let mut headers = vec![
        header("ETag", &etag)?,
        header("Accept-Ranges", "bytes")?,
    ];
    if let Some(date) = DateTimeUtc::from_unix(modified) {
        headers.push(header("Last-Modified", date.to_rfc2822())?);
    }

    match plan {
        Plan::NotModified => {
            let response = with_headers(Response::empty(StatusCode(304)), headers);
            request.respond(response)?;
        }
        Plan::Unsatisfiable => {
            headers.push(header("Content-Range", format!("bytes */{}", info.size))?);
            let response = with_headers(Response::empty(StatusCode(416)), headers);
            request.respond(response)?;
        }
        Plan::Full => {
            push_content_type(&mut headers, content_type)?;
            let length = usize::try_from(info.size).ok();
            let response = Response::new(StatusCode(200), headers, file, length, None);
            request.respond(response)?;
        }
        Plan::Partial { start, end } => {
            push_content_type(&mut headers, content_type)?;
            headers.push(header(
                "Content-Range",
                format!("bytes {start}-{end}/{}", info.size),
            )?);

            // Stream the requested range without buffering it
            let length = end - start + 1;
            file.seek(SeekFrom::Start(start))?;
            let reader = file.take(length);
            let response = Response::new(
                StatusCode(206),
                headers,
                reader,
                usize::try_from(length).ok(),
                None,
            );
            request.respond(response)?;
        }
    }
    Ok(())
}

/// Respond to a failed resolution.
///
/// The body is a plain status line; OS error details stay in the log.
/// `not_found_page` replaces the body of 404 responses.
pub fn respond_error(
    request: Request,
    err: &ResolveError,
    not_found_page: Option<(Vec<u8>, &'static str)>,
) -> Result<()> {
    use crate::utils::mime::types::PLAIN;

    let status = err.status();
    let (body, content_type) = match (err, not_found_page) {
        (ResolveError::NotFound, Some(page)) => page,
        _ => (status_line(status).into_bytes(), PLAIN),
    };

    let mut response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(header("Content-Type", content_type)?);
    if matches!(err, ResolveError::MethodNotAllowed) {
        response.add_header(header("Allow", ALLOW)?);
    }
    request.respond(response)?;
    Ok(())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    use crate::utils::mime::types::PLAIN;

    let response = Response::from_data(status_line(503).into_bytes())
        .with_status_code(StatusCode(503))
        .with_header(header("Content-Type", PLAIN)?);
    request.respond(response)?;
    Ok(())
}

fn status_line(status: u16) -> String {
    let reason = StatusCode(status).default_reason_phrase();
    format!("{status} {reason}")
}

fn push_content_type(headers: &mut Vec<Header>, content_type: ContentType) -> Result<()> {
    match content_type {
        ContentType::Set(mime) => headers.push(header("Content-Type", mime)?),
        ContentType::Suppress => headers.push(header("X-Content-Type-Options", "nosniff")?),
        ContentType::Keep => {}
    }
    Ok(())
}

fn with_headers<R: Read>(mut response: Response<R>, headers: Vec<Header>) -> Response<R> {
    for h in headers {
        response.add_header(h);
    }
    response
}

fn header(key: &'static str, value: impl AsRef<[u8]>) -> Result<Header> {
    Header::from_bytes(key, value.as_ref()).map_err(|()| anyhow!("invalid {key} header value"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ETAG: &str = "\"s44we8b\"";
    const MODIFIED: i64 = 1_700_000_000;

    fn plan(conditions: Conditions<'_>, size: u64) -> Plan {
        conditions.plan(ETAG, MODIFIED, size)
    }

    #[test]
    fn test_plain_request_is_full() {
        assert_eq!(plan(Conditions::default(), 11), Plan::Full);
    }

    #[test]
    fn test_if_none_match() {
        for value in [ETAG, "*", "\"other\", \"s44we8b\"", "W/\"s44we8b\""] {
            let conditions = Conditions {
                if_none_match: Some(value),
                ..Conditions::default()
            };
            assert_eq!(plan(conditions, 11), Plan::NotModified, "{value}");
        }

        let conditions = Conditions {
            if_none_match: Some("\"other\""),
            ..Conditions::default()
        };
        assert_eq!(plan(conditions, 11), Plan::Full);
    }

    #[test]
    fn test_if_modified_since() {
        let at = |since| Conditions {
            if_modified_since: Some(since),
            ..Conditions::default()
        };

        // Exactly the mtime, and later
        assert_eq!(plan(at("Tue, 14 Nov 2023 22:13:20 GMT"), 11), Plan::NotModified);
        assert_eq!(plan(at("Wed, 15 Nov 2023 00:00:00 GMT"), 11), Plan::NotModified);
        // Earlier
        assert_eq!(plan(at("Tue, 14 Nov 2023 22:13:19 GMT"), 11), Plan::Full);
        // Unparseable dates are ignored
        assert_eq!(plan(at("yesterday"), 11), Plan::Full);
    }

    #[test]
    fn test_if_none_match_wins_over_date() {
        let conditions = Conditions {
            if_none_match: Some("\"other\""),
            if_modified_since: Some("Wed, 15 Nov 2023 00:00:00 GMT"),
            ..Conditions::default()
        };
        assert_eq!(plan(conditions, 11), Plan::Full);
    }

    #[test]
    fn test_range_plans() {
        let range = |r| Conditions {
            range: Some(r),
            ..Conditions::default()
        };

        assert_eq!(plan(range("bytes=0-4"), 11), Plan::Partial { start: 0, end: 4 });
        assert_eq!(plan(range("bytes=6-"), 11), Plan::Partial { start: 6, end: 10 });
        assert_eq!(plan(range("bytes=-3"), 11), Plan::Partial { start: 8, end: 10 });
        assert_eq!(plan(range("bytes=5-100"), 11), Plan::Partial { start: 5, end: 10 });
        assert_eq!(plan(range("bytes=-100"), 11), Plan::Partial { start: 0, end: 10 });
        assert_eq!(plan(range("bytes=11-"), 11), Plan::Unsatisfiable);
        assert_eq!(plan(range("bytes=-0"), 11), Plan::Unsatisfiable);
        assert_eq!(plan(range("bytes=0-"), 0), Plan::Unsatisfiable);
        assert_eq!(plan(range("bytes=0-1,3-4"), 11), Plan::Full);
        assert_eq!(plan(range("bytes=4-2"), 11), Plan::Full);
        assert_eq!(plan(range("items=0-4"), 11), Plan::Full);
        assert_eq!(plan(range("bytes=a-b"), 11), Plan::Full);
    }

    #[test]
    fn test_not_modified_wins_over_range() {
        let conditions = Conditions {
            if_none_match: Some(ETAG),
            range: Some("bytes=0-4"),
            ..Conditions::default()
        };
        assert_eq!(plan(conditions, 11), Plan::NotModified);
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(404), "404 Not Found");
        assert_eq!(status_line(405), "405 Method Not Allowed");
        assert_eq!(status_line(403), "403 Forbidden");
    }

    mod loopback {
        //! Responses written through a real socket.

        use super::*;
        use crate::fileserver::FileInfo;
        use crate::fileserver::metadata::compute_etag;
        use std::io::{Cursor, Read, Write};
        use std::net::TcpStream;
        use std::path::PathBuf;
        use std::thread;
        use std::time::{Duration, UNIX_EPOCH};
        use tiny_http::Server;

        struct Reply {
            status: u16,
            head: String,
            body: String,
        }

        impl Reply {
            fn header(&self, name: &str) -> Option<&str> {
                self.head.lines().skip(1).find_map(|line| {
                    let (key, value) = line.split_once(':')?;
                    key.eq_ignore_ascii_case(name).then(|| value.trim())
                })
            }
        }

        /// Send `raw` to a one-shot server whose only request goes to `handler`.
        fn exchange(raw: &str, handler: impl FnOnce(Request) -> Result<()> + Send + 'static) -> Reply {
            let server = Server::http("127.0.0.1:0").unwrap();
            let addr = server.server_addr().to_ip().unwrap();
            let worker = thread::spawn(move || {
                let request = server.recv().unwrap();
                handler(request).unwrap();
            });

            let mut stream = TcpStream::connect(addr).unwrap();
            stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
            stream.write_all(raw.as_bytes()).unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).unwrap();
            worker.join().unwrap();

            let (head, body) = response.split_once("\r\n\r\n").unwrap();
            let status = head.split(' ').nth(1).unwrap().parse().unwrap();
            Reply {
                status,
                head: head.to_string(),
                body: body.to_string(),
            }
        }

        fn request(method: &str, extra: &str) -> String {
            format!("{method} /hello HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n{extra}\r\n")
        }

        fn served(name: &str, content_type: ContentType) -> ServedFile {
            let info = FileInfo {
                name: name.to_string(),
                size: 11,
                modified: UNIX_EPOCH + Duration::from_secs(1_700_000_000),
                is_dir: false,
            };
            ServedFile {
                path: PathBuf::from("/site").join(name),
                etag: compute_etag(&info),
                info,
                file: Box::new(Cursor::new(b"hello world".to_vec())),
                content_type,
            }
        }

        #[test]
        fn test_full_body_with_validators() {
            let reply = exchange(&request("GET", ""), |r| {
                respond_file(r, served("hello.txt", ContentType::Set(crate::utils::mime::types::PLAIN)))
            });

            assert_eq!(reply.status, 200);
            assert_eq!(reply.body, "hello world");
            assert_eq!(reply.header("ETag"), Some(ETAG));
            assert_eq!(reply.header("Accept-Ranges"), Some("bytes"));
            assert_eq!(reply.header("Last-Modified"), Some("Tue, 14 Nov 2023 22:13:20 GMT"));
            assert_eq!(reply.header("Content-Type"), Some("text/plain; charset=utf-8"));
        }

        #[test]
        fn test_range_is_streamed() {
            let reply = exchange(&request("GET", "Range: bytes=2-4\r\n"), |r| {
                respond_file(r, served("hello.txt", ContentType::Suppress))
            });

            assert_eq!(reply.status, 206);
            assert_eq!(reply.body, "llo");
            assert_eq!(reply.header("Content-Range"), Some("bytes 2-4/11"));
        }

        #[test]
        fn test_unsatisfiable_range() {
            let reply = exchange(&request("GET", "Range: bytes=20-\r\n"), |r| {
                respond_file(r, served("hello.txt", ContentType::Suppress))
            });

            assert_eq!(reply.status, 416);
            assert_eq!(reply.header("Content-Range"), Some("bytes */11"));
        }

        #[test]
        fn test_unknown_extension_is_nosniff() {
            let reply = exchange(&request("GET", ""), |r| {
                respond_file(r, served("blob.zzz", ContentType::Suppress))
            });

            assert_eq!(reply.status, 200);
            assert_eq!(reply.header("X-Content-Type-Options"), Some("nosniff"));
        }

        #[test]
        fn test_head_sends_no_body() {
            let reply = exchange(&request("HEAD", ""), |r| {
                respond_file(r, served("hello.txt", ContentType::Suppress))
            });

            assert_eq!(reply.status, 200);
            assert_eq!(reply.header("ETag"), Some(ETAG));
            assert!(reply.body.is_empty());
        }

        #[test]
        fn test_not_modified() {
            let extra = format!("If-None-Match: {ETAG}\r\n");
            let reply = exchange(&request("GET", &extra), |r| {
                respond_file(r, served("hello.txt", ContentType::Suppress))
            });

            assert_eq!(reply.status, 304);
            assert!(reply.body.is_empty());
        }

        #[test]
        fn test_method_not_allowed_lists_allowed_methods() {
            let reply = exchange(&request("POST", "Content-Length: 0\r\n"), |r| {
                respond_error(r, &ResolveError::MethodNotAllowed, None)
            });

            assert_eq!(reply.status, 405);
            assert_eq!(reply.header("Allow"), Some("GET, HEAD"));
            assert_eq!(reply.body, "405 Method Not Allowed");
        }

        #[test]
        fn test_not_found_page_replaces_body() {
            let page = (b"<h1>gone</h1>".to_vec(), crate::utils::mime::types::HTML);
            let reply = exchange(&request("GET", ""), move |r| {
                respond_error(r, &ResolveError::NotFound, Some(page))
            });

            assert_eq!(reply.status, 404);
            assert_eq!(reply.body, "<h1>gone</h1>");
            assert_eq!(reply.header("Content-Type"), Some("text/html; charset=utf-8"));
        }
    }
}
