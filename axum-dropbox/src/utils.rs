use http::{HeaderMap, Uri, header::HOST};

/// `{scheme}://{host}/` of the current request.
///
/// `X-Forwarded-Proto` and `X-Forwarded-Host` are only read when
/// `trust_forwarded` is set, any client can send them.
pub(crate) fn host_url(headers: &HeaderMap, uri: &Uri, trust_forwarded: bool) -> String {
    let forwarded = |name| {
        if trust_forwarded {
            header_str(headers, name)
        } else {
            None
        }
    };

    let scheme = uri
        .scheme_str()
        .or_else(|| forwarded("x-forwarded-proto"))
        .unwrap_or("http");

    let host = forwarded("x-forwarded-host")
        .or_else(|| header_str(headers, HOST.as_str()))
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("localhost");

    format!("{scheme}://{host}/")
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok()
}

#[cfg(test)]
mod utils {
    use http::{HeaderMap, HeaderValue, Uri};

    use super::host_url;

    #[test]
    fn host() {
        let uri = Uri::from_static("/dropbox/login");
        assert_eq!(host_url(&HeaderMap::new(), &uri, false), "http://localhost/");

        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("example.com:8080"));
        assert_eq!(host_url(&headers, &uri, false), "http://example.com:8080/");

        let uri = Uri::from_static("https://files.example.com/x");
        assert_eq!(host_url(&HeaderMap::new(), &uri, false), "https://files.example.com/");
    }

    #[test]
    fn forwarded_headers() {
        let uri = Uri::from_static("/dropbox/login");
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("example.com:8080"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("evil.example.org"));

        assert_eq!(host_url(&headers, &uri, false), "http://example.com:8080/");
        assert_eq!(host_url(&headers, &uri, true), "https://evil.example.org/");
    }
}
