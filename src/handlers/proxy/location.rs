//! Interpreting `Location` headers of upstream redirects.

/// Where a redirect points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// An `https://` URL, which the proxy cannot follow.
    Secure,
    /// Another host, with an optional port and the path to request there.
    Host {
        host: String,
        port: Option<String>,
        path: String,
    },
    /// A path on the host that sent the redirect.
    Path(String),
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '?'
}

fn strip_scheme<'a>(location: &'a str, scheme: &str) -> Option<&'a str> {
    let head = location.get(..scheme.len())?;
    if head.eq_ignore_ascii_case(scheme) {
        location.get(scheme.len()..)
    } else {
        None
    }
}

/// Classify a `Location` value.
///
/// Absolute `http://` URLs and scheme-relative `//host` URLs name a host, as
/// does a bare `host/path` whose first segment looks like a host name
/// (contains a dot or a port, or is `localhost`). Anything else without a
/// leading `/` is taken as a path relative to the root.
pub fn parse_location(location: &str) -> RedirectTarget {
    let location = location.trim();

    if strip_scheme(location, "https://").is_some() {
        return RedirectTarget::Secure;
    }
    if let Some(rest) = strip_scheme(location, "http://").or_else(|| location.strip_prefix("//")) {
        return split_authority(rest);
    }
    if location.starts_with('/') {
        return RedirectTarget::Path(location.to_string());
    }

    let first_segment = location.split(is_separator).next().unwrap_or_default();
    if first_segment.contains('.') || first_segment.contains(':') || first_segment == "localhost" {
        return split_authority(location);
    }
    RedirectTarget::Path(format!("/{location}"))
}

fn split_authority(rest: &str) -> RedirectTarget {
    let (authority, path) = match rest.find(is_separator) {
        Some(index) => (&rest[..index], &rest[index..]),
        None => (rest, "/"),
    };
    let path = if path.starts_with('?') {
        format!("/{path}")
    } else {
        path.to_string()
    };

    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            (host, Some(port.to_string()))
        }
        _ => (authority, None),
    };

    if host.is_empty() {
        return RedirectTarget::Path(path);
    }
    RedirectTarget::Host {
        host: host.to_string(),
        port,
        path,
    }
}
