//! Prefixing root-relative links in proxied HTML.

/// Rewrite root-relative `href`, `src` and CSS `url(` references in `body`
/// so they stay under `prefix`.
///
/// `url(\2f...)` (a CSS-escaped slash) gets the prefix in the same escaped
/// form. Scheme-relative `//host` links are left as they were.
pub fn rewrite_links(body: &str, prefix: &str) -> String {
    if prefix.is_empty() || prefix == "/" {
        return body.to_string();
    }
    let encoded = prefix.replace('/', "\\2f");

    body.replace("href=\"/", &format!("href=\"{prefix}/"))
        .replace("src=\"/", &format!("src=\"{prefix}/"))
        .replace("url(\"/", &format!("url(\"{prefix}/"))
        .replace("url(\\2f", &format!("url({encoded}\\2f"))
        // Undo the prefix on scheme-relative links
        .replace(&format!("href=\"{prefix}//"), "href=\"//")
        .replace(&format!("src=\"{prefix}//"), "src=\"//")
        .replace(&format!("url(\"{prefix}//"), "url(\"//")
        .replace(&format!("url({encoded}\\2f\\2f"), "url(\\2f\\2f")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrites_root_relative_links() {
        let body = r#"<a href="/asdf">x</a><img src="/img.png"><div style='background: url("/bg.png")'>"#;
        assert_eq!(
            rewrite_links(body, "/proxy"),
            r#"<a href="/proxy/asdf">x</a><img src="/proxy/img.png"><div style='background: url("/proxy/bg.png")'>"#
        );
    }

    #[test]
    fn test_keeps_scheme_relative_links() {
        let body = r#"<a href="/asdf"></a><script src="//qwer"></script><a href="//cdn/x">"#;
        assert_eq!(
            rewrite_links(body, "/proxy"),
            r#"<a href="/proxy/asdf"></a><script src="//qwer"></script><a href="//cdn/x">"#
        );
    }

    #[test]
    fn test_encoded_slashes() {
        let body = r"a{background:url(\2f img.png)} b{background:url(\2f\2f cdn)}";
        assert_eq!(
            rewrite_links(body, "/p/q"),
            r"a{background:url(\2fp\2fq\2f img.png)} b{background:url(\2f\2f cdn)}"
        );
    }

    #[test]
    fn test_root_prefix_is_untouched() {
        let body = r#"<a href="/asdf">"#;
        assert_eq!(rewrite_links(body, "/"), body);
        assert_eq!(rewrite_links(body, ""), body);
    }

    #[test]
    fn test_absolute_and_relative_links_untouched() {
        let body = r#"<a href="http://example.test/x"><a href="page.html">"#;
        assert_eq!(rewrite_links(body, "/proxy"), body);
    }
}
