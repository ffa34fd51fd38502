//! Tests for the handler registry and the built-in handlers.

#[cfg(test)]
mod handler_tests {
    use std::collections::VecDeque;
    use std::io::Read;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use flate2::read::GzDecoder;
    use parking_lot::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use crate::config::{parse_str, ConfigBlock};
    use crate::handlers::{
        build_router, create_handler, handler_names, mime_type, normalize_prefix, CompressedFileHandler,
        EchoHandler, HealthHandler, NotFoundHandler, ProxyError, ProxyHandler, ProxyTarget, SleepEchoHandler,
        StaticHandler, StatusHandler, Upstream, UpstreamFuture, DEFAULT_MAX_REDIRECTS,
    };
    use crate::parser::{parse_request, parse_response_head, HttpRequest};
    use crate::server::{
        HttpResponse, HttpServer, RequestHandler, RequestLog, ServerConfig, ServerContext, StatusCode,
        INTERNAL_ERROR_BODY, NOT_FOUND_BODY,
    };

    fn request(raw: &str) -> HttpRequest {
        parse_request(raw.as_bytes()).unwrap()
    }

    fn get(target: &str) -> HttpRequest {
        request(&format!("GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n"))
    }

    fn body(response: &HttpResponse) -> String {
        String::from_utf8(response.body.clone()).unwrap()
    }

    fn block(text: &str) -> ConfigBlock {
        parse_str(text).unwrap()
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("/static/"), "/static");
        assert_eq!(normalize_prefix("/static"), "/static");
        assert_eq!(normalize_prefix("/"), "/");
        assert_eq!(normalize_prefix("echo"), "/echo");
        assert_eq!(normalize_prefix("/a//"), "/a/");
    }

    #[test]
    fn test_registry_builds_every_known_handler() {
        let log = Arc::new(RequestLog::new());
        let config = block("root /tmp; dest example.test; port 80;");
        for name in handler_names() {
            let entry = create_handler("/x/", name, &config, &log).unwrap();
            assert_eq!(entry.prefix, "/x");
            assert_eq!(entry.handler.name(), name);
        }
        assert_eq!(handler_names().count(), 8);
    }

    #[test]
    fn test_unknown_handler_is_skipped() {
        let log = Arc::new(RequestLog::new());
        assert!(create_handler("/x", "TeapotHandler", &ConfigBlock::default(), &log).is_none());
    }

    #[test]
    fn test_build_router_from_config() {
        let config = block(
            "port 8080;\n\
             location /echo/ EchoHandler {}\n\
             location /bogus TeapotHandler {}\n\
             location /short;\n\
             server {\n\
               location /health HealthHandler;\n\
               static { /files /var/www; }\n\
               echo { /echo2; }\n\
             }\n",
        );
        let log = Arc::new(RequestLog::new());
        let router = build_router(&config, &log);

        let table: Vec<(&str, &str)> = router
            .entries()
            .iter()
            .map(|entry| (entry.prefix.as_str(), entry.handler.name()))
            .collect();
        assert_eq!(
            table,
            vec![
                ("/echo", "EchoHandler"),
                ("/health", "HealthHandler"),
                ("/files", "StaticHandler"),
                ("/echo2", "EchoHandler"),
            ]
        );

        let registered = log.handlers();
        assert_eq!(registered.len(), 4);
        assert_eq!(registered[2].prefix, "/files");
        assert_eq!(registered[2].handler, "StaticHandler");
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type(Path::new("a/index.HTML")), "text/html");
        assert_eq!(mime_type(Path::new("style.css")), "text/css");
        assert_eq!(mime_type(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(mime_type(Path::new("archive.zip")), "application/zip");
        assert_eq!(mime_type(Path::new("README")), "text/plain");
    }

    #[tokio::test]
    async fn test_echo_handler() {
        let raw = "GET /echo/hi HTTP/1.1\r\nHost: localhost\r\nUser-Agent: test\r\n\r\n";
        let response = EchoHandler.handle(&request(raw)).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.headers.get("Content-Type"), Some("text/plain"));
        assert_eq!(body(&response), raw);
    }

    #[tokio::test]
    async fn test_sleep_echo_handler_waits() {
        let handler = SleepEchoHandler::new(Duration::from_millis(50));
        let started = Instant::now();
        let response = handler.handle(&get("/sleep")).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(body(&response).starts_with("GET /sleep HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn test_health_and_not_found() {
        let health = HealthHandler.handle(&get("/health")).await.unwrap();
        assert_eq!(health.status, StatusCode::OK);
        assert_eq!(body(&health), "OK");

        let missing = NotFoundHandler.handle(&get("/anything")).await.unwrap();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(body(&missing), NOT_FOUND_BODY);
    }

    #[tokio::test]
    async fn test_status_handler_html_and_json() {
        let log = Arc::new(RequestLog::new());
        log.register_handler("/echo", "EchoHandler");
        log.record("/echo/<b>", 200);
        log.record("/missing", 404);
        let handler = StatusHandler::new(log.clone());

        let html = handler.handle(&get("/status")).await.unwrap();
        let page = body(&html);
        assert_eq!(html.headers.get("Content-Type"), Some("text/html"));
        assert!(page.contains("Total Requests Received: 3"));
        assert!(page.contains("<td>/echo/&lt;b&gt;</td><td>200</td>"));
        assert!(page.contains("<td>/missing</td><td>404</td>"));
        assert!(page.contains("<td>/echo</td><td>EchoHandler</td>"));
        // Newest first
        assert!(page.find("/status").unwrap() < page.find("/missing").unwrap());

        let json_request =
            request("GET /status HTTP/1.1\r\nHost: localhost\r\nAccept: application/json\r\n\r\n");
        let json = handler.handle(&json_request).await.unwrap();
        assert_eq!(json.headers.get("Content-Type"), Some("application/json"));
        let value: serde_json::Value = serde_json::from_slice(&json.body).unwrap();
        assert_eq!(value["total_requests"], 3);
        assert_eq!(value["requests"][0]["target"], "/status");
        assert_eq!(value["requests"][2]["status"], 200);
        assert_eq!(value["handlers"][0]["handler"], "EchoHandler");
    }

    fn static_fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>hello</h1>").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("notes.txt"), "notes ".repeat(200)).unwrap();
        dir
    }

    fn static_config(root: &Path) -> ConfigBlock {
        block(&format!("root \"{}\";", root.display()))
    }

    #[tokio::test]
    async fn test_static_handler_serves_files() {
        let dir = static_fixture();
        let handler = StaticHandler::new("/static", &static_config(dir.path()));

        let index = handler.handle(&get("/static/index.html")).await.unwrap();
        assert_eq!(index.status, StatusCode::OK);
        assert_eq!(index.headers.get("Content-Type"), Some("text/html"));
        assert_eq!(body(&index), "<h1>hello</h1>");

        let nested = handler.handle(&get("/static/sub/notes.txt?version=2")).await.unwrap();
        assert_eq!(nested.status, StatusCode::OK);
        assert_eq!(nested.headers.get("Content-Type"), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_static_handler_not_found_cases() {
        let dir = static_fixture();
        let handler = StaticHandler::new("/static", &static_config(dir.path()));

        for target in ["/static/missing.html", "/static/sub", "/static/", "/static/../etc/passwd", "/static/sub/../index.html"] {
            let response = handler.handle(&get(target)).await.unwrap();
            assert_eq!(response.status, StatusCode::NOT_FOUND, "target {target}");
            assert_eq!(body(&response), NOT_FOUND_BODY);
        }

        let gone = StaticHandler::new("/static", &block("root /definitely/not/here;"));
        let response = gone.handle(&get("/static/index.html")).await.unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_handler_with_file_root() {
        let dir = static_fixture();
        let file = dir.path().join("index.html");
        let handler = StaticHandler::new("/page", &static_config(&file));

        for target in ["/page", "/page/whatever/else"] {
            let response = handler.handle(&get(target)).await.unwrap();
            assert_eq!(response.status, StatusCode::OK);
            assert_eq!(body(&response), "<h1>hello</h1>");
        }
    }

    #[tokio::test]
    async fn test_static_handler_without_root_is_500() {
        let handler = StaticHandler::new("/static", &ConfigBlock::default());
        let response = handler.handle(&get("/static/index.html")).await.unwrap();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(&response), INTERNAL_ERROR_BODY);
    }

    #[tokio::test]
    async fn test_compressed_file_handler() {
        let dir = static_fixture();
        let handler = CompressedFileHandler::new("/c", &static_config(dir.path()));

        let gzip_request =
            request("GET /c/sub/notes.txt HTTP/1.1\r\nHost: localhost\r\nAccept-Encoding: gzip, deflate\r\n\r\n");
        let compressed = handler.handle(&gzip_request).await.unwrap();
        assert_eq!(compressed.status, StatusCode::OK);
        assert_eq!(compressed.headers.get("Content-Encoding"), Some("gzip"));
        assert!(compressed.body.len() < 1200);

        let mut decoded = String::new();
        GzDecoder::new(compressed.body.as_slice()).read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, "notes ".repeat(200));

        let plain = handler.handle(&get("/c/sub/notes.txt")).await.unwrap();
        assert!(plain.headers.get("Content-Encoding").is_none());
        assert_eq!(plain.body.len(), 1200);

        let missing_request =
            request("GET /c/nope HTTP/1.1\r\nHost: localhost\r\nAccept-Encoding: gzip\r\n\r\n");
        let missing = handler.handle(&missing_request).await.unwrap();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert!(missing.headers.get("Content-Encoding").is_none());
    }

    /// Upstream that replays scripted responses and records what it was sent.
    #[derive(Default)]
    struct FakeUpstream {
        responses: Mutex<VecDeque<HttpResponse>>,
        seen: Mutex<Vec<(String, String, HttpRequest)>>,
    }

    impl FakeUpstream {
        fn with(responses: Vec<HttpResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                seen: Mutex::default(),
            })
        }
    }

    impl Upstream for Arc<FakeUpstream> {
        fn send<'a>(&'a self, host: &'a str, port: &'a str, request: &'a HttpRequest) -> UpstreamFuture<'a> {
            self.seen
                .lock()
                .push((host.to_string(), port.to_string(), request.clone()));
            let next = self.responses.lock().pop_front();
            Box::pin(async move { next.ok_or_else(|| ProxyError::Timeout(format!("{host}:{port}"))) })
        }
    }

    fn proxy_config() -> ConfigBlock {
        block("dest \"example.test\"; port 80;")
    }

    fn redirect(status: StatusCode, location: &str) -> HttpResponse {
        HttpResponse::new(status).with_header("Location", location)
    }

    fn html(text: &str) -> HttpResponse {
        HttpResponse::new(StatusCode::OK)
            .with_content_type("text/html; charset=utf-8")
            .with_body_string(text)
    }

    #[test]
    fn test_proxy_target_from_config() {
        let target = ProxyTarget::from_config(&proxy_config()).unwrap();
        assert_eq!(target.host, "example.test");
        assert_eq!(target.port, "80");
        assert_eq!(target.max_redirects, DEFAULT_MAX_REDIRECTS);

        let custom = ProxyTarget::from_config(&block("dest a.test; port 8080; max_redirects 5;")).unwrap();
        assert_eq!(custom.max_redirects, 5);

        assert!(matches!(
            ProxyTarget::from_config(&block("dest a.test;")),
            Err(ProxyError::InvalidConfig(_))
        ));
        assert!(ProxyTarget::from_config(&block("port 80;")).is_err());
    }

    #[tokio::test]
    async fn test_proxy_rewrites_outbound_request() {
        let upstream = FakeUpstream::with(vec![HttpResponse::new(StatusCode::OK).with_body_string("hi")]);
        let handler = ProxyHandler::with_upstream("/proxy", &proxy_config(), upstream.clone());

        let inbound = request(
            "GET /proxy/a/b?q=1 HTTP/1.1\r\nHost: localhost:8080\r\nAccept-Encoding: gzip\r\nUser-Agent: t\r\n\r\n",
        );
        let response = handler.handle(&inbound).await.unwrap();
        assert_eq!(body(&response), "hi");

        let seen = upstream.seen.lock();
        let (host, port, outbound) = &seen[0];
        assert_eq!((host.as_str(), port.as_str()), ("example.test", "80"));
        assert_eq!(outbound.target, "/a/b?q=1");
        assert_eq!(outbound.get_header("Host"), Some("example.test"));
        assert_eq!(outbound.get_header("Accept-Encoding"), Some("identity"));
        assert_eq!(outbound.get_header("User-Agent"), Some("t"));
    }

    #[tokio::test]
    async fn test_proxy_bare_prefix_becomes_root() {
        let upstream = FakeUpstream::with(vec![HttpResponse::new(StatusCode::OK)]);
        let handler = ProxyHandler::with_upstream("/proxy", &proxy_config(), upstream.clone());
        handler.handle(&get("/proxy")).await.unwrap();
        assert_eq!(upstream.seen.lock()[0].2.target, "/");
    }

    #[tokio::test]
    async fn test_proxy_path_redirect_is_reprefixed() {
        let upstream = FakeUpstream::with(vec![redirect(StatusCode::MOVED_PERMANENTLY, "/asdf")]);
        let handler = ProxyHandler::with_upstream("/proxy", &proxy_config(), upstream.clone());

        let response = handler.handle(&get("/proxy/old")).await.unwrap();
        assert_eq!(response.status, StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers.get("Location"), Some("/proxy/asdf"));
        assert_eq!(upstream.seen.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_proxy_rewrites_html_links() {
        let page = r#"<a href="/asdf">a</a><script src="//qwer"></script>"#;
        let upstream = FakeUpstream::with(vec![html(page)]);
        let handler = ProxyHandler::with_upstream("/proxy", &proxy_config(), upstream);

        let response = handler.handle(&get("/proxy/")).await.unwrap();
        assert_eq!(body(&response), r#"<a href="/proxy/asdf">a</a><script src="//qwer"></script>"#);
    }

    #[tokio::test]
    async fn test_proxy_leaves_non_html_alone() {
        let upstream = FakeUpstream::with(vec![HttpResponse::new(StatusCode::OK)
            .with_content_type("application/json")
            .with_body_string(r#"{"href="/x"}"#)]);
        let handler = ProxyHandler::with_upstream("/proxy", &proxy_config(), upstream);
        let response = handler.handle(&get("/proxy/data")).await.unwrap();
        assert_eq!(body(&response), r#"{"href="/x"}"#);
    }

    #[tokio::test]
    async fn test_proxy_at_root_changes_nothing() {
        let page = r#"<a href="/asdf">a</a>"#;
        let upstream = FakeUpstream::with(vec![html(page), redirect(StatusCode::FOUND, "/elsewhere")]);
        let handler = ProxyHandler::with_upstream("/", &proxy_config(), upstream.clone());

        let response = handler.handle(&get("/some/page")).await.unwrap();
        assert_eq!(body(&response), page);
        assert_eq!(upstream.seen.lock()[0].2.target, "/some/page");

        let moved = handler.handle(&get("/old")).await.unwrap();
        assert_eq!(moved.headers.get("Location"), Some("/elsewhere"));
    }

    #[tokio::test]
    async fn test_proxy_https_redirect_returned_unchanged() {
        let upstream = FakeUpstream::with(vec![redirect(StatusCode::FOUND, "https://example.test/login")]);
        let handler = ProxyHandler::with_upstream("/proxy", &proxy_config(), upstream.clone());

        let response = handler.handle(&get("/proxy/login")).await.unwrap();
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.headers.get("Location"), Some("https://example.test/login"));
        assert_eq!(upstream.seen.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_proxy_follows_host_redirects() {
        let upstream = FakeUpstream::with(vec![
            redirect(StatusCode::MOVED_PERMANENTLY, "http://www.example.test:8080/start"),
            redirect(StatusCode::FOUND, "/final"),
            html(r#"<img src="/logo.png">"#),
        ]);
        let handler = ProxyHandler::with_upstream("/proxy", &proxy_config(), upstream.clone());

        let response = handler.handle(&get("/proxy/")).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(body(&response), r#"<img src="/proxy/logo.png">"#);

        let seen = upstream.seen.lock();
        assert_eq!(seen.len(), 3);
        assert_eq!((seen[1].0.as_str(), seen[1].1.as_str()), ("www.example.test", "8080"));
        assert_eq!(seen[1].2.target, "/start");
        assert_eq!(seen[1].2.get_header("Host"), Some("www.example.test:8080"));
        // A path redirect from the other host is followed there
        assert_eq!(seen[2].0, "www.example.test");
        assert_eq!(seen[2].2.target, "/final");
    }

    #[tokio::test]
    async fn test_proxy_redirect_budget() {
        let upstream = FakeUpstream::with(vec![
            redirect(StatusCode::FOUND, "//a.test/1"),
            redirect(StatusCode::FOUND, "//b.test/2"),
            redirect(StatusCode::FOUND, "//c.test/3"),
        ]);
        let handler = ProxyHandler::with_upstream("/proxy", &proxy_config(), upstream.clone());

        let err = handler.forward(&get("/proxy/loop")).await.unwrap_err();
        assert!(matches!(err, ProxyError::TooManyRedirects(2)));
        assert_eq!(upstream.seen.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_proxy_redirect_budget_is_500() {
        let upstream = FakeUpstream::with(vec![
            redirect(StatusCode::FOUND, "//a.test/1"),
            redirect(StatusCode::FOUND, "//b.test/2"),
            redirect(StatusCode::FOUND, "//c.test/3"),
        ]);
        let handler = ProxyHandler::with_upstream("/proxy", &proxy_config(), upstream);
        let response = handler.handle(&get("/proxy/loop")).await.unwrap();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body(&response), INTERNAL_ERROR_BODY);
    }

    #[tokio::test]
    async fn test_proxy_invalid_config_is_500_without_io() {
        let upstream = FakeUpstream::with(vec![HttpResponse::new(StatusCode::OK)]);
        let handler = ProxyHandler::with_upstream("/proxy", &block("port 80;"), upstream.clone());

        for _ in 0..2 {
            let response = handler.handle(&get("/proxy/x")).await.unwrap();
            assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        }
        assert!(upstream.seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_proxy_upstream_failure_is_500() {
        let upstream = FakeUpstream::with(Vec::new());
        let handler = ProxyHandler::with_upstream("/proxy", &proxy_config(), upstream);
        let response = handler.handle(&get("/proxy/x")).await.unwrap();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    /// Accept one connection, check the request, answer with `reply`.
    async fn one_shot_upstream(reply: &'static [u8]) -> (u16, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let task = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut chunk = [0u8; 1024];
            while !received.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&chunk[..n]);
            }
            socket.write_all(reply).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8(received).unwrap()
        });
        (port, task)
    }

    #[tokio::test]
    async fn test_proxy_over_tcp() {
        let (port, upstream) = one_shot_upstream(
            b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\nContent-Length: 20\r\n\r\n<a href=\"/x\">go</a>!",
        )
        .await;
        let config = block(&format!("dest 127.0.0.1; port {port};"));
        let handler = ProxyHandler::new("/up", &config);

        let response = handler.handle(&get("/up/page")).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(body(&response), "<a href=\"/up/x\">go</a>!");
        assert!(!response.need_close());

        let sent = upstream.await.unwrap();
        assert!(sent.starts_with("GET /page HTTP/1.1\r\n"));
        assert!(sent.contains(&format!("Host: 127.0.0.1:{port}\r\n")));
        assert!(sent.contains("Connection: close\r\n"));
    }

    #[tokio::test]
    async fn test_proxy_connection_refused_is_500() {
        // Bind and drop to find a port nobody listens on
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let handler = ProxyHandler::new("/up", &block(&format!("dest 127.0.0.1; port {port};")));
        let response = handler.handle(&get("/up/")).await.unwrap();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    async fn fetch(addr: std::net::SocketAddr, target: &str) -> (u16, String, Duration) {
        let started = Instant::now();
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let raw = format!("GET {target} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(raw.as_bytes()).await.unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        let head_end = response.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
        let head = parse_response_head(&response[..head_end]).unwrap();
        (
            head.status,
            String::from_utf8(response[head_end..].to_vec()).unwrap(),
            started.elapsed(),
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sleeping_handler_does_not_block_echo() {
        let config = block("location /sleep SleepEchoHandler {}\nlocation /echo EchoHandler {}\n");
        let log = Arc::new(RequestLog::new());
        let router = build_router(&config, &log);
        let server = HttpServer::new(ServerConfig::from_config(&config), ServerContext::new(router, log.clone()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { server.serve(Some(listener), None).await });

        let slow = tokio::spawn(fetch(addr, "/sleep"));
        tokio::time::sleep(Duration::from_millis(100)).await;
        let fast = tokio::spawn(fetch(addr, "/echo/now"));

        let (fast_status, fast_body, fast_elapsed) = fast.await.unwrap();
        assert_eq!(fast_status, 200);
        assert!(fast_body.starts_with("GET /echo/now HTTP/1.1\r\n"));
        assert!(fast_elapsed < Duration::from_secs(2), "echo took {fast_elapsed:?}");

        let (slow_status, slow_body, slow_elapsed) = slow.await.unwrap();
        assert_eq!(slow_status, 200);
        assert!(slow_body.starts_with("GET /sleep HTTP/1.1\r\n"));
        assert!(slow_elapsed >= Duration::from_secs(3));
        assert_eq!(log.total(), 2);
    }
}
