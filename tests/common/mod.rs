//! Test helpers for integration tests.
//!
//! Provides a minimal local HTTP server for serving canned feed
//! documents and a builder for RSS fixtures.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve a fixed body as an RSS feed over local HTTP.
///
/// Every request gets the same 200 response; the server accepts
/// connections until the test process ends.
pub async fn serve_feed(body: String) -> SocketAddr {
    serve_raw(body, "200 OK").await
}

/// Serve a fixed HTTP status with the given body.
pub async fn serve_raw(body: String, status: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let body = body.clone();
            tokio::spawn(async move {
                // Drain the request head before answering.
                let mut buf = [0u8; 2048];
                let _ = stream.read(&mut buf).await;

                let response = format!(
                    "HTTP/1.1 {status}\r\n\
                     Content-Type: application/rss+xml\r\n\
                     Content-Length: {}\r\n\
                     Connection: close\r\n\r\n{body}",
                    body.len(),
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    addr
}

/// Build a minimal RSS document with the given (title, link) items.
pub fn feed_xml(items: &[(&str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(title, link)| {
            format!(
                "<item><title>{title}</title><link>{link}</link>\
                 <description>Body</description>\
                 <pubDate>Mon, 02 Jun 2025 00:00:00 GMT</pubDate></item>"
            )
        })
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <rss version=\"2.0\"><channel>\
         <title>Fixture Feed</title>\
         <link>https://example.com</link>\
         <description>Fixture</description>\
         {items}</channel></rss>"
    )
}
