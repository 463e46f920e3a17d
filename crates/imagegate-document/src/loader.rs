// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image loader — resolves a locator to a ready-to-use pixel decoder.

use imagegate_core::config::GateConfig;
use imagegate_core::error::Result;
use imagegate_core::types::{Opacity, ResourceLocator, SessionKey};
use imagegate_fetch::{RemoteFetcher, TransportSettings, TrustCheck};
use tracing::{info, instrument};

use crate::image::decoder::PixelDecoder;

/// Opens local images directly and remote images through the trust-gated
/// fetcher. Fetched bytes stay in memory and are dropped with the decoder.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    fetcher: RemoteFetcher,
}

impl ImageLoader {
    pub fn new(fetcher: RemoteFetcher) -> Self {
        Self { fetcher }
    }

    /// Loader whose trust list and transport settings come from `config`.
    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(RemoteFetcher::new(TransportSettings::from_config(config)))
    }

    pub fn fetcher(&self) -> &RemoteFetcher {
        &self.fetcher
    }

    /// Build a decoder for `locator`.
    ///
    /// Remote images are decoded with the format named by the response's
    /// `Content-Type`; an unrecognised type fails as `UnsupportedFormat`.
    #[instrument(skip_all, fields(locator = %locator.redacted()))]
    pub fn open(
        &self,
        locator: &ResourceLocator,
        opacity: Opacity,
        session_key: Option<&SessionKey>,
        check: TrustCheck,
    ) -> Result<PixelDecoder> {
        match locator {
            ResourceLocator::Local(path) => PixelDecoder::open(path, opacity),
            ResourceLocator::Remote(url) => {
                let fetched = self.fetcher.fetch(url, session_key, check)?;
                let decoder =
                    PixelDecoder::from_bytes(fetched.bytes, fetched.format, url.as_str(), opacity)?;
                let (width, height) = decoder.original_dimensions();
                info!(width, height, "remote image decoded");
                Ok(decoder)
            }
        }
    }
}

impl Default for ImageLoader {
    /// A loader that trusts no remote host.
    fn default() -> Self {
        Self::new(RemoteFetcher::new(TransportSettings::default()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use imagegate_core::error::ImageGateError;
    use imagegate_security::{TrustList, TrustPolicy};

    use super::*;
    use crate::fixtures;

    /// Answer one HTTP request on loopback with `body` as `content_type`.
    pub(crate) fn serve_once(content_type: &str, body: Vec<u8>) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        let head = format!(
            "HTTP/1.1 200 OK\r\nConnection: close\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\n\r\n",
            body.len()
        );
        let handle = thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
        });
        (base, handle)
    }

    pub(crate) fn trusting_loader(entries: &[&str]) -> ImageLoader {
        let settings = TransportSettings::new(TrustPolicy::fixed(TrustList::new(entries)));
        ImageLoader::new(RemoteFetcher::new(settings))
    }

    #[test]
    fn loads_local_file() {
        fixtures::init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, fixtures::rgb_png(250, 183)).unwrap();

        let locator = ResourceLocator::parse(&path.display().to_string()).unwrap();
        let decoder = ImageLoader::default()
            .open(&locator, Opacity::OPAQUE, None, TrustCheck::Enforce)
            .unwrap();
        assert_eq!(decoder.original_dimensions(), (250, 183));
    }

    #[test]
    fn remote_image_uses_content_type() {
        fixtures::init_tracing();
        let (base, server) = serve_once("image/png", fixtures::rgb_png(20, 10));
        let locator = ResourceLocator::parse(&format!("{base}/chart")).unwrap();

        let mut decoder = trusting_loader(&["*"])
            .open(&locator, Opacity::OPAQUE, None, TrustCheck::Enforce)
            .unwrap();
        assert_eq!((decoder.width(), decoder.height()), (20, 10));
        assert_eq!(decoder.rgb_data().unwrap().len(), 20 * 10 * 3);
        server.join().unwrap();
    }

    #[test]
    fn remote_non_image_is_unsupported() {
        fixtures::init_tracing();
        let (base, server) = serve_once("text/html; charset=utf-8", b"<html></html>".to_vec());
        let locator = ResourceLocator::parse(&format!("{base}/logo.png")).unwrap();

        let err = trusting_loader(&["*"])
            .open(&locator, Opacity::OPAQUE, None, TrustCheck::Enforce)
            .unwrap_err();
        assert!(matches!(err, ImageGateError::UnsupportedFormat { .. }), "{err}");
        server.join().unwrap();
    }

    #[test]
    fn default_loader_refuses_remote_images() {
        fixtures::init_tracing();
        let locator = ResourceLocator::parse("http://images.example.com/logo.png").unwrap();
        let err = ImageLoader::default()
            .open(&locator, Opacity::OPAQUE, None, TrustCheck::Enforce)
            .unwrap_err();
        assert!(matches!(err, ImageGateError::UntrustedSource { .. }), "{err}");
    }

    #[test]
    fn from_config_applies_trust_list() {
        let config = GateConfig::from_json(r#"{"pdfgen_trusted_hosts": "*.splunk.com"}"#).unwrap();
        let loader = ImageLoader::from_config(&config);
        assert_eq!(loader.fetcher().settings().trust.resolve(None).len(), 1);
    }
}
