// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Blocking HTTP(S) image fetcher.
//
// The trust check runs before any socket is opened. Redirect targets are
// checked against the same trust list from inside the redirect policy, so a
// trusted host cannot bounce the request to an untrusted one.

use std::io::Read;
use std::sync::{Arc, Mutex};

use imagegate_core::error::{ImageGateError, Result};
use imagegate_core::format::ImageFormat;
use imagegate_core::types::{SessionKey, redact_url};
use imagegate_security::{HostTrustEvaluator, TrustList};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::transport::{FETCH_TIMEOUT, TransportSettings, TrustCheck};

/// A successfully retrieved image body.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    /// Format derived from `Content-Type`; [`ImageFormat::Unknown`] when the
    /// header is missing or not a PNG/JPEG type.
    pub format: ImageFormat,
    pub content_type: Option<String>,
    pub status: u16,
}

/// Retrieves remote images after consulting the host trust evaluator.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    settings: TransportSettings,
    evaluator: HostTrustEvaluator,
}

impl RemoteFetcher {
    pub fn new(settings: TransportSettings) -> Self {
        Self::with_evaluator(settings, HostTrustEvaluator::new())
    }

    pub fn with_evaluator(settings: TransportSettings, evaluator: HostTrustEvaluator) -> Self {
        Self {
            settings,
            evaluator,
        }
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    /// Fetch `url` with a single bounded GET.
    ///
    /// # Errors
    ///
    /// * `UntrustedSource` — `check` is [`TrustCheck::Enforce`] and the host,
    ///   or a redirect target, is not trusted.
    /// * `RemoteAccess` — timeout, connection failure, too many redirects, a
    ///   final status outside `200..400`, or a body over `max_bytes`.
    #[instrument(skip_all, fields(url = %redact_url(url), ?check))]
    pub fn fetch(
        &self,
        url: &Url,
        session_key: Option<&SessionKey>,
        check: TrustCheck,
    ) -> Result<FetchedImage> {
        let trust_list = match check {
            TrustCheck::Enforce => {
                let list = self.settings.trust.resolve(session_key);
                if !self.evaluator.evaluate(url, &list).is_trusted() {
                    error!("pdf export encountered untrusted source");
                    return Err(ImageGateError::UntrustedSource {
                        locator: url.to_string(),
                    });
                }
                Some(list)
            }
            TrustCheck::Override => {
                debug!("trust check overridden by caller");
                None
            }
        };

        let denied_redirect: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let client = self.build_client(url, trust_list, denied_redirect.clone())?;

        info!("fetching remote image");
        let response = client.get(url.as_str()).send().map_err(|err| {
            if let Some(target) = take_denied(&denied_redirect) {
                error!(redirect = %target, "redirect to untrusted source refused");
                return ImageGateError::UntrustedSource { locator: target };
            }
            let reason = if err.is_timeout() {
                format!("timed out after {}s", FETCH_TIMEOUT.as_secs())
            } else {
                err.to_string()
            };
            error!(%reason, "remote image request failed");
            ImageGateError::RemoteAccess {
                locator: url.to_string(),
                status: None,
                reason,
            }
        })?;

        let status = response.status().as_u16();
        if !(200..400).contains(&status) {
            error!(status, "remote image returned error status");
            return Err(ImageGateError::RemoteAccess {
                locator: url.to_string(),
                status: Some(status),
                reason: format!("status={status}"),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let format = content_type
            .as_deref()
            .map(ImageFormat::from_content_type)
            .unwrap_or(ImageFormat::Unknown);

        let max_bytes = self.settings.max_bytes;
        let too_large = |size: String| {
            error!(max_bytes, "remote image exceeds size limit");
            ImageGateError::RemoteAccess {
                locator: url.to_string(),
                status: Some(status),
                reason: format!("body of {size} bytes exceeds the {max_bytes} byte limit"),
            }
        };
        if let Some(declared) = response.content_length().filter(|&len| len > max_bytes) {
            return Err(too_large(declared.to_string()));
        }

        let mut bytes = Vec::new();
        response
            .take(max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|err| ImageGateError::RemoteAccess {
                locator: url.to_string(),
                status: Some(status),
                reason: format!("failed to read body: {err}"),
            })?;
        if bytes.len() as u64 > max_bytes {
            return Err(too_large(format!("more than {max_bytes}")));
        }

        info!(status, %format, bytes = bytes.len(), "remote image fetched");
        Ok(FetchedImage {
            bytes,
            format,
            content_type,
            status,
        })
    }

    /// Build a client for one fetch. `trust_list` is `None` when the trust
    /// check is overridden; redirect targets are then followed unchecked.
    fn build_client(
        &self,
        url: &Url,
        trust_list: Option<TrustList>,
        denied_redirect: Arc<Mutex<Option<String>>>,
    ) -> Result<Client> {
        let evaluator = self.evaluator.clone();
        let max_redirects = self.settings.max_redirects;

        let redirect = Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                return attempt.error(format!("more than {max_redirects} redirects"));
            }
            let trusted = trust_list
                .as_ref()
                .is_none_or(|list| evaluator.is_trusted(attempt.url().as_str(), list));
            if !trusted {
                if let Ok(mut slot) = denied_redirect.lock() {
                    *slot = Some(attempt.url().to_string());
                }
                return attempt.error("redirect to untrusted host");
            }
            attempt.follow()
        });

        Client::builder()
            .timeout(FETCH_TIMEOUT)
            .danger_accept_invalid_certs(true)
            .no_proxy()
            .user_agent(self.settings.user_agent.clone())
            .redirect(redirect)
            .build()
            .map_err(|err| ImageGateError::RemoteAccess {
                locator: url.to_string(),
                status: None,
                reason: format!("HTTP client setup failed: {err}"),
            })
    }
}

fn take_denied(slot: &Mutex<Option<String>>) -> Option<String> {
    slot.lock().ok().and_then(|mut guard| guard.take())
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use imagegate_security::TrustPolicy;

    use super::*;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    /// Serve each canned response to one connection, in order, on loopback.
    /// The listener is handed back so callers can check for extra requests.
    fn serve(responses: Vec<Vec<u8>>) -> (String, JoinHandle<TcpListener>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        let handle = thread::spawn(move || {
            for response in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    break;
                };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = stream.write_all(&response);
            }
            listener
        });
        (base, handle)
    }

    fn response(status: &str, headers: &[(&str, &str)], body: &[u8]) -> Vec<u8> {
        let mut out = format!("HTTP/1.1 {status}\r\nConnection: close\r\n");
        for (name, value) in headers {
            out.push_str(&format!("{name}: {value}\r\n"));
        }
        out.push_str(&format!("Content-Length: {}\r\n\r\n", body.len()));
        let mut bytes = out.into_bytes();
        bytes.extend_from_slice(body);
        bytes
    }

    fn settings(entries: &[&str]) -> TransportSettings {
        TransportSettings::new(TrustPolicy::fixed(TrustList::new(entries)))
    }

    fn fetcher(entries: &[&str]) -> RemoteFetcher {
        RemoteFetcher::new(settings(entries))
    }

    fn url(raw: &str) -> Url {
        Url::parse(raw).expect("url")
    }

    #[test]
    fn untrusted_host_fails_before_network() {
        init_tracing();
        // Nothing listens on port 9; a network attempt would be RemoteAccess.
        let err = fetcher(&["*.splunk.com"])
            .fetch(&url("http://127.0.0.1:9/x.png"), None, TrustCheck::Enforce)
            .unwrap_err();
        assert!(matches!(err, ImageGateError::UntrustedSource { .. }), "{err}");
    }

    #[test]
    fn trusted_fetch_reads_body_and_format() {
        init_tracing();
        let body = b"\x89PNG\r\n\x1a\nfake".to_vec();
        let (base, server) = serve(vec![response("200 OK", &[("Content-Type", "image/png")], &body)]);

        let fetched = fetcher(&["*"])
            .fetch(&url(&format!("{base}/logo.png")), None, TrustCheck::Enforce)
            .expect("fetch");
        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.format, ImageFormat::Png);
        assert_eq!(fetched.content_type.as_deref(), Some("image/png"));
        assert_eq!(fetched.bytes, body);
        server.join().unwrap();
    }

    #[test]
    fn unrecognised_content_type_is_unknown() {
        let (base, server) = serve(vec![response("200 OK", &[("Content-Type", "text/html")], b"<html>")]);
        let fetched = fetcher(&["*"])
            .fetch(&url(&format!("{base}/x.png")), None, TrustCheck::Enforce)
            .expect("fetch");
        assert_eq!(fetched.format, ImageFormat::Unknown);
        server.join().unwrap();
    }

    #[test]
    fn error_status_is_remote_access_error() {
        let (base, server) = serve(vec![response("404 Not Found", &[], b"")]);
        let err = fetcher(&["*"])
            .fetch(&url(&format!("{base}/missing.png")), None, TrustCheck::Enforce)
            .unwrap_err();
        assert_eq!(err.http_status(), Some(404));
        assert!(err.to_string().contains("status=404"));
        server.join().unwrap();
    }

    #[test]
    fn override_skips_trust_check() {
        let (base, server) = serve(vec![response("200 OK", &[("Content-Type", "image/jpeg")], b"jpg")]);
        let fetched = fetcher(&[])
            .fetch(&url(&format!("{base}/photo.jpg")), None, TrustCheck::Override)
            .expect("fetch");
        assert_eq!(fetched.format, ImageFormat::Jpg);
        server.join().unwrap();
    }

    #[test]
    fn connection_failure_has_no_status() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let err = fetcher(&[])
            .fetch(&url(&format!("http://127.0.0.1:{port}/x.png")), None, TrustCheck::Override)
            .unwrap_err();
        assert!(matches!(err, ImageGateError::RemoteAccess { status: None, .. }), "{err}");
    }

    #[test]
    fn trusted_redirect_is_followed() {
        let (base, server) = serve(vec![
            response("302 Found", &[("Location", "/final.png")], b""),
            response("200 OK", &[("Content-Type", "image/png")], b"png"),
        ]);
        let fetched = fetcher(&["*"])
            .fetch(&url(&format!("{base}/start.png")), None, TrustCheck::Enforce)
            .expect("fetch");
        assert_eq!(fetched.bytes, b"png");
        server.join().unwrap();
    }

    #[test]
    fn redirect_to_untrusted_host_is_refused() {
        let (base, server) = serve(vec![response(
            "302 Found",
            &[("Location", "http://127.0.0.2:9/evil.png")],
            b"",
        )]);
        let err = fetcher(&["!127.0.0.2", "*"])
            .fetch(&url(&format!("{base}/start.png")), None, TrustCheck::Enforce)
            .unwrap_err();
        match err {
            ImageGateError::UntrustedSource { locator } => {
                assert!(locator.starts_with("http://127.0.0.2:9/"), "{locator}");
            }
            other => panic!("unexpected error variant: {other}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn redirects_stop_at_limit() {
        init_tracing();
        let (base, server) = serve(vec![
            response("302 Found", &[("Location", "/hop-1.png")], b""),
            response("302 Found", &[("Location", "/hop-2.png")], b""),
        ]);
        let mut limited = settings(&["*"]);
        limited.max_redirects = 1;

        let err = RemoteFetcher::new(limited)
            .fetch(&url(&format!("{base}/start.png")), None, TrustCheck::Enforce)
            .unwrap_err();
        assert!(matches!(err, ImageGateError::RemoteAccess { status: None, .. }), "{err}");

        // Both canned responses were consumed and nothing asked for hop 2.
        let listener = server.join().unwrap();
        listener.set_nonblocking(true).unwrap();
        assert!(listener.accept().is_err(), "second redirect must not be requested");
    }

    #[test]
    fn declared_oversize_body_is_refused() {
        let (base, server) = serve(vec![response("200 OK", &[("Content-Type", "image/png")], b"0123456789")]);
        let mut small = settings(&["*"]);
        small.max_bytes = 4;

        let err = RemoteFetcher::new(small)
            .fetch(&url(&format!("{base}/big.png")), None, TrustCheck::Enforce)
            .unwrap_err();
        assert_eq!(err.http_status(), Some(200));
        assert!(err.to_string().contains("exceeds the 4 byte limit"), "{err}");
        server.join().unwrap();
    }

    #[test]
    fn undeclared_oversize_body_is_refused() {
        // No Content-Length: the body runs until the connection closes.
        let raw = b"HTTP/1.1 200 OK\r\nConnection: close\r\nContent-Type: image/png\r\n\r\n0123456789".to_vec();
        let (base, server) = serve(vec![raw]);
        let mut small = settings(&["*"]);
        small.max_bytes = 4;

        let err = RemoteFetcher::new(small)
            .fetch(&url(&format!("{base}/stream.png")), None, TrustCheck::Enforce)
            .unwrap_err();
        assert!(err.to_string().contains("byte limit"), "{err}");
        server.join().unwrap();
    }

    #[test]
    fn body_at_limit_is_accepted() {
        let (base, server) = serve(vec![response("200 OK", &[("Content-Type", "image/png")], b"0123")]);
        let mut exact = settings(&["*"]);
        exact.max_bytes = 4;

        let fetched = RemoteFetcher::new(exact)
            .fetch(&url(&format!("{base}/fits.png")), None, TrustCheck::Enforce)
            .expect("fetch");
        assert_eq!(fetched.bytes, b"0123");
        server.join().unwrap();
    }

    #[test]
    fn client_setup_failure_names_the_locator() {
        let mut broken = settings(&["*"]);
        broken.user_agent = "bad\nagent".into();

        let err = RemoteFetcher::new(broken)
            .fetch(&url("http://127.0.0.1:9/setup.png"), None, TrustCheck::Enforce)
            .unwrap_err();
        assert!(matches!(err, ImageGateError::RemoteAccess { status: None, .. }), "{err}");
        assert!(err.to_string().contains("http://127.0.0.1:9/setup.png"), "{err}");
    }
}
