//! Test doubles: a throwaway HTTP/1.1 responder for the source clients and a
//! scripted `PriceSource` for the aggregator and scheduler.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use async_trait::async_trait;

use crate::error::{OracleError, Result};
use crate::types::{PriceSource, Quote};

pub struct StubServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    paths: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// Answer every request with `status` and a JSON `body`
    pub async fn respond(status: u16, body: &str) -> Self {
        Self::spawn(Some((status, body.to_string()))).await
    }

    /// Accept connections but never answer
    pub async fn silent() -> Self {
        Self::spawn(None).await
    }

    async fn spawn(reply: Option<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let paths = Arc::new(Mutex::new(Vec::new()));

        let (task_hits, task_paths) = (hits.clone(), paths.clone());
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let reply = reply.clone();
                let hits = task_hits.clone();
                let paths = task_paths.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }

                    let head = String::from_utf8_lossy(&request);
                    let path = head.split_whitespace().nth(1).unwrap_or_default().to_string();
                    paths.lock().unwrap().push(path);
                    hits.fetch_add(1, Ordering::SeqCst);

                    let Some((status, body)) = reply else {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                        return;
                    };
                    let response = format!(
                        "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self {
            base_url,
            hits,
            paths,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

pub fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder().timeout(timeout).build().unwrap()
}

#[derive(Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Source that replies with a fixed outcome after an optional delay
pub struct StubSource {
    name: &'static str,
    reply: std::result::Result<Quote, u16>,
    delay: Duration,
    calls: CallCounter,
}

impl StubSource {
    pub fn ok(name: &'static str, quote: Quote) -> Self {
        Self {
            name,
            reply: Ok(quote),
            delay: Duration::ZERO,
            calls: CallCounter::default(),
        }
    }

    /// Fails every call with HTTP `status`
    pub fn failing(name: &'static str, status: u16) -> Self {
        Self {
            name,
            reply: Err(status),
            delay: Duration::ZERO,
            calls: CallCounter::default(),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

#[async_trait]
impl PriceSource for StubSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_quote(&self, _symbol: &str) -> Result<Quote> {
        self.calls.0.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        match &self.reply {
            Ok(quote) => Ok(quote.clone()),
            Err(status) => Err(OracleError::HttpStatus {
                provider: self.name,
                status: *status,
            }),
        }
    }
}
