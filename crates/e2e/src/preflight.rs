//! Reachability check for the site under test

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Poll `url` until it answers without a server error or `timeout` runs out.
pub async fn check_reachable(url: &str, timeout: Duration) -> E2eResult<()> {
    let client = client_builder().build()?;
    poll(&client, url, timeout).await
}

fn client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent(concat!("sport-e2e/", env!("CARGO_PKG_VERSION")))
}

async fn poll(client: &reqwest::Client, url: &str, timeout: Duration) -> E2eResult<()> {
    let start = Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match client.get(url).send().await {
            Ok(resp) if !resp.status().is_server_error() => {
                info!("{} is reachable ({})", url, resp.status());
                return Ok(());
            }
            Ok(resp) => {
                warn!("Reachability check returned {}", resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for {} to respond...", url);
                }
                if !e.is_connect() {
                    warn!("Reachability check error: {}", e);
                }
            }
        }

        if start.elapsed() >= timeout {
            return Err(E2eError::SiteUnreachable {
                url: url.to_string(),
                attempts,
            });
        }
        sleep(Duration::from_millis(500)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn check(url: &str, timeout: Duration) -> E2eResult<()> {
        let client = client_builder().no_proxy().build().unwrap();
        poll(&client, url, timeout).await
    }

    async fn serve_once(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!("{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n", status_line);
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{}/sport", addr)
    }

    #[tokio::test]
    async fn test_reachable_site() {
        let url = serve_once("HTTP/1.1 200 OK").await;
        check(&url, Duration::from_secs(2)).await.unwrap();
    }

    #[tokio::test]
    async fn test_not_found_still_counts_as_reachable() {
        let url = serve_once("HTTP/1.1 404 Not Found").await;
        check(&url, Duration::from_secs(2)).await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_is_unreachable() {
        let url = serve_once("HTTP/1.1 503 Service Unavailable").await;
        let err = check(&url, Duration::ZERO).await.unwrap_err();
        assert!(matches!(err, E2eError::SiteUnreachable { attempts: 1, .. }));
    }

    #[tokio::test]
    async fn test_refused_connection_is_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let err = check(&url, Duration::from_millis(100)).await.unwrap_err();
        assert!(err.is_environmental());
    }
}
