//! Playwright browser automation
//!
//! A long-lived `node` process runs the embedded bridge script and keeps a
//! single browser page open for the whole scenario. Requests and replies
//! are JSON lines over the child's stdin/stdout.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tracing::{debug, info, warn};

use super::{BrowserLauncher, BrowserOptions, LoadState, PageDriver};
use crate::error::{E2eError, E2eResult};

const BRIDGE_SCRIPT: &str = include_str!("bridge.js");

/// Extra time granted on top of the navigation timeout before the bridge is
/// considered hung.
const RESPONSE_GRACE: Duration = Duration::from_secs(10);

/// Launches browsers through the Playwright Node package
#[derive(Debug, Clone)]
pub struct PlaywrightLauncher {
    /// Directory holding the `playwright` package (usually `./node_modules`)
    node_modules: PathBuf,
}

impl PlaywrightLauncher {
    /// Create a launcher, failing fast when Playwright is not installed.
    pub fn new() -> E2eResult<Self> {
        Self::check_playwright_installed()?;

        let node_modules = std::env::current_dir()?.join("node_modules");
        Ok(Self { node_modules })
    }

    pub fn with_node_modules(mut self, dir: impl Into<PathBuf>) -> Self {
        self.node_modules = dir.into();
        self
    }

    /// Check if Playwright is installed
    pub fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["--no-install", "playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    fn node_path(&self) -> String {
        match std::env::var("NODE_PATH") {
            Ok(existing) if !existing.is_empty() => {
                format!("{}:{}", self.node_modules.display(), existing)
            }
            _ => self.node_modules.display().to_string(),
        }
    }
}

#[async_trait]
impl BrowserLauncher for PlaywrightLauncher {
    async fn launch(&self, options: &BrowserOptions) -> E2eResult<Box<dyn PageDriver>> {
        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("bridge.js");
        std::fs::write(&script_path, BRIDGE_SCRIPT)?;

        debug!("Starting Playwright bridge: {}", script_path.display());

        let child = TokioCommand::new("node")
            .arg(&script_path)
            .env("NODE_PATH", self.node_path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| E2eError::Bridge(format!("failed to spawn node: {}", e)))?;

        let mut page = PlaywrightPage::attach(
            child,
            options.navigation_timeout + RESPONSE_GRACE,
            script_dir,
        )?;

        page.request(BridgeCommand::Launch {
            browser: options.browser.as_str().to_string(),
            headless: options.headless,
            width: options.viewport.width,
            height: options.viewport.height,
            navigation_timeout_ms: options.navigation_timeout.as_millis() as u64,
        })
        .await?;

        info!(
            "Launched {} (headless: {})",
            options.browser, options.headless
        );
        Ok(Box::new(page))
    }
}

/// Requests understood by the bridge script
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum BridgeCommand {
    Launch {
        browser: String,
        headless: bool,
        width: u32,
        height: u32,
        navigation_timeout_ms: u64,
    },
    Goto {
        url: String,
    },
    WaitForLoadState {
        state: LoadState,
    },
    WaitForTimeout {
        ms: u64,
    },
    Count {
        selector: String,
    },
    ClickFirst {
        selector: String,
    },
    FillFirst {
        selector: String,
        value: String,
    },
    PressFirst {
        selector: String,
        key: String,
    },
    KeyboardPress {
        key: String,
    },
    InnerTexts {
        selector: String,
    },
    Title,
    CurrentUrl,
    Screenshot {
        path: String,
        full_page: bool,
    },
    Close,
}

#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    id: u64,
    #[serde(flatten)]
    command: &'a BridgeCommand,
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    id: Option<u64>,
    ok: bool,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

/// An open Playwright page behind the bridge process
pub struct PlaywrightPage {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    response_timeout: Duration,
    closed: bool,
    _script_dir: tempfile::TempDir,
}

impl PlaywrightPage {
    /// Take over a spawned bridge process. Its stdin and stdout must be piped;
    /// stderr, if piped, is forwarded to the debug log.
    fn attach(
        mut child: Child,
        response_timeout: Duration,
        script_dir: tempfile::TempDir,
    ) -> E2eResult<Self> {
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Bridge("bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Bridge("bridge stdout unavailable".to_string()))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(target: "sport_e2e::bridge", "{}", line);
                }
            });
        }

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 0,
            response_timeout,
            closed: false,
            _script_dir: script_dir,
        })
    }

    async fn request(&mut self, command: BridgeCommand) -> E2eResult<serde_json::Value> {
        if self.closed {
            return Err(E2eError::NoBrowserSession);
        }

        self.next_id += 1;
        let id = self.next_id;
        let mut line = serde_json::to_string(&BridgeRequest {
            id,
            command: &command,
        })?;
        line.push('\n');

        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| E2eError::Bridge(format!("write failed: {}", e)))?;
        self.stdin.flush().await?;

        loop {
            let next = tokio::time::timeout(self.response_timeout, self.stdout.next_line())
                .await
                .map_err(|_| E2eError::Timeout(format!("bridge reply to {:?}", command)))??;

            let Some(raw) = next else {
                return Err(E2eError::Bridge("bridge process exited".to_string()));
            };

            let response: BridgeResponse = match serde_json::from_str(&raw) {
                Ok(response) => response,
                Err(_) => {
                    debug!(target: "sport_e2e::bridge", "{}", raw);
                    continue;
                }
            };

            if response.id.is_some() && response.id != Some(id) {
                warn!("Discarding stale bridge reply {:?}", response.id);
                continue;
            }

            if !response.ok {
                return Err(E2eError::Playwright(
                    response.error.unwrap_or_else(|| "unknown error".to_string()),
                ));
            }
            return Ok(response.value);
        }
    }

    async fn request_unit(&mut self, command: BridgeCommand) -> E2eResult<()> {
        self.request(command).await.map(|_| ())
    }

    /// Stop the bridge process, escalating from SIGTERM to kill.
    async fn stop_process(&mut self) {
        if let Ok(Ok(_)) = tokio::time::timeout(Duration::from_secs(2), self.child.wait()).await {
            return;
        }

        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = self.child.id() {
                if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok() {
                    if let Ok(Ok(_)) =
                        tokio::time::timeout(Duration::from_millis(500), self.child.wait()).await
                    {
                        return;
                    }
                }
            }
        }

        let _ = self.child.kill().await;
    }
}

#[async_trait]
impl PageDriver for PlaywrightPage {
    async fn goto(&mut self, url: &str) -> E2eResult<()> {
        debug!("goto {}", url);
        self.request_unit(BridgeCommand::Goto {
            url: url.to_string(),
        })
        .await
    }

    async fn wait_for_load_state(&mut self, state: LoadState) -> E2eResult<()> {
        self.request_unit(BridgeCommand::WaitForLoadState { state })
            .await
    }

    async fn wait_for_timeout(&mut self, duration: Duration) -> E2eResult<()> {
        self.request_unit(BridgeCommand::WaitForTimeout {
            ms: duration.as_millis() as u64,
        })
        .await
    }

    async fn count(&mut self, selector: &str) -> E2eResult<usize> {
        let value = self
            .request(BridgeCommand::Count {
                selector: selector.to_string(),
            })
            .await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| E2eError::Bridge(format!("count returned {}", value)))
    }

    async fn click_first(&mut self, selector: &str) -> E2eResult<()> {
        self.request_unit(BridgeCommand::ClickFirst {
            selector: selector.to_string(),
        })
        .await
    }

    async fn fill_first(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        self.request_unit(BridgeCommand::FillFirst {
            selector: selector.to_string(),
            value: value.to_string(),
        })
        .await
    }

    async fn press_first(&mut self, selector: &str, key: &str) -> E2eResult<()> {
        self.request_unit(BridgeCommand::PressFirst {
            selector: selector.to_string(),
            key: key.to_string(),
        })
        .await
    }

    async fn keyboard_press(&mut self, key: &str) -> E2eResult<()> {
        self.request_unit(BridgeCommand::KeyboardPress {
            key: key.to_string(),
        })
        .await
    }

    async fn inner_texts(&mut self, selector: &str) -> E2eResult<Vec<String>> {
        let value = self
            .request(BridgeCommand::InnerTexts {
                selector: selector.to_string(),
            })
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn title(&mut self) -> E2eResult<String> {
        let value = self.request(BridgeCommand::Title).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn current_url(&mut self) -> E2eResult<String> {
        let value = self.request(BridgeCommand::CurrentUrl).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn screenshot(&mut self, path: &Path, full_page: bool) -> E2eResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.request_unit(BridgeCommand::Screenshot {
            path: path.to_string_lossy().to_string(),
            full_page,
        })
        .await
    }

    async fn close(&mut self) -> E2eResult<()> {
        if self.closed {
            return Ok(());
        }

        let result = self.request_unit(BridgeCommand::Close).await;
        self.closed = true;
        self.stop_process().await;

        if let Err(e) = &result {
            warn!("Browser did not close cleanly: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let command = BridgeCommand::FillFirst {
            selector: r#"input[type="search"]"#.to_string(),
            value: "Sport in 2023".to_string(),
        };
        let json = serde_json::to_value(BridgeRequest {
            id: 7,
            command: &command,
        })
        .unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["action"], "fill_first");
        assert_eq!(json["selector"], r#"input[type="search"]"#);
        assert_eq!(json["value"], "Sport in 2023");
    }

    #[test]
    fn test_unit_command_wire_format() {
        let json = serde_json::to_value(BridgeRequest {
            id: 1,
            command: &BridgeCommand::Close,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "id": 1, "action": "close" }));
    }

    #[test]
    fn test_response_parsing() {
        let ok: BridgeResponse =
            serde_json::from_str(r#"{"id":3,"ok":true,"value":12,"error":null}"#).unwrap();
        assert!(ok.ok);
        assert_eq!(ok.value.as_u64(), Some(12));

        let failed: BridgeResponse =
            serde_json::from_str(r#"{"id":4,"ok":false,"value":null,"error":"Timeout 30000ms exceeded"}"#)
                .unwrap();
        assert!(!failed.ok);
        assert_eq!(failed.error.as_deref(), Some("Timeout 30000ms exceeded"));
    }

    #[test]
    fn test_bridge_script_handles_every_command() {
        for action in [
            "launch",
            "goto",
            "wait_for_load_state",
            "wait_for_timeout",
            "count",
            "click_first",
            "fill_first",
            "press_first",
            "keyboard_press",
            "inner_texts",
            "title",
            "current_url",
            "screenshot",
            "close",
        ] {
            assert!(
                BRIDGE_SCRIPT.contains(&format!("case '{}'", action)),
                "bridge.js is missing '{}'",
                action
            );
        }
    }

    /// A page whose bridge is a shell script answering on stdout.
    #[cfg(unix)]
    fn scripted_page(script: &str, response_timeout: Duration) -> PlaywrightPage {
        let child = TokioCommand::new("sh")
            .args(["-c", script])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .unwrap();
        PlaywrightPage::attach(child, response_timeout, tempfile::tempdir().unwrap()).unwrap()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_noise_and_stale_replies_are_skipped() {
        let mut page = scripted_page(
            r#"read line
echo 'Debugger listening'
echo '{"id":99,"ok":true,"value":0}'
echo '{"id":1,"ok":true,"value":7}'
read line"#,
            Duration::from_secs(5),
        );

        assert_eq!(page.count("h3, h2").await.unwrap(), 7);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_error_reply_maps_to_playwright_error() {
        let mut page = scripted_page(
            r#"read line
echo '{"id":1,"ok":false,"value":null,"error":"Timeout 30000ms exceeded"}'
read line"#,
            Duration::from_secs(5),
        );

        let err = page.goto("https://www.bbc.com/sport").await.unwrap_err();
        assert!(matches!(err, E2eError::Playwright(ref m) if m.contains("30000ms")), "{err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_bridge_exit_is_reported() {
        let mut page = scripted_page("read line; exit 0", Duration::from_secs(5));

        let err = page.title().await.unwrap_err();
        assert!(matches!(err, E2eError::Bridge(ref m) if m == "bridge process exited"), "{err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_silent_bridge_times_out() {
        let mut page = scripted_page("read line; sleep 5", Duration::from_millis(100));

        let err = page.current_url().await.unwrap_err();
        assert!(matches!(err, E2eError::Timeout(_)), "{err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut page = scripted_page(
            r#"read line
echo '{"id":1,"ok":true,"value":null}'"#,
            Duration::from_secs(5),
        );

        page.close().await.unwrap();
        page.close().await.unwrap();
        assert!(page.child.try_wait().unwrap().is_some());
        assert!(matches!(
            page.count("h3").await,
            Err(E2eError::NoBrowserSession)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_lingering_bridge_gets_sigterm() {
        let mut page = scripted_page(
            r#"trap 'exit 7' TERM
read line
echo '{"id":1,"ok":true,"value":null}'
while true; do sleep 0.1; done"#,
            Duration::from_secs(5),
        );

        page.close().await.unwrap();
        let status = page.child.try_wait().unwrap().unwrap();
        assert_eq!(status.code(), Some(7));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_bridge_ignoring_sigterm_is_killed() {
        let mut page = scripted_page(
            r#"trap '' TERM
read line
echo '{"id":1,"ok":true,"value":null}'
while true; do sleep 0.1; done"#,
            Duration::from_secs(5),
        );

        page.close().await.unwrap();
        let status = page.child.try_wait().unwrap().unwrap();
        assert_eq!(status.code(), None);
    }

    #[test]
    fn test_node_path_prepends_node_modules() {
        let launcher = PlaywrightLauncher {
            node_modules: PathBuf::from("/work/node_modules"),
        };
        assert!(launcher.node_path().starts_with("/work/node_modules"));
    }
}
