//! Locally spawned driver process.

use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::client::WireClient;
use crate::error::WireError;

const READY_ATTEMPTS: u32 = 50;
const READY_INTERVAL: Duration = Duration::from_millis(100);

/// A driver binary started by us; killed on [`DriverProcess::stop`] or drop.
pub struct DriverProcess {
    child: Option<Child>,
    port: u16,
}

impl DriverProcess {
    /// Start `binary --port <port>` and wait until it answers `/status`.
    pub fn spawn(binary: &Path, port: u16) -> Result<Self, WireError> {
        let child = Command::new(binary)
            .arg(format!("--port={port}"))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| WireError::Spawn(format!("{}: {e}", binary.display())))?;
        let mut process = Self {
            child: Some(child),
            port,
        };

        let probe = WireClient::new(&process.url())?;
        for _ in 0..READY_ATTEMPTS {
            if probe.is_ready() {
                debug!("{} listening on port {port}", binary.display());
                return Ok(process);
            }
            thread::sleep(READY_INTERVAL);
        }
        process.stop();
        Err(WireError::Spawn(format!(
            "{} did not become ready on port {port}",
            binary.display()
        )))
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Kill the process and reap it. Idempotent.
    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                warn!("failed to kill driver process: {e}");
            }
            let _ = child.wait();
        }
    }
}

impl Drop for DriverProcess {
    fn drop(&mut self) {
        self.stop();
    }
}
