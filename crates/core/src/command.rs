use crate::error::{CoreError, Result};
use async_trait::async_trait;
use std::{fmt, process::Stdio, time::Duration};
use tokio::process::Command;
use tracing::debug;

/// A program plus its argument list, spawned without a shell
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// `tcpdump --list-interfaces`
    pub fn list_interfaces() -> Self {
        Self::new("tcpdump").arg("--list-interfaces")
    }

    /// `cat /sys/class/net/<iface>/address`
    pub fn mac_address(interface: &str) -> Self {
        Self::new("cat").arg(format!("/sys/class/net/{interface}/address"))
    }

    /// First `model name` line of `/proc/cpuinfo`
    pub fn cpu_model() -> Self {
        Self::new("grep").args(["-m", "1", "model name", "/proc/cpuinfo"])
    }

    /// `MemTotal` line of `/proc/meminfo`
    pub fn total_memory() -> Self {
        Self::new("grep").args(["MemTotal", "/proc/meminfo"])
    }

    /// Whole-disk names and sizes in bytes, no header
    pub fn disk_specs() -> Self {
        Self::new("lsblk").args(["-bdno", "NAME,SIZE"])
    }

    /// Per-core utilization over one 1-second sample
    pub fn cpu_usage() -> Self {
        Self::new("mpstat").args(["-P", "ALL", "1", "1"])
    }

    /// Per-interface traffic over one 1-second sample.
    ///
    /// The adapter list is passed as a single argument, so names never go
    /// through a shell.
    pub fn network_usage(adapters: &[String]) -> Self {
        Self::new("ifstat")
            .arg("-i")
            .arg(adapters.join(","))
            .args(["1", "1"])
    }

    /// Extended device statistics over one 1-second sample
    pub fn disk_usage() -> Self {
        Self::new("iostat").args(["-dxy", "1", "1"])
    }

    /// `free -m`
    pub fn remaining_memory() -> Self {
        Self::new("free").arg("-m")
    }

    /// `cat /proc/uptime`
    pub fn uptime() -> Self {
        Self::new("cat").arg("/proc/uptime")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Runs an external command and hands back its standard output
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Returns stdout exactly as emitted, trailing newline included.
    async fn run(&self, invocation: &Invocation) -> Result<String>;
}

/// Spawns real processes, bounded by a per-invocation timeout
#[derive(Debug, Clone)]
pub struct SystemCommandRunner {
    timeout: Duration,
}

impl SystemCommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, invocation: &Invocation) -> Result<String> {
        debug!(command = %invocation, "Running command");

        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CoreError::process_start(invocation.program.clone(), e))?;

        // Dropping the future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                CoreError::command_timeout(invocation.program.clone(), self.timeout)
            })??;

        if !output.status.success() && output.stdout.is_empty() {
            return Err(CoreError::command_failed(
                invocation.program.clone(),
                output.status,
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
