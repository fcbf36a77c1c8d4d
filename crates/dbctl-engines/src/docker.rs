//! Containerized client execution
//!
//! Clients run inside `docker run --network=host` so the forwarded
//! 127.0.0.1 port is reachable without installing any database tooling
//! on the host.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Where the client process reads stdin from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StdinSource {
    /// Inherit the terminal (interactive sessions)
    Inherit,
    /// Pipe the given literal text
    Text(String),
    /// Pipe the contents of a local file
    File(PathBuf),
}

/// A fully described client invocation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientInvocation {
    pub image: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub mounts: Vec<(PathBuf, String)>,
    pub tty: bool,
    pub stdin: StdinSource,
}

impl ClientInvocation {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            args: Vec::new(),
            env: Vec::new(),
            mounts: Vec::new(),
            tty: false,
            stdin: StdinSource::Inherit,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Bind-mount a local file read-only at the given container path
    pub fn mount(mut self, source: PathBuf, dest: impl Into<String>) -> Self {
        self.mounts.push((source, dest.into()));
        self
    }

    pub fn tty(mut self, tty: bool) -> Self {
        self.tty = tty;
        self
    }

    pub fn stdin(mut self, stdin: StdinSource) -> Self {
        self.stdin = stdin;
        self
    }

    /// Assemble the full `docker run` argument vector
    pub fn docker_args(&self) -> Vec<String> {
        let mut argv = vec![
            "run".to_string(),
            "--network=host".to_string(),
            "--rm".to_string(),
            "-i".to_string(),
        ];
        if self.tty {
            argv.push("-t".to_string());
        }
        for (key, value) in &self.env {
            argv.push("-e".to_string());
            argv.push(format!("{}={}", key, value));
        }
        for (source, dest) in &self.mounts {
            argv.push("-v".to_string());
            argv.push(format!("{}:{}:ro", source.display(), dest));
        }
        argv.push(self.image.clone());
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Run the client to completion with inherited stdout/stderr
    pub async fn run(&self, docker_bin: &str) -> Result<()> {
        debug!("spawning {} client via {}", self.image, docker_bin);

        let mut cmd = tokio::process::Command::new(docker_bin);
        cmd.args(self.docker_args());

        match &self.stdin {
            StdinSource::Inherit => {
                cmd.stdin(Stdio::inherit());
            }
            StdinSource::Text(_) => {
                cmd.stdin(Stdio::piped());
            }
            StdinSource::File(path) => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("failed to open {}", path.display()))?;
                cmd.stdin(Stdio::from(file));
            }
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn {}", docker_bin))?;

        if let StdinSource::Text(text) = &self.stdin {
            let mut stdin = child.stdin.take().context("client stdin unavailable")?;
            stdin.write_all(text.as_bytes()).await?;
            if !text.ends_with('\n') {
                stdin.write_all(b"\n").await?;
            }
            drop(stdin);
        }

        let status = child.wait().await.context("client process failed")?;
        if !status.success() {
            bail!("client exited with {}", status);
        }
        Ok(())
    }
}

/// Resolve a local file to an absolute path before mounting it
pub fn absolute(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path).with_context(|| format!("cannot resolve {}", path.display()))
}
