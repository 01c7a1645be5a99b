//! A UCI engine running as a child process.
//!
//! The process is spawned with `kill_on_drop`, so dropping a session on any
//! path (including a cancelled future) terminates the engine. The normal
//! path still sends `quit` and reaps the process.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::error::EngineError;
use crate::evaluator::{Analyzer, AnalyzerLauncher};
use crate::limits::SearchLimits;
use crate::protocol::{
    go_movetime_command, parse_line, position_command, setoption_command, EngineLine,
    ScoreTracker,
};
use crate::score::EngineScore;

/// How to start the engine executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub path: PathBuf,
    pub args: Vec<String>,
    /// `setoption` pairs sent after the handshake.
    pub options: Vec<(String, String)>,
}

impl EngineCommand {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn option(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.options.push((name.into(), value.to_string()));
        self
    }
}

pub struct UciEngine {
    name: String,
    child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
    limits: SearchLimits,
}

impl UciEngine {
    /// Start the engine and complete the `uci` / `isready` handshake.
    pub async fn spawn(command: &EngineCommand, limits: SearchLimits) -> Result<Self, EngineError> {
        let mut child = Command::new(&command.path)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                path: command.path.clone(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(EngineError::Closed)?;
        let stdout = child.stdout.take().ok_or(EngineError::Closed)?;
        let name = command
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| command.path.display().to_string());

        let mut engine = Self {
            name,
            child,
            stdin,
            lines: BufReader::new(stdout).lines(),
            limits,
        };

        if let Err(e) = engine.handshake(&command.options).await {
            engine.kill().await;
            return Err(e);
        }
        debug!(engine = %engine.name, "engine ready");
        Ok(engine)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    async fn handshake(&mut self, options: &[(String, String)]) -> Result<(), EngineError> {
        let budget = self.limits.handshake;

        self.send("uci").await?;
        timeout(budget, self.read_until_uciok())
            .await
            .map_err(|_| EngineError::Timeout {
                stage: "uci",
                after: budget,
            })??;

        for (name, value) in options {
            self.send(&setoption_command(name, value)).await?;
        }
        self.send("ucinewgame").await?;

        self.send("isready").await?;
        timeout(budget, self.read_until_readyok())
            .await
            .map_err(|_| EngineError::Timeout {
                stage: "isready",
                after: budget,
            })?
    }

    async fn read_until_uciok(&mut self) -> Result<(), EngineError> {
        loop {
            match parse_line(&self.next_line().await?) {
                EngineLine::IdName(name) => self.name = name,
                EngineLine::UciOk => return Ok(()),
                _ => {}
            }
        }
    }

    async fn read_until_readyok(&mut self) -> Result<(), EngineError> {
        loop {
            if parse_line(&self.next_line().await?) == EngineLine::ReadyOk {
                return Ok(());
            }
        }
    }

    /// Evaluate the position reached by `moves` from the start position.
    pub async fn search<S: AsRef<str>>(&mut self, moves: &[S]) -> Result<EngineScore, EngineError> {
        self.send(&position_command(moves)).await?;
        self.send(&go_movetime_command(self.limits.move_time_millis()))
            .await?;

        let deadline = self.limits.deadline();
        timeout(deadline, self.read_search())
            .await
            .map_err(|_| EngineError::Timeout {
                stage: "go",
                after: deadline,
            })?
    }

    async fn read_search(&mut self) -> Result<EngineScore, EngineError> {
        let mut tracker = ScoreTracker::default();
        loop {
            match parse_line(&self.next_line().await?) {
                EngineLine::Info(info) => tracker.observe(&info),
                EngineLine::BestMove(_) => return tracker.best().ok_or(EngineError::NoScore),
                _ => {}
            }
        }
    }

    async fn send(&mut self, command: &str) -> Result<(), EngineError> {
        trace!(engine = %self.name, "> {command}");
        self.stdin.write_all(command.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn next_line(&mut self) -> Result<String, EngineError> {
        match self.lines.next_line().await? {
            Some(line) => {
                trace!(engine = %self.name, "< {line}");
                Ok(line)
            }
            None => Err(EngineError::Closed),
        }
    }

    /// Ask the engine to exit and reap it; kill it if it does not comply in time.
    pub async fn quit(&mut self) -> Result<(), EngineError> {
        // The engine may already be gone; the wait below tells us either way.
        let _ = self.send("quit").await;
        match timeout(self.limits.grace, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                debug!(engine = %self.name, %status, "engine exited");
                Ok(())
            }
            Err(_) => {
                warn!(engine = %self.name, "engine ignored quit, killing it");
                self.kill().await;
                Ok(())
            }
        }
    }

    /// Kill the process and reap it.
    pub async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            debug!(engine = %self.name, error = %e, "engine already gone");
        }
    }
}

#[async_trait]
impl Analyzer for UciEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn analyse(&mut self, moves: &[String]) -> Result<EngineScore, EngineError> {
        self.search(moves).await
    }

    async fn shutdown(&mut self) -> Result<(), EngineError> {
        self.quit().await
    }

    async fn abort(&mut self) {
        self.kill().await
    }
}

/// Starts one [`UciEngine`] per game.
#[derive(Debug, Clone)]
pub struct UciLauncher {
    command: EngineCommand,
    limits: SearchLimits,
}

impl UciLauncher {
    pub fn new(command: EngineCommand, limits: SearchLimits) -> Self {
        Self { command, limits }
    }

    pub fn command(&self) -> &EngineCommand {
        &self.command
    }
}

#[async_trait]
impl AnalyzerLauncher for UciLauncher {
    async fn launch(&self) -> Result<Box<dyn Analyzer>, EngineError> {
        let engine = UciEngine::spawn(&self.command, self.limits.clone()).await?;
        Ok(Box::new(engine))
    }
}
