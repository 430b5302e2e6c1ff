//! Delegated retrieval through an external program.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::process::Command;

use super::target::DownloadTarget;
use super::traits::Fetcher;
use crate::config::{FETCH_PROGRAM_NO_CHECK_CERT_FLAG, FETCH_PROGRAM_OUTPUT_FLAG};
use crate::error_handling::DownloadError;

/// Exit information from an external program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramExit {
    /// Exit code, or `None` if the process was terminated by a signal.
    pub code: Option<i32>,
}

impl ProgramExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs an external program to completion.
///
/// Arguments are passed as-is, never through a shell.
#[async_trait]
pub trait ProgramRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<ProgramExit>;
}

/// Spawns real processes with `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProgramRunner;

#[async_trait]
impl ProgramRunner for SystemProgramRunner {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<ProgramExit> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(
                "{} stderr: {}",
                program,
                stderr.lines().rev().take(5).collect::<Vec<_>>().join(" | ")
            );
        }

        Ok(ProgramExit {
            code: output.status.code(),
        })
    }
}

/// Hands the transfer to an external program (`wget` by default).
///
/// Success is a zero exit status. A failed run may leave a partial file
/// behind; cleaning it up is left to the operator.
pub struct DelegatedFetcher {
    program: String,
    check_cert: bool,
    runner: Arc<dyn ProgramRunner>,
}

impl DelegatedFetcher {
    pub fn new(program: impl Into<String>, check_cert: bool, runner: Arc<dyn ProgramRunner>) -> Self {
        Self {
            program: program.into(),
            check_cert,
            runner,
        }
    }

    /// Argument list for fetching `target`: output path, optional
    /// certificate bypass, then the source URL.
    pub fn build_args(&self, target: &DownloadTarget) -> Vec<String> {
        let mut args = vec![
            FETCH_PROGRAM_OUTPUT_FLAG.to_string(),
            target.dest.to_string_lossy().to_string(),
        ];
        if !self.check_cert {
            args.push(FETCH_PROGRAM_NO_CHECK_CERT_FLAG.to_string());
        }
        args.push(target.url.clone());
        args
    }
}

#[async_trait]
impl Fetcher for DelegatedFetcher {
    async fn fetch(&self, target: &DownloadTarget) -> Result<(), DownloadError> {
        let args = self.build_args(target);
        debug!("Running {} {}", self.program, args.join(" "));

        let exit = self
            .runner
            .run(&self.program, &args)
            .await
            .map_err(|source| DownloadError::ProgramSpawn {
                program: self.program.clone(),
                source,
            })?;

        if exit.success() {
            Ok(())
        } else {
            if target.dest.exists() {
                warn!(
                    "{} failed and may have left a partial file at {}",
                    self.program,
                    target.dest.display()
                );
            }
            Err(DownloadError::ProgramFailed {
                program: self.program.clone(),
                code: exit.code,
            })
        }
    }

    fn name(&self) -> &'static str {
        "delegated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Records every invocation and answers with a fixed result.
    struct RecordingRunner {
        calls: Mutex<Vec<(String, Vec<String>)>>,
        code: Option<i32>,
        spawn_fails: bool,
    }

    impl RecordingRunner {
        fn exiting(code: Option<i32>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                code,
                spawn_fails: false,
            }
        }
    }

    #[async_trait]
    impl ProgramRunner for RecordingRunner {
        async fn run(&self, program: &str, args: &[String]) -> std::io::Result<ProgramExit> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            if self.spawn_fails {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no such program",
                ));
            }
            Ok(ProgramExit { code: self.code })
        }
    }

    fn target() -> DownloadTarget {
        DownloadTarget {
            url: "https://example.com/a.flac".to_string(),
            dest: PathBuf::from("./incoming/a.flac"),
        }
    }

    #[test]
    fn test_args_without_cert_checking() {
        let fetcher = DelegatedFetcher::new("wget", false, Arc::new(RecordingRunner::exiting(Some(0))));
        assert_eq!(
            fetcher.build_args(&target()),
            vec![
                "-O",
                "./incoming/a.flac",
                "--no-check-certificate",
                "https://example.com/a.flac"
            ]
        );
    }

    #[test]
    fn test_args_with_cert_checking() {
        let fetcher = DelegatedFetcher::new("wget", true, Arc::new(RecordingRunner::exiting(Some(0))));
        assert_eq!(
            fetcher.build_args(&target()),
            vec!["-O", "./incoming/a.flac", "https://example.com/a.flac"]
        );
    }

    #[tokio::test]
    async fn test_zero_exit_is_success() {
        let runner = Arc::new(RecordingRunner::exiting(Some(0)));
        let fetcher = DelegatedFetcher::new("wget", false, runner.clone());

        fetcher.fetch(&target()).await.unwrap();

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "wget");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let fetcher = DelegatedFetcher::new("wget", false, Arc::new(RecordingRunner::exiting(Some(8))));
        let result = fetcher.fetch(&target()).await;
        assert!(matches!(
            result,
            Err(DownloadError::ProgramFailed { code: Some(8), .. })
        ));
    }

    #[tokio::test]
    async fn test_signal_is_failure() {
        let fetcher = DelegatedFetcher::new("wget", false, Arc::new(RecordingRunner::exiting(None)));
        let result = fetcher.fetch(&target()).await;
        assert!(matches!(
            result,
            Err(DownloadError::ProgramFailed { code: None, .. })
        ));
    }

    #[tokio::test]
    async fn test_spawn_failure() {
        let runner = RecordingRunner {
            calls: Mutex::new(Vec::new()),
            code: None,
            spawn_fails: true,
        };
        let fetcher = DelegatedFetcher::new("no-such-fetcher", false, Arc::new(runner));
        let result = fetcher.fetch(&target()).await;
        assert!(matches!(result, Err(DownloadError::ProgramSpawn { .. })));
    }

    #[test]
    fn test_program_exit_success() {
        assert!(ProgramExit { code: Some(0) }.success());
        assert!(!ProgramExit { code: Some(1) }.success());
        assert!(!ProgramExit { code: None }.success());
    }
}
