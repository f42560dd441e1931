use crate::domain::{RunDescriptor, SweepError, SweepResult};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Exit code recorded for runs that never produced one of their own: spawn
/// failures, signal terminations and expired deadlines.
pub const LAUNCH_FAILURE_EXIT_CODE: i32 = -1;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub exit_code: i32,
    pub stderr: String,
}

pub trait RunLauncher: Sync {
    fn launch(&self, descriptor: &RunDescriptor) -> SweepResult<ProcessOutcome>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub runtime: String,
    pub image: String,
    pub workdir: String,
    pub simulator: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            runtime: "docker".to_string(),
            image: "apsq:g4-11.3.2-root-6.32".to_string(),
            workdir: "/pulse_simulation".to_string(),
            simulator: "allpix".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DockerLauncher {
    container: ContainerConfig,
    host_dir: PathBuf,
    timeout: Option<Duration>,
}

impl DockerLauncher {
    pub fn new(
        container: ContainerConfig,
        host_dir: impl Into<PathBuf>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            container,
            host_dir: host_dir.into(),
            timeout,
        }
    }

    fn command(&self, descriptor: &RunDescriptor) -> Command {
        let mut command = Command::new(&self.container.runtime);
        command
            .arg("run")
            .arg("--rm")
            .arg("-w")
            .arg(&self.container.workdir)
            .arg("-v")
            .arg(format!(
                "{}:{}",
                self.host_dir.display(),
                self.container.workdir
            ))
            .arg(&self.container.image)
            .arg(&self.container.simulator)
            .arg("-c")
            .arg(container_path(&self.container.workdir, &descriptor.main_config))
            .arg("-d")
            .arg(container_path(
                &self.container.workdir,
                &descriptor.detector_config,
            ));
        command
    }
}

impl RunLauncher for DockerLauncher {
    fn launch(&self, descriptor: &RunDescriptor) -> SweepResult<ProcessOutcome> {
        let mut command = self.command(descriptor);
        capture_process(&mut command, self.timeout)
    }
}

fn container_path(workdir: &str, config: &Path) -> String {
    format!("{}/{}", workdir, config.display())
}

/// Runs the command to completion, collecting its exit code and stderr. With
/// a deadline set, the child is polled and killed once the deadline expires.
pub fn capture_process(
    command: &mut Command,
    timeout: Option<Duration>,
) -> SweepResult<ProcessOutcome> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());
    let program = command.get_program().to_string_lossy().into_owned();
    match timeout {
        None => {
            let output = command
                .output()
                .map_err(|source| spawn_error(&program, source))?;
            Ok(outcome_from(output.status, output.stderr))
        }
        Some(limit) => run_with_deadline(command, &program, limit),
    }
}

fn run_with_deadline(
    command: &mut Command,
    program: &str,
    limit: Duration,
) -> SweepResult<ProcessOutcome> {
    let mut child = command
        .spawn()
        .map_err(|source| spawn_error(program, source))?;
    // Drained concurrently so a chatty child never blocks on a full pipe
    // while the poll loop waits for it to exit.
    let drain = spawn_stderr_drain(&mut child);
    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let stderr =
                    drain.map_or_else(Vec::new, |handle| handle.join().unwrap_or_default());
                return Ok(outcome_from(status, stderr));
            }
            Ok(None) => {
                if started.elapsed() >= limit {
                    let _ = child.kill();
                    let _ = child.wait();
                    if let Some(handle) = drain {
                        let _ = handle.join();
                    }
                    return Ok(ProcessOutcome {
                        exit_code: LAUNCH_FAILURE_EXIT_CODE,
                        stderr: format!(
                            "run timed out after {:.1}s and was killed",
                            limit.as_secs_f64()
                        ),
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(source) => {
                let _ = child.kill();
                return Err(SweepError::io_system(
                    "IO.RUN_WAIT",
                    format!("failed to poll '{}': {}", program, source),
                ));
            }
        }
    }
}

fn outcome_from(status: ExitStatus, stderr: Vec<u8>) -> ProcessOutcome {
    let stderr = String::from_utf8_lossy(&stderr).into_owned();
    match status.code() {
        Some(exit_code) => ProcessOutcome { exit_code, stderr },
        None => ProcessOutcome {
            exit_code: LAUNCH_FAILURE_EXIT_CODE,
            stderr: if stderr.is_empty() {
                "terminated by signal".to_string()
            } else {
                stderr
            },
        },
    }
}

fn spawn_stderr_drain(child: &mut Child) -> Option<thread::JoinHandle<Vec<u8>>> {
    child.stderr.take().map(|mut stderr| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = stderr.read_to_end(&mut buffer);
            buffer
        })
    })
}

fn spawn_error(program: &str, source: std::io::Error) -> SweepError {
    SweepError::io_system(
        "IO.RUN_SPAWN",
        format!("failed to launch '{}': {}", program, source),
    )
}
