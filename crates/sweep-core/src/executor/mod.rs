mod launcher;

pub use launcher::{
    ContainerConfig, DockerLauncher, LAUNCH_FAILURE_EXIT_CODE, ProcessOutcome, RunLauncher,
    capture_process,
};

use crate::domain::{RunDescriptor, RunResult, SweepError, SweepResult};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

pub fn default_worker_count() -> usize {
    std::thread::available_parallelism().map_or(1, |count| count.get())
}

/// Executes every descriptor on a fixed-size worker pool. Results come back
/// in descriptor order and a failed run never aborts its siblings.
pub fn execute_runs(
    descriptors: &[RunDescriptor],
    launcher: &dyn RunLauncher,
    workers: usize,
    show_progress: bool,
) -> SweepResult<Vec<RunResult>> {
    // rayon reads 0 as "pick a size"; reject it so a miscounted pool never
    // passes silently.
    if workers == 0 {
        return Err(SweepError::input_validation(
            "INPUT.WORKER_COUNT",
            "worker count must be at least 1",
        ));
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|source| {
            SweepError::execution(
                "RUN.POOL_BUILD",
                format!("failed to build a pool of {} workers: {}", workers, source),
            )
        })?;

    let progress = if show_progress {
        ProgressBar::new(descriptors.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    progress.set_message("simulating");

    let results: Vec<RunResult> = pool.install(|| {
        descriptors
            .par_iter()
            .map(|descriptor| {
                let result = execute_descriptor(launcher, descriptor);
                progress.inc(1);
                result
            })
            .collect()
    });
    progress.finish_with_message("all runs processed");
    Ok(results)
}

fn execute_descriptor(launcher: &dyn RunLauncher, descriptor: &RunDescriptor) -> RunResult {
    match launcher.launch(descriptor) {
        Ok(outcome) => RunResult {
            run_id: descriptor.run_id,
            exit_code: outcome.exit_code,
            diagnostic: outcome.stderr,
        },
        Err(error) => RunResult {
            run_id: descriptor.run_id,
            exit_code: LAUNCH_FAILURE_EXIT_CODE,
            diagnostic: error.to_string(),
        },
    }
}
