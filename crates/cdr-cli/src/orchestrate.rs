//! Sequential execution of report stages.
//!
//! Stages run one after another with a fixed pause in between. There is no
//! readiness check between stages and a failed stage does not stop the
//! sequence; the outcome records every failure.

use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, info_span};

use cdr_model::Stage;
use cdr_report::{ReportContext, ReportSummary, run_stage};
use cdr_store::TableStore;

#[derive(Debug, Clone, Serialize)]
pub struct StageOutcome {
    pub stage: Stage,
    pub summary: Option<ReportSummary>,
    /// Full error chain of a failed stage.
    pub error: Option<String>,
}

impl StageOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunOutcome {
    pub stages: Vec<StageOutcome>,
}

impl RunOutcome {
    pub fn failures(&self) -> usize {
        self.stages.iter().filter(|stage| !stage.is_success()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

pub fn run_sequence(
    stages: &[Stage],
    delay: Duration,
    ctx: &ReportContext<'_>,
    store: &mut dyn TableStore,
) -> RunOutcome {
    let mut outcome = RunOutcome::default();
    for (idx, stage) in stages.iter().copied().enumerate() {
        if idx > 0 && !delay.is_zero() {
            info!(seconds = delay.as_secs(), next = %stage, "waiting before next stage");
            thread::sleep(delay);
        }
        let span = info_span!("stage", stage = %stage);
        let _guard = span.enter();
        match run_stage(stage, ctx, store) {
            Ok(summary) => {
                info!(
                    input = summary.input_rows,
                    output = summary.output_rows,
                    "stage finished"
                );
                outcome.stages.push(StageOutcome {
                    stage,
                    summary: Some(summary),
                    error: None,
                });
            }
            Err(err) => {
                let message = format!("{err:#}");
                error!(error = %message, "stage failed");
                outcome.stages.push(StageOutcome {
                    stage,
                    summary: None,
                    error: Some(message),
                });
            }
        }
    }
    info!(
        stages = outcome.stages.len(),
        failures = outcome.failures(),
        "sequence complete"
    );
    outcome
}
