//! Judging engine
//!
//! Runs one solution against every test case of its task, classifies each
//! execution, and reduces the per-test verdicts to a single solution status.
//! Every test always runs; there is no short-circuit on first failure. The
//! ephemeral solution source is the runner's concern and is gone on every
//! exit path.

use tracing::{debug, info};

use crate::comparator::{compare_output, unescape_fixture, OutputMatch};
use crate::runner::{RunOutcome, RunnerError, SolutionRunner};
use crate::store::Task;
use crate::verdict::{SolutionStatus, TestVerdict};

/// Diagnostic signature of a syntax-level failure in the interpreter's
/// stderr. CPython prints this for code that never started executing.
const SYNTAX_FAILURE_SIGNATURE: &str = "SyntaxError";

/// Per-test outcome of one judging pass
#[derive(Debug, Clone)]
pub struct TestOutcome {
    pub test_id: u64,
    pub verdict: TestVerdict,
    pub did_pass: bool,
}

/// Result of judging one solution
#[derive(Debug)]
pub struct JudgeOutcome {
    pub status: SolutionStatus,
    pub test_results: Vec<TestOutcome>,
}

/// Judge a solution against all test cases of `task`
pub async fn judge_solution(
    runner: &dyn SolutionRunner,
    content: &str,
    task: &Task,
) -> Result<JudgeOutcome, RunnerError> {
    let mut test_results = Vec::with_capacity(task.tests.len());

    for test in &task.tests {
        let input = unescape_fixture(&test.input);
        let expected = unescape_fixture(&test.expected);

        let outcome = runner.run(content, &input).await?;
        let verdict = classify(&outcome, &expected);

        debug!("Test {} of task {}: {}", test.id, task.id, verdict);

        test_results.push(TestOutcome {
            test_id: test.id,
            verdict,
            did_pass: verdict == TestVerdict::Okay,
        });
    }

    let status = reduce_verdicts(test_results.iter().map(|r| r.verdict));

    info!(
        "Judged solution for task {}: status={}, tests={}",
        task.id,
        status,
        test_results.len()
    );

    Ok(JudgeOutcome {
        status,
        test_results,
    })
}

/// Map one raw run outcome to a per-test verdict
fn classify(outcome: &RunOutcome, expected: &str) -> TestVerdict {
    match outcome {
        RunOutcome::TimedOut => TestVerdict::TimeExceeded,
        RunOutcome::Failed { stderr } => {
            if stderr.contains(SYNTAX_FAILURE_SIGNATURE) {
                TestVerdict::CompilationError
            } else {
                TestVerdict::RuntimeError
            }
        }
        RunOutcome::Completed { stdout } => match compare_output(stdout, expected) {
            OutputMatch::Exact => TestVerdict::Okay,
            OutputMatch::PresentationMismatch => TestVerdict::PresentationError,
            OutputMatch::Mismatch => TestVerdict::WrongAnswer,
        },
    }
}

/// Reduce per-test verdicts to one solution status by fixed precedence.
/// An explicit ordered list; the first verdict present anywhere in the run
/// wins. A run with no tests reduces to `Correct` (vacuous pass, an
/// inherited quirk kept deliberately; see the zero-test case below).
pub fn reduce_verdicts(verdicts: impl IntoIterator<Item = TestVerdict>) -> SolutionStatus {
    const PRECEDENCE: [(TestVerdict, SolutionStatus); 5] = [
        (TestVerdict::TimeExceeded, SolutionStatus::TimeExceededError),
        (TestVerdict::RuntimeError, SolutionStatus::RuntimeError),
        (TestVerdict::CompilationError, SolutionStatus::CompilationError),
        (TestVerdict::PresentationError, SolutionStatus::PresentationError),
        (TestVerdict::WrongAnswer, SolutionStatus::Incorrect),
    ];

    let verdicts: Vec<TestVerdict> = verdicts.into_iter().collect();
    for (verdict, status) in PRECEDENCE {
        if verdicts.contains(&verdict) {
            return status;
        }
    }
    SolutionStatus::Correct
}
