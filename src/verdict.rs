//! Verdict types for judged solutions
//!
//! A solution gets exactly one `SolutionStatus` after judging; every test
//! case executed along the way gets its own `TestVerdict` first.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Submission-level status of a solution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionStatus {
    NotEvaluated,
    Correct,
    Incorrect,
    PresentationError,
    CompilationError,
    RuntimeError,
    TimeExceededError,
}

impl SolutionStatus {
    /// Whether judging has produced a terminal status for this solution
    pub fn is_evaluated(&self) -> bool {
        !matches!(self, SolutionStatus::NotEvaluated)
    }
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolutionStatus::NotEvaluated => "not_evaluated",
            SolutionStatus::Correct => "correct",
            SolutionStatus::Incorrect => "incorrect",
            SolutionStatus::PresentationError => "presentation_error",
            SolutionStatus::CompilationError => "compilation_error",
            SolutionStatus::RuntimeError => "runtime_error",
            SolutionStatus::TimeExceededError => "time_exceeded_error",
        };
        write!(f, "{}", s)
    }
}

/// Per-test-case verdict, before reduction to a `SolutionStatus`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestVerdict {
    Okay,
    WrongAnswer,
    PresentationError,
    CompilationError,
    RuntimeError,
    TimeExceeded,
}

impl fmt::Display for TestVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TestVerdict::Okay => "okay",
            TestVerdict::WrongAnswer => "wrong_answer",
            TestVerdict::PresentationError => "presentation_error",
            TestVerdict::CompilationError => "compilation_error",
            TestVerdict::RuntimeError => "runtime_error",
            TestVerdict::TimeExceeded => "time_exceeded",
        };
        write!(f, "{}", s)
    }
}
