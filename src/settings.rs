//! Service settings loaded from the environment

use anyhow::Context;

/// Runtime settings for the judge service
#[derive(Debug, Clone)]
pub struct Settings {
    /// Address the HTTP API binds to
    pub bind_addr: String,
    /// Interpreter command for solutions, e.g. "python3"
    pub interpreter: Vec<String>,
    /// Suffix for materialized solution sources
    pub source_suffix: String,
    /// Wall-clock limit per test execution in milliseconds
    pub test_timeout_ms: u64,
    /// Path to the contest fixture TOML
    pub fixtures_path: String,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("ARBITER_BIND").unwrap_or_else(|_| "0.0.0.0:8080".into());
        let interpreter_raw =
            std::env::var("ARBITER_INTERPRETER").unwrap_or_else(|_| "python3".into());
        let source_suffix =
            std::env::var("ARBITER_SOURCE_SUFFIX").unwrap_or_else(|_| ".py".into());
        let test_timeout_ms = std::env::var("ARBITER_TEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "10000".into())
            .parse::<u64>()
            .context("Invalid ARBITER_TEST_TIMEOUT_MS")?;
        let fixtures_path =
            std::env::var("ARBITER_FIXTURES").unwrap_or_else(|_| "./files/contest.toml".into());

        let interpreter: Vec<String> = interpreter_raw
            .split_whitespace()
            .map(|s| s.to_string())
            .collect();
        if interpreter.is_empty() {
            anyhow::bail!("ARBITER_INTERPRETER must name an interpreter command");
        }

        Ok(Self {
            bind_addr,
            interpreter,
            source_suffix,
            test_timeout_ms,
            fixtures_path,
        })
    }
}
