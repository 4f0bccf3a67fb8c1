// crates/toolwire-cli/src/evaluation.rs
// ============================================================================
// Module: Evaluation Runner
// Description: Out-of-process evaluation command contract and prompt cases.
// Purpose: Run an external evaluator over a session and capture its output.
// Dependencies: tokio (process, time), toolwire-config
// ============================================================================

//! ## Overview
//! Evaluation is a batch collaborator outside the request path. The runner
//! builds `<program> eval run [--agent-id <id>] --session-id <sid>
//! --evaluator <name>...`, waits for it under a timeout, and returns the exit
//! code with captured output. A missing program or an expired timeout is an
//! [`EvaluationOutcome`], not an error. Results are reported, never stored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use toolwire_config::EvaluationConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable carrying the region to the evaluator.
const REGION_ENV: &str = "AWS_REGION";

// ============================================================================
// SECTION: Prompt Cases
// ============================================================================

/// A prompt sent to the agent before evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationCase {
    /// Case label.
    pub name: &'static str,
    /// Prompt text.
    pub prompt: &'static str,
    /// Tool the agent is expected to select.
    pub expected_tool: &'static str,
}

/// Builtin prompt cases exercising each tool.
const DEFAULT_CASES: [EvaluationCase; 5] = [
    EvaluationCase {
        name: "Statistics Tool Usage",
        prompt: "Calculate statistics for these numbers: 10, 20, 30, 40, 50",
        expected_tool: "calculate_statistics",
    },
    EvaluationCase {
        name: "Compound Interest Tool",
        prompt: "If I invest $1000 at 5% annual interest for 2 years compounded monthly, how \
                 much will I have?",
        expected_tool: "compound_interest",
    },
    EvaluationCase {
        name: "Text Analysis Tool",
        prompt: "Analyze this text for me: 'The quick brown fox jumps over the lazy dog. This is \
                 a test sentence.'",
        expected_tool: "text_analyzer",
    },
    EvaluationCase {
        name: "Tool Selection - Math",
        prompt: "What's the standard deviation of: 100, 150, 200, 250, 300?",
        expected_tool: "calculate_statistics",
    },
    EvaluationCase {
        name: "Tool Selection - Finance",
        prompt: "How much interest will I earn on $5000 at 4% for 3 years?",
        expected_tool: "compound_interest",
    },
];

/// Returns the builtin prompt cases.
#[must_use]
pub const fn default_cases() -> &'static [EvaluationCase] {
    &DEFAULT_CASES
}

// ============================================================================
// SECTION: Command Contract
// ============================================================================

/// One evaluation run over a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationCommand {
    /// Evaluator program.
    pub program: String,
    /// Optional agent identifier.
    pub agent_id: Option<String>,
    /// Session to evaluate.
    pub session_id: String,
    /// Evaluator names, passed in order.
    pub evaluators: Vec<String>,
    /// Optional region exported to the evaluator environment.
    pub region: Option<String>,
    /// Wall-clock limit for the run.
    pub timeout: Duration,
}

/// Captured result of an evaluation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationOutcome {
    /// Process exit code; `None` when the process did not exit normally.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error, or the launch failure description.
    pub stderr: String,
    /// Whether the timeout expired.
    pub timed_out: bool,
}

impl EvaluationOutcome {
    /// Returns true when the evaluator exited with code zero.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self.exit_code, Some(0)) && !self.timed_out
    }

    /// Builds an outcome for a run that never produced an exit status.
    fn aborted(stderr: String, timed_out: bool) -> Self {
        Self {
            exit_code: None,
            stdout: String::new(),
            stderr,
            timed_out,
        }
    }
}

impl EvaluationCommand {
    /// Builds a command from configuration for `session_id`.
    #[must_use]
    pub fn from_config(config: &EvaluationConfig, session_id: &str) -> Self {
        Self {
            program: config.program.clone(),
            agent_id: config.agent_id.clone(),
            session_id: session_id.to_string(),
            evaluators: config.evaluators.clone(),
            region: None,
            timeout: config.timeout(),
        }
    }

    /// Returns the argument list passed to the program.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["eval".to_string(), "run".to_string()];
        if let Some(agent_id) = &self.agent_id {
            args.push("--agent-id".to_string());
            args.push(agent_id.clone());
        }
        args.push("--session-id".to_string());
        args.push(self.session_id.clone());
        for evaluator in &self.evaluators {
            args.push("--evaluator".to_string());
            args.push(evaluator.clone());
        }
        args
    }

    /// Runs the evaluator and captures its output.
    pub async fn run(&self) -> EvaluationOutcome {
        let mut command = Command::new(&self.program);
        command
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(region) = &self.region {
            command.env(REGION_ENV, region);
        }
        let child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                let message = format!("failed to launch {}: {err}", self.program);
                return EvaluationOutcome::aborted(message, false);
            }
        };
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => EvaluationOutcome {
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                timed_out: false,
            },
            Ok(Err(err)) => {
                EvaluationOutcome::aborted(format!("evaluation wait failed: {err}"), false)
            }
            Err(_) => {
                let message = format!("evaluation timed out after {} ms", self.timeout.as_millis());
                EvaluationOutcome::aborted(message, true)
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::dbg_macro,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only evaluation runner assertions."
    )]

    use std::time::Duration;

    use toolwire_config::EvaluationConfig;

    use super::EvaluationCommand;
    use super::default_cases;

    fn command(program: &str) -> EvaluationCommand {
        EvaluationCommand {
            program: program.to_string(),
            agent_id: Some("agent-1".to_string()),
            session_id: "session-abc".to_string(),
            evaluators: vec![
                "Builtin.Correctness".to_string(),
                "Builtin.GoalSuccessRate".to_string(),
            ],
            region: Some("us-west-2".to_string()),
            timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn args_follow_command_contract() {
        assert_eq!(
            command("agentcore").args(),
            vec![
                "eval",
                "run",
                "--agent-id",
                "agent-1",
                "--session-id",
                "session-abc",
                "--evaluator",
                "Builtin.Correctness",
                "--evaluator",
                "Builtin.GoalSuccessRate",
            ]
        );
    }

    #[test]
    fn args_omit_absent_agent_id() {
        let mut command = command("agentcore");
        command.agent_id = None;
        let args = command.args();
        assert!(!args.iter().any(|arg| arg == "--agent-id"));
        assert_eq!(args[2], "--session-id");
    }

    #[test]
    fn from_config_uses_defaults() {
        let command = EvaluationCommand::from_config(&EvaluationConfig::default(), "sid");
        assert_eq!(command.program, "agentcore");
        assert_eq!(command.evaluators.len(), 4);
        assert_eq!(command.session_id, "sid");
        assert_eq!(command.timeout, Duration::from_millis(120_000));
    }

    #[test]
    fn default_cases_cover_every_tool() {
        let cases = default_cases();
        assert_eq!(cases.len(), 5);
        for tool in ["calculate_statistics", "compound_interest", "text_analyzer"] {
            assert!(cases.iter().any(|case| case.expected_tool == tool));
        }
    }

    #[tokio::test]
    async fn missing_program_is_an_outcome() {
        let outcome = command("toolwire-evaluator-that-does-not-exist").run().await;
        assert_eq!(outcome.exit_code, None);
        assert!(!outcome.timed_out);
        assert!(!outcome.succeeded());
        assert!(outcome.stderr.contains("failed to launch"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn echo_program_captures_arguments() {
        let outcome = command("echo").run().await;
        assert!(outcome.succeeded());
        assert_eq!(
            outcome.stdout.trim(),
            "eval run --agent-id agent-1 --session-id session-abc --evaluator Builtin.Correctness \
             --evaluator Builtin.GoalSuccessRate"
        );
    }
}
