//! `planexec run`: drive a full plan/execute/replan session.

use planexec_agent::AnswerPolicy;
use planexec_core::event::{DomainEvent, EventBus, preview};
use planexec_core::state::{SessionState, TimeContext};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

pub async fn run(
    objective: String,
    answer: Option<AnswerPolicy>,
    max_rounds: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config()?;
    if let Some(answer) = answer {
        config.session.answer = answer;
    }
    if let Some(max_rounds) = max_rounds {
        config.session.max_rounds = max_rounds;
    }

    let event_bus = Arc::new(EventBus::default());
    let progress = tokio::spawn(render_progress(event_bus.subscribe()));
    let agent = super::build_agent(&config, event_bus.clone())?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, stopping before the next phase...");
            on_interrupt.cancel();
        }
    });

    let result = agent.run(objective, TimeContext::now(), &cancel).await;

    // Closing every sender lets the progress task drain and exit.
    drop(agent);
    drop(event_bus);
    let _ = progress.await;

    match result {
        Ok(outcome) => {
            println!("{}", outcome.answer);
            Ok(())
        }
        Err(failure) => {
            eprintln!("\nSession failed after {} round(s): {}", failure.rounds, failure.error);
            eprint!("{}", diagnostics(&failure.state));
            Err(failure.error.into())
        }
    }
}

async fn render_progress(mut rx: broadcast::Receiver<Arc<DomainEvent>>) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Some(line) = progress_line(&event) {
                    eprintln!("{line}");
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Progress renderer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// One human-readable stderr line per session event.
fn progress_line(event: &DomainEvent) -> Option<String> {
    match event {
        DomainEvent::SessionStarted { objective, .. } => Some(format!("▶ Objective: {objective}")),
        DomainEvent::PlanCreated { steps, .. } => Some(format!("📋 Plan:\n{}", indented(steps))),
        DomainEvent::StepExecuted {
            round,
            task,
            document_task,
            outcome_preview,
            ..
        } => {
            let kind = if *document_task { " [draft]" } else { "" };
            Some(format!(
                "✓ Round {round}{kind}: {task}\n    → {}",
                preview(outcome_preview, 160)
            ))
        }
        DomainEvent::Replanned { round, steps, .. } => {
            Some(format!("↻ Replanned after round {round}:\n{}", indented(steps)))
        }
        DomainEvent::SessionCompleted { rounds, .. } => {
            Some(format!("■ Done after {rounds} round(s)\n"))
        }
        DomainEvent::ToolExecuted {
            tool_name,
            success,
            duration_ms,
            ..
        } => Some(format!(
            "    ⚙ {tool_name} ({}, {duration_ms}ms)",
            if *success { "ok" } else { "failed" }
        )),
        DomainEvent::SessionFailed { .. } | DomainEvent::ResponseGenerated { .. } => None,
    }
}

fn indented(steps: &[String]) -> String {
    if steps.is_empty() {
        return "    (no tasks)".into();
    }
    steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("    {}. {step}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// History and draft accumulated before a failure.
fn diagnostics(state: &SessionState) -> String {
    let mut out = String::new();

    if state.past_steps.is_empty() {
        out.push_str("\nNo tasks were executed.\n");
    } else {
        out.push_str("\nExecuted tasks:\n");
        for (i, step) in state.past_steps.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n     {}\n", i + 1, step.task, step.outcome));
        }
    }

    if !state.plan.is_empty() {
        out.push_str(&format!("\nStill planned:\n{}\n", indented(&state.plan)));
    }

    if let Some(draft) = state.draft.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("\nCurrent draft:\n{draft}\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use planexec_core::state::{PastStep, StateUpdate};

    #[test]
    fn step_line_marks_document_tasks() {
        let line = progress_line(&DomainEvent::StepExecuted {
            session_id: "s".into(),
            round: 2,
            task: "Refine the current draft".into(),
            document_task: true,
            outcome_preview: "Ada Lovelace (1815–1852)".into(),
            timestamp: Utc::now(),
        })
        .unwrap();
        assert!(line.contains("Round 2 [draft]: Refine the current draft"));
        assert!(line.contains("Ada Lovelace"));
    }

    #[test]
    fn token_usage_is_not_rendered() {
        let event = DomainEvent::ResponseGenerated {
            model: "gpt-4o".into(),
            tokens_used: 42,
            timestamp: Utc::now(),
        };
        assert!(progress_line(&event).is_none());
    }

    #[test]
    fn empty_plan_is_labelled() {
        assert_eq!(indented(&[]), "    (no tasks)");
    }

    #[test]
    fn diagnostics_show_history_and_draft() {
        let time = TimeContext::new("2025-03-14", "09:00:00", 2025);
        let mut state = SessionState::new("Write a bio", time);
        state.apply(StateUpdate {
            plan: Some(vec!["Polish the current draft".into()]),
            past_steps: vec![PastStep::new("Generate an initial draft", "Ada was...")],
            draft: Some("Ada was...".into()),
            response: None,
        });

        let text = diagnostics(&state);
        assert!(text.contains("1. Generate an initial draft"));
        assert!(text.contains("Still planned:\n    1. Polish the current draft"));
        assert!(text.contains("Current draft:\nAda was..."));
    }

    #[test]
    fn diagnostics_without_progress() {
        let state = SessionState::new("obj", TimeContext::new("2025-03-14", "09:00:00", 2025));
        let text = diagnostics(&state);
        assert!(text.contains("No tasks were executed."));
        assert!(!text.contains("Current draft"));
    }
}
