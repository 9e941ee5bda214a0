//! `loresmith ask` - one question, one answer.

use super::setup;
use loresmith_agent::{AgentResponse, StreamEvent};
use std::io::Write;

pub async fn run(question: &str, stream: bool, trace: bool) -> anyhow::Result<()> {
    let config = setup::load_config()?;
    let agent = setup::build_agent(&config)?;

    if stream {
        stream_question(&agent, question).await?;
        return Ok(());
    }

    let response = agent.smart_ask(question, None).await?;
    // Long observations are abbreviated for the terminal.
    print_response(&response.for_transport(500), trace);
    Ok(())
}

async fn stream_question(agent: &loresmith_agent::Agent, question: &str) -> anyhow::Result<()> {
    let mut rx = agent.ask_stream(question, None).await?;
    let mut stdout = std::io::stdout();

    while let Some(event) = rx.recv().await {
        match event {
            StreamEvent::Iteration { step, max } => {
                eprintln!("[iteration {step}/{max}]");
            }
            StreamEvent::Action { tool, input, .. } => {
                let args = serde_json::to_string(&input).unwrap_or_default();
                eprintln!("-> {tool} {args}");
            }
            StreamEvent::Observation { text, .. } => {
                eprintln!("<- {text}");
            }
            StreamEvent::AnswerToken { token, .. } => {
                write!(stdout, "{token}")?;
                stdout.flush()?;
            }
            StreamEvent::ReflectionResult { suggestion, .. } => {
                eprintln!("\n[reflection] {suggestion}");
            }
            StreamEvent::Meta {
                iterations,
                elapsed_ms,
                tools_used,
                ..
            } => {
                eprintln!(
                    "\n[{iterations} iteration(s), {elapsed_ms} ms, tools: {}]",
                    if tools_used.is_empty() {
                        "none".to_string()
                    } else {
                        tools_used.join(", ")
                    }
                );
            }
            StreamEvent::Error { message, .. } => {
                anyhow::bail!("run failed: {message}");
            }
            _ => {}
        }
    }
    println!();
    Ok(())
}

fn print_response(response: &AgentResponse, trace: bool) {
    println!("{}", response.answer);

    if let Some(reflection) = &response.final_reflection {
        eprintln!("\n[reflection] {reflection}");
    }

    if trace {
        eprintln!("\n--- reasoning trace ({} iteration(s)) ---", response.iterations);
        for step in &response.thought_history {
            eprintln!("[{}] Thought: {}", step.step, step.thought);
            if let Some(action) = &step.action {
                let args = step
                    .action_input
                    .as_ref()
                    .and_then(|a| serde_json::to_string(a).ok())
                    .unwrap_or_default();
                eprintln!("    Action: {action} {args}");
            }
            if let Some(observation) = &step.observation {
                eprintln!("    Observation: {observation}");
            }
        }
    }
}
