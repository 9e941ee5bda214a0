//! `loresmith chat` - interactive session with conversation memory.

use super::setup;
use loresmith_agent::StreamEvent;
use std::io::{BufRead, Write};

pub async fn run() -> anyhow::Result<()> {
    let config = setup::load_config()?;
    let agent = setup::build_agent(&config)?;
    let conversation = agent.new_conversation().await?;

    println!("Loresmith chat - /history, /clear, /quit");
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    loop {
        write!(stdout, "\n> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                agent.clear_conversation(&conversation).await?;
                println!("(history cleared)");
                continue;
            }
            "/history" => {
                for message in agent.history(&conversation).await? {
                    println!("{}: {}", message.role, message.content);
                }
                continue;
            }
            _ => {}
        }

        let mut rx = agent.ask_stream(line, Some(&conversation)).await?;
        while let Some(event) = rx.recv().await {
            match event {
                StreamEvent::Action { tool, .. } => {
                    eprintln!("-> {tool}");
                }
                StreamEvent::AnswerToken { token, .. } => {
                    write!(stdout, "{token}")?;
                    stdout.flush()?;
                }
                StreamEvent::Error { message, .. } => {
                    eprintln!("error: {message}");
                }
                _ => {}
            }
        }
        println!();
    }

    Ok(())
}
