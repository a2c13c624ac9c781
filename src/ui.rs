//! Terminal helpers for the training CLI

use std::io::{self, IsTerminal, Write};

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};

/// Startup banner for the interactive trainer
pub fn display_banner() {
    println!();
    println!("{}", "WorkSim · CS 역할극 트레이너".blue().bold());
    println!(
        "{}",
        "업로드한 매뉴얼을 바탕으로 AI 고객을 상대하며 응대 연습을 합니다.".dimmed()
    );
    println!(
        "{}",
        "💡 'exit' 또는 'quit'을 입력하면 세션이 종료됩니다.".dimmed()
    );
    println!();
}

fn redraw(prompt: &str, input: &str) -> io::Result<()> {
    // clear-to-eol after the rewrite so shrinking input leaves no residue
    print!("\r{} {}\x1b[K", prompt.green().bold(), input);
    io::stdout().flush()
}

/// Read one line of trainee input, with up/down history navigation when the
/// terminal is interactive. Piped stdin falls back to a plain line read.
pub fn input_with_history(prompt: &str, history: &mut Vec<String>) -> io::Result<String> {
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(input);
    }

    enable_raw_mode()?;
    let mut input = String::new();
    let mut history_index: Option<usize> = None;

    redraw(prompt, &input)?;

    let result = loop {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };

        match key_event.code {
            KeyCode::Enter => {
                break Ok(input.trim().to_string());
            }
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                break Ok("exit".to_string());
            }
            KeyCode::Char(c) => {
                input.push(c);
                history_index = None;
                redraw(prompt, &input)?;
            }
            KeyCode::Backspace => {
                input.pop();
                redraw(prompt, &input)?;
            }
            KeyCode::Up => {
                if !history.is_empty() {
                    let next = match history_index {
                        None => history.len() - 1,
                        Some(0) => 0,
                        Some(i) => i - 1,
                    };
                    history_index = Some(next);
                    input = history[next].clone();
                    redraw(prompt, &input)?;
                }
            }
            KeyCode::Down => {
                match history_index {
                    Some(i) if i + 1 < history.len() => {
                        history_index = Some(i + 1);
                        input = history[i + 1].clone();
                    }
                    Some(_) => {
                        history_index = None;
                        input.clear();
                    }
                    None => {}
                }
                redraw(prompt, &input)?;
            }
            KeyCode::Esc => {
                input.clear();
                history_index = None;
                redraw(prompt, &input)?;
            }
            _ => {}
        }
    };

    disable_raw_mode()?;
    println!();

    if let Ok(line) = &result {
        if !line.is_empty() {
            history.push(line.clone());
        }
    }
    result
}
