//! Console module for the interactive terminal front end
//!
//! - `command_handlers`: parses typed lines and runs them against the app
//! - `ui_builder`: formats views and notices as terminal lines
//! - `speech`: printed narration with keyboard standing in for the microphone

pub mod command_handlers;
pub mod speech;
pub mod ui_builder;

use anyhow::Result;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use crate::app::{App, AppEvent, CookingInput};
use command_handlers::{handle_command, parse_command, Flow};
use speech::SpeechEvent;
use ui_builder::{format_notices, render_view};

pub use command_handlers::ConsoleCommand;
pub use speech::ConsoleSpeech;

/// How often timed cooking prompts are advanced
const TICK_INTERVAL: Duration = Duration::from_millis(200);

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

/// Read commands from stdin until `quit` or end of input
pub async fn run_console(mut app: App, mut speech_events: UnboundedReceiver<SpeechEvent>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);

    print_lines(&render_view(&app));
    println!("Type 'help' for commands.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("End of input");
                    break;
                };

                let command = match parse_command(&line, app.cooking().is_some()) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(message) => {
                        println!("{}", message);
                        continue;
                    }
                };

                let (flow, output) = handle_command(&mut app, command).await?;
                print_lines(&output);
                if flow == Flow::Quit {
                    break;
                }
            }
            Some(event) = speech_events.recv() => {
                let input = match event {
                    SpeechEvent::Finished(id) => CookingInput::SpeechFinished(id),
                    SpeechEvent::Failed(id, error) => {
                        warn!(error = %error, "Narration failed");
                        CookingInput::SpeechFailed(id, error)
                    }
                };
                let notices = app.dispatch(AppEvent::Cooking(input)).await;
                print_lines(&format_notices(&notices));
            }
            _ = ticker.tick() => {
                let notices = app.dispatch(AppEvent::Tick).await;
                print_lines(&format_notices(&notices));
            }
        }
    }

    app.shutdown();
    Ok(())
}
