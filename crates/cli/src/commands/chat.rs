//! `solace chat` — interactive conversation loop.

use solace_config::AppConfig;
use std::io::{BufRead, Write};

use super::build_pipeline;

pub async fn run(user: &str) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let (pipeline, _sweeper) = build_pipeline(&config)?;

    println!("Solace chat. Type 'exit' to quit.");
    println!();

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    loop {
        print!("you> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message == "exit" || message == "quit" {
            break;
        }

        match pipeline.submit_turn(user, message, &[], None).await {
            Ok(response) => {
                println!();
                println!("{}", response.content);
                if response.is_crisis {
                    println!();
                    println!("[crisis support mode]");
                }
                println!();
            }
            Err(e) => {
                println!("({e})");
            }
        }
    }

    println!("Take care.");
    Ok(())
}
