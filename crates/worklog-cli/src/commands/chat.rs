//! Interactive chat with the work-log assistant

use anyhow::Result;
use std::io::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use worklog_api::ApiClient;
use worklog_chat::{Chat, ChatUpdate, HttpTransport};

pub async fn run(client: ApiClient) -> Result<()> {
    let chat = Chat::new(Arc::new(HttpTransport::new(client)));

    println!("work-log assistant — /reset clears the conversation, /quit leaves");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                chat.reset_conversation();
                println!("conversation cleared");
                continue;
            }
            _ => {}
        }

        // Subscribe before starting so no update is missed
        let mut updates = chat.subscribe();
        let handle = match chat.start_turn(line) {
            Ok(handle) => handle,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        let generation = handle.generation();

        loop {
            match updates.recv().await {
                Ok(ChatUpdate::Delta {
                    generation: g,
                    content,
                }) if g == generation => {
                    print!("{content}");
                    std::io::stdout().flush()?;
                }
                Ok(ChatUpdate::TurnEnd { generation: g }) if g == generation => {
                    println!();
                    break;
                }
                Ok(ChatUpdate::TurnFailed {
                    generation: g,
                    message,
                }) if g == generation => {
                    println!();
                    eprintln!("turn failed: {message}");
                    break;
                }
                Ok(_) => {}
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
        handle.join().await;
    }

    Ok(())
}
