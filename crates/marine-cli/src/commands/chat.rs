//! Fisheries assistant command

use anyhow::{bail, Result};
use marine_core::{ChatController, Dispatch, MarineClient};
use serde_json::json;

use super::core::print_json;

pub async fn cmd_chat(client: &MarineClient, question: &str, json: bool) -> Result<()> {
    let controller = ChatController::new(client.clone());

    let reply = match controller.send(question).await {
        Dispatch::Completed(reply) => reply,
        Dispatch::NoInput => bail!("Question is empty"),
        Dispatch::Busy => bail!("Assistant is busy"),
    };

    if json {
        return print_json(&json!({
            "question": question.trim(),
            "answer": reply,
        }));
    }

    println!("🤖 {}", reply);
    Ok(())
}
