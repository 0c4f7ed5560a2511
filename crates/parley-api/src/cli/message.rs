//! Chat log CLI commands: list, show, send, edit, delete, clear, reply.

use std::time::Duration;

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

use parley_types::message::{Message, MessageId, NewMessage};

use crate::state::AppState;

/// List all messages in a table.
pub async fn list_messages(state: &AppState, json: bool) -> Result<()> {
    let messages = state.chat_service.list_messages().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!();
        println!(
            "  {} No messages yet. Start with: {}",
            style("i").blue().bold(),
            style("parley send \"привет\"").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Sender").fg(Color::White),
        Cell::new("Text").fg(Color::White),
        Cell::new("Sent").fg(Color::White),
    ]);

    for message in &messages {
        let sender_cell = if message.is_bot {
            Cell::new(format!("◆ {}", message.sender)).fg(Color::Cyan)
        } else {
            Cell::new(&message.sender)
        };

        let sent = if message.is_edited() {
            format!("{} (edited)", format_relative_time(&message.created_at))
        } else {
            format_relative_time(&message.created_at)
        };

        table.add_row(vec![
            Cell::new(message.id).fg(Color::DarkGrey),
            sender_cell,
            Cell::new(&message.text),
            Cell::new(sent).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {} message{}",
        messages.len(),
        if messages.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Show one message with all its fields.
pub async fn show_message(state: &AppState, id: MessageId, json: bool) -> Result<()> {
    let message = state.chat_service.get_message(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&message)?);
        return Ok(());
    }

    println!();
    print_message(&message);
    println!(
        "  {}  {}",
        style("Created:").bold(),
        message.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(updated_at) = message.updated_at {
        println!(
            "  {}  {}",
            style("Edited:").bold(),
            updated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    println!();

    Ok(())
}

/// Post a message. Unless `no_wait` is set, block until the bot has answered.
///
/// # Examples
///
/// ```bash
/// parley send "привет" --sender Аня
/// parley send "который час? время" --no-wait
/// ```
pub async fn send_message(
    state: &AppState,
    text: String,
    sender: Option<String>,
    no_wait: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let request = NewMessage { text, sender };
    let message = state.chat_service.create_message(request).await?;

    if no_wait {
        if json {
            println!("{}", serde_json::to_string_pretty(&message)?);
        } else if !quiet {
            println!(
                "  {} Message #{} stored.",
                style("✓").green().bold(),
                message.id
            );
        }
        return Ok(());
    }

    let spinner = (!json && !quiet)
        .then(|| spinner(format!("{} is typing...", state.chat_service.config().bot_name)))
        .transpose()?;

    state.chat_service.wait_for_replies().await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let reply = state
        .chat_service
        .list_messages()
        .await?
        .into_iter()
        .find(|m| m.is_bot && m.id > message.id);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "message": message,
                "reply": reply,
            }))?
        );
        return Ok(());
    }

    println!();
    print_message(&message);
    match &reply {
        Some(reply) => print_message(reply),
        None => println!("  {}", style("(no reply)").dim()),
    }
    println!();

    Ok(())
}

/// Replace the text of a message.
pub async fn edit_message(
    state: &AppState,
    id: MessageId,
    text: &str,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let message = state.chat_service.update_message(id, text).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&message)?);
    } else if !quiet {
        println!(
            "  {} Message #{} updated.",
            style("✓").green().bold(),
            message.id
        );
    }

    Ok(())
}

/// Delete one message.
pub async fn delete_message(state: &AppState, id: MessageId, json: bool, quiet: bool) -> Result<()> {
    state.chat_service.delete_message(id).await?;

    if json {
        println!("{}", serde_json::json!({"deleted": true, "id": id}));
    } else if !quiet {
        println!("  {} Message #{} deleted.", style("✓").red().bold(), id);
    }

    Ok(())
}

/// Delete every message after confirmation.
pub async fn clear_messages(state: &AppState, force: bool, json: bool, quiet: bool) -> Result<()> {
    let count = state.chat_service.list_messages().await?.len();

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete all {} messages?",
                style(count).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.chat_service.delete_all().await?;

    if json {
        println!("{}", serde_json::json!({"deleted": count}));
    } else if !quiet {
        println!(
            "  {} Deleted {} message{}.",
            style("✓").red().bold(),
            count,
            if count == 1 { "" } else { "s" }
        );
    }

    Ok(())
}

/// Print the bot answer for `text` without storing anything.
pub fn probe_reply(state: &AppState, text: &str, sender: Option<&str>, json: bool) -> Result<()> {
    let reply = state.chat_service.bot_reply(text, sender)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(());
    }

    println!();
    println!("  {} {}", style(format!("{}:", reply.sender)).bold(), reply.original_text);
    println!(
        "  {} {}",
        style(format!("{}:", state.chat_service.config().bot_name))
            .cyan()
            .bold(),
        reply.reply_text
    );
    println!();

    Ok(())
}

fn print_message(message: &Message) {
    let sender = if message.is_bot {
        style(format!("{}:", message.sender)).cyan().bold()
    } else {
        style(format!("{}:", message.sender)).bold()
    };
    println!(
        "  {} {} {}",
        style(format!("#{}", message.id)).dim(),
        sender,
        message.text
    );
}

fn spinner(message: String) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    Ok(spinner)
}

fn format_relative_time(dt: &chrono::DateTime<chrono::Utc>) -> String {
    let now = chrono::Utc::now();
    let diff = now - *dt;

    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_days() < 1 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 30 {
        format!("{}d ago", diff.num_days())
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use tempfile::TempDir;

    use parley_types::config::ChatConfig;

    use super::*;

    #[test]
    fn test_format_relative_time() {
        let now = Utc::now();
        assert_eq!(format_relative_time(&now), "just now");
        assert_eq!(format_relative_time(&(now - TimeDelta::minutes(5))), "5m ago");
        assert_eq!(format_relative_time(&(now - TimeDelta::hours(3))), "3h ago");
        assert_eq!(format_relative_time(&(now - TimeDelta::days(2))), "2d ago");
    }

    #[tokio::test]
    async fn test_send_waits_for_reply() {
        let dir = TempDir::new().unwrap();
        let config = ChatConfig {
            reply_delay_ms: 5,
            ..ChatConfig::default()
        };
        let state = AppState::with_config(dir.path().to_path_buf(), config);

        send_message(&state, "привет".to_string(), Some("Аня".to_string()), false, true, true)
            .await
            .unwrap();

        let messages = state.chat_service.list_messages().await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].text, "Привет, Аня!");
    }

    #[tokio::test]
    async fn test_send_blank_text_fails() {
        let dir = TempDir::new().unwrap();
        let state = AppState::with_config(dir.path().to_path_buf(), ChatConfig::default());

        let result = send_message(&state, "  ".to_string(), None, true, true, true).await;
        assert!(result.is_err());
        assert!(state.chat_service.list_messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_forced_clear_empties_log() {
        let dir = TempDir::new().unwrap();
        let config = ChatConfig {
            reply_delay_ms: 5,
            ..ChatConfig::default()
        };
        let state = AppState::with_config(dir.path().to_path_buf(), config);
        send_message(&state, "hi".to_string(), None, false, true, true)
            .await
            .unwrap();

        clear_messages(&state, true, true, true).await.unwrap();
        assert!(state.chat_service.list_messages().await.unwrap().is_empty());
    }
}
