//! Sticky Board, a command-line front end for the sticky notes board.
//!
//! Reads and writes notes in local storage by default, or through the notes
//! REST API when `STICKY_API_URL` (or `--api-url`) is set.

mod cli;

use chrono::Local;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use sticky_board::config::Backend;
use sticky_board::store::FileBacking;
use sticky_board::types::{ImportMode, NewNote, NotePatch};
use sticky_board::{Board, DisplayState, LocalNoteStore, NoteCard, NoteStore, RemoteNoteStore};

use cli::{CliConfig, Command, EditArgs};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = CliConfig::parse();
    let backend = Backend::resolve(cli.api_url.clone(), cli.data_dir.clone());
    log::debug!("[BOARD] Using {}", backend.describe());

    let ok = match backend {
        Backend::Remote { api_url } => {
            run(Board::new(RemoteNoteStore::new(&api_url)), cli.command).await
        }
        Backend::Local { data_dir, storage_key } => {
            let backing = Arc::new(FileBacking::new(data_dir));
            run(Board::new(LocalNoteStore::new(backing, storage_key)), cli.command).await
        }
    };

    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Execute one command against the board and report alerts on stderr.
async fn run<S: NoteStore>(mut board: Board<S>, command: Command) -> bool {
    let ok = match command {
        Command::List { search } => {
            board.set_search(search);
            let loaded = board.refresh().await;
            print_cards(&board.view_now());
            loaded
        }
        Command::Add { text, due, reminder } => {
            let new_note = NewNote {
                text,
                due_date: due,
                reminder_time: reminder,
            };
            report(board.add(new_note).await.map(|n| format!("Added note {}", n.id)))
        }
        Command::Edit(args) => {
            let id = args.id.clone();
            report(board.edit(&id, patch_from(args)).await.map(|n| format!("Updated note {}", n.id)))
        }
        Command::Pin { id } => {
            report(board.edit(&id, NotePatch::pinned(true)).await.map(|n| format!("Pinned note {}", n.id)))
        }
        Command::Unpin { id } => {
            report(board.edit(&id, NotePatch::pinned(false)).await.map(|n| format!("Unpinned note {}", n.id)))
        }
        Command::Delete { id, yes } => {
            board.refresh().await;
            let preview = board
                .notes()
                .iter()
                .find(|n| n.id == id)
                .map(|n| n.text.clone());

            let pending = board.request_delete(id);
            let confirmed = yes || confirm(&format!(
                "Delete note {}{}? [y/N] ",
                pending.target(),
                preview.map(|t| format!(" \"{}\"", t)).unwrap_or_default()
            ));

            if confirmed {
                let target = pending.target().clone();
                report(board.confirm_delete(pending).await.map(|_| format!("Deleted note {}", target)))
            } else {
                pending.cancel();
                println!("Cancelled");
                true
            }
        }
        Command::Export { out } => match board.export(Local::now().date_naive()).await {
            Ok((file_name, body)) => {
                let path = out.join(file_name);
                match std::fs::write(&path, body) {
                    Ok(()) => {
                        println!("Exported to {}", path.display());
                        true
                    }
                    Err(e) => {
                        eprintln!("Failed to write {}: {}", path.display(), e);
                        false
                    }
                }
            }
            Err(_) => false,
        },
        Command::Import { file, replace } => {
            let mode = if replace { ImportMode::Replace } else { ImportMode::Merge };
            match std::fs::read_to_string(&file) {
                Ok(raw) => report(board.import(&raw, mode).await.map(|s| {
                    format!(
                        "Imported {} note(s), skipped {}, {} total",
                        s.added, s.skipped, s.total
                    )
                })),
                Err(e) => {
                    eprintln!("Failed to read {}: {}", file.display(), e);
                    false
                }
            }
        }
    };

    if board.saved_notice().is_visible(std::time::Instant::now()) {
        println!("Saved.");
    }
    for alert in board.take_alerts() {
        eprintln!("{}", alert);
    }
    ok
}

fn patch_from(args: EditArgs) -> NotePatch {
    NotePatch {
        text: args.text,
        pinned: None,
        due_date: if args.clear_due { Some(None) } else { args.due.map(Some) },
        reminder_time: if args.clear_reminder { Some(None) } else { args.reminder.map(Some) },
    }
}

/// Print the success message; failures were already queued as alerts.
fn report<E>(result: Result<String, E>) -> bool {
    match result {
        Ok(msg) => {
            println!("{}", msg);
            true
        }
        Err(_) => false,
    }
}

fn confirm(prompt: &str) -> bool {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn print_cards(cards: &[NoteCard<'_>]) {
    if cards.is_empty() {
        println!("No notes.");
        return;
    }

    for card in cards {
        let pin = if card.note.pinned { "*" } else { " " };
        let due = card
            .note
            .due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let reminder = card
            .note
            .reminder_time
            .map(|t| t.format(" %H:%M").to_string())
            .unwrap_or_default();
        let state = match card.state {
            DisplayState::Default => String::new(),
            other => format!("[{}]", other.as_str()),
        };

        println!(
            "{} {:>14}  {:<14} {:<10}{:<6}  {}",
            pin, card.note.id, state, due, reminder, card.note.text
        );
    }
}
