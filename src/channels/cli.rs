//! CLI widget: stdin/stdout presentation layer for the lead dialog.
//!
//! Option sets are shown numbered; typing a number (or the label) selects.
//! When a CV is requested, a file path is read from disk and submitted.
//! `/restart` starts over, `/quit` exits.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex};

use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::error;

use crate::backend::LeadBackend;
use crate::config::DialogConfig;
use crate::dialog::{DialogManager, Effect, Event, MessageKind, OptionSet};
use crate::uploads::CvFile;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static ROW_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</(tr|p|div|h\d)>").unwrap());
static CELL_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</t[dh]>").unwrap());

/// What the terminal currently shows, as far as input parsing cares.
#[derive(Debug, Default)]
pub struct ViewState {
    pub offer: Option<OptionSet>,
    pub upload_requested: bool,
    pub input_enabled: bool,
}

impl ViewState {
    /// A fresh view, ready for typing.
    pub fn new() -> Self {
        Self {
            input_enabled: true,
            ..Self::default()
        }
    }

    /// Account for an event on its way to the dialog.
    ///
    /// A selection consumes the shown option set and a submitted CV answers
    /// the upload request. A restart drops everything on screen.
    pub fn note_sent(&mut self, event: &Event) {
        match event {
            Event::Restart => *self = Self::new(),
            Event::Selection { .. } => self.offer = None,
            Event::UploadSubmitted(_) => self.upload_requested = false,
            _ => {}
        }
    }
}

/// A parsed line of input.
#[derive(Debug)]
pub enum Command {
    Quit,
    Send(Event),
    /// Read this file and submit it as the CV.
    Upload(PathBuf),
    /// Input is disabled; only `/restart` and `/quit` work.
    Paused,
    Nothing,
}

/// Interpret one line against the current view.
pub fn interpret(line: &str, view: &ViewState) -> Command {
    let line = line.trim();
    match line {
        "" => return Command::Nothing,
        "/quit" => return Command::Quit,
        "/restart" => return Command::Send(Event::Restart),
        _ => {}
    }

    if !view.input_enabled {
        return Command::Paused;
    }

    if view.upload_requested {
        return Command::Upload(PathBuf::from(line));
    }

    if let Some(offer) = &view.offer {
        let by_number = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| offer.options.get(i));
        let by_label = || {
            offer
                .options
                .iter()
                .find(|c| c.label().eq_ignore_ascii_case(line))
        };
        if let Some(choice) = by_number.or_else(by_label) {
            return Command::Send(Event::select(offer.id, *choice));
        }
    }

    Command::Send(Event::text(line))
}

/// Turn estimate markup into something readable in a terminal.
pub fn markup_to_text(html: &str) -> String {
    let text = ROW_END.replace_all(html, "\n");
    let text = CELL_END.replace_all(&text, "\t");
    let text = TAG.replace_all(&text, "");
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text to print for an effect, if any. Also updates the view.
pub fn render(effect: &Effect, view: &mut ViewState) -> Option<String> {
    match effect {
        Effect::Say(msg) => Some(match msg.kind {
            MessageKind::Bot => format!("🤖 {}", msg.text),
            MessageKind::Warning => format!("⚠️  {}", msg.text),
            MessageKind::Error => format!("❌ {}", msg.text),
            MessageKind::Markup => markup_to_text(&msg.text),
        }),
        Effect::Offer(set) => {
            view.offer = Some(set.clone());
            let lines: Vec<String> = set
                .options
                .iter()
                .enumerate()
                .map(|(i, c)| format!("   [{}] {}", i + 1, c.label()))
                .collect();
            Some(lines.join("\n"))
        }
        Effect::RequestUpload => {
            view.upload_requested = true;
            Some("📎 Enter the path to your CV (PDF):".to_string())
        }
        Effect::InputEnabled(enabled) => {
            view.input_enabled = *enabled;
            None
        }
        Effect::Pause(_) | Effect::Call(..) => None,
    }
}

async fn read_cv(path: &Path) -> std::io::Result<CvFile> {
    let content = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(CvFile::new(filename, content))
}

/// Terminal chat against a lead backend.
pub struct CliWidget {
    config: DialogConfig,
    backend: Arc<dyn LeadBackend>,
}

impl CliWidget {
    pub fn new(config: DialogConfig, backend: Arc<dyn LeadBackend>) -> Self {
        Self { config, backend }
    }

    /// Run until `/quit` or end of input.
    pub async fn run(self) -> std::io::Result<()> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (effect_tx, mut effect_rx) = mpsc::unbounded_channel::<Effect>();
        let view = Arc::new(Mutex::new(ViewState::new()));

        let manager = DialogManager::new(self.config, self.backend);
        let dialog = tokio::spawn(manager.run(event_rx, effect_tx));

        let render_view = Arc::clone(&view);
        let renderer = tokio::spawn(async move {
            while let Some(effect) = effect_rx.recv().await {
                if let Effect::Pause(delay) = effect {
                    tokio::time::sleep(delay).await;
                    continue;
                }
                let text = match render_view.lock() {
                    Ok(mut view) => render(&effect, &mut view),
                    Err(_) => break,
                };
                if let Some(text) = text {
                    println!("{text}\n");
                    eprint!("> ");
                }
            }
        });

        if event_tx.send(Event::Start).is_err() {
            return Ok(());
        }

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    error!("Error reading stdin: {}", e);
                    break;
                }
            };

            let command = match view.lock() {
                Ok(view) => interpret(&line, &view),
                Err(_) => break,
            };
            let event = match command {
                Command::Quit => break,
                Command::Nothing => {
                    eprint!("> ");
                    continue;
                }
                Command::Paused => {
                    println!("⏸  Input is paused. /restart starts over, /quit exits.\n");
                    eprint!("> ");
                    continue;
                }
                Command::Send(event) => event,
                Command::Upload(path) => match read_cv(&path).await {
                    Ok(file) => Event::UploadSubmitted(file),
                    Err(e) => {
                        println!("❌ Could not read {}: {}\n", path.display(), e);
                        eprint!("> ");
                        continue;
                    }
                },
            };
            if let Ok(mut view) = view.lock() {
                view.note_sent(&event);
            }
            if event_tx.send(event).is_err() {
                break;
            }
        }

        drop(event_tx);
        if let Err(e) = dialog.await {
            error!("Dialog task failed: {}", e);
        }
        if let Err(e) = renderer.await {
            error!("Renderer task failed: {}", e);
        }
        Ok(())
    }
}
