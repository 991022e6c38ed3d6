// src/cli/headless.rs — Line-oriented front end
//
// Prints transcript entries and emotion changes as they happen and sends
// every stdin line as a chat message. Ctrl-C quits.

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::controller::{ControllerHandle, Snapshot};

/// Tracks what has already been printed.
#[derive(Debug, Default)]
pub struct TranscriptPrinter {
    printed: usize,
    last_feeling: Option<String>,
}

impl TranscriptPrinter {
    /// Lines to print for whatever is new in `snap`.
    pub fn new_lines(&mut self, snap: &Snapshot) -> Vec<String> {
        let mut out = Vec::new();

        if snap.emotion.is_some() {
            let feeling = snap.feeling_line();
            if self.last_feeling.as_deref() != Some(feeling.as_str()) {
                out.push(format!("* {feeling}"));
                self.last_feeling = Some(feeling);
            }
        }

        let entries = snap.transcript.entries();
        for entry in entries.iter().skip(self.printed) {
            out.push(entry.to_line());
        }
        self.printed = self.printed.max(entries.len());
        out
    }
}

pub async fn run_headless(handle: &ControllerHandle) -> anyhow::Result<()> {
    let mut snapshots = handle.snapshots();
    let mut printer = TranscriptPrinter::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let initial = snapshots.borrow_and_update().clone();
    for line in printer.new_lines(&initial) {
        println!("{line}");
    }

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = snapshots.borrow_and_update().clone();
                for line in printer.new_lines(&snap) {
                    println!("{line}");
                }
            }
            line = lines.next_line(), if stdin_open => match line? {
                Some(text) => handle.send_chat(text).await?,
                None => {
                    tracing::debug!("stdin closed; still watching (Ctrl-C to quit)");
                    stdin_open = false;
                }
            },
            _ = &mut shutdown => break,
        }
    }
    Ok(())
}
