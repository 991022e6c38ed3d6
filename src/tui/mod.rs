// src/tui/mod.rs — Full-screen terminal client, built with ratatui.
//
// Shows the detected emotion, the chat transcript, the emotion pie chart
// and an input line. Launch via `moodchat` (without `--headless`).

pub mod app;
pub mod theme;
pub mod widgets;

pub use app::run_client_ui;
