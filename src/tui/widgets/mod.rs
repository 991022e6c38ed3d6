// src/tui/widgets/mod.rs — Panels of the client screen.

pub mod chart;
pub mod transcript;
