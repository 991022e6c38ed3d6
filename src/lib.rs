// src/lib.rs — Library root for moodchat

pub mod backend;
pub mod capture;
pub mod cli;
pub mod controller;
pub mod devserver;
pub mod infra;
pub mod session;
pub mod tui;
pub mod util;
