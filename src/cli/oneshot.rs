// src/cli/oneshot.rs — Single-request commands: detect, stats, chat

use crate::backend::{ChatRequest, DetectRequest, EmotionBackend, HttpBackend};
use crate::capture::{FileSource, FrameEncoder, FrameSource};
use crate::infra::config::Config;
use crate::session::{EmotionDistribution, EmotionLabel};

/// Detect the emotion in one image file and print the feeling line.
pub async fn run_detect(config: &Config, image: &std::path::Path) -> anyhow::Result<()> {
    let backend = HttpBackend::from_config(&config.server)?;
    let encoder = FrameEncoder::from_config(&config.capture);

    let mut source = FileSource::open(image)?;
    let frame = source.grab().await?;
    let data_url = encoder.encode(&frame)?;

    let emotion = backend
        .detect_emotion(DetectRequest {
            image: data_url,
            user_id: config.session.user_id.clone(),
        })
        .await?;

    match emotion.as_deref().and_then(EmotionLabel::new) {
        Some(label) => println!("{}", label.feeling_line()),
        None => println!("No emotion detected."),
    }
    Ok(())
}

/// Print the distribution as an aligned table.
pub async fn run_stats(config: &Config) -> anyhow::Result<()> {
    let backend = HttpBackend::from_config(&config.server)?;
    let distribution = backend.emotion_stats(&config.session.user_id).await?;
    print!("{}", format_distribution(&distribution));
    Ok(())
}

pub fn format_distribution(distribution: &EmotionDistribution) -> String {
    let slices = distribution.slices();
    if slices.is_empty() {
        return "No emotion data yet.\n".to_string();
    }
    let mut out = String::new();
    for s in slices {
        out.push_str(&format!("{:<10} {:>6.1}%\n", s.label, s.fraction * 100.0));
    }
    out
}

/// Send one message and print the reply.
pub async fn run_chat(config: &Config, emotion: &str, message: &str) -> anyhow::Result<()> {
    let message = message.trim();
    if message.is_empty() {
        anyhow::bail!("message is empty");
    }
    let emotion = EmotionLabel::new(emotion).unwrap_or_else(EmotionLabel::neutral);

    let backend = HttpBackend::from_config(&config.server)?;
    let reply = backend
        .chat(ChatRequest {
            message: message.to_string(),
            emotion: emotion.as_str().to_string(),
            user_id: config.session.user_id.clone(),
        })
        .await?;

    match reply {
        Some(text) => println!("{text}"),
        None => println!("(no reply)"),
    }
    Ok(())
}
