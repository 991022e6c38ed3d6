// src/devserver/replies.rs — Emotion-keyed canned replies.

/// Reply sent when the detected emotion changes. Unknown emotions get the
/// neutral line.
pub fn emotion_reply(emotion: &str) -> &'static str {
    match emotion.trim().to_lowercase().as_str() {
        "happy" => "Great to hear! What's making you smile?",
        "sad" => "I'm sorry you're feeling down. I'm here if you want to talk.",
        "angry" => "That sounds frustrating. Take a breath, I'm listening.",
        "fear" => "It's okay to feel uneasy. You're not alone.",
        "surprise" => "Oh! Something caught you off guard?",
        "disgust" => "Something bothering you? Tell me about it.",
        _ => "How's everything going?",
    }
}

fn tone(emotion: &str) -> &'static str {
    match emotion.trim().to_lowercase().as_str() {
        "happy" => "Love the energy!",
        "sad" => "I hear you.",
        "angry" => "Let's take it slow.",
        _ => "Got it.",
    }
}

/// Chat answer: a tone opener matching the emotion plus an echo.
pub fn chat_reply(message: &str, emotion: &str) -> String {
    format!("{} You said: \"{}\"", tone(emotion), message.trim())
}
