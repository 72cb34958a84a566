//! The fixed persona instruction and the history mapping that injects it.

use crate::models::{Message, MessageRole};

use super::{ChatTurn, Speaker};

/// System-level text prepended to every conversation to steer the model's
/// tone. Injected as the first model-side history entry, not as a separate
/// system channel, so the wire shape works with multi-turn chat seeding.
pub const PERSONA_INSTRUCTION: &str = "\
You are Solace, an empathetic AI assistant for cancer patients and caregivers.

Guidelines:
- Be warm, supportive, and human-like in your responses
- Use encouraging and hopeful language
- Avoid clinical terminology and robotic tone
- Ask thoughtful follow-up questions to understand the person's situation
- If you don't know something, be honest and suggest speaking with a healthcare provider
- Never provide specific medical advice or diagnosis
- Focus on emotional support and general information

Remember that you're speaking with someone going through a difficult time. \
Show compassion and understanding.";

fn turn(message: &Message) -> ChatTurn {
    let speaker = match message.role {
        MessageRole::User => Speaker::User,
        MessageRole::Assistant => Speaker::Model,
    };
    ChatTurn {
        speaker,
        text: message.content.clone(),
    }
}

/// Split a conversation into the history to seed the backend with and the
/// newest message's text, which is submitted as the active turn.
///
/// The history starts with the persona instruction and then every message
/// *except* the newest, so its length always equals `messages.len()`. The
/// newest message is never part of the history — it is submitted exactly
/// once, as the turn to answer. Returns `None` for an empty conversation.
pub fn split_active_turn(messages: &[Message]) -> Option<(Vec<ChatTurn>, &str)> {
    let (newest, earlier) = messages.split_last()?;
    let mut history = Vec::with_capacity(messages.len());
    history.push(ChatTurn {
        speaker: Speaker::Model,
        text: PERSONA_INSTRUCTION.to_string(),
    });
    history.extend(earlier.iter().map(turn));
    Some((history, newest.content.as_str()))
}
