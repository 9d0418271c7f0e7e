//! Reply Source: a fixed rotation of canned replies.

use serde::Serialize;

use crate::error::{ServiceError, ServiceResult};

use super::poses::names;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyRecord {
    /// Transcript text
    pub text: String,
    /// Pose used when the keyword classifier has no hint
    pub pose: String,
    /// Short bubble caption
    pub speech: String,
}

impl ReplyRecord {
    pub fn new(text: impl Into<String>, pose: impl Into<String>, speech: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pose: pose.into(),
            speech: speech.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplySource {
    records: Vec<ReplyRecord>,
}

impl ReplySource {
    pub fn new(records: Vec<ReplyRecord>) -> ServiceResult<Self> {
        if records.is_empty() {
            return Err(ServiceError::Config {
                message: "reply source needs at least one record".to_string(),
            });
        }
        Ok(Self { records })
    }

    pub fn builtin() -> ServiceResult<Self> {
        Self::new(builtin_replies())
    }

    /// Record for the exchange with the given counter value
    pub fn select(&self, counter: u64) -> &ReplyRecord {
        // new() guarantees a non-empty sequence
        let index = (counter % self.records.len() as u64) as usize;
        &self.records[index]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReplyRecord> {
        self.records.iter()
    }
}

fn builtin_replies() -> Vec<ReplyRecord> {
    vec![
        ReplyRecord::new(
            "Oof, sounds like a lot! How are you feeling about it all?",
            names::NODDING,
            "sounds heavy...",
        ),
        ReplyRecord::new(
            "Wait, seriously?! That's actually wild. Tell me more!",
            names::SURPRISED,
            "no way!",
        ),
        ReplyRecord::new(
            "Haha okay okay, I see you! That's lowkey a win though.",
            names::HAPPY,
            "yesss!",
        ),
        ReplyRecord::new(
            "Hmm... maybe the key thing here is how you reacted to it?",
            names::THINKING,
            "hmm 🤔",
        ),
        ReplyRecord::new(
            "I feel like this keeps coming up for you. Is it weighing on you?",
            names::NODDING,
            "i hear you...",
        ),
        ReplyRecord::new(
            "Bro that sounds exhausting. You okay? Real talk.",
            names::NODDING,
            "you ok?",
        ),
        ReplyRecord::new(
            "Okay but that's actually hilarious 😅 didn't see that coming",
            names::HAPPY,
            "lmaooo",
        ),
        ReplyRecord::new(
            "You're allowed to just feel whatever you feel about it, y'know?",
            names::TALKING,
            "for real tho",
        ),
    ]
}
