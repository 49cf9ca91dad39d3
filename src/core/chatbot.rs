//! Keyword chatbot: an ordered rule table matched by substring, plus the chat
//! widget that keeps the on-page transcript.

use crate::core::render::Escaped;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Greeting,
    Programs,
    Admission,
    Grants,
    Hostel,
    Contact,
}

#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Fixed(&'static str),
    /// One variant chosen uniformly at random per call.
    OneOf(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub topic: Topic,
    /// Kazakh, Russian and English stems; any one is enough.
    pub keywords: &'static [&'static str],
    pub reply: Reply,
}

pub const GREETINGS: &[&str] = &[
    "Сәлеметсіз бе! 👋 Мен ORDA колледжінің виртуалды көмекшісімін. Сізге қалай көмектесе аламын?",
    "Сәлем! ORDA колледжінің ботымын. Сұрақтарыңыз бар ма?",
];

pub const PROGRAMS_REPLY: &str = "Бізде 38-ден астам мамандық бар: IT технологиялары, бизнес, білім беру, шығармашылық өнер, құқық, инженерлік іс. Толық тізімді 'Мамандықтар' бөлімінде көре аласыз.";

pub const ADMISSION_REPLY: &str = "Қабылдау 20 маусымнан 25 тамызға дейін жүреді. Қажетті құжаттар: өтініш, білімі туралы куәлік, денсаулық туралы анықтама (086-У), туу туралы куәлік, 6 фото 3x4, жеке куәлық.";

pub const GRANTS_REPLY: &str = "Иә, мемлекеттік гранттар бар. Гранттар шектеулі санда беріледі, сондықтан ертерек өтініш беру ұсынылады.";

pub const HOSTEL_REPLY: &str =
    "Иә, колледж студенттері үшін жатақхана бар. Айына 15.000 теңге. Орын саны шектеулі.";

pub const CONTACT_REPLY: &str = "Бізбен байланысу үшін: 📞 +7 (7242) 27-75-27 📧 info@ordacollege.kz 📍 Қызылорда, Қонаев көш., 17";

pub const FALLBACK_REPLY: &str = "Кешіріңіз, мен сіздің сұрағыңызды түсінбеймін. Басқа сұрақтарыңыз бар ма? Негізгі тақырыптар: мамандықтар, қабылдау, гранттар, байланыс.";

/// Evaluated top to bottom; first match wins.
pub const DEFAULT_RULES: &[Rule] = &[
    Rule {
        topic: Topic::Greeting,
        keywords: &["салем", "сәлем", "привет", "hello"],
        reply: Reply::OneOf(GREETINGS),
    },
    Rule {
        topic: Topic::Programs,
        keywords: &["мамандық", "специальность", "program"],
        reply: Reply::Fixed(PROGRAMS_REPLY),
    },
    Rule {
        topic: Topic::Admission,
        keywords: &["қабылдау", "прием", "admission"],
        reply: Reply::Fixed(ADMISSION_REPLY),
    },
    Rule {
        topic: Topic::Grants,
        keywords: &["грант", "стипендия", "grant"],
        reply: Reply::Fixed(GRANTS_REPLY),
    },
    Rule {
        topic: Topic::Hostel,
        keywords: &["жатақхана", "общежит", "hostel"],
        reply: Reply::Fixed(HOSTEL_REPLY),
    },
    Rule {
        topic: Topic::Contact,
        keywords: &["байланыс", "контакт", "contact"],
        reply: Reply::Fixed(CONTACT_REPLY),
    },
];

/// Stateless responder; every call is independent of earlier messages.
#[derive(Debug, Clone)]
pub struct Responder {
    rules: &'static [Rule],
    fallback: &'static str,
}

impl Responder {
    pub fn new(rules: &'static [Rule], fallback: &'static str) -> Self {
        Self { rules, fallback }
    }

    pub fn rule_for(&self, message: &str) -> Option<&Rule> {
        let lower = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| lower.contains(kw)))
    }

    pub fn classify(&self, message: &str) -> Option<Topic> {
        self.rule_for(message).map(|rule| rule.topic)
    }

    pub fn respond(&self, message: &str) -> &'static str {
        self.respond_with(message, random_index)
    }

    /// Like [`respond`](Self::respond) with a caller-chosen variant picker,
    /// which receives the number of variants.
    pub fn respond_with(&self, message: &str, pick: impl FnOnce(usize) -> usize) -> &'static str {
        match self.rule_for(message).map(|rule| rule.reply) {
            Some(Reply::Fixed(text)) => text,
            Some(Reply::OneOf(variants)) if !variants.is_empty() => {
                variants[pick(variants.len()) % variants.len()]
            }
            _ => self.fallback,
        }
    }
}

impl Default for Responder {
    fn default() -> Self {
        Self::new(DEFAULT_RULES, FALLBACK_REPLY)
    }
}

fn random_index(len: usize) -> usize {
    // v4 uuids are 122 random bits; reused here rather than adding an RNG crate
    let bytes = uuid::Uuid::new_v4().into_bytes();
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[..8]);
    (u64::from_le_bytes(word) % len as u64) as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    fn class(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

/// Bot answer that is still "typing". The transcript gets the reply once
/// the typing delay has passed, whether or not this handle is awaited.
#[derive(Debug)]
pub struct PendingReply {
    reply: &'static str,
    posted: Option<JoinHandle<()>>,
}

impl PendingReply {
    pub fn text(&self) -> &'static str {
        self.reply
    }

    /// Waits until the reply is in the transcript.
    pub async fn arrived(self) -> &'static str {
        if let Some(posted) = self.posted {
            if let Err(e) = posted.await {
                tracing::warn!("⚠️ Chat reply task failed: {}", e);
            }
        }
        self.reply
    }
}

/// Floating chat panel: open state plus transcript.
#[derive(Debug, Clone)]
pub struct ChatWidget {
    responder: Responder,
    typing_delay: Duration,
    open: bool,
    messages: Arc<Mutex<Vec<ChatMessage>>>,
}

impl ChatWidget {
    pub fn new(responder: Responder, typing_delay: Duration) -> Self {
        Self {
            responder,
            typing_delay,
            open: false,
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().clone()
    }

    /// Posts the user's message now and the reply after the typing delay.
    /// Returns immediately. Blank input is ignored and returns `None`.
    pub fn send(&self, input: &str) -> Option<PendingReply> {
        let message = input.trim();
        if message.is_empty() {
            return None;
        }

        self.post(Sender::User, message);
        let reply = self.responder.respond(message);
        tracing::debug!(
            "💬 Chat topic {:?} for {:?}",
            self.responder.classify(message),
            message
        );

        let posted = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let widget = self.clone();
                Some(handle.spawn(async move {
                    tokio::time::sleep(widget.typing_delay).await;
                    widget.post(Sender::Bot, reply);
                }))
            }
            Err(_) => {
                self.post(Sender::Bot, reply);
                None
            }
        };
        Some(PendingReply { reply, posted })
    }

    pub fn render(&self) -> String {
        self.lock()
            .iter()
            .map(|msg| {
                format!(
                    r#"<div class="chat-message {}"><div class="message-content"><p>{}</p></div></div>"#,
                    msg.sender.class(),
                    Escaped(&msg.text)
                )
            })
            .collect()
    }

    fn post(&self, sender: Sender, text: &str) {
        self.lock().push(ChatMessage {
            sender,
            text: text.to_string(),
        });
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ChatMessage>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
