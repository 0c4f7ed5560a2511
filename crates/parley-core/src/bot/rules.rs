//! Keyword rules mapping a user message to a bot reply.
//!
//! Rules are checked in order against the lower-cased message; the first rule
//! with a keyword contained in the text wins. Messages matching no rule get a
//! reply from the fallback pool, chosen by an injectable `FallbackPicker`.

use std::fmt;

use chrono::{Local, NaiveDateTime};

use super::picker::{FallbackPicker, ThreadRngPicker};

/// Identifies which rule produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Greeting,
    WellBeingQuery,
    PositiveMood,
    NeutralMood,
    NegativeMood,
    Farewell,
    Identity,
    Time,
    Date,
    Express,
    React,
    Node,
    Gratitude,
    Activity,
    Capabilities,
    AboutSelf,
    Api,
    Help,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

enum Template {
    /// Literal reply; `{name}` is replaced with the sender.
    Text(&'static str),
    /// Current local time.
    Time,
    /// Current local date.
    Date,
}

struct Rule {
    kind: RuleKind,
    keywords: &'static [&'static str],
    template: Template,
}

/// Priority order matters: "как дела" must be checked before the mood words,
/// and the mood words before farewell.
const RULES: &[Rule] = &[
    Rule {
        kind: RuleKind::Greeting,
        keywords: &["привет"],
        template: Template::Text("Привет, {name}!"),
    },
    Rule {
        kind: RuleKind::WellBeingQuery,
        keywords: &["как дела"],
        template: Template::Text("У меня хорошо, {name}! А у тебя?"),
    },
    Rule {
        kind: RuleKind::PositiveMood,
        keywords: &["хорошо", "отлично"],
        template: Template::Text("Рад это слышать, {name}!"),
    },
    Rule {
        kind: RuleKind::NeutralMood,
        keywords: &["нормально"],
        template: Template::Text("Неплохо, {name}!"),
    },
    Rule {
        kind: RuleKind::NegativeMood,
        keywords: &["плохо"],
        template: Template::Text("Жаль, {name}. Надеюсь, всё наладится."),
    },
    Rule {
        kind: RuleKind::Farewell,
        keywords: &["пока"],
        template: Template::Text("Пока, {name}!"),
    },
    Rule {
        kind: RuleKind::Identity,
        keywords: &["имя"],
        template: Template::Text("Я чат-бот на Rust."),
    },
    Rule {
        kind: RuleKind::Time,
        keywords: &["время"],
        template: Template::Time,
    },
    Rule {
        kind: RuleKind::Date,
        keywords: &["дата"],
        template: Template::Date,
    },
    Rule {
        kind: RuleKind::Express,
        keywords: &["express"],
        template: Template::Text("Express - это фреймворк для Node.js."),
    },
    Rule {
        kind: RuleKind::React,
        keywords: &["react"],
        template: Template::Text("React - это библиотека для интерфейсов."),
    },
    Rule {
        kind: RuleKind::Node,
        keywords: &["node"],
        template: Template::Text("Node.js - это среда для JavaScript."),
    },
    Rule {
        kind: RuleKind::Gratitude,
        keywords: &["спасибо"],
        template: Template::Text("Пожалуйста, {name}!"),
    },
    Rule {
        kind: RuleKind::Activity,
        keywords: &["что делаешь"],
        template: Template::Text("Общаюсь с тобой, {name}!"),
    },
    Rule {
        kind: RuleKind::Capabilities,
        keywords: &["что ты умеешь"],
        template: Template::Text("Могу ответить на простые вопросы и поддерживать разговор."),
    },
    Rule {
        kind: RuleKind::AboutSelf,
        keywords: &["расскажи о себе"],
        template: Template::Text(
            "Я простой чат-бот на Rust. У меня есть API и храню сообщения в файле.",
        ),
    },
    Rule {
        kind: RuleKind::Api,
        keywords: &["api", "апи"],
        template: Template::Text(
            "Мой API: /api/chat. Можно делать GET, POST, PUT, DELETE запросы.",
        ),
    },
    Rule {
        kind: RuleKind::Help,
        keywords: &["помощь"],
        template: Template::Text("Спроси: привет, как дела, время, дата, что такое express."),
    },
];

/// Replies used when no rule matches.
pub const FALLBACK_REPLIES: &[&str] = &[
    "Не понял, {name}.",
    "Попробуй спросить по-другому.",
    "Спроси что-нибудь простое.",
    "Я простой бот, не знаю ответа.",
    "Можем поговорить о чём-нибудь другом?",
];

/// Render a fallback template for a sender.
pub fn render_fallback(template: &str, sender: &str) -> String {
    template.replace("{name}", sender)
}

/// The bot's reply classifier.
///
/// Side-effect free apart from reading the clock (time/date rules) and the
/// picker (fallback branch).
pub struct ResponseRules {
    picker: Box<dyn FallbackPicker>,
}

impl ResponseRules {
    pub fn new(picker: impl FallbackPicker + 'static) -> Self {
        Self {
            picker: Box::new(picker),
        }
    }

    /// Which rule, if any, matches `text`. `None` means the fallback pool.
    pub fn matching_rule(&self, text: &str) -> Option<RuleKind> {
        find_rule(&text.to_lowercase()).map(|rule| rule.kind)
    }

    /// Compute the reply to `text` sent by `sender`, using the local clock.
    pub fn classify(&self, text: &str, sender: &str) -> String {
        self.classify_at(text, sender, Local::now().naive_local())
    }

    /// Compute the reply as of `now` (local wall-clock time).
    pub fn classify_at(&self, text: &str, sender: &str, now: NaiveDateTime) -> String {
        match find_rule(&text.to_lowercase()) {
            Some(rule) => match rule.template {
                Template::Text(template) => template.replace("{name}", sender),
                Template::Time => format!("Сейчас {}", now.format("%H:%M:%S")),
                Template::Date => format!("Сегодня {}", now.format("%d.%m.%Y")),
            },
            None => {
                let index = self.picker.pick(FALLBACK_REPLIES.len()) % FALLBACK_REPLIES.len();
                render_fallback(FALLBACK_REPLIES[index], sender)
            }
        }
    }
}

impl Default for ResponseRules {
    fn default() -> Self {
        Self::new(ThreadRngPicker)
    }
}

fn find_rule(lowered: &str) -> Option<&'static Rule> {
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lowered.contains(kw)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
