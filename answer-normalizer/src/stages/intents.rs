//! Intent overrides: canned or computed answers keyed on the question.
//!
//! The table is evaluated top to bottom and the first intent that both
//! matches and has something to say wins. An intent whose backing persona
//! data is empty stays silent and lets the next one try.

use std::sync::Arc;

use regex::Regex;
use tracing::info;

use super::{Flow, Stage, StageContext};
use crate::{
    arithmetic::{ExprParser, format_number},
    clock::Clock,
    errors::NormalizerError,
    persona::PersonaProfile,
};

pub const PRIVACY_REFUSAL: &str =
    "I prefer to keep personal details private, but I'm happy to talk about my professional background.";
pub const DIVISION_BY_ZERO: &str =
    "Dividing by zero has no answer, but I'm happy to help with anything about my work.";

type Responder = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

struct Intent {
    name: &'static str,
    predicate: Regex,
    respond: Responder,
}

fn fixed(text: impl Into<String>) -> Responder {
    let text = text.into();
    Box::new(move |_: &str| Some(text.clone()))
}

/// `None` when `value` is blank, so the intent does not fire.
fn fixed_if_present(value: &str, render: impl Fn(&str) -> String) -> Responder {
    let out = (!value.trim().is_empty()).then(|| render(value.trim()));
    Box::new(move |_: &str| out.clone())
}

fn bullet_list(header: &str, items: &[String]) -> Responder {
    let items: Vec<&str> = items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    let out = (!items.is_empty()).then(|| {
        let body = items
            .iter()
            .map(|s| format!("- {s}"))
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("{header}\n\n{body}")
    });
    Box::new(move |_: &str| out.clone())
}

/// "a", "a and b", "a, b, and c".
fn natural_join(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [one] => one.to_string(),
        [a, b] => format!("{a} and {b}"),
        [rest @ .., last] => format!("{}, and {last}", rest.join(", ")),
    }
}

/// Priority-ordered `(predicate, responder)` table.
pub struct IntentTable {
    intents: Vec<Intent>,
}

impl IntentTable {
    pub fn new(persona: &PersonaProfile, clock: Arc<dyn Clock>) -> Result<Self, NormalizerError> {
        let p = persona;
        let mut intents = Vec::new();
        let mut add = |name: &'static str, pattern: &str, respond: Responder| -> Result<(), NormalizerError> {
            intents.push(Intent {
                name,
                predicate: Regex::new(pattern)?,
                respond,
            });
            Ok(())
        };

        add(
            "greeting",
            r"(?i)^\s*(?:hi|hello|hey|hiya|howdy|greetings|yo|good\s+(?:morning|afternoon|evening))(?:\s+there)?\s*[!.?,]*\s*$",
            fixed(format!(
                "Hi! I'm {}. Ask me anything about my background, skills, or projects.",
                p.first_name
            )),
        )?;
        add(
            "how_are_you",
            r"(?i)^\s*(?:(?:hi|hello|hey)[\s,!]*)?how(?:'s|\s+is|\s+are)\s+(?:you|it going|things)(?:\s+doing)?(?:\s+today)?\s*[?!.]*\s*$",
            fixed("I'm doing well, thanks for asking! What would you like to know about my work?"),
        )?;
        add(
            "thanks",
            r"(?i)^\s*(?:thanks|thank you|thx|cheers|much appreciated)\b[^?]*$",
            fixed("You're welcome! Let me know if there's anything else you'd like to know."),
        )?;
        add(
            "goodbye",
            r"(?i)^\s*(?:bye|goodbye|see you|see ya|farewell)\b[^?]*$",
            fixed("Thanks for stopping by! Feel free to come back with more questions anytime."),
        )?;
        add(
            "identity",
            r"(?i)\b(?:who\s+are\s+you|what(?:'s|\s+is)\s+your\s+name|introduce\s+yourself|tell\s+me\s+about\s+yourself)\b",
            fixed(if p.headline.trim().is_empty() {
                format!("I'm {}.", p.full_name)
            } else {
                format!("I'm {}, {}.", p.full_name, p.headline.trim())
            }),
        )?;
        add(
            "location",
            r"(?i)\bwhere\s+are\s+you\s+(?:based|located|from)\b|\bwhere\s+do\s+you\s+(?:come\s+from|work\s+from)\b",
            fixed_if_present(&p.location, |l| format!("I'm based in {l}.")),
        )?;
        add(
            "role",
            r"(?i)\bwhat\s+do\s+you\s+do\b|\bwhat(?:'s|\s+is)\s+your\s+(?:current\s+)?(?:role|job|title|position|profession)\b",
            fixed_if_present(&p.role, |r| format!("I work as {r}.")),
        )?;
        add(
            "education",
            r"(?i)\b(?:education|degree|university|college|graduated?|(?:where|what)\s+did\s+you\s+study)\b",
            fixed_if_present(&p.education, |e| format!("I hold {e}.")),
        )?;
        add(
            "skills",
            r"(?i)\b(?:skills?|tech\s+stack|technologies|programming\s+languages|what\s+are\s+you\s+good\s+at|expertise)\b",
            bullet_list("Here are my core skills:", &p.skills),
        )?;
        add(
            "projects",
            r"(?i)\b(?:projects?|portfolio|what\s+have\s+you\s+(?:built|made|shipped))\b",
            bullet_list("Here are some projects I've worked on:", &p.projects),
        )?;
        let clients: Vec<&str> = p
            .clients
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        add(
            "clients",
            r"(?i)\b(?:clients?|customers|work\s+history|employers?|companies|past\s+jobs|(?:who|where)\s+have\s+you\s+worked)\b",
            fixed_if_present(&natural_join(&clients), |c| format!("I've worked with {c}.")),
        )?;
        add(
            "personal_info",
            r"(?i)\b(?:age|how\s+old|birthday|birth\s*date|date\s+of\s+birth|born|address|where\s+(?:do\s+)?you\s+live|phone(?:\s+number)?|e-?mail|contact\s+(?:details|info(?:rmation)?)|family|married|spouse|wife|husband|kids|children|parents|siblings|girlfriend|boyfriend)\b",
            fixed(PRIVACY_REFUSAL),
        )?;

        let parser = ExprParser::new()?;
        add(
            "arithmetic",
            r"\d",
            Box::new(move |q: &str| {
                let expr = parser.parse(q)?;
                Some(
                    expr.eval()
                        .map(format_number)
                        .unwrap_or_else(|| DIVISION_BY_ZERO.to_string()),
                )
            }),
        )?;

        let c = clock.clone();
        add(
            "date",
            r"(?i)\bwhat(?:'s|\s+is)\s+(?:the\s+|today's\s+)?date\b|\bwhat\s+date\s+is\s+(?:it|today)\b",
            Box::new(move |_: &str| Some(format!("Today is {}.", c.now().format("%A, %B %-d, %Y")))),
        )?;
        let c = clock.clone();
        add(
            "day",
            r"(?i)\bwhat\s+(?:day|weekday)\s+is\s+(?:it|today)\b",
            Box::new(move |_: &str| Some(format!("Today is {}.", c.now().format("%A")))),
        )?;
        let c = clock.clone();
        add(
            "time",
            r"(?i)\bwhat\s+time\s+is\s+it\b|\bwhat(?:'s|\s+is)\s+the\s+time\b|\bcurrent\s+time\b|\bwhat\s+hour\s+is\s+it\b",
            Box::new(move |_: &str| Some(format!("It's {}.", c.now().format("%H:%M")))),
        )?;
        let c = clock;
        add(
            "year",
            r"(?i)\bwhat\s+year\s+is\s+(?:it|this)\b|\bcurrent\s+year\b",
            Box::new(move |_: &str| Some(format!("It's {}.", c.now().format("%Y")))),
        )?;

        Ok(Self { intents })
    }

    /// First intent that matches `question` and produces an answer.
    pub fn resolve(&self, question: &str) -> Option<(&'static str, String)> {
        self.intents
            .iter()
            .filter(|i| i.predicate.is_match(question))
            .find_map(|i| (i.respond)(question).map(|answer| (i.name, answer)))
    }

    /// Intent names in evaluation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.intents.iter().map(|i| i.name).collect()
    }
}

impl Stage for IntentTable {
    fn name(&self) -> &'static str {
        "intent_override"
    }

    fn apply(&self, text: String, ctx: &StageContext<'_>) -> Flow {
        match self.resolve(ctx.question) {
            Some((intent, answer)) => {
                info!(intent, "intent override fired");
                Flow::Finish(answer)
            }
            None => Flow::Continue(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn table_for(p: &PersonaProfile) -> IntentTable {
        let clock = FixedClock::at(2026, 10, 19, 14, 5).unwrap();
        IntentTable::new(p, Arc::new(clock)).unwrap()
    }

    fn answer(q: &str) -> Option<(&'static str, String)> {
        table_for(&PersonaProfile::default()).resolve(q)
    }

    #[test]
    fn greeting_is_a_fixed_literal() {
        let (name, text) = answer("hi").unwrap();
        assert_eq!(name, "greeting");
        assert_eq!(
            text,
            "Hi! I'm Alex. Ask me anything about my background, skills, or projects."
        );
        assert_eq!(answer("Hello there!").unwrap().0, "greeting");
    }

    #[test]
    fn greeting_with_a_real_question_is_not_a_greeting() {
        assert_ne!(answer("hi, what are your skills?").unwrap().0, "greeting");
    }

    #[test]
    fn small_talk_and_factual_lookups() {
        assert_eq!(answer("How are you?").unwrap().0, "how_are_you");
        assert_eq!(answer("thanks a lot").unwrap().0, "thanks");
        assert_eq!(answer("Who are you?").unwrap().1, format!(
            "I'm Alex Morgan, {}.",
            PersonaProfile::default().headline
        ));
        assert_eq!(answer("Where are you based?").unwrap().1, "I'm based in Lisbon, Portugal.");
        assert_eq!(answer("What is your current role?").unwrap().1, "I work as a senior backend engineer.");
    }

    #[test]
    fn lists_come_from_the_profile() {
        let (name, text) = answer("What are your skills?").unwrap();
        assert_eq!(name, "skills");
        assert!(text.starts_with("Here are my core skills:\n\n- Rust\n\n- Go"));

        let (name, text) = answer("Which clients have you worked with?").unwrap();
        assert_eq!(name, "clients");
        assert_eq!(
            text,
            "I've worked with a European fintech scale-up, a logistics platform, and several early-stage startups."
        );
    }

    #[test]
    fn empty_backing_data_lets_later_intents_fire() {
        let p = PersonaProfile {
            projects: Vec::new(),
            ..PersonaProfile::default()
        };
        assert!(table_for(&p).resolve("Tell me about your projects").is_none());
    }

    #[test]
    fn personal_information_is_refused() {
        for q in ["what's your address", "How old are you?", "Are you married?", "What is your phone number?"] {
            assert_eq!(answer(q).unwrap().1, PRIVACY_REFUSAL, "{q}");
        }
    }

    #[test]
    fn arithmetic_is_computed() {
        assert_eq!(answer("what is 7 * 6?").unwrap().1, "42");
        assert_eq!(answer("9 / 0").unwrap().1, DIVISION_BY_ZERO);
        assert!(answer("I used Rust 1.75 at work, thoughts?").is_none());
    }

    #[test]
    fn date_and_time_come_from_the_clock() {
        assert_eq!(answer("What's the date?").unwrap().1, "Today is Monday, October 19, 2026.");
        assert_eq!(answer("what day is it today").unwrap().1, "Today is Monday.");
        assert_eq!(answer("What time is it?").unwrap().1, "It's 14:05.");
        assert_eq!(answer("what year is it").unwrap().1, "It's 2026.");
    }

    #[test]
    fn unrelated_questions_fall_through() {
        assert!(answer("How did you get into distributed systems?").is_none());
    }

    #[test]
    fn evaluation_order_is_declared() {
        let names = table_for(&PersonaProfile::default()).names();
        assert_eq!(names.first(), Some(&"greeting"));
        let refusal = names.iter().position(|n| *n == "personal_info").unwrap();
        let arithmetic = names.iter().position(|n| *n == "arithmetic").unwrap();
        assert!(refusal < arithmetic);
    }
}
