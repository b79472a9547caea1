//! Third-person to first-person rewrite.
//!
//! Rules run once, in declaration order, each over the output of the previous
//! one. Later rules repair what earlier ones leave behind ("I is" -> "I am"),
//! so the order below is part of the contract.

use regex::{Captures, Regex};
use tracing::trace;

use super::{Flow, Stage, StageContext, capitalize_first};
use crate::{errors::NormalizerError, persona::PersonaProfile};

/// Third-person verb forms and their first-person counterparts.
const VERBS: &[(&str, &str)] = &[
    ("is", "am"),
    ("has", "have"),
    ("does", "do"),
    ("was", "was"),
    ("had", "had"),
    ("did", "did"),
    ("can", "can"),
    ("will", "will"),
    ("would", "would"),
    ("could", "could"),
    ("should", "should"),
    ("works", "work"),
    ("worked", "worked"),
    ("builds", "build"),
    ("built", "built"),
    ("leads", "lead"),
    ("led", "led"),
    ("enjoys", "enjoy"),
    ("specializes", "specialize"),
    ("specialises", "specialise"),
    ("focuses", "focus"),
    ("loves", "love"),
    ("likes", "like"),
    ("uses", "use"),
    ("knows", "know"),
    ("brings", "bring"),
    ("holds", "hold"),
    ("lives", "live"),
    ("studies", "study"),
    ("studied", "studied"),
    ("designs", "design"),
    ("designed", "designed"),
    ("develops", "develop"),
    ("developed", "developed"),
    ("manages", "manage"),
    ("managed", "managed"),
    ("writes", "write"),
    ("wrote", "wrote"),
    ("creates", "create"),
    ("created", "created"),
    ("helps", "help"),
    ("helped", "helped"),
    ("believes", "believe"),
    ("thinks", "think"),
    ("prefers", "prefer"),
    ("speaks", "speak"),
    ("teaches", "teach"),
    ("mentors", "mentor"),
    ("ships", "ship"),
    ("shipped", "shipped"),
    ("owns", "own"),
    ("runs", "run"),
    ("contributes", "contribute"),
    ("contributed", "contributed"),
    ("joined", "joined"),
    ("started", "started"),
    ("graduated", "graduated"),
];

/// Participles that turn a rewritten "I'm" back into "I've" ("he's worked").
const PARTICIPLES: &str = "been|got|had|worked|built|led|done|made|shipped|created|developed|designed|managed|written|taught|helped|contributed|spent|joined|started";

/// Words after which a name stays a name ("I'm Alex", "my name is Alex").
const NAME_KEEPERS: &[&str] = &["i'm", "am", "is", "called", "named", "name's"];

/// Words after which a name is an object ("contact Alex" -> "contact me").
const OBJECT_MARKERS: &[&str] = &[
    "with", "to", "for", "about", "from", "of", "by", "contact", "ask", "hire", "reach", "email",
];

const ABBREVIATIONS: &[&str] = &["e.g", "i.e", "mr", "mrs", "ms", "dr", "vs", "etc"];

enum Rewrite {
    Literal(&'static str),
    With(Box<dyn Fn(&Captures<'_>) -> String + Send + Sync>),
}

struct Rule {
    name: &'static str,
    re: Regex,
    rewrite: Rewrite,
}

impl Rule {
    fn literal(name: &'static str, pattern: &str, rep: &'static str) -> Result<Self, NormalizerError> {
        Ok(Self {
            name,
            re: Regex::new(pattern)?,
            rewrite: Rewrite::Literal(rep),
        })
    }

    fn with<F>(name: &'static str, pattern: &str, f: F) -> Result<Self, NormalizerError>
    where
        F: Fn(&Captures<'_>) -> String + Send + Sync + 'static,
    {
        Ok(Self {
            name,
            re: Regex::new(pattern)?,
            rewrite: Rewrite::With(Box::new(f)),
        })
    }

    fn apply(&self, text: &str) -> String {
        match &self.rewrite {
            Rewrite::Literal(rep) => self.re.replace_all(text, *rep).into_owned(),
            Rewrite::With(f) => self.re.replace_all(text, |c: &Captures<'_>| f(c)).into_owned(),
        }
    }
}

fn first_person(verb: &str) -> &'static str {
    VERBS
        .iter()
        .find(|(third, _)| *third == verb)
        .map(|(_, first)| *first)
        .unwrap_or("")
}

fn conjugated(c: &Captures<'_>) -> String {
    let verb = c.get(1).map(|m| m.as_str()).unwrap_or_default();
    format!("I {}", first_person(verb))
}

/// Keeps the capitalization of the first letter of `original`.
fn same_case(original: &str, lower: &str) -> String {
    if original.chars().next().is_some_and(char::is_uppercase) {
        capitalize_first(lower)
    } else {
        lower.to_string()
    }
}

/// Ordered persona rewrite rules for one profile.
pub struct PersonaRewrite {
    rules: Vec<Rule>,
}

impl PersonaRewrite {
    pub fn new(persona: &PersonaProfile) -> Result<Self, NormalizerError> {
        let names = format!(
            "(?:{}|{})",
            regex::escape(persona.full_name.trim()),
            regex::escape(persona.first_name.trim())
        );
        let verbs = VERBS.iter().map(|(v, _)| *v).collect::<Vec<_>>().join("|");

        let rules = vec![
            Rule::literal("name_possessive", &format!(r"\b{names}(?:'s|’s)"), "my")?,
            Rule::with("name_verb", &format!(r"\b{names}\s+({verbs})\b"), conjugated)?,
            Rule::literal("candidate_possessive", r"(?i)\bthe candidate(?:'s|’s)", "my")?,
            Rule::with(
                "candidate_verb",
                &format!(r"(?i:\bthe candidate)\s+({verbs})\b"),
                conjugated,
            )?,
            Rule::with("he_verb", &format!(r"\b(?i:he)\s+({verbs})\b"), conjugated)?,
            Rule::with(
                "name_remaining",
                &format!(r"(?:\b([\w'’]+)(\s+))?\b{names}\b"),
                |c: &Captures<'_>| {
                    let whole = c.get(0).map(|m| m.as_str()).unwrap_or_default();
                    let Some(prev) = c.get(1).map(|m| m.as_str()) else {
                        return "I".to_string();
                    };
                    let gap = c.get(2).map(|m| m.as_str()).unwrap_or(" ");
                    let lower = prev.to_lowercase().replace('’', "'");
                    if NAME_KEEPERS.contains(&lower.as_str()) {
                        whole.to_string()
                    } else if OBJECT_MARKERS.contains(&lower.as_str()) {
                        format!("{prev}{gap}me")
                    } else {
                        format!("{prev}{gap}I")
                    }
                },
            )?,
            Rule::literal("the_candidate", r"(?i)\bthe candidate\b", "I")?,
            Rule::literal("he_is_contracted", r"\b(?i:he)(?:'s|’s)", "I'm")?,
            Rule::literal("he", r"\b(?i:he)\b", "I")?,
            Rule::with("his", r"\b(?i:his)\b", |c: &Captures<'_>| same_case(&c[0], "my"))?,
            Rule::with("himself", r"\b(?i:himself)\b", |c: &Captures<'_>| {
                same_case(&c[0], "myself")
            })?,
            Rule::with("him", r"\b(?i:him)\b", |c: &Captures<'_>| same_case(&c[0], "me"))?,
            Rule::literal("i_is", r"\bI is\b", "I am")?,
            Rule::literal("i_has", r"\bI has\b", "I have")?,
            Rule::literal("i_does", r"\bI does\b", "I do")?,
            Rule::literal("im_participle", &format!(r"\bI'm ({PARTICIPLES})\b"), "I've $1")?,
            Rule::literal("object_i", r"\b(with|to|for|about|from|by|of)\s+I\b", "$1 me")?,
            Rule::with("lowercase_i", r"\bi\b(?:\.e\.)?", |c: &Captures<'_>| {
                let m = &c[0];
                if m.len() > 1 { m.to_string() } else { "I".to_string() }
            })?,
            Rule::literal(
                "context_attribution",
                r"(?i)\b(?:according to|based on) (?:the )?(?:provided |given |available )?(?:context|information|documents?|profile)\s*,?\s*",
                "",
            )?,
            Rule::with("sentence_case", r"(\S*[.!?])(\s+)(\p{Ll})", |c: &Captures<'_>| {
                let token = &c[1];
                let bare = token.trim_end_matches(['.', '!', '?']).to_lowercase();
                if ABBREVIATIONS.contains(&bare.as_str()) {
                    c[0].to_string()
                } else {
                    format!("{}{}{}", token, &c[2], c[3].to_uppercase())
                }
            })?,
            Rule::literal("double_i", r"\bI(?:\s+I\b)+", "I")?,
            Rule::literal("double_my", r"\b(?i:(my))(?:\s+(?i:my)\b)+", "$1")?,
            Rule::literal("double_me", r"\b(?i:(me))(?:\s+(?i:me)\b)+", "$1")?,
        ];

        Ok(Self { rules })
    }

    pub fn rewrite(&self, text: &str) -> String {
        let mut cur = text.to_string();
        for rule in &self.rules {
            let next = rule.apply(&cur);
            if next != cur {
                trace!(rule = rule.name, "persona rule applied");
            }
            cur = next;
        }
        capitalize_first(cur.trim())
    }
}

impl Stage for PersonaRewrite {
    fn name(&self) -> &'static str {
        "persona_rewrite"
    }

    fn apply(&self, text: String, _ctx: &StageContext<'_>) -> Flow {
        Flow::Continue(self.rewrite(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rw(s: &str) -> String {
        PersonaRewrite::new(&PersonaProfile::default()).unwrap().rewrite(s)
    }

    #[test]
    fn name_and_possessive_become_first_person() {
        assert_eq!(
            rw("Alex is a backend engineer. Alex's main language is Rust."),
            "I am a backend engineer. My main language is Rust."
        );
        assert_eq!(rw("Alex Morgan builds tools and he enjoys it."), "I build tools and I enjoy it.");
    }

    #[test]
    fn pronouns_are_rewritten_with_grammar_repair() {
        assert_eq!(
            rw("He has worked with clients. His focus is APIs."),
            "I have worked with clients. My focus is APIs."
        );
        assert_eq!(rw("He's shipped three products."), "I've shipped three products.");
        assert_eq!(rw("he's a mentor and teams trust him."), "I'm a mentor and teams trust me.");
        assert_eq!(rw("He taught himself Rust."), "I taught myself Rust.");
    }

    #[test]
    fn name_in_object_position_becomes_me() {
        assert_eq!(rw("You can contact Alex Morgan for details."), "You can contact me for details.");
        assert_eq!(rw("Teams like working with the candidate."), "Teams like working with me.");
    }

    #[test]
    fn self_introductions_keep_the_name() {
        assert_eq!(rw("I'm Alex and Alex loves Rust."), "I'm Alex and I love Rust.");
    }

    #[test]
    fn lowercase_i_attribution_and_sentence_case() {
        assert_eq!(
            rw("i like rust, i.e. systems work. according to the context, it is fast."),
            "I like rust, i.e. systems work. It is fast."
        );
        assert_eq!(
            rw("Based on the provided context, the candidate is based in Lisbon."),
            "I am based in Lisbon."
        );
    }

    #[test]
    fn stutters_collapse() {
        assert_eq!(rw("I I work with my my team."), "I work with my team.");
    }

    #[test]
    fn rewrite_is_stable_on_its_own_output() {
        for s in [
            "Alex is a backend engineer. Alex's main language is Rust.",
            "He's shipped three products and he leads a team.",
            "I'm Alex and Alex loves Rust.",
            "You can contact Alex Morgan for details.",
        ] {
            let once = rw(s);
            assert_eq!(rw(&once), once, "unstable for {s:?}");
        }
    }
}
