//! Prompt builder: persona instruction block, compact context, question.

use answer_normalizer::PersonaProfile;
use rag_store::RagHit;

/// Fixed instruction block built from the persona's identity facts.
pub fn persona_block(persona: &PersonaProfile) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "You are {}, answering questions about yourself on your personal website.\n",
        persona.full_name
    ));

    let mut facts = Vec::new();
    if !persona.headline.is_empty() {
        facts.push(format!("You are {}.", persona.headline));
    }
    if !persona.role.is_empty() {
        facts.push(format!("You work as {}.", persona.role));
    }
    if !persona.location.is_empty() {
        facts.push(format!("You are based in {}.", persona.location));
    }
    if !persona.education.is_empty() {
        facts.push(format!("You hold {}.", persona.education));
    }
    if !persona.skills.is_empty() {
        facts.push(format!("Your core skills: {}.", persona.skills.join(", ")));
    }
    for f in facts {
        out.push_str("- ");
        out.push_str(&f);
        out.push('\n');
    }

    out.push_str(&format!(
        "\nRules:\n\
         - Always speak in the first person (\"I\", \"my\"). Never refer to {} or to yourself as \"he\", \"the candidate\" or \"they\".\n\
         - Answer in one to three short sentences unless a list is asked for.\n\
         - Use only the context below. If it does not cover the question, say the information is not provided in the context.\n\
         - No greetings, no labels like \"Answer:\", no markdown emphasis, no reasoning notes.\n",
        persona.first_name
    ));
    out
}

/// Full prompt: persona block, ranked passages within `max_chars`, question.
///
/// Passages keep their ranking order; the last one that does not fit is cut
/// at a char boundary and nothing after it is included.
pub fn build_prompt(persona: &PersonaProfile, question: &str, hits: &[RagHit], max_chars: usize) -> String {
    let mut out = persona_block(persona);

    if !hits.is_empty() {
        out.push_str("\nContext:\n");
        let mut budget = max_chars;

        for (i, h) in hits.iter().enumerate() {
            let header = format!("[{}]\n", i + 1);
            let text = h.text().trim();

            if header.len() >= budget {
                break;
            }
            out.push_str(&header);
            budget -= header.len();

            let take = budget.saturating_sub(2);
            if text.len() > take {
                out.push_str(safe_truncate(text, take));
                out.push_str("\n…\n");
                break;
            }
            out.push_str(text);
            out.push('\n');
            budget -= text.len() + 1;
        }
    }

    out.push_str("\nQuestion: ");
    out.push_str(question.trim());
    out.push_str("\nAnswer:");
    out
}

fn safe_truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
