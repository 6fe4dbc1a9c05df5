//! Invitation note templates

use shared::{Candidate, TemplateId};

/// Longest note the outreach channel accepts
pub const MAX_NOTE_CHARS: usize = 300;

/// Fill in a template for one candidate at `company`
pub fn render(template: TemplateId, candidate: &Candidate, company: &str) -> String {
    let greeting = if candidate.first_name.trim().is_empty() {
        "Hi there".to_string()
    } else {
        format!("Hi {}", candidate.first_name.trim())
    };
    let industry = non_empty_or(&candidate.industry, "your industry");
    let title = non_empty_or(&candidate.title, "your role");

    let note = match template {
        TemplateId::Standard => format!(
            "{greeting}, I came across your profile while looking into {company} and would love to connect."
        ),
        TemplateId::Industry => format!(
            "{greeting}, I'm connecting with people working in {industry} at {company}. \
             It would be great to swap notes on where the space is heading."
        ),
        TemplateId::Leadership => format!(
            "{greeting}, I've been following what {company} is building and your work as {title} stood out. \
             I'd value having you in my network."
        ),
        TemplateId::Alumni => format!(
            "{greeting}, we move in similar circles and I noticed your work at {company}. \
             Thought it would be good to connect."
        ),
    };
    truncate_chars(&note, MAX_NOTE_CHARS)
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback
    } else {
        trimmed
    }
}

/// Cut to at most `max` characters without splitting a code point
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
