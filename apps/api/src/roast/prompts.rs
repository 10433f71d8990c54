// Roast prompt constants and the canned fallback roast.

/// System prompt: comedic, mildly biting, work-safe, 400–600 words of markdown.
pub const ROAST_SYSTEM: &str = "You are a hilarious resume roaster. \
    Your job is to humorously critique resumes in a roast comedy style. \
    Be funny, sarcastic, and a bit mean - but keep it professional enough that it could still be shown in a work setting. \
    Focus on resume red flags, buzzwords, exaggerations, and formatting issues. \
    Format your response with markdown headings, bullet points, and occasional emojis for emphasis. \
    Your response should be between 400-600 words.";

/// User turn template. Replace `{resume_text}` before sending.
pub const ROAST_USER_TEMPLATE: &str = "Here's the resume to roast:\n\n{resume_text}";

pub const ROAST_MAX_TOKENS: u32 = 1000;
pub const ROAST_TEMPERATURE: f32 = 0.8;

/// Served whenever the live backend is unconfigured or fails.
pub const FALLBACK_ROAST: &str = r#"# Your Resume: A Comedy of Errors 🤣

## "Professional Experience" or Professional Exaggeration?

* Your job titles seem to grow more impressive with each role. Did you actually **"Lead Strategic Innovation Initiatives"** or did you just organize the office birthday calendar?
* I see you've listed "proficient in Excel" - let me guess, you can sum a column? Revolutionary!
* Those bullet points are longer than a CVS receipt. Maybe your next skill should be "concise communication."

## Skills & Expertise (allegedly)

* "Detail-oriented" yet I spotted three typos in the first paragraph alone. Irony at its finest!
* "Team player" who "works well independently" - so basically, you exist in a quantum state of collaboration.
* Your core competencies take up half the page. Compensating for something?

## Education: The Four Most Expensive Years of Your Life

* That prestigious university degree and yet here we are, with a resume that looks like it was formatted in the dark.
* Minor in Psychology but major in overusing corporate buzzwords. "Synergy" appears 7 times!

In conclusion, this resume reads like it was written by ChatGPT after being fed nothing but LinkedIn motivational posts for a week. But hey, at least your name is spelled correctly! 👏"#;

pub fn build_user_prompt(resume_text: &str) -> String {
    ROAST_USER_TEMPLATE.replace("{resume_text}", resume_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_embeds_resume() {
        let prompt = build_user_prompt("Experienced ninja rockstar");
        assert!(prompt.starts_with("Here's the resume to roast:\n\n"));
        assert!(prompt.ends_with("Experienced ninja rockstar"));
    }

    #[test]
    fn test_fallback_is_markdown() {
        assert!(FALLBACK_ROAST.starts_with("# "));
        assert!(FALLBACK_ROAST.contains("\n## "));
        assert!(FALLBACK_ROAST.contains("\n* "));
    }
}
