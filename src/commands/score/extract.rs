use super::*;

const ANSWER_PREFIXES: [&str; 8] = [
    "The best answer is",
    "The correct answer is",
    "The answer is",
    "The answer",
    "The best option is",
    "The correct option is",
    "Best answer:",
    "Best option:",
];

pub struct AnswerExtractor {
    parenthetical: Regex,
    letter: Regex,
}

impl AnswerExtractor {
    pub fn new() -> Result<Self> {
        let parenthetical =
            Regex::new(r"\(([A-Ea-e])\)").context("failed to compile parenthetical regex")?;
        let letter = Regex::new(r"[A-Ea-e]").context("failed to compile letter regex")?;

        Ok(Self {
            parenthetical,
            letter,
        })
    }

    // Stages are ordered from least to most ambiguous; the first stage with
    // any match wins.
    pub fn extract(&self, raw: &str) -> String {
        let mut text = raw.trim().to_string();
        for prefix in ANSWER_PREFIXES {
            text = text.replace(prefix, "");
        }

        if !self.letter.is_match(&text) {
            return String::new();
        }

        let mut letters = self.parenthetical_letters(&text);
        if letters.is_empty() {
            letters = self.bounded_letters(&text);
        }
        if letters.is_empty() {
            letters = self.bare_letters(&text);
        }

        letters.into_iter().collect()
    }

    fn parenthetical_letters(&self, text: &str) -> BTreeSet<char> {
        self.parenthetical
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .flat_map(|group| group.as_str().chars())
            .map(|letter| letter.to_ascii_uppercase())
            .collect()
    }

    // The boundaries are checked against the neighboring characters instead of
    // being part of the pattern, so adjacent standalone letters ("A B C") all
    // match rather than every other one.
    fn bounded_letters(&self, text: &str) -> BTreeSet<char> {
        self.letter
            .find_iter(text)
            .filter(|found| {
                let before = text[..found.start()].chars().next_back();
                let after = text[found.end()..].chars().next();
                before.is_none_or(char::is_whitespace)
                    && after.is_none_or(|c| c.is_whitespace() || c == ',' || c == '.')
            })
            .flat_map(|found| found.as_str().chars())
            .map(|letter| letter.to_ascii_uppercase())
            .collect()
    }

    fn bare_letters(&self, text: &str) -> BTreeSet<char> {
        self.letter
            .find_iter(text)
            .flat_map(|found| found.as_str().chars())
            .map(|letter| letter.to_ascii_uppercase())
            .collect()
    }
}

pub fn letter_set(answer: &str) -> BTreeSet<char> {
    answer
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

pub fn unable_to_decide_letter(options: &[String]) -> Result<char> {
    const LETTERS: &[u8] = b"ABCDEFGH";
    ensure!(
        !options.is_empty() && options.len() <= LETTERS.len(),
        "expected between 1 and {} answer choices, found {}",
        LETTERS.len(),
        options.len()
    );
    let last = &options[options.len() - 1];
    ensure!(
        last.to_lowercase().contains("unable to decide"),
        "last answer choice is not the unable-to-decide option: {last:?}"
    );

    Ok(LETTERS[options.len() - 1] as char)
}
