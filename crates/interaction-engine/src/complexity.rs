//! §4.1 task-complexity heuristic.
//!
//! Preserved verbatim from the source, dead lower branches included: the
//! keyword/word-count score selects a tier of 25/35/50, but the engine then
//! applies `Config::min_max_iterations` (50) as a floor, so the 25 and 35
//! tiers never actually take effect. See DESIGN.md's Open Question note.

const KEYWORDS: &[&str] = &[
    "register",
    "registration",
    "sign up",
    "signup",
    "create account",
    "login",
    "log in",
    "authentication",
    "verify",
    "verification",
    "multi-step",
    "workflow",
    "form",
    "multiple pages",
    "navigation",
    "chat",
    "message",
    "conversation",
    "upload",
    "download",
    "search and",
    "find and",
    "extract and",
    "scrape and",
];

/// Case-insensitive keyword substring count plus a word-count bump.
pub fn score(task: &str) -> u32 {
    let lower = task.to_ascii_lowercase();
    let mut score = KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count() as u32;

    let word_count = task.split_whitespace().count();
    if word_count > 20 {
        score += 2;
    } else if word_count > 10 {
        score += 1;
    }

    score
}

/// Score >= 4 -> 50, >= 2 -> 35, else 25.
pub fn tier(task: &str) -> u32 {
    match score(task) {
        s if s >= 4 => 50,
        s if s >= 2 => 35,
        _ => 25,
    }
}
