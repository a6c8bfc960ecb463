//! §4.1 step 4 / §4.4 step 1: planning context and prompt rendering, plus the
//! §4.4 Reminders computed from recent history.

use webagent_core_types::{AttemptOutcome, AttemptRecord, Operation};

/// Everything the Planner needs to render one planning prompt (§4.1 step 4).
#[derive(Debug, Clone)]
pub struct PlanningContext {
    pub task: String,
    pub iteration: u32,
    pub max_iterations: u32,
    pub current_url: String,
    pub url_changed: bool,
    pub stable_selectors: Vec<String>,
    pub clickable_texts: Vec<String>,
    pub field_inventory_rendered: String,
    /// Full attempt history so far; only the last 5 are rendered, but the
    /// reminder heuristics look a little further back.
    pub history: Vec<AttemptRecord>,
}

impl PlanningContext {
    /// The contextual reminder (§4.4 Reminders), or none if nothing applies.
    pub fn reminder(&self) -> Option<String> {
        compute_reminder(&self.history, &self.current_url)
    }

    /// §4.4 step 1: the full prompt body, XML-only, wrapped in `<answer>`.
    pub fn render(&self) -> String {
        let recent: Vec<&AttemptRecord> = self.history.iter().rev().take(5).rev().collect();
        let history_block = if recent.is_empty() {
            "(no attempts yet)".to_string()
        } else {
            recent.iter().map(|r| r.summary_line()).collect::<Vec<_>>().join("\n")
        };

        let reminder_block = match self.reminder() {
            Some(r) => format!("\nREMINDER: {r}\n"),
            None => String::new(),
        };

        format!(
            "TASK: {task}\n\
             ITERATION: {iteration}/{max_iterations}\n\
             CURRENT URL: {url}\n\
             URL CHANGED SINCE LAST STEP: {url_changed}\n\
             STABLE SELECTORS:\n{selectors}\n\
             CLICKABLE TEXTS:\n{texts}\n\
             FIELDS:\n{fields}\n\
             RECENT HISTORY:\n{history}\n\
             {reminder}\n\
             Respond with exactly one <interaction><step>...</step></interaction> block, \
             wrapped in <answer>...</answer>, and nothing else. Do not include prose outside \
             the <answer> tags.",
            task = self.task,
            iteration = self.iteration,
            max_iterations = self.max_iterations,
            url = self.current_url,
            url_changed = self.url_changed,
            selectors = render_list(&self.stable_selectors),
            texts = render_list(&self.clickable_texts),
            fields = self.field_inventory_rendered,
            history = history_block,
            reminder = reminder_block,
        )
    }

    /// §4.4 step 4: a corrective prompt prepending the previous error.
    pub fn render_corrective(&self, previous_error: &str) -> String {
        format!(
            "Your previous response was rejected: {previous_error}\n\
             Emit exactly one <interaction><step>...</step></interaction> block wrapped in \
             <answer>...</answer>, using only the known operation names, and nothing else.\n\n{}",
            self.render()
        )
    }
}

fn render_list(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.iter().map(|s| format!("- {s}")).collect::<Vec<_>>().join("\n")
    }
}

/// §4.4 Reminders: nudges derived from the tail of `history`, given the
/// current URL (used for the search-results heuristic).
pub fn compute_reminder(history: &[AttemptRecord], current_url: &str) -> Option<String> {
    let last = history.last()?;
    if last.outcome != AttemptOutcome::Success {
        return None;
    }
    let (operation, _, value) = &last.signature;

    match operation {
        Operation::Fill => {
            let pressed_enter_recently = history
                .iter()
                .rev()
                .take(2)
                .any(|r| r.outcome == AttemptOutcome::Success && is_press_enter(&r.signature));
            if pressed_enter_recently {
                None
            } else {
                Some(
                    "the last fill has not been followed by pressing Enter yet; submit the form \
                     with a press Enter step before moving on"
                        .to_string(),
                )
            }
        }
        Operation::ScrapeToMemory => {
            if looks_like_search_results(current_url) {
                Some(
                    "the scraped page looks like a search-results listing; click into a specific \
                     result before responding"
                        .to_string(),
                )
            } else {
                Some(
                    "the page was already scraped to memory; do not scrape it again, instead \
                     respond, click onward, or finish with done"
                        .to_string(),
                )
            }
        }
        Operation::Press if is_press_enter(&last.signature) => {
            if last.detail.contains("page updated") {
                Some("pressing Enter changed the page; do not press Enter again, continue with the new page".to_string())
            } else if last.detail.contains("page did not change") {
                let consecutive = history
                    .iter()
                    .rev()
                    .take_while(|r| {
                        r.outcome == AttemptOutcome::Success
                            && is_press_enter(&r.signature)
                            && r.detail.contains("page did not change")
                    })
                    .count();
                if consecutive >= 2 {
                    Some(format!(
                        "pressing Enter has not changed the page {consecutive} times in a row; try a \
                         different action instead of pressing Enter again"
                    ))
                } else {
                    None
                }
            } else {
                None
            }
        }
        _ => {
            let _ = value;
            None
        }
    }
}

fn is_press_enter(signature: &(Operation, String, String)) -> bool {
    signature.0 == Operation::Press && signature.2.eq_ignore_ascii_case("enter")
}

/// Heuristic for "this looks like a search-results listing" (§4.4).
fn looks_like_search_results(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    ["/search", "?q=", "&q=", "q=", "/results", "search?"]
        .iter()
        .any(|marker| lower.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(iteration: u32, op: Operation, value: &str, outcome: AttemptOutcome, detail: &str) -> AttemptRecord {
        AttemptRecord::new(iteration, (op, String::new(), value.to_string()), outcome, detail)
    }

    #[test]
    fn no_reminder_with_empty_history() {
        assert_eq!(compute_reminder(&[], "https://example.test"), None);
    }

    #[test]
    fn fill_without_recent_enter_reminds_to_press_enter() {
        let history = vec![record(1, Operation::Fill, "hello", AttemptOutcome::Success, "filled")];
        let reminder = compute_reminder(&history, "https://example.test").unwrap();
        assert!(reminder.contains("press Enter") || reminder.contains("press"));
    }

    #[test]
    fn fill_followed_by_successful_enter_has_no_reminder() {
        let history = vec![
            record(1, Operation::Fill, "hello", AttemptOutcome::Success, "filled"),
            record(2, Operation::Press, "Enter", AttemptOutcome::Success, "pressed Enter: page updated"),
        ];
        assert_eq!(compute_reminder(&history, "https://example.test"), None);
    }

    #[test]
    fn scrape_on_search_results_url_urges_clicking_a_result() {
        let history = vec![record(
            1,
            Operation::ScrapeToMemory,
            "",
            AttemptOutcome::Success,
            "scraped",
        )];
        let reminder = compute_reminder(&history, "https://example.test/search?q=rust").unwrap();
        assert!(reminder.contains("search-results"));
    }

    #[test]
    fn scrape_elsewhere_warns_against_rescraping() {
        let history = vec![record(
            1,
            Operation::ScrapeToMemory,
            "",
            AttemptOutcome::Success,
            "scraped",
        )];
        let reminder = compute_reminder(&history, "https://example.test/article/42").unwrap();
        assert!(reminder.contains("do not scrape it again"));
    }

    #[test]
    fn repeated_non_changing_enter_warns_after_two() {
        let history = vec![
            record(1, Operation::Press, "Enter", AttemptOutcome::Success, "pressed Enter: page did not change"),
            record(2, Operation::Press, "Enter", AttemptOutcome::Success, "pressed Enter: page did not change"),
        ];
        let reminder = compute_reminder(&history, "https://example.test").unwrap();
        assert!(reminder.contains("different action"));
    }

    #[test]
    fn single_non_changing_enter_does_not_yet_warn() {
        let history = vec![record(
            1,
            Operation::Press,
            "Enter",
            AttemptOutcome::Success,
            "pressed Enter: page did not change",
        )];
        assert_eq!(compute_reminder(&history, "https://example.test"), None);
    }

    #[test]
    fn render_includes_task_and_history() {
        let ctx = PlanningContext {
            task: "search for rust".into(),
            iteration: 2,
            max_iterations: 50,
            current_url: "https://example.test".into(),
            url_changed: false,
            stable_selectors: vec!["#q".into()],
            clickable_texts: vec!["Search".into()],
            field_inventory_rendered: "input: selector=#q label=Search".into(),
            history: vec![record(1, Operation::Fill, "rust", AttemptOutcome::Success, "filled")],
        };
        let rendered = ctx.render();
        assert!(rendered.contains("search for rust"));
        assert!(rendered.contains("#q"));
        assert!(rendered.contains("<answer>"));
    }
}
