//! Conflict resolution: single-target prompt and two-pass batch selection
//!
//! Decisions depend only on the answers returned by the `DecisionProvider`,
//! so a recorded transcript always reproduces the same plan.

use super::decision::DecisionProvider;
use super::paths::RenamingAllocator;
use crate::error::FetchError;
use crate::model::{ConflictAction, ConflictDecision, DownloadTarget, TargetStatus};

const OVERWRITE_QUESTION: &str = "Enter numbers to 'Overwrite' (e.g., '1 2', 'all', or Enter to skip):";
const NUMBER_QUESTION: &str = "Enter numbers to 'Add number' (e.g., '1 2', 'all', or Enter to skip):";

/// Result of running the engine over a set of conflicts
#[derive(Debug)]
pub enum Resolution {
    /// One decision per conflict, in the order the conflicts were given
    Decided(Vec<ConflictDecision>),

    /// The user asked to stop the run
    Quit,
}

/// Parsed answer to one batch selection pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Selected 1-based indices, in the order they were typed (deduplicated)
    Indices(Vec<usize>),
    Quit,
}

/// Map a single-target answer onto an action
///
/// Only the first character counts, case-insensitively: `o` overwrite,
/// `n` number, `q` quit. Anything else, including an empty answer, skips.
pub fn parse_single_answer(answer: &str) -> ConflictAction {
    match answer.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('o') => ConflictAction::Overwrite,
        Some('n') => ConflictAction::Number,
        Some('q') => ConflictAction::Quit,
        _ => ConflictAction::Skip,
    }
}

/// Parse a batch selection line against the indices still open
///
/// Grammar: empty (nothing), `all`, `q`/`quit`, or whitespace-separated
/// indices. Tokens that aren't numbers, or name an index outside
/// `remaining`, are dropped and reported through `warnings`; the other
/// tokens still apply.
pub fn parse_selection(input: &str, remaining: &[usize], warnings: &mut Vec<String>) -> Selection {
    let trimmed = input.trim();
    let lower = trimmed.to_ascii_lowercase();

    if lower.is_empty() {
        return Selection::Indices(Vec::new());
    }
    if lower == "q" || lower == "quit" {
        return Selection::Quit;
    }
    if lower == "all" {
        return Selection::Indices(remaining.to_vec());
    }

    let mut selected = Vec::new();
    for token in trimmed.split_whitespace() {
        match token.parse::<usize>() {
            Ok(index) if remaining.contains(&index) => {
                if !selected.contains(&index) {
                    selected.push(index);
                }
            }
            Ok(_) => warnings.push(format!("Index out of range: {}", token)),
            Err(_) => warnings.push(format!("Invalid number: {}", token)),
        }
    }

    Selection::Indices(selected)
}

/// Ask once about a single conflicted target
pub fn resolve_single<P: DecisionProvider>(target: DownloadTarget, provider: &mut P) -> Resolution {
    let question = format!(
        "Path '{}' exists. [O]verwrite, [N]umber, [S]kip, [Q]uit?",
        target.base_path().display()
    );

    match parse_single_answer(&provider.ask(&question)) {
        ConflictAction::Quit => Resolution::Quit,
        action => Resolution::Decided(vec![ConflictDecision { target, action }]),
    }
}

/// Two selection passes over all conflicts: overwrite first, then number
/// among whatever is left. Unselected conflicts are skipped.
pub fn resolve_batch<P: DecisionProvider>(
    conflicts: Vec<DownloadTarget>,
    provider: &mut P,
) -> Resolution {
    if conflicts.is_empty() {
        return Resolution::Decided(Vec::new());
    }

    let mut actions: Vec<Option<ConflictAction>> = vec![None; conflicts.len()];

    provider.notify("Found existing arrangements:");
    for (i, target) in conflicts.iter().enumerate() {
        provider.notify(&format!("  {}. {}", i + 1, target.base_path().display()));
    }

    let passes = [
        (OVERWRITE_QUESTION, ConflictAction::Overwrite),
        (NUMBER_QUESTION, ConflictAction::Number),
    ];

    for (pass, (question, action)) in passes.into_iter().enumerate() {
        let remaining: Vec<usize> = (1..=conflicts.len())
            .filter(|index| actions[index - 1].is_none())
            .collect();
        if remaining.is_empty() {
            break;
        }

        // The overwrite pass reuses the full listing shown above
        if pass > 0 {
            provider.notify("Remaining conflicts:");
            for &index in &remaining {
                provider.notify(&format!(
                    "  {}. {}",
                    index,
                    conflicts[index - 1].base_path().display()
                ));
            }
        }

        let answer = provider.ask(question);
        let mut warnings = Vec::new();
        let selection = parse_selection(&answer, &remaining, &mut warnings);
        for warning in &warnings {
            provider.notify(warning);
        }

        match selection {
            Selection::Quit => return Resolution::Quit,
            Selection::Indices(indices) => {
                for index in indices {
                    actions[index - 1] = Some(action);
                }
            }
        }
    }

    let decisions = conflicts
        .into_iter()
        .zip(actions)
        .map(|(target, action)| ConflictDecision {
            target,
            action: action.unwrap_or(ConflictAction::Skip),
        })
        .collect();

    Resolution::Decided(decisions)
}

/// Fix the destination of a decided target
///
/// `Number` asks the allocator for a fresh sibling; every other action keeps
/// the base path. The target ends up `Resolved` either way.
pub fn apply_decision(
    decision: &mut ConflictDecision,
    allocator: &mut RenamingAllocator,
) -> Result<(), FetchError> {
    if decision.action == ConflictAction::Number {
        let path = allocator.allocate(decision.target.base_path())?;
        decision.target.redirect_to(path);
    }
    decision.target.status = TargetStatus::Resolved;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SongReference;
    use crate::resolve::decision::ScriptedDecisions;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn conflicted(name: &str) -> DownloadTarget {
        let reference = SongReference::new(name, "lead", "https://x").unwrap();
        let mut target = DownloadTarget::new(reference, PathBuf::from(format!("charts/{}/lead", name)));
        target.status = TargetStatus::Conflicted;
        target
    }

    fn five_conflicts() -> Vec<DownloadTarget> {
        ["a", "b", "c", "d", "e"].iter().map(|n| conflicted(n)).collect()
    }

    fn actions(resolution: Resolution) -> Vec<ConflictAction> {
        match resolution {
            Resolution::Decided(decisions) => decisions.into_iter().map(|d| d.action).collect(),
            Resolution::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_single_answers() {
        for answer in ["o", "O", "overwrite", "  Overwrite  "] {
            assert_eq!(parse_single_answer(answer), ConflictAction::Overwrite);
        }
        assert_eq!(parse_single_answer("n"), ConflictAction::Number);
        assert_eq!(parse_single_answer("Number"), ConflictAction::Number);
        assert_eq!(parse_single_answer("q"), ConflictAction::Quit);
        assert_eq!(parse_single_answer("QUIT"), ConflictAction::Quit);
        for answer in ["x", "", "s", "skip", "yes"] {
            assert_eq!(parse_single_answer(answer), ConflictAction::Skip);
        }
    }

    #[test]
    fn test_resolve_single_prompt_text() {
        let mut provider = ScriptedDecisions::new(["n"]);
        let result = actions(resolve_single(conflicted("a"), &mut provider));

        assert_eq!(result, vec![ConflictAction::Number]);
        assert_eq!(
            provider.questions,
            vec!["Path 'charts/a/lead' exists. [O]verwrite, [N]umber, [S]kip, [Q]uit?"]
        );
    }

    #[test]
    fn test_resolve_single_quit() {
        let mut provider = ScriptedDecisions::new(["q"]);
        assert!(matches!(resolve_single(conflicted("a"), &mut provider), Resolution::Quit));
    }

    #[test]
    fn test_batch_two_passes() {
        let mut provider = ScriptedDecisions::new(["1 3", "2"]);
        let result = actions(resolve_batch(five_conflicts(), &mut provider));

        use ConflictAction::*;
        assert_eq!(result, vec![Overwrite, Number, Overwrite, Skip, Skip]);

        let listing = provider
            .messages
            .iter()
            .position(|m| m == "Remaining conflicts:")
            .unwrap();
        assert_eq!(
            provider.messages[listing + 1..],
            ["  2. charts/b/lead", "  4. charts/d/lead", "  5. charts/e/lead"]
        );
    }

    #[test]
    fn test_batch_all_overwrite_skips_number_pass() {
        let mut provider = ScriptedDecisions::new(["all", "1"]);
        let result = actions(resolve_batch(five_conflicts(), &mut provider));

        assert_eq!(result, vec![ConflictAction::Overwrite; 5]);
        assert_eq!(provider.questions.len(), 1);
        assert_eq!(provider.remaining(), 1);
    }

    #[test]
    fn test_batch_empty_answers_skip_everything() {
        let mut provider = ScriptedDecisions::new(["", ""]);
        let result = actions(resolve_batch(five_conflicts(), &mut provider));
        assert_eq!(result, vec![ConflictAction::Skip; 5]);
    }

    #[test]
    fn test_batch_all_on_number_pass_takes_only_remaining() {
        let mut provider = ScriptedDecisions::new(["2", "ALL"]);
        let result = actions(resolve_batch(five_conflicts(), &mut provider));

        use ConflictAction::*;
        assert_eq!(result, vec![Number, Overwrite, Number, Number, Number]);
    }

    #[test]
    fn test_batch_quit_at_either_pass() {
        let mut provider = ScriptedDecisions::new(["q"]);
        assert!(matches!(resolve_batch(five_conflicts(), &mut provider), Resolution::Quit));

        let mut provider = ScriptedDecisions::new(["1", "quit"]);
        assert!(matches!(resolve_batch(five_conflicts(), &mut provider), Resolution::Quit));
    }

    #[test]
    fn test_batch_ignores_bad_tokens() {
        let mut provider = ScriptedDecisions::new(["1 x 9 0 -2 4", "1 2"]);
        let result = actions(resolve_batch(five_conflicts(), &mut provider));

        use ConflictAction::*;
        // "1" on the number pass was already decided and is out of range there
        assert_eq!(result, vec![Overwrite, Number, Skip, Overwrite, Skip]);
        assert!(provider.messages.contains(&"Invalid number: x".to_string()));
        assert!(provider.messages.contains(&"Index out of range: 9".to_string()));
        assert!(provider.messages.contains(&"Index out of range: 0".to_string()));
        assert!(provider.messages.contains(&"Invalid number: -2".to_string()));
        assert!(provider.messages.contains(&"Index out of range: 1".to_string()));
    }

    #[test]
    fn test_parse_selection_deduplicates() {
        let mut warnings = Vec::new();
        assert_eq!(
            parse_selection("3 3 1", &[1, 2, 3], &mut warnings),
            Selection::Indices(vec![3, 1])
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_batch_is_reproducible() {
        let run = || {
            let mut provider = ScriptedDecisions::new(["2 5", "1"]);
            actions(resolve_batch(five_conflicts(), &mut provider))
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_apply_number_allocates_distinct_paths() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("song/lead");
        fs::create_dir_all(&base).unwrap();

        let reference = SongReference::new("song", "lead", "https://x").unwrap();
        let mut allocator = RenamingAllocator::new();
        let mut paths = Vec::new();
        for _ in 0..2 {
            let mut decision = ConflictDecision {
                target: DownloadTarget::new(reference.clone(), base.clone()),
                action: ConflictAction::Number,
            };
            apply_decision(&mut decision, &mut allocator).unwrap();
            assert_eq!(decision.target.status, TargetStatus::Resolved);
            assert_eq!(decision.target.base_path(), base.as_path());
            paths.push(decision.target.resolved_path().to_path_buf());
        }

        assert_eq!(paths, vec![dir.path().join("song/lead_1"), dir.path().join("song/lead_2")]);
    }

    #[test]
    fn test_apply_overwrite_keeps_base_path() {
        let mut decision = ConflictDecision {
            target: conflicted("a"),
            action: ConflictAction::Overwrite,
        };
        apply_decision(&mut decision, &mut RenamingAllocator::new()).unwrap();
        assert_eq!(decision.target.resolved_path(), decision.target.base_path());
    }
}
