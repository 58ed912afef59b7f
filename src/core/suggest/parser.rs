use super::TaskDraft;

const TITLE_LABEL: &str = "Title:";
const DESCRIPTION_LABEL: &str = "Description:";
const PRIORITY_LABEL: &str = "Priority:";

/// Turns a raw completion into task drafts. Implementations must never fail;
/// unusable input yields fewer (or zero) drafts.
pub trait SuggestionParser: Send + Sync {
    fn parse(&self, text: &str) -> Vec<TaskDraft>;
}

/// Parser for blank-line separated `Title:` / `Description:` / `Priority:`
/// blocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct LabelledBlockParser;

impl SuggestionParser for LabelledBlockParser {
    fn parse(&self, text: &str) -> Vec<TaskDraft> {
        parse_suggestions(text)
    }
}

pub fn parse_suggestions(text: &str) -> Vec<TaskDraft> {
    let text = text.replace("\r\n", "\n");
    text.trim().split("\n\n").filter_map(parse_block).collect()
}

// Blocks with fewer than three non-empty lines are dropped.
fn parse_block(block: &str) -> Option<TaskDraft> {
    let mut lines = block
        .trim()
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty());

    let title = lines.next()?;
    let description = lines.next()?;
    let priority = lines.next()?;

    Some(TaskDraft {
        title: strip_label(title, TITLE_LABEL),
        description: strip_label(description, DESCRIPTION_LABEL),
        priority: strip_label(priority, PRIORITY_LABEL),
    })
}

/// Remove a leading, case-sensitive label and surrounding whitespace. Lines
/// without the label come back trimmed but otherwise unchanged.
pub fn strip_label(line: &str, label: &str) -> String {
    let mut rest = line.trim();
    while let Some(stripped) = rest.strip_prefix(label) {
        rest = stripped.trim_start();
    }
    rest.trim_end().to_string()
}
