use crate::core::store::types::TaskDetails;

pub const PROMPT_HEADER: &str = "Current Employee Tasks:\n\n";

pub const NEXT_TASKS_INSTRUCTION: &str = "Based on the above tasks, suggest the next 3 tasks that should follow, \
including a short description and a priority for each.\n\
Answer with exactly 3 blocks separated by a blank line, each written as:\n\
Title: <title>\n\
Description: <description>\n\
Priority: <priority>";

fn render_task(task: &TaskDetails) -> String {
    format!(
        "Title: {}\nDescription: {}\nPriority: {}\n\n",
        task.title, task.description, task.priority
    )
}

/// Render an employee's task history into a completion prompt. Tasks appear
/// in the given order; the instruction always comes last.
pub fn build_prompt(tasks: &[TaskDetails]) -> String {
    let mut prompt = String::from(PROMPT_HEADER);
    for task in tasks {
        prompt.push_str(&render_task(task));
    }
    prompt.push_str(NEXT_TASKS_INSTRUCTION);
    prompt
}
