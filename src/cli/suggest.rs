use anyhow::{Context, Result, anyhow};
use console::style;
use std::sync::Arc;

use super::flag_value;
use crate::core::config::AppConfig;
use crate::core::store::Database;
use crate::core::suggest::{NextTasksReport, PersistOutcome, SuggestionPipeline};
use crate::core::terminal::{print_status, print_step, print_success, print_warn};

pub(crate) fn parse_employee_id(args: &[String], start: usize) -> Result<i64> {
    let raw = flag_value(args, start, "--employee").ok_or_else(|| anyhow!("--employee is required"))?;
    raw.parse()
        .with_context(|| format!("--employee expects a numeric id, got '{raw}'"))
}

fn print_report(report: &NextTasksReport) {
    print_status("Employee", &report.employee_id.to_string());
    print_status("Existing tasks", &report.employee_tasks.len().to_string());
    print_step("Suggested next tasks");
    if report.suggestions.is_empty() {
        println!("{}", report.next_tasks);
    }
    for (i, draft) in report.suggestions.iter().enumerate() {
        println!(
            "  {}. {} [{}]\n     {}",
            i + 1,
            style(&draft.title).bold(),
            style(&draft.priority).cyan(),
            draft.description
        );
    }
    match &report.persistence {
        PersistOutcome::Saved { saved } => {
            print_success(&format!("Assigned {saved} task(s)"))
        }
        PersistOutcome::NothingToSave => print_warn("Nothing parseable to assign"),
        PersistOutcome::Failed { reason } => {
            print_warn(&format!("Suggestions were not saved: {reason}"))
        }
    }
}

pub async fn run_suggest_command(args: &[String], config: &AppConfig) -> Result<()> {
    let employee_id = parse_employee_id(args, 2)?;
    let db = Arc::new(Database::open(config.database_path()).await?);
    let api_key = config.suggestions.api_key(|k| std::env::var(k).ok());
    let pipeline = SuggestionPipeline::from_config(&config.suggestions, db, api_key)?
        .ok_or_else(|| anyhow!("Set {} to use suggestions", config.suggestions.api_key_env))?;

    let report = pipeline.generate_next_tasks(employee_id).await?;
    print_report(&report);
    Ok(())
}
