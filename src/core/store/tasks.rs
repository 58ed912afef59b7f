use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

use super::types::{Screenshot, TaskDetails, TaskInput, TaskPatch};
use super::{Database, ValidationError};

const TASK_SELECT: &str = "SELECT t.id, t.title, t.description, t.date, t.git_link, t.hosting_link,
        t.task_type, t.status, t.priority, t.start_time, t.end_time, t.created_at,
        t.estimated_hours, t.employee_id, e.full_name
     FROM task_details t JOIN employees e ON e.id = t.employee_id";

fn task_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaskDetails> {
    Ok(TaskDetails {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        date: row.get(3)?,
        git_link: row.get(4)?,
        hosting_link: row.get(5)?,
        task_type: row.get(6)?,
        status: row.get(7)?,
        priority: row.get(8)?,
        start_time: row.get(9)?,
        end_time: row.get(10)?,
        created_at: row.get(11)?,
        estimated_hours: row.get(12)?,
        employee: row.get(13)?,
        employee_name: row.get(14)?,
        screenshots: Vec::new(),
    })
}

fn attach_screenshots(db: &Connection, tasks: &mut [TaskDetails]) -> rusqlite::Result<()> {
    let mut stmt =
        db.prepare("SELECT id, image FROM task_screenshots WHERE task_id = ?1 ORDER BY id")?;
    for task in tasks.iter_mut() {
        let rows = stmt.query_map(params![task.id], |row| {
            Ok(Screenshot {
                id: row.get(0)?,
                image: row.get(1)?,
            })
        })?;
        for row in rows {
            task.screenshots.push(row?);
        }
    }
    Ok(())
}

fn query_tasks(
    db: &Connection,
    filter: &str,
    args: &[&dyn rusqlite::ToSql],
) -> rusqlite::Result<Vec<TaskDetails>> {
    let mut stmt = db.prepare(&format!("{TASK_SELECT} {filter} ORDER BY t.id"))?;
    let rows = stmt.query_map(args, task_row)?;
    let mut tasks = Vec::new();
    for row in rows {
        tasks.push(row?);
    }
    attach_screenshots(db, &mut tasks)?;
    Ok(tasks)
}

fn fetch_task(db: &Connection, id: i64) -> rusqlite::Result<Option<TaskDetails>> {
    let mut task = db
        .query_row(&format!("{TASK_SELECT} WHERE t.id = ?1"), params![id], task_row)
        .optional()?;
    if let Some(task) = task.as_mut() {
        attach_screenshots(db, std::slice::from_mut(task))?;
    }
    Ok(task)
}

impl Database {
    pub async fn create_task(&self, input: &TaskInput) -> Result<TaskDetails> {
        if input.title.trim().is_empty() {
            return Err(ValidationError::new("title is required").into());
        }

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO task_details (employee_id, title, description, date, git_link,
                hosting_link, task_type, status, priority, start_time, end_time, estimated_hours)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                input.employee,
                input.title.trim(),
                input.description,
                input.date,
                input.git_link,
                input.hosting_link,
                input.task_type,
                input.status,
                input.priority,
                input.start_time,
                input.end_time,
                input.estimated_hours,
            ],
        )?;
        let id = db.last_insert_rowid();
        fetch_task(&db, id)?.ok_or_else(|| anyhow::anyhow!("task {id} disappeared after insert"))
    }

    pub async fn get_task(&self, id: i64) -> Result<Option<TaskDetails>> {
        let db = self.db.lock().await;
        Ok(fetch_task(&db, id)?)
    }

    pub async fn list_tasks(&self) -> Result<Vec<TaskDetails>> {
        let db = self.db.lock().await;
        Ok(query_tasks(&db, "", &[])?)
    }

    /// Tasks of one employee in creation order.
    pub async fn list_tasks_for_employee(&self, employee_id: i64) -> Result<Vec<TaskDetails>> {
        let db = self.db.lock().await;
        Ok(query_tasks(&db, "WHERE t.employee_id = ?1", &[&employee_id])?)
    }

    pub async fn update_task(&self, id: i64, patch: &TaskPatch) -> Result<Option<TaskDetails>> {
        if matches!(patch.title.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err(ValidationError::new("title may not be blank").into());
        }

        let db = self.db.lock().await;
        db.execute(
            "UPDATE task_details SET
                employee_id = COALESCE(?1, employee_id),
                title = COALESCE(?2, title),
                description = COALESCE(?3, description),
                date = COALESCE(?4, date),
                git_link = COALESCE(?5, git_link),
                hosting_link = COALESCE(?6, hosting_link),
                task_type = COALESCE(?7, task_type),
                status = COALESCE(?8, status),
                priority = COALESCE(?9, priority),
                start_time = COALESCE(?10, start_time),
                end_time = COALESCE(?11, end_time),
                estimated_hours = COALESCE(?12, estimated_hours)
             WHERE id = ?13",
            params![
                patch.employee,
                patch.title.as_deref().map(str::trim),
                patch.description,
                patch.date,
                patch.git_link,
                patch.hosting_link,
                patch.task_type,
                patch.status,
                patch.priority,
                patch.start_time,
                patch.end_time,
                patch.estimated_hours,
                id,
            ],
        )?;
        Ok(fetch_task(&db, id)?)
    }

    pub async fn delete_task(&self, id: i64) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute("DELETE FROM task_details WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// Attach a stored image reference to a task. `None` when the task does
    /// not exist.
    pub async fn add_screenshot(&self, task_id: i64, image: &str) -> Result<Option<Screenshot>> {
        let image = image.trim();
        if image.is_empty() {
            return Err(ValidationError::new("image is required").into());
        }

        let db = self.db.lock().await;
        let exists: i64 = db.query_row(
            "SELECT COUNT(*) FROM task_details WHERE id = ?1",
            params![task_id],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Ok(None);
        }
        db.execute(
            "INSERT INTO task_screenshots (task_id, image) VALUES (?1, ?2)",
            params![task_id, image],
        )?;
        Ok(Some(Screenshot {
            id: db.last_insert_rowid(),
            image: image.to_string(),
        }))
    }
}
