use anyhow::Result;
use async_trait::async_trait;
use rusqlite::params;

use super::Database;
use super::types::{TaskAssignment, TaskDetails};
use crate::core::suggest::{SuggestedTask, TaskStore};

impl Database {
    pub async fn list_assignments_for_employee(
        &self,
        employee_id: i64,
    ) -> Result<Vec<TaskAssignment>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT a.id, a.title, a.description, a.priority, a.assigned_at, e.full_name, a.employee_id
             FROM task_assignments a JOIN employees e ON e.id = a.employee_id
             WHERE a.employee_id = ?1
             ORDER BY a.id",
        )?;
        let rows = stmt.query_map(params![employee_id], |row| {
            Ok(TaskAssignment {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                priority: row.get(3)?,
                assigned_at: row.get(4)?,
                employee_name: row.get(5)?,
                employee: row.get(6)?,
            })
        })?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub async fn delete_assignment(&self, id: i64) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute("DELETE FROM task_assignments WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    /// Insert all suggestions in one transaction. Either every row lands or
    /// none does.
    pub async fn insert_assignments(&self, tasks: &[SuggestedTask]) -> Result<usize> {
        let mut db = self.db.lock().await;
        let tx = db.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO task_assignments (employee_id, title, description, priority, assigned_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for task in tasks {
                stmt.execute(params![
                    task.employee_id,
                    task.title,
                    task.description,
                    task.priority,
                    task.assigned_at.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(tasks.len())
    }
}

#[async_trait]
impl TaskStore for Database {
    async fn list_tasks_for_employee(&self, employee_id: i64) -> Result<Vec<TaskDetails>> {
        Database::list_tasks_for_employee(self, employee_id).await
    }

    async fn bulk_insert(&self, tasks: &[SuggestedTask]) -> Result<usize> {
        self.insert_assignments(tasks).await
    }
}
