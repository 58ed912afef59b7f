use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, params};

use super::types::{Employee, EmployeeInput, EmployeePatch};
use super::{Database, Page, PageRequest, ValidationError};

const EMPLOYEE_COLUMNS: &str = "id, full_name, email, phone, designation, address, city_id, \
     date_of_joining, experience_certificate, user_id, created_at";

/// Experience certificates are only accepted as PDF documents.
pub fn validate_certificate(file_name: &str) -> Result<(), ValidationError> {
    if file_name.to_lowercase().ends_with(".pdf") {
        Ok(())
    } else {
        Err(ValidationError::new("Only PDF files are allowed."))
    }
}

fn employee_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        designation: row.get(4)?,
        address: row.get(5)?,
        city: row.get(6)?,
        date_of_joining: row.get(7)?,
        experience_certificate: row.get(8)?,
        user: row.get(9)?,
        created_at: row.get(10)?,
    })
}

fn fetch_employee(db: &Connection, id: i64) -> rusqlite::Result<Option<Employee>> {
    db.query_row(
        &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?1"),
        params![id],
        employee_row,
    )
    .optional()
}

fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn check_certificate(certificate: Option<&str>) -> Result<()> {
    if let Some(name) = certificate
        && !name.is_empty()
    {
        validate_certificate(name)?;
    }
    Ok(())
}

impl Database {
    pub async fn create_employee(&self, input: &EmployeeInput) -> Result<Employee> {
        if input.full_name.trim().is_empty() || input.email.trim().is_empty() {
            return Err(ValidationError::new("full_name and email are required").into());
        }
        check_certificate(input.experience_certificate.as_deref())?;

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO employees (full_name, email, phone, designation, address, city_id,
                date_of_joining, experience_certificate, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                input.full_name.trim(),
                input.email.trim(),
                input.phone,
                input.designation,
                input.address,
                input.city,
                input.date_of_joining,
                input.experience_certificate,
                input.user,
            ],
        )?;
        let id = db.last_insert_rowid();
        fetch_employee(&db, id)?
            .ok_or_else(|| anyhow::anyhow!("employee {id} disappeared after insert"))
    }

    pub async fn get_employee(&self, id: i64) -> Result<Option<Employee>> {
        let db = self.db.lock().await;
        Ok(fetch_employee(&db, id)?)
    }

    /// List employees, optionally filtered by case-insensitive substrings of
    /// name and email.
    pub async fn list_employees(
        &self,
        name: Option<&str>,
        email: Option<&str>,
        page: &PageRequest,
    ) -> Result<Page<Employee>> {
        let name = name.map(str::trim).filter(|s| !s.is_empty()).map(like_pattern);
        let email = email
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let filter = "WHERE (?1 IS NULL OR full_name LIKE ?1 ESCAPE '\\')
               AND (?2 IS NULL OR email LIKE ?2 ESCAPE '\\')";

        let db = self.db.lock().await;
        let total: i64 = db.query_row(
            &format!("SELECT COUNT(*) FROM employees {filter}"),
            params![name, email],
            |row| row.get(0),
        )?;

        let mut stmt = db.prepare(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees {filter} ORDER BY id LIMIT ?3 OFFSET ?4"
        ))?;
        let rows = stmt.query_map(
            params![name, email, page.limit(), page.offset()],
            employee_row,
        )?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(Page::new(results, total, page))
    }

    pub async fn update_employee(
        &self,
        id: i64,
        patch: &EmployeePatch,
    ) -> Result<Option<Employee>> {
        check_certificate(patch.experience_certificate.as_deref())?;
        if matches!(patch.full_name.as_deref(), Some(n) if n.trim().is_empty())
            || matches!(patch.email.as_deref(), Some(e) if e.trim().is_empty())
        {
            return Err(ValidationError::new("full_name and email may not be blank").into());
        }

        let db = self.db.lock().await;
        db.execute(
            "UPDATE employees SET
                full_name = COALESCE(?1, full_name),
                email = COALESCE(?2, email),
                phone = COALESCE(?3, phone),
                designation = COALESCE(?4, designation),
                address = COALESCE(?5, address),
                city_id = COALESCE(?6, city_id),
                date_of_joining = COALESCE(?7, date_of_joining),
                experience_certificate = COALESCE(?8, experience_certificate),
                user_id = COALESCE(?9, user_id)
             WHERE id = ?10",
            params![
                patch.full_name.as_deref().map(str::trim),
                patch.email.as_deref().map(str::trim),
                patch.phone,
                patch.designation,
                patch.address,
                patch.city,
                patch.date_of_joining,
                patch.experience_certificate,
                patch.user,
                id,
            ],
        )?;
        Ok(fetch_employee(&db, id)?)
    }

    pub async fn delete_employee(&self, id: i64) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute("DELETE FROM employees WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub async fn link_employee_user(&self, employee_id: i64, user_id: i64) -> Result<bool> {
        let db = self.db.lock().await;
        let rows = db.execute(
            "UPDATE employees SET user_id = ?1 WHERE id = ?2",
            params![user_id, employee_id],
        )?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
pub(crate) async fn seed_employee(db: &Database, full_name: &str) -> Employee {
    db.create_employee(&EmployeeInput {
        full_name: full_name.to_string(),
        email: format!("{}@example.com", full_name.to_lowercase().replace(' ', ".")),
        ..Default::default()
    })
    .await
    .expect("employee should be created")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::test_database;

    #[test]
    fn certificate_must_be_pdf() {
        assert!(validate_certificate("resume.pdf").is_ok());
        assert!(validate_certificate("RESUME.PDF").is_ok());
        let err = validate_certificate("resume.docx").unwrap_err();
        assert_eq!(err.to_string(), "Only PDF files are allowed.");
    }

    #[tokio::test]
    async fn create_rejects_non_pdf_certificate() {
        let (db, _dir) = test_database().await;
        let err = db
            .create_employee(&EmployeeInput {
                full_name: "Asha Nair".into(),
                email: "asha@example.com".into(),
                experience_certificate: Some("letter.png".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<ValidationError>().is_some());
    }

    #[tokio::test]
    async fn filters_by_name_and_email_case_insensitively() {
        let (db, _dir) = test_database().await;
        seed_employee(&db, "Asha Nair").await;
        seed_employee(&db, "Rahul Menon").await;
        seed_employee(&db, "Ashok Kumar").await;

        let page = db
            .list_employees(Some("ASH"), None, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.count, 2);

        let page = db
            .list_employees(Some("ash"), Some("nair"), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].full_name, "Asha Nair");

        let page = db
            .list_employees(None, None, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.count, 3);
    }

    #[tokio::test]
    async fn like_wildcards_in_filter_are_literal() {
        let (db, _dir) = test_database().await;
        seed_employee(&db, "Asha Nair").await;
        let page = db
            .list_employees(Some("%"), None, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.count, 0);
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let (db, _dir) = test_database().await;
        let emp = seed_employee(&db, "Asha Nair").await;

        let updated = db
            .update_employee(
                emp.id,
                &EmployeePatch {
                    designation: Some("Backend Intern".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.designation.as_deref(), Some("Backend Intern"));
        assert_eq!(updated.full_name, "Asha Nair");
        assert_eq!(updated.email, emp.email);
    }

    #[tokio::test]
    async fn delete_missing_employee_returns_false() {
        let (db, _dir) = test_database().await;
        assert!(!db.delete_employee(404).await.unwrap());
    }
}
