use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Country {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateRecord {
    pub id: i64,
    pub name: String,
    pub country: i64,
    pub country_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub state: i64,
    pub state_name: String,
    pub country_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Employee {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub designation: Option<String>,
    pub address: Option<String>,
    pub city: Option<i64>,
    pub date_of_joining: Option<String>,
    pub experience_certificate: Option<String>,
    pub user: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeInput {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<i64>,
    #[serde(default)]
    pub date_of_joining: Option<String>,
    #[serde(default)]
    pub experience_certificate: Option<String>,
    #[serde(default)]
    pub user: Option<i64>,
}

/// Partial employee update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeePatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub designation: Option<String>,
    pub address: Option<String>,
    pub city: Option<i64>,
    pub date_of_joining: Option<String>,
    pub experience_certificate: Option<String>,
    pub user: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Screenshot {
    pub id: i64,
    pub image: String,
}

/// A tracked unit of work for one employee. This is also the history the
/// suggestion pipeline feeds to the language model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDetails {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: Option<String>,
    pub git_link: Option<String>,
    pub hosting_link: Option<String>,
    pub task_type: Option<String>,
    pub status: String,
    pub priority: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub created_at: String,
    pub estimated_hours: Option<f64>,
    pub employee: i64,
    pub employee_name: String,
    pub screenshots: Vec<Screenshot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskInput {
    pub employee: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub git_link: Option<String>,
    #[serde(default)]
    pub hosting_link: Option<String>,
    #[serde(default)]
    pub task_type: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
}

fn default_status() -> String {
    "pending".to_string()
}

fn default_priority() -> String {
    "medium".to_string()
}

impl TaskInput {
    pub fn new(employee: i64, title: &str, description: &str, priority: &str) -> Self {
        Self {
            employee,
            title: title.to_string(),
            description: description.to_string(),
            date: None,
            git_link: None,
            hosting_link: None,
            task_type: None,
            status: default_status(),
            priority: priority.to_string(),
            start_time: None,
            end_time: None,
            estimated_hours: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub employee: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub git_link: Option<String>,
    pub hosting_link: Option<String>,
    pub task_type: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub estimated_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskAssignment {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub assigned_at: String,
    pub employee_name: String,
    pub employee: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub employee_id: Option<i64>,
}
