use anyhow::{Result, bail};
use console::style;

use super::{flag_value, has_flag};
use crate::core::config::AppConfig;
use crate::core::store::Database;
use crate::core::terminal::{print_info, print_success};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UserAddArgs {
    pub username: String,
    pub password: String,
    pub email: String,
    pub is_staff: bool,
    pub employee: Option<i64>,
}

pub(crate) fn parse_user_add_args(args: &[String], start: usize) -> Result<UserAddArgs> {
    let Some(username) = flag_value(args, start, "--username") else {
        bail!("--username is required");
    };
    let Some(password) = flag_value(args, start, "--password") else {
        bail!("--password is required");
    };
    let employee = match flag_value(args, start, "--employee") {
        Some(raw) => match raw.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => bail!("--employee expects a numeric id, got '{raw}'"),
        },
        None => None,
    };
    Ok(UserAddArgs {
        username,
        password,
        email: flag_value(args, start, "--email").unwrap_or_default(),
        is_staff: has_flag(args, start, "--staff"),
        employee,
    })
}

pub async fn run_user_command(args: &[String], config: &AppConfig) -> Result<()> {
    let sub_cmd = args.get(2).map(String::as_str).unwrap_or("");
    match sub_cmd {
        "add" => {
            let parsed = parse_user_add_args(args, 3)?;
            let db = Database::open(config.database_path()).await?;
            add_user(&db, &parsed).await
        }
        _ => {
            println!(
                "{}",
                style("Usage: intertask user add --username U --password P [--email E] [--staff] [--employee ID]")
                    .bold()
            );
            Ok(())
        }
    }
}

async fn add_user(db: &Database, args: &UserAddArgs) -> Result<()> {
    if let Some(employee_id) = args.employee
        && db.get_employee(employee_id).await?.is_none()
    {
        bail!("Employee {employee_id} does not exist");
    }

    let user = db
        .create_user(&args.username, &args.password, &args.email, args.is_staff)
        .await?;
    if let Some(employee_id) = args.employee {
        db.link_employee_user(employee_id, user.id).await?;
        print_info(&format!("Linked to employee {employee_id}"));
    }
    let role = if user.is_staff { "staff" } else { "member" };
    print_success(&format!("Created {role} user '{}' (id {})", user.username, user.id));
    Ok(())
}
