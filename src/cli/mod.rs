mod serve;
mod suggest;
mod users;

use anyhow::Result;
use console::style;

use crate::core::config::{self, AppConfig};
use crate::core::terminal::{self, GuideSection, print_error};
use crate::logging;

fn print_help() {
    terminal::print_banner();

    GuideSection::new("Server")
        .command("serve", "Start the REST API [--api-host H] [--api-port P]")
        .print();

    GuideSection::new("Management")
        .command(
            "user add",
            "Create a login (--username U --password P [--email E] [--staff] [--employee ID])",
        )
        .command("suggest", "Suggest next tasks for one employee (--employee ID)")
        .print();

    println!(
        "\n {} {} <command> [subcommand]\n",
        style("Usage:").bold(),
        style("intertask").green()
    );
}

/// Value following `flag`, if any. Shared by the subcommand parsers.
pub(crate) fn flag_value(args: &[String], start: usize, flag: &str) -> Option<String> {
    let mut i = start;
    while i < args.len() {
        if args[i] == flag {
            return args.get(i + 1).cloned();
        }
        i += 1;
    }
    None
}

pub(crate) fn has_flag(args: &[String], start: usize, flag: &str) -> bool {
    args.iter().skip(start).any(|a| a == flag)
}

pub(crate) fn parse_api_server_flags(
    args: &[String],
    start: usize,
    mut api_host: String,
    mut api_port: u16,
) -> (String, u16) {
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--api-port" => {
                if i + 1 < args.len() {
                    api_port = args[i + 1].parse().unwrap_or(api_port);
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--api-host" => {
                if i + 1 < args.len() {
                    api_host = args[i + 1].clone();
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    (api_host, api_port)
}

pub async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("help");

    if matches!(command, "help" | "--help" | "-h") {
        print_help();
        return Ok(());
    }

    let config = AppConfig::load(config::data_dir()).await?;
    logging::init_logging(&config.logging.level);
    config.log_source();

    match command {
        "serve" => serve::run_serve(&args, config).await,
        "user" => users::run_user_command(&args, &config).await,
        "suggest" => suggest::run_suggest_command(&args, &config).await,
        other => {
            print_error(&format!("Unknown command: {other}"));
            print_help();
            Ok(())
        }
    }
}
