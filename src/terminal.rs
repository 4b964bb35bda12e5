//! Line-oriented terminal front end for the view controller

use anyhow::Result;
use std::fmt::Write as _;
use std::future::Future;
use tokio::io::{AsyncBufReadExt, BufReader};
use txfeed_core::{CoreError, Employee, Transaction, ViewController, ViewSnapshot};

const HELP: &str = "\
Commands:
  list              show the visible transactions
  employees         show the employee filter
  select <id|all>   filter by employee, or show every employee
  more              load the next page
  help              show this help
  quit              exit";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    List,
    Employees,
    Select(String),
    More,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let command = match words.next() {
            Some(word) => word.to_lowercase(),
            None => return Err("empty command".to_string()),
        };

        match (command.as_str(), words.next()) {
            ("list" | "ls", None) => Ok(Command::List),
            ("employees", None) => Ok(Command::Employees),
            ("select", Some(target)) => Ok(Command::Select(target.to_string())),
            ("select", None) => Err("usage: select <id|all>".to_string()),
            ("more", None) => Ok(Command::More),
            ("help" | "?", None) => Ok(Command::Help),
            ("quit" | "exit" | "q", None) => Ok(Command::Quit),
            _ => Err(format!("unknown command: {}", line.trim())),
        }
    }
}

/// Run the browse loop until `quit` or end of input
pub async fn run(controller: ViewController) -> Result<()> {
    if let Err(e) = with_progress(&controller, controller.evaluate_startup()).await {
        println!("{}", render_error(&e));
    }
    println!("{}", render_transactions(&controller.snapshot()));
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        match command {
            Command::List => println!("{}", render_transactions(&controller.snapshot())),
            Command::Employees => println!("{}", render_filter(&controller.snapshot())),
            Command::Select(target) => select(&controller, &target).await,
            Command::More => match with_progress(&controller, controller.load_more()).await {
                Ok(true) => println!("{}", render_transactions(&controller.snapshot())),
                Ok(false) => println!("No more transactions to load."),
                Err(e) => println!("{}", render_error(&e)),
            },
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }

    Ok(())
}

async fn select(controller: &ViewController, target: &str) {
    let choice = if target.eq_ignore_ascii_case("all") {
        Some(Employee::all_employees())
    } else {
        controller
            .directory()
            .state()
            .data
            .and_then(|employees| employees.into_iter().find(|e| e.id == target))
    };

    let Some(employee) = choice else {
        println!("Unknown employee: {} (see `employees`)", target);
        return;
    };

    match with_progress(controller, controller.on_selection_changed(Some(&employee))).await {
        Ok(()) => println!("{}", render_transactions(&controller.snapshot())),
        Err(e) => println!("{}", render_error(&e)),
    }
}

/// Drive `op` to completion, printing a status line each time the caches
/// publish a different loading state
async fn with_progress<F: Future>(controller: &ViewController, op: F) -> F::Output {
    let mut directory = controller.directory().subscribe();
    let mut paginated = controller.paginated().subscribe();
    let mut by_employee = controller.by_employee().subscribe();
    let mut last: Option<String> = None;

    tokio::pin!(op);
    loop {
        tokio::select! {
            output = &mut op => return output,
            Ok(()) = directory.changed() => {}
            Ok(()) = paginated.changed() => {}
            Ok(()) = by_employee.changed() => {}
        }

        let status = render_status(&controller.snapshot(), by_employee.current().is_loading);
        if status != last {
            if let Some(ref line) = status {
                println!("{}", line);
            }
        }
        last = status;
    }
}

/// One line naming every fetch in flight, `None` when nothing is loading
pub fn render_status(snapshot: &ViewSnapshot, employee_transactions_loading: bool) -> Option<String> {
    let mut loading = Vec::new();
    if snapshot.employee_directory_loading {
        loading.push("employees");
    }
    if snapshot.load_more_busy {
        loading.push("transactions");
    }
    if employee_transactions_loading {
        loading.push("employee transactions");
    }

    if loading.is_empty() {
        None
    } else {
        Some(format!("[loading {}...]", loading.join(", ")))
    }
}

/// Error with its code and suggestions, each line marked with `!`
pub fn render_error(error: &CoreError) -> String {
    error
        .to_details()
        .to_string()
        .lines()
        .map(|line| format!("! {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_transaction(transaction: &Transaction) -> String {
    format!(
        "{}  {:<24} {:>10}  {:<20} {}",
        transaction.date,
        transaction.merchant,
        transaction.amount,
        transaction.employee.display_name(),
        if transaction.approved { "approved" } else { "pending" },
    )
}

pub fn render_transactions(snapshot: &ViewSnapshot) -> String {
    let mut out = String::new();
    match snapshot.visible_transactions {
        None => out.push_str("Loading..."),
        Some(ref transactions) if transactions.is_empty() => out.push_str("No transactions."),
        Some(ref transactions) => {
            for transaction in transactions {
                let _ = writeln!(out, "{}", render_transaction(transaction));
            }
            let _ = write!(out, "{} transactions", transactions.len());
        }
    }

    if snapshot.all_transactions_loading {
        out.push_str("\n[loading transactions...]");
    } else if snapshot.load_more_busy {
        out.push_str("\n[loading more...]");
    } else if snapshot.load_more_enabled {
        out.push_str("\n[more available: `more`]");
    }
    for error in &snapshot.errors {
        let _ = write!(out, "\n! {}", error);
    }
    out
}

pub fn render_filter(snapshot: &ViewSnapshot) -> String {
    if snapshot.employee_directory_loading {
        return "Loading employees...".to_string();
    }
    if snapshot.filter_options.is_empty() {
        return "No employees loaded.".to_string();
    }

    snapshot
        .filter_options
        .iter()
        .map(|option| {
            let value = if option.value.is_empty() { "all" } else { option.value.as_str() };
            format!("  {:<12} {}", value, option.label)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
