//! Console shell for the finance tracker.
//!
//! One blocking read-eval loop: render whatever the navigator says is the
//! active view, read a choice, dispatch it to the domain services, and let
//! the navigator decide where to go next. After every successful mutation
//! the shell raises a data-changed event so the view re-renders with fresh
//! numbers.

use std::io::{self, Write};
use std::sync::Arc;

use tracing::{info, Level};

use shared::{
    format_amount, ChangePasswordRequest, RecordTransactionRequest, ResetSecretRequest,
    SignupRequest, TransactionKind, TransactionListQuery, UpsertBudgetRequest,
};

use budget_buddy_backend::domain::{
    ActiveView, AuthService, LedgerService, MenuItem, MutationService, NavEvent, Navigator,
    Session,
};
use budget_buddy_backend::storage::DbConnection;
use budget_buddy_backend::{Error, MessageCategory};

const MENU_HINT: &str =
    "[d] Dashboard  [t] Transactions  [r] Reports  [b] Budgets  [s] Settings  [l] Log out  [q] Quit";

/// Print a prompt and read one trimmed line; `None` means stdin closed
fn prompt(label: &str) -> anyhow::Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn report_error(err: &Error) {
    let prefix = match err.message_category() {
        MessageCategory::Input => "Input error",
        MessageCategory::Auth => "Authentication error",
        MessageCategory::Data => "Data error",
    };
    println!("{prefix}: {err}");
}

/// Apply a shared-menu choice; returns false when the user chose to quit
fn dispatch_menu(choice: &str, navigator: &mut Navigator, session: &mut Session) -> bool {
    let event = match choice {
        "d" => NavEvent::Menu(MenuItem::Dashboard),
        "t" => NavEvent::Menu(MenuItem::RecordTransaction),
        "r" => NavEvent::Menu(MenuItem::Reports),
        "b" => NavEvent::Menu(MenuItem::Budgets),
        "s" => NavEvent::Menu(MenuItem::Settings),
        "l" => NavEvent::Logout,
        "q" => return false,
        other => {
            println!("Unknown choice '{other}'");
            return true;
        }
    };
    navigator.handle(event, session);
    true
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Setting up database");
    let connection = Arc::new(DbConnection::init().await?);

    let auth_service = AuthService::new(connection.clone());
    let ledger_service = LedgerService::new(connection.clone());
    let mutation_service = MutationService::new(connection, auth_service.clone());

    let mut session = Session::new();
    let mut navigator = Navigator::new();

    println!("Budget Buddy");
    loop {
        match navigator.view() {
            ActiveView::Login => {
                println!();
                println!("=== Sign In ===");
                println!("[1] Sign in  [2] Create account  [3] Forgot password  [q] Quit");
                let Some(choice) = prompt("> ")? else { break };
                match choice.as_str() {
                    "1" => {
                        let Some(username) = prompt("Username: ")? else { break };
                        let Some(password) = prompt("Password: ")? else { break };
                        match auth_service.authenticate(&username, &password).await {
                            Ok(user_id) => {
                                navigator.handle(
                                    NavEvent::LoginSucceeded { user_id, username },
                                    &mut session,
                                );
                            }
                            Err(err) => report_error(&err),
                        }
                    }
                    "2" => {
                        navigator.handle(NavEvent::GoToSignup, &mut session);
                    }
                    "3" => {
                        navigator.handle(NavEvent::GoToForgotPassword, &mut session);
                    }
                    "q" => break,
                    other => println!("Unknown choice '{other}'"),
                }
            }

            ActiveView::Signup => {
                println!();
                println!("=== Create Account ===");
                let Some(username) = prompt("Username (blank to cancel): ")? else { break };
                if username.is_empty() {
                    navigator.handle(NavEvent::BackToLogin, &mut session);
                    continue;
                }
                let Some(password) = prompt("Password: ")? else { break };
                let Some(confirm_password) = prompt("Confirm password: ")? else { break };
                let Some(email) = prompt("Email (optional): ")? else { break };

                match mutation_service
                    .create_account(SignupRequest {
                        username,
                        password,
                        confirm_password,
                        email,
                    })
                    .await
                {
                    Ok(_) => {
                        println!("Account created. You can sign in now.");
                        navigator.handle(NavEvent::BackToLogin, &mut session);
                    }
                    Err(err) => report_error(&err),
                }
            }

            ActiveView::ForgotPassword => {
                println!();
                println!("=== Reset Password ===");
                let Some(username) = prompt("Username (blank to cancel): ")? else { break };
                if username.is_empty() {
                    navigator.handle(NavEvent::BackToLogin, &mut session);
                    continue;
                }
                let Some(new_password) = prompt("New password: ")? else { break };
                let Some(confirm_password) = prompt("Confirm new password: ")? else { break };

                match mutation_service
                    .reset_secret(ResetSecretRequest {
                        username,
                        new_password,
                        confirm_password,
                    })
                    .await
                {
                    Ok(()) => {
                        println!("Password reset. Sign in with your new password.");
                        navigator.handle(NavEvent::BackToLogin, &mut session);
                    }
                    Err(err) => report_error(&err),
                }
            }

            ActiveView::Dashboard => {
                println!();
                println!("=== Dashboard ===");
                if let Some(username) = session.current_username() {
                    println!("Signed in as {username}");
                }
                match ledger_service.dashboard_summary(&session).await {
                    Ok(summary) => {
                        println!("Income:      {:>14}", format_amount(summary.total_income));
                        println!("Expenses:    {:>14}", format_amount(summary.total_expense));
                        println!("Net savings: {:>14}", format_amount(summary.net_savings));
                    }
                    Err(err) => report_error(&err),
                }
                println!("{MENU_HINT}");
                let Some(choice) = prompt("> ")? else { break };
                if !dispatch_menu(&choice, &mut navigator, &mut session) {
                    break;
                }
            }

            ActiveView::RecordTransaction => {
                println!();
                println!("=== Transactions ===");
                let recent = TransactionListQuery {
                    limit: Some(10),
                    offset: None,
                };
                match ledger_service.list_transactions(&session, &recent).await {
                    Ok(rows) if rows.is_empty() => println!("No transactions yet."),
                    Ok(rows) => {
                        println!(
                            "{:>5}  {:<10}  {:<7}  {:>12}  {:<16}  note",
                            "id", "date", "kind", "amount", "category"
                        );
                        for row in &rows {
                            println!(
                                "{:>5}  {:<10}  {:<7}  {:>12}  {:<16}  {}",
                                row.id,
                                row.occurred_on.to_string(),
                                row.kind.as_str(),
                                format_amount(row.amount),
                                row.category,
                                row.note.as_deref().unwrap_or("-"),
                            );
                        }
                    }
                    Err(err) => report_error(&err),
                }
                println!("[1] Record an entry  [2] Delete an entry");
                println!("{MENU_HINT}");
                let Some(choice) = prompt("> ")? else { break };
                match choice.as_str() {
                    "1" => {
                        let Some(kind_text) = prompt("Kind (income/expense): ")? else { break };
                        let kind = match kind_text.to_lowercase().as_str() {
                            "income" | "i" => TransactionKind::Income,
                            "expense" | "e" => TransactionKind::Expense,
                            other => {
                                println!("Unknown kind '{other}'");
                                continue;
                            }
                        };
                        let Some(amount) = prompt("Amount: ")? else { break };
                        let Some(category) = prompt("Category: ")? else { break };
                        let Some(occurred_on) = prompt("Date (YYYY-MM-DD): ")? else { break };
                        let Some(note) = prompt("Note (optional): ")? else { break };

                        let request = RecordTransactionRequest {
                            kind,
                            amount,
                            category,
                            occurred_on,
                            note: if note.is_empty() { None } else { Some(note) },
                        };
                        match mutation_service.record_transaction(&session, request).await {
                            Ok(_) => {
                                navigator.handle(NavEvent::DataChanged, &mut session);
                            }
                            Err(err) => report_error(&err),
                        }
                    }
                    "2" => {
                        let Some(id_text) = prompt("Transaction id: ")? else { break };
                        match id_text.parse::<i64>() {
                            Ok(id) => {
                                match mutation_service.delete_transaction(&session, id).await {
                                    Ok(()) => {
                                        navigator.handle(NavEvent::DataChanged, &mut session);
                                    }
                                    Err(err) => report_error(&err),
                                }
                            }
                            Err(_) => println!("'{id_text}' is not a number"),
                        }
                    }
                    other => {
                        if !dispatch_menu(other, &mut navigator, &mut session) {
                            break;
                        }
                    }
                }
            }

            ActiveView::Reports => {
                println!();
                println!("=== Reports ===");
                match ledger_service.category_breakdown(&session).await {
                    Ok(breakdown) if breakdown.is_empty() => {
                        println!("No expenses recorded yet.")
                    }
                    Ok(breakdown) => {
                        println!("Spending by category:");
                        for (category, total) in &breakdown {
                            println!("  {:<16} {:>14}", category, format_amount(*total));
                        }
                    }
                    Err(err) => report_error(&err),
                }
                println!("{MENU_HINT}");
                let Some(choice) = prompt("> ")? else { break };
                if !dispatch_menu(&choice, &mut navigator, &mut session) {
                    break;
                }
            }

            ActiveView::Budgets => {
                println!();
                println!("=== Budgets ===");
                match ledger_service.budget_status(&session).await {
                    Ok(rows) if rows.is_empty() => println!("No budgets set yet."),
                    Ok(rows) => {
                        println!(
                            "{:<16} {:>12} {:>12} {:>12}  status",
                            "category", "limit", "spent", "remaining"
                        );
                        for row in &rows {
                            println!(
                                "{:<16} {:>12} {:>12} {:>12}  {}",
                                row.category,
                                format_amount(row.limit),
                                format_amount(row.spent),
                                format_amount(row.remaining),
                                row.status,
                            );
                        }
                    }
                    Err(err) => report_error(&err),
                }
                println!("[1] Set a budget");
                println!("{MENU_HINT}");
                let Some(choice) = prompt("> ")? else { break };
                match choice.as_str() {
                    "1" => {
                        let Some(category) = prompt("Category: ")? else { break };
                        let Some(limit) = prompt("Monthly limit: ")? else { break };
                        let request = UpsertBudgetRequest { category, limit };
                        match mutation_service.upsert_budget(&session, request).await {
                            Ok(()) => {
                                navigator.handle(NavEvent::DataChanged, &mut session);
                            }
                            Err(err) => report_error(&err),
                        }
                    }
                    other => {
                        if !dispatch_menu(other, &mut navigator, &mut session) {
                            break;
                        }
                    }
                }
            }

            ActiveView::Settings => {
                println!();
                println!("=== Settings ===");
                match ledger_service.profile(&session).await {
                    Ok(profile) => {
                        println!("Username: {}", profile.username);
                        println!("Email:    {}", profile.email.as_deref().unwrap_or("(none)"));
                    }
                    Err(err) => report_error(&err),
                }
                println!("[1] Change password");
                println!("{MENU_HINT}");
                let Some(choice) = prompt("> ")? else { break };
                match choice.as_str() {
                    "1" => {
                        let Some(current_password) = prompt("Current password: ")? else { break };
                        let Some(new_password) = prompt("New password: ")? else { break };
                        let Some(confirm_password) = prompt("Confirm new password: ")? else {
                            break;
                        };

                        let request = ChangePasswordRequest {
                            current_password,
                            new_password,
                            confirm_password,
                        };
                        match mutation_service.change_password(&session, request).await {
                            Ok(()) => println!("Password changed."),
                            Err(err) => report_error(&err),
                        }
                    }
                    other => {
                        if !dispatch_menu(other, &mut navigator, &mut session) {
                            break;
                        }
                    }
                }
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}
