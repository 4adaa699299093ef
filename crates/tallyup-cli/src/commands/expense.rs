use anyhow::Result;
use tallyup_application::{AppServices, ExpenseRequest};

use super::utils::{money, print_json};

pub async fn add(
    services: &AppServices,
    group_id: String,
    amount: f64,
    description: String,
    paid: Vec<(String, f64)>,
    category: Option<String>,
    json: bool,
) -> Result<()> {
    let mut paid_by = std::collections::BTreeMap::new();
    for (member, value) in paid {
        *paid_by.entry(member).or_insert(0.0) += value;
    }

    let expense = services
        .expenses
        .add_expense(ExpenseRequest {
            group_id,
            total_amount: amount,
            paid_by,
            description,
            date: None,
            category,
        })
        .await?;

    if json {
        return print_json(&expense);
    }
    println!(
        "✅ Recorded '{}' for {} ({})",
        expense.description,
        money(expense.total_amount),
        expense.id
    );
    Ok(())
}

pub async fn list(services: &AppServices, group_id: &str, json: bool) -> Result<()> {
    let expenses = services.expenses.list_expenses(group_id).await?;
    if json {
        return print_json(&expenses);
    }
    if expenses.is_empty() {
        println!("No expenses recorded.");
    }
    for expense in &expenses {
        let payers: Vec<String> = expense
            .paid_by
            .iter()
            .map(|(member, value)| format!("{} {}", member, money(*value)))
            .collect();
        println!(
            "{}  {:>10}  {}  (paid by {})",
            expense.date.format("%Y-%m-%d"),
            money(expense.total_amount),
            expense.description,
            payers.join(", ")
        );
    }
    Ok(())
}

pub async fn feed(services: &AppServices, member: &str, json: bool) -> Result<()> {
    let feed = services.expenses.activity_feed(member).await?;
    if json {
        return print_json(&feed);
    }
    if feed.is_empty() {
        println!("No recent activity.");
    }
    for activity in &feed {
        println!(
            "{}  {:>10}  {}  [{}]{}",
            activity.date.format("%Y-%m-%d"),
            money(activity.amount),
            activity.description,
            activity.group_name,
            activity
                .category
                .as_deref()
                .map(|c| format!("  #{}", c))
                .unwrap_or_default()
        );
    }
    Ok(())
}
