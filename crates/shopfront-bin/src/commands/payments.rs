//! Payment and subscription commands.

use crate::output::{self, OutputFormat};
use anyhow::Result;
use shopfront_api::payments::{PaymentHistoryStatus, PlanInterval};
use shopfront_api::ApiClient;

fn format_amount(amount: i64, currency: &str) -> String {
    format!("{:.2} {}", amount as f64 / 100.0, currency.to_uppercase())
}

/// Show payment history.
pub async fn history(client: &ApiClient, format: &OutputFormat) -> Result<()> {
    if !client.session().initialize().await {
        output::print_error("Not logged in", format);
        return Ok(());
    }

    let items = match client.payment_history().await {
        Ok(items) => items,
        Err(e) => {
            output::print_error(&format!("Could not load payment history: {}", e), format);
            return Ok(());
        }
    };

    match format {
        OutputFormat::Text => {
            if items.is_empty() {
                println!("No payments yet");
                return Ok(());
            }
            for item in &items {
                let status = match item.status {
                    PaymentHistoryStatus::Pending => "pending",
                    PaymentHistoryStatus::Completed => "completed",
                    PaymentHistoryStatus::Failed => "failed",
                    PaymentHistoryStatus::Refunded => "refunded",
                };
                println!(
                    "Order #{}  {}  {}  {}",
                    item.order_id,
                    format_amount(item.amount, &item.currency),
                    status,
                    item.created_at,
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
    }

    Ok(())
}

/// List available subscription plans.
pub async fn plans(client: &ApiClient, format: &OutputFormat) -> Result<()> {
    client.session().initialize().await;

    let plans = match client.subscription_plans().await {
        Ok(plans) => plans,
        Err(e) => {
            output::print_error(&format!("Could not load plans: {}", e), format);
            return Ok(());
        }
    };

    match format {
        OutputFormat::Text => {
            if plans.is_empty() {
                println!("No plans available");
                return Ok(());
            }
            for plan in &plans {
                let interval = match plan.interval {
                    PlanInterval::Month => "month",
                    PlanInterval::Year => "year",
                };
                println!(
                    "{} ({} per {})",
                    plan.name,
                    format_amount(plan.amount, &plan.currency),
                    interval,
                );
                output::print_row("Id", &plan.id);
                output::print_row("Description", &plan.description);
                for feature in &plan.features {
                    println!("    - {}", feature);
                }
                output::print_divider();
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&plans)?);
        }
    }

    Ok(())
}
