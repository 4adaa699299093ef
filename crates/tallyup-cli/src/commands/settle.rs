use anyhow::Result;
use tallyup_application::AppServices;
use tallyup_core::settlement::{SETTLEMENT_EPSILON, Settlement};

use super::utils::{money, print_json};

pub async fn compute(services: &AppServices, group_id: &str, json: bool) -> Result<()> {
    let created = services.settlements.compute_settlements(group_id).await?;
    if json {
        return print_json(&created);
    }
    if created.is_empty() {
        println!("✅ Everyone is square.");
        return Ok(());
    }
    println!("📋 {} new pending settlement(s):", created.len());
    print_settlements(&created);
    Ok(())
}

pub async fn pending(services: &AppServices, group_id: &str, json: bool) -> Result<()> {
    let pending = services.settlements.pending_settlements(group_id).await?;
    if json {
        return print_json(&pending);
    }
    if pending.is_empty() {
        println!("No settlements to show for this group.");
        return Ok(());
    }
    print_settlements(&pending);
    Ok(())
}

pub async fn confirm(services: &AppServices, settlement_id: &str, json: bool) -> Result<()> {
    let settlement = services.settlements.confirm_settlement(settlement_id).await?;
    if json {
        return print_json(&settlement);
    }
    println!(
        "✅ {} paid {} {}",
        settlement.from,
        settlement.to,
        money(settlement.amount)
    );
    Ok(())
}

pub async fn balances(services: &AppServices, group_id: &str, json: bool) -> Result<()> {
    let balances = services.settlements.group_balances(group_id).await?;
    if json {
        return print_json(&balances);
    }
    for (member, balance) in &balances {
        let status = if *balance > SETTLEMENT_EPSILON {
            "is owed"
        } else if *balance < -SETTLEMENT_EPSILON {
            "owes"
        } else {
            "is settled"
        };
        println!("{:<16} {:>10}  {}", member, money(*balance), status);
    }
    Ok(())
}

fn print_settlements(settlements: &[Settlement]) {
    for s in settlements {
        println!("  {}  {} → {}  {}", s.id, s.from, s.to, money(s.amount));
    }
}
