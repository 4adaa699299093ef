use anyhow::Result;
use serde::Serialize;

/// Parses `member=amount` as given to `--paid`.
pub fn parse_payment(raw: &str) -> std::result::Result<(String, f64), String> {
    let (member, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected member=amount, got '{}'", raw))?;
    let member = member.trim();
    if member.is_empty() {
        return Err(format!("missing member in '{}'", raw));
    }
    let amount: f64 = amount
        .trim()
        .parse()
        .map_err(|_| format!("invalid amount in '{}'", raw))?;
    Ok((member.to_string(), amount))
}

/// Two-decimal rendering used for every amount shown to the user.
pub fn money(amount: f64) -> String {
    // Avoid "$-0.00" for values that round to zero.
    let amount = if amount.abs() < 0.005 { 0.0 } else { amount };
    format!("${:.2}", amount)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
