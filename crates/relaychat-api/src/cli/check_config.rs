//! `relaychat check-config`: show the effective, redacted configuration.

use anyhow::Result;
use console::style;

use relaychat_infra::config::{redacted_endpoint, RelayConfig};

/// Print the resolved configuration. The bearer token is never shown.
pub fn check_config(config: &RelayConfig, json: bool) -> Result<()> {
    let endpoint = redacted_endpoint(&config.webhook_url);

    if json {
        let report = serde_json::json!({
            "valid": true,
            "webhook_endpoint": endpoint,
            "bearer_token": "[REDACTED]",
            "max_messages": config.limit.max_messages,
            "cap_unit": config.limit.unit.to_string(),
            "message_cap": config.limit.message_cap(),
            "connect_timeout_secs": config.connect_timeout.as_secs(),
            "read_timeout_secs": config.read_timeout.as_secs(),
            "idle_ttl_secs": config.idle_ttl.as_secs(),
            "fallback": config.fallback,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("  {} Configuration is valid", style("✓").green().bold());
    println!();
    println!("  {}", style("── Webhook ──").dim());
    println!("  Endpoint:  {}", style(&endpoint).cyan());
    println!("  Token:     {}", style("[REDACTED]").dim());
    println!(
        "  Timeouts:  connect {}s, response {}s",
        config.connect_timeout.as_secs(),
        config.read_timeout.as_secs()
    );
    println!();
    println!("  {}", style("── Limits ──").dim());
    println!(
        "  Cap:       {} {} ({} messages, {} turns)",
        config.limit.max_messages,
        config.limit.unit,
        config.limit.message_cap(),
        config.limit.remaining_turns(0)
    );
    println!("  Idle TTL:  {}s (HTTP server)", config.idle_ttl.as_secs());
    println!();
    println!("  {}", style("── Fallback texts ──").dim());
    println!("  Timeout:        {}", style(&config.fallback.timeout).dim());
    println!("  Error:          {}", style(&config.fallback.error).dim());
    println!("  Unprocessable:  {}", style(&config.fallback.unprocessable).dim());
    println!("  Limit reached:  {}", style(&config.fallback.limit_reached).dim());
    println!();

    Ok(())
}
