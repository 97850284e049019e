//! Log command
//!
//! Usage: calltrail log <LEVEL> <MESSAGE> [--context KEY=VALUE]... [--config <FILE>]
//!        [--name <NAME>] [--stream <FILE>] [--mail-to <ADDRESS>]...

use calltrail_core::Level;
use calltrail_errors::CalltrailError;
use calltrail_logging::schema::{CHANNEL_CHAT, CHANNEL_MAIL};
use calltrail_logging::{Context, Logger, Outbox};
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Severity name (debug, info, notice, warning, error, critical, alert, emergency)
    pub level: String,

    /// Record message
    pub message: String,

    /// Context entry; the value is parsed as JSON, falling back to a string
    #[arg(short = 'x', long = "context", value_name = "KEY=VALUE")]
    pub context: Vec<String>,

    /// TOML configuration file (default: built-in defaults)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Logger name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Stream target file
    #[arg(short, long)]
    pub stream: Option<PathBuf>,

    /// Mail recipient; replaces the configured recipients
    #[arg(long = "mail-to", value_name = "ADDRESS")]
    pub mail_to: Vec<String>,
}

/// Execute log command
pub fn execute(args: LogArgs) -> Result<(), Box<dyn std::error::Error>> {
    let level: Level = args.level.parse()?;
    let context = parse_context(&args.context)?;

    let mut builder = Logger::builder().config(super::load_config(args.config.as_deref())?);
    if let Some(name) = &args.name {
        builder = builder.name(name);
    }
    if let Some(stream) = &args.stream {
        builder = builder.stream_target(stream);
    }
    if !args.mail_to.is_empty() {
        builder = builder.mail_recipients(args.mail_to);
    }

    let outbox = Outbox::new();
    let logger = builder.transport(outbox.clone()).build()?;

    let handled = logger.add_record(level, args.message, context);

    println!("handled={}", handled);
    println!(
        "notifications: mail={} chat={}",
        outbox.for_channel(CHANNEL_MAIL).len(),
        outbox.for_channel(CHANNEL_CHAT).len()
    );
    Ok(())
}

fn parse_context(pairs: &[String]) -> Result<Context, CalltrailError> {
    pairs
        .iter()
        .map(|pair| parse_context_pair(pair))
        .collect()
}

fn parse_context_pair(pair: &str) -> Result<(String, Value), CalltrailError> {
    let (key, raw) = pair
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| CalltrailError::InvalidContextPair {
            pair: pair.to_string(),
        })?;

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_context_values() {
        let context = parse_context(&[
            "order_id=17".to_string(),
            "paid=true".to_string(),
            "customer=ana".to_string(),
            "tags=[\"a\",\"b\"]".to_string(),
            "note=".to_string(),
        ])
        .unwrap();

        assert_eq!(context["order_id"], 17);
        assert_eq!(context["paid"], true);
        assert_eq!(context["customer"], "ana");
        assert_eq!(context["tags"][1], "b");
        assert_eq!(context["note"], "");
    }

    #[test]
    fn test_value_may_contain_equals() {
        let (key, value) = parse_context_pair("query=a=b").unwrap();
        assert_eq!(key, "query");
        assert_eq!(value, "a=b");
    }

    #[test]
    fn test_malformed_pairs_rejected() {
        for pair in ["no_separator", "=value"] {
            let err = parse_context_pair(pair).unwrap_err();
            assert_eq!(
                err,
                CalltrailError::InvalidContextPair {
                    pair: pair.to_string()
                }
            );
        }
    }
}
