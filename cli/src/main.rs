//! GsrSerDe CLI.
//!
//! # Commands
//! ```text
//! gsrserde decode    --data <hex> [--secondary <id>] [--schemas <file.json>] [--topic <name>] [--async] [--json]
//! gsrserde inspect   --data <hex>
//! gsrserde fallbacks [--json]
//! gsrserde info
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use gsrserde_core::config::keys;
use gsrserde_core::{ConfigMap, SerializationContext, HEADER_VERSION_BYTE};
use gsrserde_fallback::FallbackRegistry;
use gsrserde_kafka::GlueSchemaRegistryKafkaDeserializer;
use gsrserde_observability::{init_tracing, GsrSerDeMetrics, LogConfig};
use gsrserde_registry::{DefaultDataFormatDecoderFactory, MemorySchemaRegistry, WireFrame};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(
    name = "gsrserde",
    about = "Decode schema registry and legacy Kafka payloads",
    long_about = "
GsrSerDe CLI: route a Kafka payload through the schema registry decode path
or a secondary deserializer, exactly as a consumer would.

Payloads starting with 0x03 are registry frames; anything else goes to the
secondary deserializer given with --secondary.
",
    version
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one payload through the dispatching deserializer
    Decode {
        /// Payload bytes (hex, optionally 0x-prefixed)
        #[arg(long)]
        data: String,
        /// Secondary deserializer id for non-registry payloads
        #[arg(long)]
        secondary: Option<String>,
        /// JSON file with an array of { id, schema_name, schema_def, data_format }
        #[arg(long)]
        schemas: Option<PathBuf>,
        /// Topic the payload was consumed from
        #[arg(long, default_value = "default")]
        topic: String,
        /// Extra configuration entries, key=value
        #[arg(long = "config", value_name = "KEY=VALUE")]
        config: Vec<String>,
        /// Use the non-blocking decode path
        #[arg(long = "async")]
        use_async: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the registry wire frame header of a payload
    Inspect {
        /// Payload bytes (hex, optionally 0x-prefixed)
        #[arg(long)]
        data: String,
    },

    /// List registered secondary deserializers
    Fallbacks {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show build info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log = if cli.verbose {
        LogConfig {
            level: "debug".into(),
            ..LogConfig::default()
        }
    } else {
        LogConfig {
            level: "warn".into(),
            ..LogConfig::default()
        }
    };
    init_tracing(&log).context("failed to initialise logging")?;

    match cli.command {
        Commands::Decode {
            data,
            secondary,
            schemas,
            topic,
            config,
            use_async,
            json,
        } => {
            cmd_decode(
                &data,
                secondary.as_deref(),
                schemas.as_deref(),
                &topic,
                &config,
                use_async,
                json,
            )
            .await
        }
        Commands::Inspect { data } => cmd_inspect(&data),
        Commands::Fallbacks { json } => cmd_fallbacks(json),
        Commands::Info => cmd_info(),
    }
}

// ─── Command implementations ─────────────────────────────────────────────────

fn parse_hex(data: &str) -> Result<Vec<u8>> {
    let trimmed = data.trim();
    hex::decode(trimmed.strip_prefix("0x").unwrap_or(trimmed)).context("invalid payload hex")
}

fn parse_config(entries: &[String], secondary: Option<&str>) -> Result<ConfigMap> {
    let mut configs = ConfigMap::new();
    for entry in entries {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("config entry '{entry}' is not KEY=VALUE"))?;
        configs.insert(key.trim().to_string(), Value::String(value.trim().to_string()));
    }
    if let Some(id) = secondary {
        configs.insert(keys::SECONDARY_DESERIALIZER.to_string(), Value::String(id.to_string()));
    }
    Ok(configs)
}

async fn cmd_decode(
    data: &str,
    secondary: Option<&str>,
    schemas: Option<&std::path::Path>,
    topic: &str,
    config: &[String],
    use_async: bool,
    as_json: bool,
) -> Result<()> {
    let payload = parse_hex(data)?;

    let registry = MemorySchemaRegistry::new();
    if let Some(path) = schemas {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let loaded = registry.load_json(&content)?;
        if loaded == 0 {
            anyhow::bail!("no schemas found in '{}'", path.display());
        }
    }

    let configs = parse_config(config, secondary)?;
    let deserializer = GlueSchemaRegistryKafkaDeserializer::builder(
        Arc::new(registry),
        Arc::new(DefaultDataFormatDecoderFactory::new()),
    )
    .build(&configs)?;

    let ctx = SerializationContext::value(topic);
    let started = Instant::now();
    let result = if use_async {
        deserializer
            .deserialize_async(Bytes::from(payload), false, ctx)
            .await
    } else {
        deserializer.deserialize(&payload, false, &ctx)
    };
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    let metrics = GsrSerDeMetrics::new(&opentelemetry::global::meter("gsrserde-cli"));
    metrics.record_snapshot(topic, &deserializer.metrics());
    metrics.record_latency(elapsed_ms, topic);
    let decoded = result?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
    } else {
        match decoded {
            Some(value) => println!("{value}"),
            None => println!("null"),
        }
    }
    Ok(())
}

fn cmd_inspect(data: &str) -> Result<()> {
    let payload = parse_hex(data)?;
    match payload.first() {
        Some(&HEADER_VERSION_BYTE) => {
            let frame = WireFrame::parse(&payload)?;
            println!("Route:          registry");
            println!("Compression:    {:#04x}", frame.compression);
            println!("Schema version: {}", frame.schema_version_id);
            println!("Body:           {} bytes", frame.body.len());
        }
        Some(first) => {
            println!("Route:          secondary deserializer");
            println!("First byte:     {first:#04x}");
            println!("Length:         {} bytes", payload.len());
        }
        None => println!("Route:          null (empty payload)"),
    }
    Ok(())
}

fn cmd_fallbacks(as_json: bool) -> Result<()> {
    let registry = FallbackRegistry::global();
    let entries: Vec<(String, String)> = registry
        .ids()
        .into_iter()
        .map(|id| {
            let caps = registry
                .capabilities_of(&id)
                .map(|c| c.to_string())
                .unwrap_or_default();
            (id, caps)
        })
        .collect();

    if as_json {
        let list: Vec<Value> = entries
            .iter()
            .map(|(id, caps)| json!({ "id": id, "capabilities": caps }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        for (id, caps) in entries {
            println!("  {id:40} {caps}");
        }
    }
    Ok(())
}

fn cmd_info() -> Result<()> {
    println!("gsrserde {}", env!("CARGO_PKG_VERSION"));
    println!("Registry header byte: {HEADER_VERSION_BYTE:#04x}");
    println!("Built-in secondary deserializers: {}", FallbackRegistry::global().len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_with_and_without_prefix() {
        assert_eq!(parse_hex("0x0001").unwrap(), vec![0x00, 0x01]);
        assert_eq!(parse_hex(" 0301 ").unwrap(), vec![0x03, 0x01]);
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn config_entries_and_secondary() {
        let configs = parse_config(
            &["dataFormat=JSON".to_string(), "region = eu-west-1".to_string()],
            Some("gsrserde::Utf8Deserializer"),
        )
        .unwrap();
        assert_eq!(configs["dataFormat"], json!("JSON"));
        assert_eq!(configs["region"], json!("eu-west-1"));
        assert_eq!(configs[keys::SECONDARY_DESERIALIZER], json!("gsrserde::Utf8Deserializer"));
    }

    #[test]
    fn malformed_config_entry() {
        assert!(parse_config(&["novalue".to_string()], None).is_err());
    }
}
