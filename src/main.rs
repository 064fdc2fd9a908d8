use anyhow::{Context, bail};
use gift_redeemer::cli::{Args, ConfigDiscovery, ExecutionMode, RedeemConfig, ScanConfig};
use gift_redeemer::redeem::token_pool::mask_token;
use gift_redeemer::{CodeExtractor, Outcome, RedeemerConfig, Redemption, RedemptionEngine};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mode = args.mode().map_err(anyhow::Error::msg)?;

    let default_filter = if mode.verbose() {
        "gift_redeemer=debug"
    } else {
        "gift_redeemer=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match mode {
        ExecutionMode::Scan(config) => run_scan(config),
        ExecutionMode::Redeem(config) => run_redeem(config).await,
        ExecutionMode::ShowConfig => {
            ConfigDiscovery::show_discovery_info();
            Ok(())
        }
        ExecutionMode::InitConfig { path } => run_init_config(path.as_deref()),
    }
}

fn run_init_config(path: Option<&Path>) -> anyhow::Result<()> {
    let config_path = match path {
        Some(path) => {
            ConfigDiscovery::create_default_config_at(path)?;
            path.to_path_buf()
        }
        None => ConfigDiscovery::create_default_user_config()?,
    };
    println!("{}", config_path.display());
    Ok(())
}

fn load_config(config_override: Option<&Path>) -> anyhow::Result<RedeemerConfig> {
    let config = match config_override {
        Some(path) => {
            info!("Loading configuration override from: {:?}", path);
            RedeemerConfig::from_toml_file(path)?
        }
        None => ConfigDiscovery::discover_config()?,
    };
    Ok(config)
}

fn run_scan(config: ScanConfig) -> anyhow::Result<()> {
    let redeemer_config = load_config(config.config_override.as_deref())?;
    let extractor = CodeExtractor::new(&redeemer_config.link_prefixes)?;

    let text = config
        .input
        .read_to_string()
        .with_context(|| format!("Failed to read {:?}", config.input))?;

    for code in extractor.find_codes(&text) {
        println!("{}", code);
    }
    Ok(())
}

#[derive(Serialize)]
struct RedemptionRow {
    code: String,
    outcome: Outcome,
    token: Option<String>,
}

impl From<&Redemption> for RedemptionRow {
    fn from(redemption: &Redemption) -> Self {
        Self {
            code: redemption.code.clone(),
            outcome: redemption.outcome,
            token: redemption.token.as_deref().map(mask_token),
        }
    }
}

async fn run_redeem(config: RedeemConfig) -> anyhow::Result<()> {
    let redeemer_config = load_config(config.config_override.as_deref())?;
    if redeemer_config.tokens.is_empty() {
        bail!("No tokens configured. Add [[tokens]] entries to the configuration file.");
    }

    let engine = RedemptionEngine::with_http(redeemer_config)?;

    let mut codes = config.codes.clone();
    if let Some(input) = &config.input {
        let text = input
            .read_to_string()
            .with_context(|| format!("Failed to read {:?}", input))?;
        codes.extend(engine.extractor().find_codes(&text));
    }

    if codes.is_empty() {
        warn!("No gift codes found");
        return Ok(());
    }

    info!("Redeeming {} code(s)", codes.len());
    let results = engine.redeem_all(&codes).await;
    let rows: Vec<RedemptionRow> = results.iter().map(RedemptionRow::from).collect();

    if config.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in &rows {
            println!(
                "{}\t{}\t{}",
                row.code,
                row.outcome,
                row.token.as_deref().unwrap_or("-")
            );
        }
    }

    let status = engine.status().await;
    info!(
        tokens_remaining = status.tokens_remaining,
        requests = status.latency.count,
        mean_latency_ms = status.latency.mean_ms.unwrap_or_default(),
        "Done"
    );
    Ok(())
}
