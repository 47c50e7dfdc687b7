//! asin-lookup - Look up Amazon products by ASIN through a CORS relay

use anyhow::Result;
use asin_lookup::amazon::regions::Region;
use asin_lookup::commands::{LookupCommand, ShellCommand};
use asin_lookup::config::{Config, OutputFormat};
use asin_lookup::format::Formatter;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "asin-lookup",
    version,
    about = "Look up Amazon products by ASIN through a CORS relay",
    long_about = "Validates an ASIN, fetches its product page through a relay proxy and reports \
                  whether the product was found. On relay errors an alternative relay is offered."
)]
struct Cli {
    /// Amazon region whose product pages are looked up
    #[arg(short, long, global = true)]
    region: Option<Region>,

    /// Relay URL prefix (e.g., https://cors-anywhere.herokuapp.com/)
    #[arg(long, global = true)]
    relay: Option<String>,

    /// Product page template overriding the region's (e.g., https://www.amazon.com/dp/)
    #[arg(long, global = true)]
    target_url: Option<String>,

    /// Allow switching to relays outside the known set
    #[arg(long, global = true)]
    allow_custom_relay: bool,

    /// Outbound proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true)]
    proxy: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up products by ASIN
    #[command(alias = "l")]
    Lookup {
        /// ASIN(s) to look up
        #[arg(required = true)]
        asins: Vec<String>,

        /// Save found product pages as <DIR>/<ASIN>.html
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Interactive lookup shell
    #[command(alias = "sh")]
    Shell {
        /// Save found product pages as <DIR>/<ASIN>.html
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// List known relays
    Relays,

    /// List supported regions
    Regions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries results only
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config with layered overrides; AMZ_* variables are read only here
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(region) = cli.region {
        config.region = region;
    }
    if let Some(relay) = cli.relay {
        config.relay = relay;
    }
    if let Some(target_url) = cli.target_url {
        config.target_url = Some(target_url);
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    config.allow_custom_relay |= cli.allow_custom_relay;

    match cli.command {
        Commands::Lookup { asins, save } => {
            let cmd = LookupCommand::new(config).save_to(save);

            let output = if asins.len() == 1 {
                cmd.execute(&asins[0]).await?
            } else {
                cmd.execute_batch(&asins).await?
            };

            println!("{}", output);
        }

        Commands::Shell { save } => {
            ShellCommand::new(config).save_to(save).execute().await?;
        }

        Commands::Relays => {
            let formatter = Formatter::new(config.format);
            println!("{}", formatter.format_relays(&config.relay_set(), &config.relay_endpoint()));
        }

        Commands::Regions => {
            let formatter = Formatter::new(config.format);
            println!("{}", formatter.format_regions(Region::all()));
        }
    }

    Ok(())
}
