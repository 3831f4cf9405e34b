//! # Keystone Probe
//!
//! Binary entry point for the cache inspection CLI.

use clap::Parser;
use std::time::Instant;

use keystone_cache::{CacheService, RedisClient};
use keystone_logger::{Logger, fields};
use keystone_probe::{Command, Config, Overrides, run};

#[derive(Parser, Debug)]
#[command(name = "keystone-probe")]
#[command(about = "Inspect a Redis cache through the keystone facades", version)]
struct Args {
    /// Redis host (overrides REDIS_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Redis port (overrides REDIS_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Redis database index (overrides REDIS_DB)
    #[arg(long)]
    db: Option<i64>,

    /// Log filter directive (overrides LOG_LEVEL)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::from_env()?.with_overrides(Overrides {
        host: args.host,
        port: args.port,
        db: args.db,
        log_level: args.log_level,
    });

    // Replies go to stdout; keep log records out of the way on stderr.
    let logger = Logger::with_writer(&config.logger, std::io::stderr)?;
    // Library crates log through plain `tracing`; send them to the same sink.
    tracing::dispatcher::set_global_default(logger.dispatch().clone())?;

    logger.debug(
        "Connecting to Redis",
        &fields!["addr", config.redis.addr(), "db", config.redis.db],
    );

    let client = match RedisClient::connect(&config.redis).await {
        Ok(client) => client,
        Err(e) => {
            logger.error("Redis unavailable", &fields!["error", e.to_string()]);
            return Err(e.into());
        }
    };
    let cache = CacheService::from_client(client);

    let started = Instant::now();
    match run(&cache, &args.command).await {
        Ok(reply) => {
            logger.info(
                "Command completed",
                &fields![
                    "command",
                    args.command.name(),
                    "elapsed_us",
                    u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX)
                ],
            );
            println!("{reply}");
            Ok(())
        }
        Err(e) => {
            logger.error(
                "Command failed",
                &fields!["command", args.command.name(), "error", e.to_string()],
            );
            Err(e)
        }
    }
}
