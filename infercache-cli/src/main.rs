//! infercache CLI
//!
//! Command-line interface for trying out and load-testing the infercache cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use infercache_cache::{CacheConfig, CacheStats, ManualClock, NoopObserver, SweepPolicy, TtlCache};

/// infercache - TTL + LRU cache for inference responses
#[derive(Parser)]
#[command(name = "infercache")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through the LRU and TTL scenarios step by step
    Demo,

    /// Hammer a shared cache from several threads
    Bench {
        /// Worker threads
        #[arg(short, long, default_value = "8")]
        threads: usize,
        /// Operations per thread
        #[arg(short, long, default_value = "100000")]
        ops: usize,
        /// Cache capacity
        #[arg(short, long, default_value = "1024")]
        capacity: usize,
        /// Distinct prompts drawn from
        #[arg(short, long, default_value = "4096")]
        keys: usize,
        /// TTL for every set, in seconds
        #[arg(long, default_value = "60")]
        ttl: i64,
        /// Run a background sweeper at this interval (milliseconds)
        #[arg(long)]
        sweep_ms: Option<u64>,
    },

    /// Print the configuration loaded from the environment
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "infercache=debug,info"
    } else {
        "infercache=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Demo => cmd_demo(),
        Commands::Bench {
            threads,
            ops,
            capacity,
            keys,
            ttl,
            sweep_ms,
        } => cmd_bench(threads, ops, capacity, keys, ttl, sweep_ms),
        Commands::Config => cmd_config(),
    }
}

/// Run the scripted scenarios against a manual clock
fn cmd_demo() -> Result<()> {
    println!("{}", "🧪 LRU: a read protects an entry from eviction".cyan().bold());
    let cache = TtlCache::new(2)?;

    cache.set("t1", "m1", "p1", "v1", 60)?;
    println!("   set p1 = v1");
    cache.set("t1", "m1", "p2", "v2", 60)?;
    println!("   set p2 = v2");
    show(&cache, "p1");
    cache.set("t1", "m1", "p3", "v3", 60)?;
    println!("   set p3 = v3 {}", "(cache full, evicts least recently used)".dimmed());
    show(&cache, "p2");
    show(&cache, "p1");
    show(&cache, "p3");

    println!("\n{}", "⏱  TTL: entries expire regardless of use".cyan().bold());
    let clock = Arc::new(ManualClock::new());
    let cache = TtlCache::builder()
        .capacity(2)
        .clock(clock.clone())
        .build()?;

    cache.set("t1", "m1", "p1", "v1", 1)?;
    println!("   set p1 = v1 (ttl 1s), {} entr(y/ies)", cache.len());
    clock.advance(Duration::from_secs(2));
    println!("   clock advanced by 2s");
    show(&cache, "p1");
    println!("   {} entr(y/ies) left", cache.len());

    print_stats(&cache.stats());
    Ok(())
}

fn show(cache: &TtlCache, prompt: &str) {
    match cache.get("t1", "m1", prompt) {
        Some(value) => println!(
            "   get {} -> {} {}",
            prompt,
            String::from_utf8_lossy(&value).green(),
            "hit".green()
        ),
        None => println!("   get {} -> {}", prompt, "miss".red()),
    }
}

/// Run a concurrent mixed workload
fn cmd_bench(
    threads: usize,
    ops: usize,
    capacity: usize,
    keys: usize,
    ttl: i64,
    sweep_ms: Option<u64>,
) -> Result<()> {
    ensure!(threads > 0, "need at least one thread");
    ensure!(keys > 0, "need at least one key");

    println!(
        "{} {} threads × {} ops (capacity {}, {} keys)",
        "📊 Benchmarking".cyan().bold(),
        threads,
        ops,
        capacity,
        keys
    );

    let sweep = match sweep_ms {
        Some(ms) => SweepPolicy::Background {
            interval: Duration::from_millis(ms),
        },
        None => SweepPolicy::Lazy,
    };
    let cache = TtlCache::builder()
        .capacity(capacity)
        .sweep(sweep)
        .observer(Arc::new(NoopObserver))
        .build()
        .context("failed to build cache")?;

    let pb = ProgressBar::new((threads * ops) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("   [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    std::thread::scope(|scope| -> Result<()> {
        let workers: Vec<_> = (0..threads)
            .map(|t| {
                let cache = &cache;
                let pb = pb.clone();
                scope.spawn(move || run_worker(cache, t, ops, keys, ttl, &pb))
            })
            .collect();
        for worker in workers {
            worker
                .join()
                .map_err(|_| anyhow::anyhow!("worker thread panicked"))??;
        }
        Ok(())
    })?;
    pb.finish();
    let elapsed = start.elapsed();

    let total = (threads * ops) as f64;
    println!("\n{}", "📈 Results:".green().bold());
    println!("   Throughput: {:.0} ops/sec", total / elapsed.as_secs_f64());
    println!("   Time per op: {:.2}µs", elapsed.as_micros() as f64 / total);
    print_stats(&cache.stats());

    info!(elapsed_ms = elapsed.as_millis() as u64, "Benchmark finished");
    Ok(())
}

fn run_worker(
    cache: &TtlCache,
    thread: usize,
    ops: usize,
    keys: usize,
    ttl: i64,
    pb: &ProgressBar,
) -> Result<()> {
    let mut rng = rand::thread_rng();
    let tenant = format!("tenant-{}", thread % 4);
    for i in 0..ops {
        let prompt = format!("prompt {}", rng.gen_range(0..keys));
        match rng.gen_range(0..100) {
            0..=59 => {
                if cache.get(&tenant, "bench-model", &prompt).is_none() {
                    cache.set(&tenant, "bench-model", &prompt, prompt.clone(), ttl)?;
                }
            }
            60..=94 => cache.set(&tenant, "bench-model", &prompt, prompt.clone(), ttl)?,
            _ => cache.delete(&tenant, "bench-model", &prompt),
        }
        if i % 1024 == 0 {
            pb.inc(1024u64.min((ops - i) as u64));
        }
    }
    Ok(())
}

/// Print the effective configuration
fn cmd_config() -> Result<()> {
    let config = CacheConfig::from_env().context("invalid cache configuration")?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn print_stats(stats: &CacheStats) {
    println!("\n{}", "📦 Cache stats:".green().bold());
    println!("   Entries:     {}/{}", stats.len, stats.capacity);
    println!("   Hits:        {}", stats.hits);
    println!("   Misses:      {}", stats.misses);
    println!("   Hit rate:    {:.1}%", stats.hit_rate() * 100.0);
    println!("   Inserts:     {}", stats.inserts);
    println!("   Updates:     {}", stats.updates);
    println!("   Evictions:   {}", stats.evictions);
    println!("   Expirations: {}", stats.expirations);
    println!("   Deletions:   {}", stats.deletions);
}
