use std::process::exit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use clap::Parser;
use log::{error, info, warn};

use worker_pools::{Context, Result, WorkerPool, DEFAULT_QUEUE_CAPACITY};

const DEFAULT_ITEMS: usize = 1000;

#[derive(Parser)]
#[command(name = "pool-demo", version, about = "Runs a batch of items through a worker pool")]
struct Cli {
    /// Number of workers [default: number of CPUs]
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Queue capacity; 0 hands items straight to a waiting worker
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY as u64, value_name = "C")]
    capacity: u64,

    /// Number of items to submit
    #[arg(long, default_value_t = DEFAULT_ITEMS, value_name = "M")]
    items: usize,

    /// Deadline passed to the workers, in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let workers = cli.workers.unwrap_or_else(num_cpus::get);
    info!("pool-demo {}", env!("CARGO_PKG_VERSION"));

    let buffer = Arc::new(Mutex::new(String::new()));
    let started = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicUsize::new(0));
    let late = Arc::new(AtomicUsize::new(0));

    let out = buffer.clone();
    let late_items = late.clone();
    let pre = started.clone();
    let post = finished.clone();
    let pool = WorkerPool::builder(move |ctx: &Context, i: usize| {
        if ctx.is_done() {
            late_items.fetch_add(1, Ordering::Relaxed);
        }
        out.lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_str(&format!("item {}\n", i));
    })
    .pool_size(workers)?
    .queue_capacity(cli.capacity)?
    .prework(move |_| {
        pre.fetch_add(1, Ordering::SeqCst);
    })
    .postwork(move |_| {
        post.fetch_add(1, Ordering::SeqCst);
    })
    .build();

    let ctx = Context::background();
    let (ctx, _cancel) = match cli.timeout_ms {
        Some(ms) => ctx.with_timeout(Duration::from_millis(ms)),
        None => ctx.with_cancel(),
    };

    let begin = Instant::now();
    let pool = pool.start(&ctx)?;
    for i in 0..cli.items {
        if let Err(e) = pool.submit(i) {
            warn!("Item {} rejected: {}", i, e);
        }
    }
    pool.stop()?;
    let elapsed = begin.elapsed();

    let lines = buffer
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .lines()
        .count();
    let late = late.load(Ordering::Relaxed);
    if late > 0 {
        warn!("{} items were processed after the deadline", late);
    }
    info!("Processed {} items in {:?}", lines, elapsed);

    println!(
        "workers={} finished={} items={} lines={}",
        started.load(Ordering::SeqCst),
        finished.load(Ordering::SeqCst),
        cli.items,
        lines
    );
    Ok(())
}
