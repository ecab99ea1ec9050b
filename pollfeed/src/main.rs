use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chrono::Utc;
use pollfeed::{
    AssetCatalog, DisplayState, Event, FileProvider, PostRef, PostStore, StoreConfig, Subscription,
};

#[derive(Parser)]
#[command(name = "pollfeed")]
#[command(about = "Load a poll feed, cast votes and print the resulting cells")]
struct Args {
    /// Directory holding `<source>.json` and `assets.json`
    #[arg(short, long, env = "POLLFEED_DATA_DIR", default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/data"))]
    data_dir: PathBuf,

    /// Payload name inside the data directory (without `.json`)
    #[arg(short, long, env = "POLLFEED_SOURCE", default_value = "posts")]
    source: String,

    /// Asset manifest (defaults to `<data-dir>/assets.json`)
    #[arg(short, long, env = "POLLFEED_ASSETS")]
    assets: Option<PathBuf>,

    /// Pause between data arrival and the final display state
    #[arg(long, env = "POLLFEED_SETTLE_DELAY_MS", default_value_t = 2500)]
    settle_delay_ms: u64,

    /// Vote to cast after loading (format: post:option, post is an index or
    /// an id; can be repeated)
    #[arg(long, value_parser = parse_vote)]
    vote: Vec<(PostRef, String)>,

    /// Print cells as JSON
    #[arg(long)]
    json: bool,
}

fn parse_vote(s: &str) -> Result<(PostRef, String), String> {
    let (post, option) = s
        .rsplit_once(':')
        .ok_or("Expected format: post:option".to_string())?;
    if post.is_empty() || option.is_empty() {
        return Err("Expected format: post:option".to_string());
    }
    let target = match post.parse::<usize>() {
        Ok(index) => PostRef::Index(index),
        Err(_) => PostRef::Id(post.to_string()),
    };
    Ok((target, option.to_string()))
}

/// Wait until a load has settled on `posts` or `empty`.
async fn wait_for_settle(events: &mut Subscription) -> Option<DisplayState> {
    while let Some(event) = events.recv().await {
        if let Event::StateChanged { new, .. } = event
            && matches!(new, DisplayState::Posts | DisplayState::Empty)
        {
            return Some(new);
        }
    }
    None
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pollfeed=info".parse()?))
        .init();

    let args = Args::parse();

    let provider = match &args.assets {
        Some(manifest) => {
            let catalog = AssetCatalog::load(manifest).await?;
            FileProvider::new(&args.data_dir, &args.source, catalog)
        }
        None => FileProvider::open(&args.data_dir, &args.source).await?,
    };
    info!("Reading {}", provider.source_path().display());

    let config = StoreConfig::default().with_settle_delay(Duration::from_millis(args.settle_delay_ms));
    let store = PostStore::new(provider, config);
    let mut events = store.subscribe();

    if let Err(e) = store.load().await {
        warn!("Load failed: {}", e);
    }
    let state = if store.state() == DisplayState::Loading {
        wait_for_settle(&mut events).await.unwrap_or(store.state())
    } else {
        store.state()
    };
    info!("Display state: {}", state);

    for (target, option_id) in &args.vote {
        let posts = store.posts();
        let option = match target {
            PostRef::Index(i) => posts.get(*i),
            PostRef::Id(id) => posts.iter().find(|p| &p.id == id),
        }
        .and_then(|post| post.option(option_id).cloned());

        let Some(option) = option else {
            warn!("No option {} on post {:?}, skipping", option_id, target);
            continue;
        };
        let outcome = store.vote(&option, target.clone())?;
        info!("Vote {:?}:{} -> applied={}", target, option_id, outcome.is_applied());
    }

    let cells = store.cells();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&*cells)?);
        return Ok(());
    }

    println!("{} - {}", store.page_title(), store.header_label());
    let now = Utc::now();
    for cell in cells.iter() {
        println!();
        println!("{} (by {})", cell.title, cell.username);
        for option in &cell.options {
            println!(
                "  [{}] {:>3}% ({})",
                option.id,
                cell.option_percentage(&option.id).unwrap_or(0),
                option.voted
            );
        }
        let voted = if cell.is_voted { ", voted" } else { "" };
        match cell.last_voted_label(now) {
            Some(last) => println!("  {}{}, last vote {}", cell.vote_count_label(), voted, last),
            None => println!("  {}{}", cell.vote_count_label(), voted),
        }
    }

    Ok(())
}
