//! Terminal client that pages back through a group's history.
//!
//! Renders the newest page, then keeps "scrolling to the top" so the feed
//! scroller pulls older pages until the server has no more or `--max-pages`
//! is reached, and prints the resulting feed oldest first.

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use feed_scroll::feed::{
    BodyNode, FeedAttributes, FeedScroller, FeedSurface, HttpPageSource, LoadOutcome,
    MemorySurface, NEAR_TOP_THRESHOLD, PageSource, ScrollerSettings, render_batch,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server base URL
    #[arg(long, env = "FEED_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Group to browse
    #[arg(long)]
    group: String,

    /// Stop after this many older pages
    #[arg(long, default_value_t = 5)]
    max_pages: usize,

    /// Visible height of the feed
    #[arg(long, default_value_t = 600.0)]
    viewport: f64,

    /// Scroll offset that triggers loading an older page
    #[arg(long, default_value_t = NEAR_TOP_THRESHOLD)]
    threshold: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let source = HttpPageSource::new(&args.base_url)
        .with_context(|| format!("invalid base URL {}", args.base_url))?;

    // The host page renders the newest page itself.
    let newest = source
        .fetch_page(&args.group, 0)
        .await
        .context("failed to load the newest page")?;
    let surface = MemorySurface::with_cards(args.viewport, render_batch(&newest.posts));
    let attrs = FeedAttributes {
        group_id: args.group.clone(),
        page: 0,
        has_more: newest.more,
    };

    let settings = ScrollerSettings {
        near_top_threshold: args.threshold,
    };
    let Some(scroller) = FeedScroller::attach(Some(surface), source, attrs, settings) else {
        return Ok(());
    };

    for _ in 0..args.max_pages {
        scroller.surface().set_scroll_top(0.0);
        match scroller.on_scroll().await {
            None | Some(LoadOutcome::Empty { more: false }) => break,
            Some(LoadOutcome::Loaded { .. } | LoadOutcome::Empty { more: true }) => {}
            Some(outcome) => {
                warn!(?outcome, "Stopped paging");
                break;
            }
        }
    }

    let cursor = scroller.cursor();
    info!(page = cursor.page, has_more = cursor.has_more, "Done paging");

    let surface = scroller.surface();
    for card in surface.cards() {
        println!("{}", card.author);
        let mut line = String::from("  ");
        for node in &card.body {
            match node {
                BodyNode::Text(text) => line.push_str(text),
                BodyNode::LineBreak => {
                    println!("{line}");
                    line = String::from("  ");
                }
            }
        }
        println!("{line}");
    }
    if cursor.has_more {
        println!("(older messages not loaded)");
    }
    Ok(())
}
