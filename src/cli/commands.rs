use crate::app::{AppContext, Result};
use crate::cli::ChainArgs;
use crate::crawler::{ChainLimit, CrawlReport};
use crate::store::{estimate_posts, InventorySummary, Layout, Store};

/// Gaps listed before the status output switches to a count
const MAX_LISTED_GAPS: usize = 20;

pub async fn run_parallel(
    ctx: &AppContext,
    urls: &[String],
    layout: Layout,
) -> Result<CrawlReport> {
    println!(
        "Scraping {} posts, {} tabs at a time...",
        urls.len(),
        ctx.config.crawler.parallel_tabs
    );

    let report = ctx.crawler()?.crawl_parallel(urls).await?;
    finish_run(ctx, &report, layout)?;
    Ok(report)
}

/// Follow the chain from `args.url`. Returns `None` when nothing needed crawling.
pub async fn run_chain(
    ctx: &AppContext,
    args: &ChainArgs,
    layout: Layout,
) -> Result<Option<CrawlReport>> {
    let limit = match (args.count, args.target) {
        (Some(count), _) => ChainLimit::Posts(count.get()),
        (None, Some(target)) => {
            let inventory = ctx.store.inventory()?;
            match estimate_posts(target, inventory.latest, ctx.config.crawler.chapters_per_post) {
                Some(posts) => {
                    println!(
                        "Latest captured chapter is {}; about {} posts to reach chapter {}",
                        inventory.latest, posts, target
                    );
                    ChainLimit::Posts(posts)
                }
                None => {
                    println!(
                        "Chapter {} is already captured (latest is {})",
                        target, inventory.latest
                    );
                    return Ok(None);
                }
            }
        }
        (None, None) => ChainLimit::UntilExhausted,
    };

    match limit {
        ChainLimit::Posts(n) => println!("Following chain from {} for {} posts...", args.url, n),
        ChainLimit::UntilExhausted => println!(
            "Following chain from {} until it ends (max {} posts)...",
            args.url, ctx.config.crawler.max_posts
        ),
    }

    let report = ctx.crawler()?.crawl_chain(&args.url, limit).await?;
    finish_run(ctx, &report, layout)?;
    Ok(Some(report))
}

fn finish_run(ctx: &AppContext, report: &CrawlReport, layout: Layout) -> Result<()> {
    let written = ctx.store.save(&report.chapters, layout)?;

    println!();
    println!(
        "Run finished ({}): {} posts visited, {} chapters captured, {} failures",
        report.stop,
        report.posts_visited,
        report.chapters.len(),
        report.failures.len()
    );
    for failure in &report.failures {
        eprintln!("  [{}] {}: {}", failure.index + 1, failure.url, failure.error);
    }
    for path in &written {
        println!("  Saved {}", path.display());
    }
    if let Some(next) = &report.next_url {
        println!("Resume from: {}", next);
    }

    println!();
    print_summary(ctx, &ctx.store.inventory()?);
    Ok(())
}

pub fn print_status(ctx: &AppContext, json: bool) -> Result<()> {
    let inventory = ctx.store.inventory()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&inventory)?);
        return Ok(());
    }

    print_summary(ctx, &inventory);
    Ok(())
}

fn print_summary(ctx: &AppContext, inventory: &InventorySummary) {
    let dir = ctx.store.dir().display();

    if inventory.is_empty() {
        println!("No chapter files in {}", dir);
        return;
    }

    println!("Chapters in {}", dir);
    for file in &inventory.files {
        let modified = file
            .modified
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<20} {:>10} bytes  {}", file.name, file.size, modified);
    }

    let first = inventory.chapters.first().copied().unwrap_or(0);
    println!(
        "Total: {} chapters ({}-{}), latest {}",
        inventory.total(),
        first,
        inventory.latest,
        inventory.latest
    );

    if inventory.gaps.is_empty() {
        println!("No missing chapters");
    } else if inventory.gaps.len() <= MAX_LISTED_GAPS {
        let gaps: Vec<String> = inventory.gaps.iter().map(u32::to_string).collect();
        println!("Missing: {}", gaps.join(", "));
    } else {
        println!("Missing: {} chapters", inventory.gaps.len());
    }
}

pub async fn list_tabs(ctx: &AppContext) -> Result<()> {
    let tabs = ctx.port.list_tabs().await?;

    if tabs.is_empty() {
        println!("No open tabs");
        return Ok(());
    }

    for tab in tabs {
        let attached = if tab.web_socket_debugger_url.is_some() {
            ""
        } else {
            " (attached elsewhere)"
        };
        println!("{:<8} {} {}{}", tab.kind, tab.id, tab.url, attached);
        if !tab.title.is_empty() {
            println!("         {}", tab.title);
        }
    }

    Ok(())
}
