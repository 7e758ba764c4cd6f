use crate::prelude::{print, println, *};
use colored::Colorize;
use postfeed_core::post::Post;
use postfeed_core::view::{summarize, visible_posts, FeedSummary};
use serde::Serialize;

use super::format_post_text;
use crate::config::FeedConfig;
use crate::store::PageStore;
use crate::transport::PostsTransport;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ListOptions {
    /// Maximum number of pages to load
    #[arg(short, long, default_value = "1")]
    pub pages: usize,

    /// Only show posts whose title contains this text (case-insensitive)
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Loaded posts plus the feed summary
#[derive(Debug, Serialize, Clone)]
pub struct ListOutput {
    pub search: String,
    pub posts: Vec<Post>,
    pub summary: FeedSummary,
}

pub async fn run<T: PostsTransport>(
    options: ListOptions,
    config: &FeedConfig,
    transport: T,
    global: crate::Global,
) -> Result<()> {
    if global.verbose {
        println!("Loading up to {} pages...", options.pages);
    }

    let output = list_posts_data(transport, config.page_size, &options).await?;

    if options.json {
        println!("{}", format_list_json(&output)?);
    } else {
        print!("{}", format_list_text(&output));
    }

    Ok(())
}

/// Load pages and return the filtered view of everything loaded
pub async fn list_posts_data<T: PostsTransport>(
    transport: T,
    page_size: usize,
    options: &ListOptions,
) -> Result<ListOutput> {
    let mut store = PageStore::new(transport, page_size);
    store
        .load_pages(options.pages)
        .await
        .map_err(|e| eyre!("{}", e))?;

    let posts = visible_posts(store.feed().collection().pages(), &options.search);
    let summary = summarize(store.feed(), posts.len());

    Ok(ListOutput {
        search: options.search.clone(),
        posts,
        summary,
    })
}

fn format_list_json(output: &ListOutput) -> Result<String> {
    serde_json::to_string_pretty(output).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

fn format_list_text(output: &ListOutput) -> String {
    let mut result = String::new();
    let summary = &output.summary;

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    let heading = if output.search.is_empty() {
        "POSTS".to_string()
    } else {
        format!("POSTS MATCHING \"{}\"", output.search)
    };
    result.push_str(&format!("{}\n", heading.bright_cyan().bold()));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    if output.posts.is_empty() {
        result.push_str(&format!("\n{}\n", "No posts to show.".yellow()));
    } else {
        for post in &output.posts {
            result.push('\n');
            result.push_str(&format_post_text(post, 120));
        }
    }

    result.push_str(&format!(
        "\n{} {} {} {} {} {}\n",
        "Showing".bright_white(),
        summary.shown.to_string().bright_cyan().bold(),
        "of".bright_white(),
        summary.loaded.to_string().bright_cyan().bold(),
        "loaded posts from".bright_white(),
        format!("{} pages", summary.pages).bright_cyan().bold(),
    ));

    if summary.has_more {
        result.push_str(&format!(
            "{}: {}\n",
            "More available".green(),
            format!("postfeed posts list --pages {}", summary.pages + 1).cyan()
        ));
    } else {
        result.push_str(&format!("{}\n", "End of feed.".bright_black()));
    }

    result.push('\n');
    result
}
