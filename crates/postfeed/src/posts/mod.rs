use crate::prelude::{println, *};
use colored::Colorize;
use postfeed_core::post::{Post, ValidationErrors};

use crate::config::{create_client, FeedConfig};
use crate::transport::HttpTransport;

pub mod browse;
pub mod create;
pub mod delete;
pub mod list;
pub mod update;

#[derive(Debug, clap::Parser)]
#[command(name = "posts")]
#[command(about = "Browse and edit posts")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List posts, loading pages until the feed ends or --pages is reached
    #[clap(name = "list")]
    List(list::ListOptions),

    /// Create a post
    #[clap(name = "create")]
    Create(create::CreateOptions),

    /// Update a post's title and/or body
    #[clap(name = "update")]
    Update(update::UpdateOptions),

    /// Delete a post
    #[clap(name = "delete")]
    Delete(delete::DeleteOptions),

    /// Interactive infinite-scroll session
    #[clap(name = "browse")]
    Browse(browse::BrowseOptions),
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let config = FeedConfig::from_env()?
        .with_overrides(global.base_url.clone(), global.page_size)
        .validate()?;

    let transport = HttpTransport::new(create_client()?, config.base_url.clone());

    if global.verbose {
        println!("Posts API Base: {}", transport.base_url());
        println!("Page size: {}", config.page_size);
        println!();
    }

    match app.command {
        Commands::List(options) => list::run(options, &config, transport, global).await,
        Commands::Create(options) => create::run(options, &config, transport).await,
        Commands::Update(options) => update::run(options, &config, transport).await,
        Commands::Delete(options) => delete::run(options, &config, transport).await,
        Commands::Browse(options) => browse::run(options, &config, transport).await,
    }
}

pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

/// One post as a colored text block
pub fn format_post_text(post: &Post, body_chars: usize) -> String {
    format!(
        "{} {}\n    {}\n",
        format!("[{}]", post.id).yellow().bold(),
        post.title.white().bold(),
        truncate_text(&post.body.replace('\n', " "), body_chars).bright_black()
    )
}

/// Field errors rendered one per line, next to their field name
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut result = String::new();
    for error in &errors.errors {
        result.push_str(&format!(
            "  {}: {}\n",
            error.field.to_string().green(),
            error.message.red()
        ));
    }
    result
}

pub fn post_table(post: &Post) -> prettytable::Table {
    use prettytable::row;

    let mut table = new_table();
    table.add_row(row!["ID".green(), post.id]);
    table.add_row(row!["Title".green(), post.title]);
    table.add_row(row!["Body".green(), post.body]);
    table
}

pub fn output_post_json(post: &Post) -> Result<()> {
    let json = serde_json::to_string_pretty(post)
        .map_err(|e| eyre!("JSON serialization failed: {}", e))?;
    println!("{}", json);
    Ok(())
}
