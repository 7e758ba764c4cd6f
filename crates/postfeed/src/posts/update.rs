//! Update posts

use clap::Args;
use colored::Colorize;
use postfeed_core::post::{merge_edit, Post};

use super::{format_validation_errors, output_post_json, post_table};
use crate::config::FeedConfig;
use crate::error::Error;
use crate::mutations::MutationCoordinator;
use crate::prelude::{eprintln, println, *};
use crate::store::PageStore;
use crate::transport::PostsTransport;

/// Update a post's title and/or body
#[derive(Args, Debug, Clone)]
pub struct UpdateOptions {
    /// Post id
    pub id: u64,

    /// New title
    #[arg(long, short = 't')]
    pub title: Option<String>,

    /// New body
    #[arg(long, short = 'b')]
    pub body: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run<T: PostsTransport>(
    options: UpdateOptions,
    config: &FeedConfig,
    transport: T,
) -> Result<()> {
    if options.title.is_none() && options.body.is_none() {
        return Err(eyre!(
            "At least one field must be provided for update (--title or --body)"
        ));
    }

    let json = options.json;
    let post = match update_post_data(options, config, transport).await {
        Ok(post) => post,
        Err(Error::Validation(errors)) => {
            eprintln!("{}", "Post was not submitted:".red().bold());
            eprintln!("{}", format_validation_errors(&errors));
            return Err(eyre!("Invalid post"));
        }
        Err(err) => return Err(eyre!("{}", err)),
    };

    if json {
        output_post_json(&post)?;
    } else {
        println!("{}", "Post updated".green().bold());
        post_table(&post).printstd();
    }

    Ok(())
}

/// Fetch the current post, merge the edits, validate and send the full post
pub async fn update_post_data<T: PostsTransport>(
    options: UpdateOptions,
    config: &FeedConfig,
    transport: T,
) -> Result<Post, Error> {
    let current = transport.fetch_post(options.id).await?;
    let edited = merge_edit(&current, options.title, options.body);

    let mut store = PageStore::new(transport.clone(), config.page_size);
    let coordinator = MutationCoordinator::new(transport);
    coordinator.update(edited, &mut store).await
}
