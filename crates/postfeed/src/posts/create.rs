//! Create posts

use clap::Args;
use colored::Colorize;
use postfeed_core::post::{Post, PostDraft};

use super::{format_validation_errors, output_post_json, post_table};
use crate::config::FeedConfig;
use crate::error::Error;
use crate::mutations::MutationCoordinator;
use crate::prelude::{eprintln, println, *};
use crate::store::PageStore;
use crate::transport::PostsTransport;

/// Create a new post
#[derive(Args, Debug, Clone)]
pub struct CreateOptions {
    /// Title of the post (at least 3 characters)
    #[arg(long, short = 't')]
    pub title: String,

    /// Body of the post (at least 10 characters)
    #[arg(long, short = 'b')]
    pub body: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run<T: PostsTransport>(
    options: CreateOptions,
    config: &FeedConfig,
    transport: T,
) -> Result<()> {
    let json = options.json;
    let post = match create_post_data(options, config, transport).await {
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
        println!("{}", "Post created".green().bold());
        post_table(&post).printstd();
    }

    Ok(())
}

/// Validate and create a post, returning it with its assigned id
pub async fn create_post_data<T: PostsTransport>(
    options: CreateOptions,
    config: &FeedConfig,
    transport: T,
) -> Result<Post, Error> {
    let mut store = PageStore::new(transport.clone(), config.page_size);
    let coordinator = MutationCoordinator::new(transport);

    coordinator
        .create(PostDraft::new(options.title, options.body), &mut store)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::MemoryTransport;

    fn options(title: &str, body: &str) -> CreateOptions {
        CreateOptions {
            title: title.to_string(),
            body: body.to_string(),
            json: false,
        }
    }

    #[tokio::test]
    async fn test_create_post_data() {
        let transport = MemoryTransport::with_posts(100);

        let post = create_post_data(
            options("Hello there", "A body that is long enough"),
            &FeedConfig::default(),
            transport.clone(),
        )
        .await
        .unwrap();

        assert_eq!(post.id, 101);
        assert_eq!(transport.server_posts().len(), 101);
    }

    #[tokio::test]
    async fn test_create_post_data_rejects_invalid_input() {
        let transport = MemoryTransport::with_posts(1);

        let err = create_post_data(options("Hi", "short"), &FeedConfig::default(), transport.clone())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(transport.requests().is_empty());
    }
}
