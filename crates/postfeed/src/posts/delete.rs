//! Delete posts

use clap::Args;
use colored::Colorize;

use crate::config::FeedConfig;
use crate::error::Error;
use crate::mutations::MutationCoordinator;
use crate::prelude::{println, *};
use crate::store::PageStore;
use crate::transport::PostsTransport;

/// Delete a post by id
#[derive(Args, Debug, Clone)]
pub struct DeleteOptions {
    /// Post id
    pub id: u64,
}

pub async fn run<T: PostsTransport>(
    options: DeleteOptions,
    config: &FeedConfig,
    transport: T,
) -> Result<()> {
    delete_post_data(options.id, config, transport)
        .await
        .map_err(|e| eyre!("{}", e))?;

    println!(
        "{} {}",
        "Deleted post".green().bold(),
        options.id.to_string().bright_white()
    );
    Ok(())
}

pub async fn delete_post_data<T: PostsTransport>(
    id: u64,
    config: &FeedConfig,
    transport: T,
) -> Result<(), Error> {
    let mut store = PageStore::new(transport.clone(), config.page_size);
    MutationCoordinator::new(transport)
        .delete(id, &mut store)
        .await
}
