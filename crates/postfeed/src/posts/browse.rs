//! Interactive infinite-scroll session over stdin

use clap::Args;
use colored::Colorize;
use postfeed_core::pages::FetchState;
use tokio::io::BufReader;

use super::{format_post_text, format_validation_errors};
use crate::config::FeedConfig;
use crate::prelude::{print, println, *};
use crate::session::{Notice, Session, Update, HELP};
use crate::transport::PostsTransport;

#[derive(Args, Debug, Clone)]
pub struct BrowseOptions {
    /// Initial search term
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Characters of each body to show
    #[arg(long, default_value = "100")]
    pub body_chars: usize,
}

pub async fn run<T: PostsTransport>(
    options: BrowseOptions,
    config: &FeedConfig,
    transport: T,
) -> Result<()> {
    let mut session = Session::new(transport, config.page_size, options.search.clone());
    let stdin = BufReader::new(tokio::io::stdin());
    let body_chars = options.body_chars;

    println!("{}", "Type help for commands.".bright_black());

    session
        .run(stdin, |session, update| {
            print!("{}", render_update(session, &update, body_chars));
        })
        .await
        .map_err(|e| eyre!("Failed to read input: {}", e))?;

    Ok(())
}

/// Text for one update: the redrawn view, then any notices
pub fn render_update<T: PostsTransport>(
    session: &Session<T>,
    update: &Update,
    body_chars: usize,
) -> String {
    let mut result = String::new();

    if update.redraw {
        result.push_str(&render_view(session, body_chars));
    }

    for notice in &update.notices {
        result.push_str(&render_notice(notice));
    }

    result
}

fn render_view<T: PostsTransport>(session: &Session<T>, body_chars: usize) -> String {
    let view = session.view();
    let store = session.store();
    let mut result = String::new();

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    if view.search().is_empty() {
        result.push_str(&format!("{}\n", "POSTS".bright_cyan().bold()));
    } else {
        result.push_str(&format!(
            "{}\n",
            format!("POSTS MATCHING \"{}\"", view.search())
                .bright_cyan()
                .bold()
        ));
    }
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    for post in view.visible() {
        result.push_str(&format_post_text(post, body_chars));
    }

    let at_end_marker = view
        .sentinel()
        .is_some_and(|sentinel| sentinel.post_id().is_none());
    if at_end_marker && !store.state().is_fetching() {
        result.push_str(&format!("{}\n", "No posts to show.".yellow()));
    }

    let footer = match store.state() {
        FetchState::Loading => "Loading...".to_string(),
        FetchState::LoadingMore => "Loading more posts...".to_string(),
        FetchState::Error => "Error fetching posts. Type reload to try again.".to_string(),
        FetchState::Idle if store.has_more() => format!(
            "{} of {} loaded posts shown, press enter for more",
            view.visible().len(),
            store.feed().collection().len()
        ),
        FetchState::Idle => format!(
            "{} of {} posts shown, end of feed",
            view.visible().len(),
            store.feed().collection().len()
        ),
    };
    result.push_str(&format!("{}\n", footer.bright_black()));

    result
}

fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Loading | Notice::LoadingMore => String::new(),
        Notice::EndOfFeed => format!("{}\n", "No more posts.".yellow()),
        Notice::Created(post) => format!("{} {}\n", "Created post".green(), post.id),
        Notice::Updated(post) => format!("{} {}\n", "Updated post".green(), post.id),
        Notice::Deleted(id) => format!("{} {}\n", "Deleted post".green(), id),
        Notice::Invalid(errors) => format!(
            "{}\n{}",
            "Post was not submitted:".red().bold(),
            format_validation_errors(errors)
        ),
        Notice::Failed(err) => format!("{} {}\n", "Error:".red().bold(), err),
        Notice::Help => format!("{HELP}\n"),
        Notice::Message(message) => format!("{}\n", message.yellow()),
    }
}
