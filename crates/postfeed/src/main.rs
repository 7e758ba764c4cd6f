use crate::prelude::*;
use clap::Parser;

mod config;
mod error;
mod mutations;
mod posts;
mod prelude;
mod session;
mod store;
mod transport;
mod view;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Browse, create, edit and delete posts from a paginated REST collection"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Base URL of the REST backend (overrides POSTFEED_BASE_URL)
    #[clap(long, global = true)]
    base_url: Option<String>,

    /// Posts requested per page (overrides POSTFEED_PAGE_SIZE)
    #[clap(long, global = true)]
    page_size: Option<usize>,

    /// Whether to display additional information.
    #[clap(long, env = "POSTFEED_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Posts collection operations
    Posts(crate::posts::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Posts(sub_app) => crate::posts::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
