//! Interactive browse session
//!
//! One task owns the cache. User input and transport completions are handled
//! one at a time from a single `select!` loop, so the cache needs no lock.
//! Requests stay in flight concurrently and may finish in any order.

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use postfeed_core::pages::{Mutation, PageOutcome};
use postfeed_core::post::{merge_edit, Post, PostDraft, ValidationErrors};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;

use crate::error::Error;
use crate::mutations::MutationCoordinator;
use crate::store::{PageCompletion, PageStore};
use crate::transport::{PostsTransport, TransportFuture};
use crate::view::ViewController;

/// A line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scrolled past the last rendered post
    Scroll,
    /// Confirmed a search term; empty clears it
    Search(String),
    Create(PostDraft),
    Edit {
        id: u64,
        title: Option<String>,
        body: Option<String>,
    },
    Delete(u64),
    Reload,
    Help,
    Quit,
}

pub const HELP: &str = "\
<enter> | more            load the next page
/<term>                   search titles (/ alone clears)
new <title> | <body>      create a post
edit <id> <title> | <body> edit a post (leave a side empty to keep it)
rm <id>                   delete a post
reload                    refetch from the start
help                      show this help
quit                      leave";

fn parse_id(raw: &str) -> Result<u64, String> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| format!("Invalid post id: {}", raw.trim()))
}

fn split_fields(raw: &str) -> (String, String) {
    match raw.split_once('|') {
        Some((title, body)) => (title.trim().to_string(), body.trim().to_string()),
        None => (raw.trim().to_string(), String::new()),
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Parse one input line into a [`Command`]
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();

    if let Some(term) = line.strip_prefix('/') {
        return Ok(Command::Search(term.trim().to_string()));
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "" | "more" => Ok(Command::Scroll),
        "new" => {
            let (title, body) = split_fields(rest);
            Ok(Command::Create(PostDraft::new(title, body)))
        }
        "edit" => {
            let (id, fields) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let (title, body) = split_fields(fields);
            Ok(Command::Edit {
                id: parse_id(id)?,
                title: non_empty(title),
                body: non_empty(body),
            })
        }
        "rm" | "delete" => Ok(Command::Delete(parse_id(rest)?)),
        "reload" => Ok(Command::Reload),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("Unknown command: {other} (try help)")),
    }
}

/// Something the front end should tell the user
#[derive(Debug)]
pub enum Notice {
    Loading,
    LoadingMore,
    EndOfFeed,
    Created(Post),
    Updated(Post),
    Deleted(u64),
    /// Field errors shown next to the form, nothing was sent
    Invalid(ValidationErrors),
    Failed(Error),
    Help,
    Message(String),
}

/// Result of handling one input or completion
#[derive(Debug, Default)]
pub struct Update {
    /// The derived view changed and should be redrawn
    pub redraw: bool,
    pub notices: Vec<Notice>,
    pub quit: bool,
}

impl Update {
    fn notice(notice: Notice) -> Self {
        Self {
            notices: vec![notice],
            ..Default::default()
        }
    }
}

enum Completion {
    Page(PageCompletion),
    Mutation(Result<Mutation, Error>),
}

pub struct Session<T: PostsTransport> {
    store: PageStore<T>,
    mutations: MutationCoordinator<T>,
    view: ViewController,
    pending: FuturesUnordered<BoxFuture<'static, Completion>>,
}

impl<T: PostsTransport> Session<T> {
    pub fn new(transport: T, page_size: usize, search: impl Into<String>) -> Self {
        Self {
            store: PageStore::new(transport.clone(), page_size),
            mutations: MutationCoordinator::new(transport),
            view: ViewController::new(search),
            pending: FuturesUnordered::new(),
        }
    }

    pub fn store(&self) -> &PageStore<T> {
        &self.store
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    /// Number of requests still in flight
    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    fn track_page(&mut self, fetch: Option<BoxFuture<'static, PageCompletion>>) -> bool {
        match fetch {
            Some(fetch) => {
                self.pending.push(fetch.map(Completion::Page).boxed());
                true
            }
            None => false,
        }
    }

    fn track_mutation(&mut self, request: Result<TransportFuture<Mutation>, Error>) -> Update {
        match request {
            Ok(request) => {
                self.pending.push(request.map(Completion::Mutation).boxed());
                Update::default()
            }
            Err(Error::Validation(errors)) => Update::notice(Notice::Invalid(errors)),
            Err(err) => Update::notice(Notice::Failed(err)),
        }
    }

    /// Mount the view and request the first page
    pub fn start(&mut self) -> Update {
        let fetch = self.store.request_next_page();
        self.track_page(fetch);
        self.view.recompute(&self.store);

        Update {
            redraw: true,
            notices: vec![Notice::Loading],
            quit: false,
        }
    }

    /// Handle one user command
    pub fn handle(&mut self, command: Command) -> Update {
        match command {
            Command::Scroll => {
                let fetch = self.view.on_last_item_visible(&mut self.store);
                if self.track_page(fetch) {
                    Update::notice(Notice::LoadingMore)
                } else if !self.store.has_more() {
                    Update::notice(Notice::EndOfFeed)
                } else {
                    Update::default()
                }
            }
            Command::Search(term) => {
                log::debug!("search committed: {term:?}");
                let fetch = self.view.commit_search(term, &mut self.store);
                self.track_page(fetch);
                self.view.recompute(&self.store);
                Update {
                    redraw: true,
                    notices: vec![Notice::Loading],
                    quit: false,
                }
            }
            Command::Create(draft) => {
                let request = self.mutations.submit_create(draft);
                self.track_mutation(request)
            }
            Command::Edit { id, title, body } => {
                let request = match self.store.feed().collection().find(id) {
                    Some(current) => self
                        .mutations
                        .submit_update(merge_edit(current, title, body)),
                    None => Ok(self.mutations.submit_remote_edit(id, title, body)),
                };
                self.track_mutation(request)
            }
            Command::Delete(id) => {
                let request = self.mutations.submit_delete(id);
                self.track_mutation(Ok(request))
            }
            Command::Reload => {
                let fetch = self.store.refetch();
                self.track_page(fetch);
                self.view.recompute(&self.store);
                Update {
                    redraw: true,
                    notices: vec![Notice::Loading],
                    quit: false,
                }
            }
            Command::Help => Update::notice(Notice::Help),
            Command::Quit => Update {
                quit: true,
                ..Default::default()
            },
        }
    }

    fn complete(&mut self, completion: Completion) -> Update {
        if !self.view.is_mounted() {
            return Update::default();
        }

        match completion {
            Completion::Page(page) => match self.store.complete_page(page) {
                Ok(PageOutcome::Appended { .. }) => {
                    self.view.recompute(&self.store);
                    Update {
                        redraw: true,
                        ..Default::default()
                    }
                }
                Ok(PageOutcome::Stale) => Update::default(),
                Err(err) => Update::notice(Notice::Failed(err)),
            },
            Completion::Mutation(Ok(mutation)) => {
                let notice = match &mutation {
                    Mutation::Created(post) => Notice::Created(post.clone()),
                    Mutation::Updated(post) => Notice::Updated(post.clone()),
                    Mutation::Deleted(id) => Notice::Deleted(*id),
                };
                self.store.apply(mutation);
                self.view.recompute(&self.store);
                Update {
                    redraw: true,
                    notices: vec![notice],
                    quit: false,
                }
            }
            Completion::Mutation(Err(Error::Validation(errors))) => {
                Update::notice(Notice::Invalid(errors))
            }
            Completion::Mutation(Err(err)) => Update::notice(Notice::Failed(err)),
        }
    }

    /// Wait for the next in-flight request and fold it in
    pub async fn next_completion(&mut self) -> Option<Update> {
        let completion = self.pending.next().await?;
        Some(self.complete(completion))
    }

    /// Fold in every in-flight request
    pub async fn settle(&mut self) -> Vec<Update> {
        let mut updates = Vec::new();
        while let Some(update) = self.next_completion().await {
            updates.push(update);
        }
        updates
    }

    /// Unmount the view
    ///
    /// Requests still in flight run to completion on their own task but their
    /// results are never applied. The handle resolves to how many finished.
    pub fn teardown(&mut self) -> JoinHandle<usize> {
        self.view.teardown();
        let in_flight = self.in_flight();
        if in_flight > 0 {
            log::debug!("letting {in_flight} in-flight requests finish unapplied");
        }
        let pending = std::mem::take(&mut self.pending);
        tokio::spawn(pending.count())
    }

    /// Drive the session from an input stream until it ends or the user quits
    ///
    /// `render` is called with every update, with the session available to
    /// read the current view.
    pub async fn run<R, F>(&mut self, input: R, mut render: F) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        F: FnMut(&Session<T>, Update),
    {
        let mut lines = input.lines();

        let update = self.start();
        render(self, update);

        let result = loop {
            tokio::select! {
                line = lines.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => break Ok(()),
                        Err(err) => break Err(err),
                    };
                    let update = match parse_command(&line) {
                        Ok(command) => self.handle(command),
                        Err(message) => Update::notice(Notice::Message(message)),
                    };
                    let quit = update.quit;
                    render(self, update);
                    if quit {
                        break Ok(());
                    }
                }
                Some(completion) = self.pending.next(), if !self.pending.is_empty() => {
                    let update = self.complete(completion);
                    render(self, update);
                }
            }
        };

        match self.teardown().await {
            Ok(finished) => log::debug!("{finished} requests finished after teardown"),
            Err(err) => log::warn!("in-flight requests were interrupted: {err}"),
        }
        result
    }
}
