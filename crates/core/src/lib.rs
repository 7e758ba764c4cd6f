//! Core library for postfeed
//!
//! This crate implements the **Functional Core** of the postfeed application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`postfeed_core`** (this crate): pagination math, cache edits, filtering
//!   and validation, with zero I/O
//! - **`postfeed`**: HTTP transport, the interactive session and the CLI
//!   (the Imperative Shell)
//!
//! Everything here is deterministic and tested with fixture data only.
//!
//! # Module Organization
//!
//! - [`post`]: the post model and pre-submit validation
//! - [`pages`]: the page cache, fetch state machine and id-keyed local edits
//! - [`view`]: flattening, search filtering and the pagination trigger
//! - [`queries`]: REST paths and query parameters
//!
//! # Example Usage
//!
//! ```rust
//! use postfeed_core::pages::{FeedState, Mutation};
//! use postfeed_core::post::Post;
//! use postfeed_core::view::visible_posts;
//!
//! let mut feed = FeedState::new(10);
//! let request = feed.begin_next_page().unwrap();
//! feed.finish_page(
//!     request,
//!     vec![Post { id: 2, title: "Banana".into(), body: "yellow fruit".into() }],
//! );
//!
//! feed.apply(Mutation::Created(Post {
//!     id: 1,
//!     title: "Apple pie".into(),
//!     body: "with cinnamon".into(),
//! }));
//!
//! let shown = visible_posts(feed.collection().pages(), "apple");
//! assert_eq!(shown.len(), 1);
//! assert_eq!(shown[0].id, 1);
//! ```

pub mod pages;
pub mod post;
pub mod queries;
pub mod view;
