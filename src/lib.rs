//! # Quote Desk
//!
//! A retrieval-augmented chatbot that answers price and delivery questions
//! for a product from a set of plain-text documents.
//!
//! Documents are split into chunks, embedded, and held in an in-memory
//! index. Each question retrieves the nearest chunks, pulls price and
//! delivery facts out of them with fixed patterns, and answers with either
//! the exact quote or a linear estimate from the closest quoted quantity.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌─────────────┐
//! │  Loader  │──▶│  Chunk +   │──▶│  Embedding  │
//! │ .txt/dir │   │  Embed     │   │  Index      │
//! └──────────┘   └────────────┘   └──────┬──────┘
//!                                        │ top-k
//!                                        ▼
//!                 ┌───────────┐   ┌─────────────┐
//!                 │  Answer   │◀──│  Extract    │
//!                 │  $ / days │   │  facts      │
//!                 └───────────┘   └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! qd ask --load quotes.txt "What is the price for 150 units of Product Y?"
//! qd chat --load quotes/
//! qd serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`loader`] | Path resolution and file reading |
//! | [`chunk`] | Text chunking |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`index`] | In-memory nearest-neighbour index |
//! | [`extract`] | Price and delivery fact extraction |
//! | [`answer`] | Exact and estimated answers |
//! | [`session`] | Load and chat operations |
//! | [`server`] | HTTP front end |
//! | [`error`] | Error kinds and user-facing messages |

pub mod answer;
pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod index;
pub mod loader;
pub mod models;
pub mod server;
pub mod session;
