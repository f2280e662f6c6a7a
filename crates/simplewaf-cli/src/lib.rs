//! # SimpleWAF CLI
//!
//! Account maintenance used by the `simplewaf-cli` binary.
//!
//! The functions work against any [`simplewaf_db::UserRepository`], so the
//! binary runs them on PostgreSQL while tests use the in-memory store.
//!
//! ```ignore
//! use simplewaf_cli::accounts::{NewAccount, create_account};
//!
//! let repos = simplewaf_db::Repositories::postgres(pool);
//! create_account(repos.users.as_ref(), NewAccount { .. }).await?;
//! ```

pub mod accounts;
