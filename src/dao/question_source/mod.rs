mod dir;
#[cfg(feature = "http-sets")]
mod http;
pub mod parse;

use futures::future::BoxFuture;

use crate::{dao::storage::StorageResult, state::game::Question};

pub use self::dir::DirQuestionSource;
#[cfg(feature = "http-sets")]
pub use self::http::HttpQuestionSource;

/// Abstraction over where question corpora come from.
///
/// A source exposes named sets; the admin picks one by name to play a
/// game from. Implementations parse the shared plain-text corpus
/// format (see [`parse`]).
pub trait QuestionSource: Send + Sync {
    /// Names of the sets currently available.
    fn list_sets(&self) -> BoxFuture<'static, StorageResult<Vec<String>>>;
    /// Load and parse one set by name.
    fn fetch_set(&self, name: String) -> BoxFuture<'static, StorageResult<Vec<Question>>>;
}
