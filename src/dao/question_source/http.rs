use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};

use crate::{
    dao::{
        question_source::{QuestionSource, parse},
        storage::{StorageError, StorageResult},
    },
    state::game::Question,
};

/// Question sets served by a remote corpus service.
///
/// `GET {base}/sets` lists set names as a JSON array; `GET
/// {base}/sets/{name}` returns the plain-text corpus for one set.
#[derive(Clone)]
pub struct HttpQuestionSource {
    client: Client,
    base_url: Arc<str>,
}

impl HttpQuestionSource {
    /// Build a source for the given base URL.
    pub fn new(base_url: &str) -> StorageResult<Self> {
        let client = Client::builder().build().map_err(|source| {
            StorageError::unavailable("cannot build http client".into(), source)
        })?;
        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }
}

impl QuestionSource for HttpQuestionSource {
    fn list_sets(&self) -> BoxFuture<'static, StorageResult<Vec<String>>> {
        let client = self.client.clone();
        let url = format!("{}/sets", self.base_url);
        Box::pin(async move {
            let response = client
                .get(&url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|source| {
                    StorageError::unavailable(format!("cannot list question sets at {url}"), source)
                })?;
            response.json::<Vec<String>>().await.map_err(|source| {
                StorageError::unavailable("cannot decode question set listing".into(), source)
            })
        })
    }

    fn fetch_set(&self, name: String) -> BoxFuture<'static, StorageResult<Vec<Question>>> {
        let client = self.client.clone();
        let url = format!("{}/sets/{name}", self.base_url);
        Box::pin(async move {
            let response = client.get(&url).send().await.map_err(|source| {
                StorageError::unavailable(format!("cannot fetch question set {name}"), source)
            })?;
            if response.status() == StatusCode::NOT_FOUND {
                return Err(StorageError::Missing(name));
            }
            let text = response
                .error_for_status()
                .map_err(|source| {
                    StorageError::unavailable(format!("question set {name} fetch failed"), source)
                })?
                .text()
                .await
                .map_err(|source| {
                    StorageError::unavailable(format!("cannot read question set {name}"), source)
                })?;
            let questions = parse::parse_corpus(&text);
            if questions.is_empty() {
                return Err(StorageError::InvalidPayload(format!(
                    "question set '{name}' holds no usable questions"
                )));
            }
            Ok(questions)
        })
    }
}
