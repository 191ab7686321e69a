use std::{io, path::PathBuf};

use futures::future::BoxFuture;
use tokio::fs;

use crate::{
    dao::{
        question_source::{QuestionSource, parse},
        storage::{StorageError, StorageResult},
    },
    state::game::Question,
};

/// Question sets stored as `<name>.txt` files in a local directory.
#[derive(Clone)]
pub struct DirQuestionSource {
    dir: PathBuf,
}

impl DirQuestionSource {
    /// Serve sets from the given directory; it is read lazily, so the
    /// directory may be populated while the server runs.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl QuestionSource for DirQuestionSource {
    fn list_sets(&self) -> BoxFuture<'static, StorageResult<Vec<String>>> {
        let dir = self.dir.clone();
        Box::pin(async move {
            let unavailable = |source: io::Error| {
                StorageError::unavailable(
                    format!("cannot read question directory {}", dir.display()),
                    source,
                )
            };
            let mut entries = fs::read_dir(&dir).await.map_err(unavailable)?;
            let mut sets = Vec::new();
            while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) == Some("txt")
                    && let Some(stem) = path.file_stem().and_then(|stem| stem.to_str())
                {
                    sets.push(stem.to_owned());
                }
            }
            sets.sort();
            Ok(sets)
        })
    }

    fn fetch_set(&self, name: String) -> BoxFuture<'static, StorageResult<Vec<Question>>> {
        let dir = self.dir.clone();
        Box::pin(async move {
            // Set names map to file stems, never to paths.
            if name.contains(['/', '\\']) || name.contains("..") {
                return Err(StorageError::Missing(name));
            }
            let path = dir.join(format!("{name}.txt"));
            let text = fs::read_to_string(&path).await.map_err(|source| {
                if source.kind() == io::ErrorKind::NotFound {
                    StorageError::Missing(name.clone())
                } else {
                    StorageError::unavailable(
                        format!("cannot read question set {}", path.display()),
                        source,
                    )
                }
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

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::DirQuestionSource;
    use crate::dao::{question_source::QuestionSource, storage::StorageError};

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("question-sets-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn lists_txt_files_by_stem() {
        let dir = scratch_dir();
        std::fs::write(dir.join("history.txt"), "").unwrap();
        std::fs::write(dir.join("geography.txt"), "").unwrap();
        std::fs::write(dir.join("notes.md"), "").unwrap();

        let source = DirQuestionSource::new(&dir);
        let sets = source.list_sets().await.unwrap();
        assert_eq!(sets, vec!["geography", "history"]);
    }

    #[tokio::test]
    async fn fetches_and_parses_a_set() {
        let dir = scratch_dir();
        std::fs::write(dir.join("history.txt"), "Q?\nA\nA\nB\nC\nD\n").unwrap();

        let source = DirQuestionSource::new(&dir);
        let questions = source.fetch_set("history".into()).await.unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer, "A");
    }

    #[tokio::test]
    async fn missing_sets_and_path_escapes_are_rejected() {
        let dir = scratch_dir();
        let source = DirQuestionSource::new(&dir);
        assert!(matches!(
            source.fetch_set("nope".into()).await,
            Err(StorageError::Missing(_))
        ));
        assert!(matches!(
            source.fetch_set("../etc/passwd".into()).await,
            Err(StorageError::Missing(_))
        ));
    }
}
