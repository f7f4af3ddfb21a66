use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use validator::Validate;

use crate::config::CaptureSettings;
use crate::error::CaptureError;
use crate::models::response::{answer_filename_field, answer_text_field};
use crate::models::{FileRef, FreeTextFieldConfig, QtData, QuestionConfig, SubmittedAnswer};
use crate::services::host::{ConfigLookup, ContentStore, UsageContextResolver};
use crate::utils::retry::{retry_async_with_config, RetryConfig};

/// Pulls files and free-text answers out of a submitted step.
pub struct ResponseCapture {
    content_store: Arc<dyn ContentStore>,
    contexts: Arc<dyn UsageContextResolver>,
    config_lookup: Arc<dyn ConfigLookup>,
    settings: CaptureSettings,
}

impl ResponseCapture {
    pub fn new(
        content_store: Arc<dyn ContentStore>,
        contexts: Arc<dyn UsageContextResolver>,
        config_lookup: Arc<dyn ConfigLookup>,
        settings: CaptureSettings,
    ) -> Self {
        Self {
            content_store,
            contexts,
            config_lookup,
            settings,
        }
    }

    /// Files of the file field.
    ///
    /// A fresh upload is used as is. A placeholder means we are regrading and
    /// the files are re-read from the content store under the usage's
    /// context. An empty result is an error when `required` is set.
    pub async fn capture_files(
        &self,
        field: &str,
        answer: Option<&SubmittedAnswer>,
        usage_id: &str,
        required: bool,
    ) -> Result<Vec<FileRef>, CaptureError> {
        let files = match answer {
            Some(SubmittedAnswer::Fresh(collection)) => collection.files.clone(),
            Some(SubmittedAnswer::Placeholder { field: stored }) => {
                self.refetch_stored_files(stored, usage_id).await?
            }
            None => Vec::new(),
        };

        if files.is_empty() && required {
            return Err(CaptureError::MissingFiles {
                field: field.to_string(),
            });
        }

        Ok(files)
    }

    async fn refetch_stored_files(
        &self,
        field: &str,
        usage_id: &str,
    ) -> Result<Vec<FileRef>, CaptureError> {
        let context_id = self.contexts.context_id(usage_id).await.map_err(|e| {
            CaptureError::ContextResolution {
                usage_id: usage_id.to_string(),
                source: e.into(),
            }
        })?;

        let files = retry_async_with_config(RetryConfig::from(&self.settings), || {
            self.content_store.resolve_files(field, context_id)
        })
        .await
        .map_err(|e| CaptureError::ContentStore {
            field: field.to_string(),
            context_id,
            source: e.into(),
        })?;

        tracing::info!(
            "Re-fetched {} stored files for regrade: usage={}, field={}, context={}",
            files.len(),
            usage_id,
            field,
            context_id
        );

        Ok(files)
    }

    /// Free-text answers keyed by the filename they are graded under.
    ///
    /// Empty fields are skipped. Two fields resolving to the same filename
    /// collide and the higher index wins.
    pub async fn capture_free_text(
        &self,
        response: &QtData,
        config: &QuestionConfig,
    ) -> Result<BTreeMap<String, String>, CaptureError> {
        self.check_config(config)?;

        let answered: Vec<(usize, &str)> = (0..config.fts_max_num_fields)
            .filter_map(|index| {
                response
                    .text(&answer_text_field(index))
                    .filter(|text| !text.is_empty())
                    .map(|text| (index, text))
            })
            .collect();

        let rows = try_join_all(
            answered
                .iter()
                .map(|(index, _)| self.lookup_field(&config.question_id, *index)),
        )
        .await?;

        let mut answers = BTreeMap::new();
        for ((index, text), row) in answered.into_iter().zip(rows) {
            let submitted = response
                .text(&answer_filename_field(index))
                .unwrap_or_default();
            let filename = resolve_filename(
                index,
                submitted,
                row.as_ref(),
                config.fts_auto_generate_filenames,
            )?;

            if answers.insert(filename.clone(), text.to_string()).is_some() {
                tracing::debug!(
                    "Free-text field {} overwrites earlier answer for {}",
                    index,
                    filename
                );
            }
        }

        Ok(answers)
    }

    async fn lookup_field(
        &self,
        question_id: &str,
        index: usize,
    ) -> Result<Option<FreeTextFieldConfig>, CaptureError> {
        self.config_lookup
            .get(question_id, index)
            .await
            .map_err(|e| CaptureError::ConfigLookup {
                question_id: question_id.to_string(),
                field_index: index,
                source: e.into(),
            })
    }

    fn check_config(&self, config: &QuestionConfig) -> Result<(), CaptureError> {
        config
            .validate()
            .map_err(|e| CaptureError::InvalidConfig(e.to_string()))?;

        if config.fts_max_num_fields > self.settings.max_free_text_fields {
            return Err(CaptureError::InvalidConfig(format!(
                "question {} declares {} free-text fields, at most {} allowed",
                config.question_id, config.fts_max_num_fields, self.settings.max_free_text_fields
            )));
        }

        Ok(())
    }
}

/// Filename for free-text field `index`.
///
/// - configured preset: the configured name;
/// - configured without preset: the learner's name, generated if empty;
/// - not configured: generated when `auto_generate` is on or the learner's
///   name is empty, otherwise the learner's name.
pub fn resolve_filename(
    index: usize,
    submitted: &str,
    row: Option<&FreeTextFieldConfig>,
    auto_generate: bool,
) -> Result<String, CaptureError> {
    match row {
        Some(row) if row.preset_filename => match row.filename.as_deref() {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(CaptureError::InvalidConfig(format!(
                "free-text field {} has a preset filename but none is configured",
                index
            ))),
        },
        Some(_) if submitted.is_empty() => Ok(generated_filename(index)),
        Some(_) => Ok(submitted.to_string()),
        None if auto_generate || submitted.is_empty() => Ok(generated_filename(index)),
        None => Ok(submitted.to_string()),
    }
}

pub fn generated_filename(index: usize) -> String {
    format!("File{}.txt", index + 1)
}
