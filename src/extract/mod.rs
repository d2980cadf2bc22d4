use crate::gemini_api::{Attachment, TextGenerator};
use crate::ledger::{HistoryRecord, JournalEntry};

mod normalize;
mod payload;
mod prompt;

pub use normalize::{normalize, NormalizedDocument};

/// Model for tabular statements. A single failure yields an empty result,
/// there is no fallback on this path.
pub const TABULAR_MODEL: &str = "gemini-2.0-flash-exp";

/// Models for image/document extraction, tried in order. The first success
/// short-circuits; extend the list to add further fallbacks without touching
/// call sites.
pub const DOCUMENT_MODELS: &[&str] = &["gemini-2.0-flash-exp", "gemini-1.5-flash"];

/// Turns one normalized document into candidate journal entries, biased by
/// the semantic reference list.
///
/// Never fails: extraction or parse failures degrade this document to zero
/// entries so a batch keeps going per-document.
pub async fn extract_entries(
    generator: &impl TextGenerator,
    document: &NormalizedDocument,
    history: &[HistoryRecord],
) -> Vec<JournalEntry> {
    match document {
        NormalizedDocument::Tabular(text) => extract_from_tabular(generator, text, history).await,
        NormalizedDocument::Binary { mime_type, bytes } => {
            extract_from_binary(generator, mime_type, bytes, history).await
        }
    }
}

async fn extract_from_tabular(
    generator: &impl TextGenerator,
    text: &str,
    history: &[HistoryRecord],
) -> Vec<JournalEntry> {
    log::info!("Analyzing tabular statement with semantic reference...");
    let prompt = prompt::tabular_prompt(text, history);
    match generator.generate(TABULAR_MODEL, &prompt, None).await {
        Ok(raw) => match payload::parse_entries(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("Tabular extraction produced an unusable payload: {err:#}");
                Vec::new()
            }
        },
        Err(err) => {
            log::warn!("Tabular extraction failed: {err:#}");
            Vec::new()
        }
    }
}

async fn extract_from_binary(
    generator: &impl TextGenerator,
    mime_type: &str,
    bytes: &[u8],
    history: &[HistoryRecord],
) -> Vec<JournalEntry> {
    log::info!("Analyzing {mime_type} document with semantic reference...");
    let prompt = prompt::document_prompt(history);
    let attachment = Attachment {
        mime_type,
        data: bytes,
    };
    for &model in DOCUMENT_MODELS {
        match generator.generate(model, &prompt, Some(&attachment)).await {
            Ok(raw) => match payload::parse_entries(&raw) {
                Ok(entries) => return entries,
                Err(err) => log::warn!("Model {model} produced an unusable payload: {err:#}"),
            },
            Err(err) => log::warn!("Model {model} failed: {err:#}"),
        }
    }
    log::warn!("All extraction models failed for this document");
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Generator that replays scripted responses and records what was asked.
    struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<String>>>,
        calls: Mutex<Vec<(String, bool)>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, bool)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            model: &str,
            _prompt: &str,
            attachment: Option<&Attachment<'_>>,
        ) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), attachment.is_some()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow!("no scripted response left")))
        }
    }

    const PAYLOAD: &str = r#"```json
[{"date": "2024-06-01", "debit_account": "消耗品費", "credit_account": "未払金",
  "amount": 1980, "counterparty": "Amazon", "memo": "備品"}]
```"#;

    fn image_document() -> NormalizedDocument {
        NormalizedDocument::Binary {
            mime_type: "image/jpeg".to_string(),
            bytes: vec![0xff, 0xd8],
        }
    }

    #[tokio::test]
    async fn tabular_path_uses_a_single_model_without_attachment() {
        let generator = ScriptedGenerator::new(vec![Ok(PAYLOAD.to_string())]);
        let document = NormalizedDocument::Tabular("利用日,金額\n2024-06-01,1980".to_string());
        let entries = extract_entries(&generator, &document, &[]).await;
        assert_eq!(1, entries.len());
        assert_eq!("Amazon", entries[0].counterparty);
        assert_eq!(vec![(TABULAR_MODEL.to_string(), false)], generator.calls());
    }

    #[tokio::test]
    async fn tabular_failure_yields_empty_without_fallback() {
        let generator = ScriptedGenerator::new(vec![Err(anyhow!("quota exceeded"))]);
        let document = NormalizedDocument::Tabular("a,b".to_string());
        let entries = extract_entries(&generator, &document, &[]).await;
        assert!(entries.is_empty());
        assert_eq!(1, generator.calls().len());
    }

    #[tokio::test]
    async fn document_path_falls_back_to_the_secondary_model() {
        let generator = ScriptedGenerator::new(vec![
            Err(anyhow!("primary model unavailable")),
            Ok(PAYLOAD.to_string()),
        ]);
        let entries = extract_entries(&generator, &image_document(), &[]).await;
        assert_eq!(1, entries.len());
        assert_eq!(
            vec![
                ("gemini-2.0-flash-exp".to_string(), true),
                ("gemini-1.5-flash".to_string(), true),
            ],
            generator.calls()
        );
    }

    #[tokio::test]
    async fn unparseable_payload_also_triggers_the_fallback() {
        let generator = ScriptedGenerator::new(vec![
            Ok("すみません、読み取れませんでした。".to_string()),
            Ok(PAYLOAD.to_string()),
        ]);
        let entries = extract_entries(&generator, &image_document(), &[]).await;
        assert_eq!(1, entries.len());
        assert_eq!(2, generator.calls().len());
    }

    #[tokio::test]
    async fn exhausted_fallback_list_yields_empty() {
        let generator = ScriptedGenerator::new(vec![
            Err(anyhow!("primary down")),
            Err(anyhow!("secondary down")),
        ]);
        let entries = extract_entries(&generator, &image_document(), &[]).await;
        assert!(entries.is_empty());
        assert_eq!(DOCUMENT_MODELS.len(), generator.calls().len());
    }
}
