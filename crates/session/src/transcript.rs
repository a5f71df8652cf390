//! Accumulated session results and their JSON export.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use voxbridge_protocol::SentenceUpdate;

use crate::error::SessionError;

/// Latest known revision of one sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceRecord {
    pub sentence_id: u64,
    pub text: String,
    pub is_complete: bool,
    /// Provisional tail the recognizer may still revise. Display only.
    #[serde(skip)]
    pub stash: Option<String>,
}

impl SentenceRecord {
    fn from_update(update: &SentenceUpdate) -> Self {
        Self {
            sentence_id: update.sentence_id,
            text: update.text.clone(),
            is_complete: update.is_sentence_end,
            stash: update.stash.as_ref().map(|s| s.text.clone()),
        }
    }

    /// Text followed by the provisional tail, if any.
    pub fn display_text(&self) -> String {
        match &self.stash {
            Some(stash) if !stash.is_empty() => format!("{}{}", self.text, stash),
            _ => self.text.clone(),
        }
    }
}

/// Every sentence received in a session, for the source language and each
/// target language, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct TranscriptBook {
    transcription: Vec<SentenceRecord>,
    translations: BTreeMap<String, Vec<SentenceRecord>>,
}

/// The exported file body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptExport {
    pub source_language: String,
    pub transcription: Vec<SentenceRecord>,
    pub translations: BTreeMap<String, Vec<SentenceRecord>>,
}

impl TranscriptBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a transcription revision. Returns the stored sentence.
    pub fn upsert_transcription(&mut self, update: &SentenceUpdate) -> &SentenceRecord {
        upsert(&mut self.transcription, update)
    }

    /// Records a translation revision for `language`.
    pub fn upsert_translation(&mut self, language: &str, update: &SentenceUpdate) -> &SentenceRecord {
        let sentences = self.translations.entry(language.to_string()).or_default();
        upsert(sentences, update)
    }

    pub fn transcription(&self) -> &[SentenceRecord] {
        &self.transcription
    }

    pub fn translation(&self, language: &str) -> &[SentenceRecord] {
        self.translations
            .get(language)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn translations(&self) -> &BTreeMap<String, Vec<SentenceRecord>> {
        &self.translations
    }

    /// Nothing has been transcribed yet.
    pub fn is_empty(&self) -> bool {
        self.transcription.is_empty()
    }

    pub fn clear(&mut self) {
        self.transcription.clear();
        self.translations.clear();
    }

    pub fn export(&self, source_language: &str) -> TranscriptExport {
        TranscriptExport {
            source_language: source_language.to_string(),
            transcription: self.transcription.clone(),
            translations: self.translations.clone(),
        }
    }

    /// Writes the export as pretty JSON into `dir` and returns the path.
    pub fn write_export(&self, source_language: &str, dir: &Path) -> Result<PathBuf, SessionError> {
        if self.is_empty() {
            return Err(SessionError::NothingToExport);
        }

        let json = serde_json::to_string_pretty(&self.export(source_language))?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(export_filename(Utc::now()));
        std::fs::write(&path, json)?;

        info!(
            path = %path.display(),
            sentences = self.transcription.len(),
            "transcript exported"
        );
        Ok(path)
    }
}

fn upsert<'a>(sentences: &'a mut Vec<SentenceRecord>, update: &SentenceUpdate) -> &'a SentenceRecord {
    let record = SentenceRecord::from_update(update);
    match sentences
        .iter()
        .position(|s| s.sentence_id == update.sentence_id)
    {
        Some(i) => {
            sentences[i] = record;
            &sentences[i]
        }
        None => {
            sentences.push(record);
            &sentences[sentences.len() - 1]
        }
    }
}

/// `translation_2024-05-01T12-30-45-123Z.json` for the given instant.
pub fn export_filename(at: DateTime<Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("translation_{stamp}.json")
}
