//! On-disk artifact pair: the fitted vectorizer and the fitted model.
//!
//! Each file has a small fixed header followed by a bincode payload:
//!
//! ```text
//! +-------+-------------+-------------+-----------------+
//! | magic | version u32 | crc32 u32   | bincode payload |
//! | 4 B   | LE          | LE, payload |                 |
//! +-------+-------------+-------------+-----------------+
//! ```
//!
//! Both files are staged under unique temporary names in the target
//! directory, synced, and only then renamed into place, so a reader never
//! observes a partially written artifact. The two renames are not one atomic
//! step: a reader racing a save may briefly see the new vectorizer next to
//! the old model, which loading rejects unless the dimensions happen to agree.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, UrlGuardError};
use crate::ml::naive_bayes::MultinomialNaiveBayes;
use crate::ml::tfidf::{TfIdfVectorizer, VectorizerState};

/// File name of the vectorizer artifact.
pub const VECTORIZER_FILE: &str = "vectorizer.bin";

/// File name of the model artifact.
pub const MODEL_FILE: &str = "model.bin";

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

const VECTORIZER_MAGIC: [u8; 4] = *b"UGVZ";
const MODEL_MAGIC: [u8; 4] = *b"UGNB";
const HEADER_LEN: usize = 12;

/// Facts about the training run that produced a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub trained_at: DateTime<Utc>,
    pub n_train: usize,
    pub n_test: usize,
    pub test_accuracy: f64,
    /// Best mean cross-validation accuracy; `None` if CV was skipped.
    pub cv_score: Option<f64>,
}

/// A fitted model together with its training metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model: MultinomialNaiveBayes,
    pub metadata: ModelMetadata,
}

/// A vectorizer and the model trained against its vocabulary.
#[derive(Debug)]
pub struct ArtifactPair {
    vectorizer: TfIdfVectorizer,
    model: ModelArtifact,
}

impl ArtifactPair {
    /// Pair a vectorizer with a model, checking that their dimensions agree.
    pub fn new(vectorizer: TfIdfVectorizer, model: ModelArtifact) -> Result<Self> {
        check_pair(&vectorizer, &model.model)?;
        Ok(ArtifactPair { vectorizer, model })
    }

    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn model(&self) -> &ModelArtifact {
        &self.model
    }

    pub fn into_parts(self) -> (TfIdfVectorizer, ModelArtifact) {
        (self.vectorizer, self.model)
    }

    /// Write both artifacts into `dir`, creating it if needed.
    ///
    /// On error the canonical files are left as they were: staged files are
    /// removed, and if the model cannot be renamed into place the vectorizer
    /// that was published before this call is put back.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| {
            UrlGuardError::serialization(format!(
                "failed to create artifact directory {}: {e}",
                dir.display()
            ))
        })?;

        let vectorizer_bytes = encode(VECTORIZER_MAGIC, &self.vectorizer.to_state())?;
        let model_bytes = encode(MODEL_MAGIC, &self.model)?;

        let staged_vectorizer = stage(dir, VECTORIZER_FILE, &vectorizer_bytes)?;
        let staged_model = match stage(dir, MODEL_FILE, &model_bytes) {
            Ok(path) => path,
            Err(e) => {
                let _ = fs::remove_file(&staged_vectorizer);
                return Err(e);
            }
        };

        let vectorizer_path = dir.join(VECTORIZER_FILE);
        let backup = keep_previous(&vectorizer_path).inspect_err(|_| {
            let _ = fs::remove_file(&staged_vectorizer);
            let _ = fs::remove_file(&staged_model);
        })?;

        let published = publish(&staged_vectorizer, &vectorizer_path).and_then(|_| {
            publish(&staged_model, &dir.join(MODEL_FILE))
                .inspect_err(|_| restore_previous(backup.as_deref(), &vectorizer_path))
        });
        for leftover in [Some(&staged_vectorizer), Some(&staged_model), backup.as_ref()]
            .into_iter()
            .flatten()
        {
            let _ = fs::remove_file(leftover);
        }
        published?;

        info!(
            "saved artifacts to {} ({} vocabulary terms)",
            dir.display(),
            self.vectorizer.vocabulary_size()
        );
        Ok(())
    }

    /// Read both artifacts from `dir` and verify they belong together.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let state: VectorizerState = read_artifact(&dir.join(VECTORIZER_FILE), VECTORIZER_MAGIC)?;
        let vectorizer = TfIdfVectorizer::from_state(state)?;

        let model: ModelArtifact = read_artifact(&dir.join(MODEL_FILE), MODEL_MAGIC)?;
        model.model.validate()?;

        debug!(
            "loaded artifacts from {} (trained {})",
            dir.display(),
            model.metadata.trained_at
        );
        Self::new(vectorizer, model)
    }
}

fn check_pair(vectorizer: &TfIdfVectorizer, model: &MultinomialNaiveBayes) -> Result<()> {
    if vectorizer.vocabulary_size() != model.n_features() {
        return Err(UrlGuardError::mismatch(format!(
            "vectorizer has {} features but model expects {}",
            vectorizer.vocabulary_size(),
            model.n_features()
        )));
    }
    Ok(())
}

fn encode<T: Serialize>(magic: [u8; 4], value: &T) -> Result<Vec<u8>> {
    let payload = bincode::serialize(value)
        .map_err(|e| UrlGuardError::serialization(format!("failed to encode artifact: {e}")))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&magic);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

fn decode<T: DeserializeOwned>(magic: [u8; 4], bytes: &[u8], path: &Path) -> Result<T> {
    let corrupt = |what: &str| {
        UrlGuardError::serialization(format!("{}: {what}", path.display()))
    };

    if bytes.len() < HEADER_LEN {
        return Err(corrupt("file is too short to be an artifact"));
    }
    let (header, payload) = bytes.split_at(HEADER_LEN);
    if header[0..4] != magic {
        return Err(corrupt(&format!(
            "bad magic, expected {:?}",
            String::from_utf8_lossy(&magic)
        )));
    }

    let word = |range: std::ops::Range<usize>| {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&header[range]);
        u32::from_le_bytes(buf)
    };
    let version = word(4..8);
    if version != FORMAT_VERSION {
        return Err(corrupt(&format!(
            "unsupported format version {version}, expected {FORMAT_VERSION}"
        )));
    }
    let checksum = word(8..12);
    if crc32fast::hash(payload) != checksum {
        return Err(corrupt("checksum mismatch"));
    }

    bincode::deserialize(payload).map_err(|e| corrupt(&format!("failed to decode payload: {e}")))
}

fn read_artifact<T: DeserializeOwned>(path: &Path, magic: [u8; 4]) -> Result<T> {
    let bytes = fs::read(path).map_err(|e| {
        UrlGuardError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read artifact {}: {e}", path.display()),
        ))
    })?;
    decode(magic, &bytes, path)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()
}

/// Write `bytes` to a fresh temporary file next to `name`.
fn stage(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let temp = dir.join(format!(".{name}.{}.tmp", Uuid::new_v4()));
    write_synced(&temp, bytes).map_err(|e| {
        let _ = fs::remove_file(&temp);
        UrlGuardError::serialization(format!("failed to write {}: {e}", temp.display()))
    })?;
    Ok(temp)
}

/// Hard-link the currently published file to a backup name, if there is one.
fn keep_previous(path: &Path) -> Result<Option<PathBuf>> {
    if !path.is_file() {
        return Ok(None);
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let backup = path.with_file_name(format!(".{name}.{}.bak", Uuid::new_v4()));
    fs::hard_link(path, &backup)
        .or_else(|_| fs::copy(path, &backup).map(|_| ()))
        .map_err(|e| {
            UrlGuardError::serialization(format!(
                "failed to back up {}: {e}",
                path.display()
            ))
        })?;
    Ok(Some(backup))
}

/// Undo a vectorizer publish whose model never made it into place.
fn restore_previous(backup: Option<&Path>, target: &Path) {
    let restored = match backup {
        Some(backup) => fs::rename(backup, target),
        None => fs::remove_file(target),
    };
    if let Err(e) = restored {
        warn!("failed to roll back {}: {e}", target.display());
    }
}

fn publish(staged: &Path, target: &Path) -> Result<()> {
    fs::rename(staged, target).map_err(|e| {
        UrlGuardError::serialization(format!(
            "failed to publish {}: {e}",
            target.display()
        ))
    })
}
