//! File-backed repository storing one encoded file per conversation.

use super::MemoryRepository;
use crate::codec::{FORMAT_VERSION, MessageCodec};
use crate::error::MemoryError;
use crate::model::MessageRecord;
use log::{debug, info, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Extension reserved for conversation files.
pub const FILE_EXTENSION: &str = "prly";

/// Characters that cannot appear in a conversation file name.
const FORBIDDEN_CHARS: &[char] = &['/', '\\', '\0', ':', '*', '?', '"', '<', '>', '|'];

/// Durable repository writing `{conversation_id}.prly` files under a root.
#[derive(Debug, Clone)]
pub struct FileMemoryRepository {
    /// Root directory for conversation files.
    root: PathBuf,
    codec: MessageCodec,
}

impl FileMemoryRepository {
    /// Create a repository under the given root, creating it if needed.
    pub fn new(root: impl AsRef<Path>, codec: MessageCodec) -> Result<Self, MemoryError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        info!(
            "initialized file memory repository (root={}, format_version={})",
            root.display(),
            codec.version()
        );
        Ok(Self { root, codec })
    }

    /// Root directory holding conversation files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to a conversation file.
    fn conversation_path(&self, conversation_id: &str) -> Result<PathBuf, MemoryError> {
        validate_conversation_id(conversation_id)?;
        Ok(self
            .root
            .join(format!("{conversation_id}.{FILE_EXTENSION}")))
    }

    /// Unique temporary sibling used while rewriting a conversation.
    fn temp_path(&self, conversation_id: &str) -> PathBuf {
        self.root
            .join(format!(".{conversation_id}.{}.tmp", Uuid::new_v4()))
    }

    fn load(&self, conversation_id: &str) -> Result<Vec<MessageRecord>, MemoryError> {
        let path = self.conversation_path(conversation_id)?;
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut reader = BufReader::new(file);
        self.codec.decode(&mut reader)
    }

    /// Refuse to replace a file written by a newer format version.
    ///
    /// Missing or unreadable headers are not guarded; such files read as empty
    /// and may be rewritten.
    fn ensure_writable(&self, path: &Path) -> Result<(), MemoryError> {
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        match self.codec.read_version(&mut file) {
            Ok(found) if found > FORMAT_VERSION => {
                warn!(
                    "refusing to overwrite newer conversation file (path={}, found={}, supported={})",
                    path.display(),
                    found,
                    FORMAT_VERSION
                );
                Err(MemoryError::UnsupportedVersion {
                    found,
                    supported: FORMAT_VERSION,
                })
            }
            Ok(_) | Err(MemoryError::InvalidHeader) => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn write_temp(
        &self,
        temp_path: &Path,
        conversation_id: &str,
        messages: &[MessageRecord],
    ) -> Result<(), MemoryError> {
        let file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(temp_path)?;
        let mut writer = BufWriter::new(file);
        self.codec.encode(&mut writer, conversation_id, messages)?;
        writer.flush()?;
        let file = writer.into_inner().map_err(|err| err.into_error())?;
        file.sync_all()?;
        Ok(())
    }
}

impl MemoryRepository for FileMemoryRepository {
    /// Rewrite a conversation file atomically.
    fn save_all(
        &self,
        conversation_id: &str,
        messages: &[MessageRecord],
    ) -> Result<(), MemoryError> {
        let path = self.conversation_path(conversation_id)?;
        self.ensure_writable(&path)?;
        let temp_path = self.temp_path(conversation_id);
        let written = self
            .write_temp(&temp_path, conversation_id, messages)
            .and_then(|()| fs::rename(&temp_path, &path).map_err(MemoryError::from));
        if let Err(err) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(err);
        }
        debug!(
            "saved conversation (conversation_id={}, messages={}, path={})",
            conversation_id,
            messages.len(),
            path.display()
        );
        Ok(())
    }

    /// Load a conversation; unreadable files yield an empty sequence.
    fn find_by_conversation_id(&self, conversation_id: &str) -> Vec<MessageRecord> {
        match self.load(conversation_id) {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    "failed to read conversation, treating as empty (conversation_id={}, err={})",
                    conversation_id, err
                );
                Vec::new()
            }
        }
    }

    fn delete_by_conversation_id(&self, conversation_id: &str) -> Result<(), MemoryError> {
        let path = self.conversation_path(conversation_id)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("deleted conversation (conversation_id={})", conversation_id);
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn find_conversation_ids(&self) -> Result<Vec<String>, MemoryError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let suffix = format!(".{FILE_EXTENSION}");
        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(id) = name.strip_suffix(&suffix) else {
                continue;
            };
            if validate_conversation_id(id).is_err() {
                debug!("skipping foreign file in memory root (name={})", name);
                continue;
            }
            ids.push(id.to_string());
        }
        ids.sort();
        Ok(ids)
    }
}

/// Check that a conversation id maps onto a single, recoverable file name.
pub fn validate_conversation_id(conversation_id: &str) -> Result<(), MemoryError> {
    let invalid = conversation_id.is_empty()
        || conversation_id.starts_with('.')
        || conversation_id.contains("..")
        || conversation_id.contains(FORBIDDEN_CHARS)
        || conversation_id.chars().any(char::is_control)
        || conversation_id.ends_with(&format!(".{FILE_EXTENSION}"));
    if invalid {
        return Err(MemoryError::InvalidConversationId(
            conversation_id.to_string(),
        ));
    }
    Ok(())
}
