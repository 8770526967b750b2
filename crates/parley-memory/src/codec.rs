//! Binary encoding for stored conversations.
//!
//! A stored conversation is a five byte header (`PRLY` magic plus a format
//! version) followed by a MessagePack document. Struct fields are written by
//! name, so readers tolerate reordered fields and ignore fields they do not
//! know. Fields added in later versions must be `#[serde(default)]`.

use crate::error::MemoryError;
use crate::model::MessageRecord;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read, Write};

/// Magic bytes at the start of every stored conversation.
pub const MAGIC: &[u8; 4] = b"PRLY";
/// Format version written by this codec.
pub const FORMAT_VERSION: u8 = 1;

#[derive(Serialize)]
struct StoredConversationRef<'a> {
    conversation_id: &'a str,
    messages: &'a [MessageRecord],
}

#[derive(Deserialize)]
struct StoredConversation {
    #[serde(default)]
    #[allow(dead_code)]
    conversation_id: String,
    #[serde(default)]
    messages: Vec<MessageRecord>,
}

/// Serializer for conversation files.
///
/// Constructed once and handed to each repository that needs it.
#[derive(Debug, Clone, Copy)]
pub struct MessageCodec {
    version: u8,
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageCodec {
    /// Codec writing the current format version.
    pub fn new() -> Self {
        Self {
            version: FORMAT_VERSION,
        }
    }

    /// Version stamped into encoded headers.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Encode a conversation into the writer.
    pub fn encode<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        conversation_id: &str,
        messages: &[MessageRecord],
    ) -> Result<(), MemoryError> {
        writer.write_all(MAGIC)?;
        writer.write_all(&[self.version()])?;
        let document = StoredConversationRef {
            conversation_id,
            messages,
        };
        rmp_serde::encode::write_named(writer, &document)?;
        Ok(())
    }

    /// Encode a conversation into a fresh buffer.
    pub fn encode_to_vec(
        &self,
        conversation_id: &str,
        messages: &[MessageRecord],
    ) -> Result<Vec<u8>, MemoryError> {
        let mut buffer = Vec::new();
        self.encode(&mut buffer, conversation_id, messages)?;
        Ok(buffer)
    }

    /// Read the header and return the format version it declares.
    ///
    /// The version is not checked against [`FORMAT_VERSION`].
    pub fn read_version<R: Read>(&self, reader: &mut R) -> Result<u8, MemoryError> {
        let mut header = [0u8; 5];
        reader.read_exact(&mut header).map_err(|err| {
            if err.kind() == ErrorKind::UnexpectedEof {
                MemoryError::InvalidHeader
            } else {
                MemoryError::Io(err)
            }
        })?;
        if &header[..4] != MAGIC {
            return Err(MemoryError::InvalidHeader);
        }
        Ok(header[4])
    }

    /// Decode a conversation, validating the header first.
    pub fn decode<R: Read>(&self, reader: &mut R) -> Result<Vec<MessageRecord>, MemoryError> {
        let found = self.read_version(reader)?;
        if found == 0 || found > FORMAT_VERSION {
            return Err(MemoryError::UnsupportedVersion {
                found,
                supported: FORMAT_VERSION,
            });
        }
        let document: StoredConversation = rmp_serde::decode::from_read(reader)?;
        Ok(document.messages)
    }

    /// Decode a conversation from an in-memory buffer.
    pub fn decode_slice(&self, bytes: &[u8]) -> Result<Vec<MessageRecord>, MemoryError> {
        let mut reader = bytes;
        self.decode(&mut reader)
    }
}
