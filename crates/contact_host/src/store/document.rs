//! Contact document model shared by store backends and the UI envelope.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Stable document identifier assigned on first insert.
pub struct DocumentId(String);

impl DocumentId {
    /// Wraps a raw identifier string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Opaque revision token in the `"<generation>-<token>"` shape.
///
/// Tokens are compared for equality only. The generation prefix is exposed for diagnostics and
/// tests; it advances by one on every write to the same document.
pub struct Revision(String);

impl Revision {
    /// Wraps a raw revision token.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the numeric generation prefix, when the token carries one.
    pub fn generation(&self) -> Option<u64> {
        self.0.split_once('-')?.0.parse().ok()
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Revision {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Binary attachment stored alongside a contact document.
pub struct Attachment {
    /// MIME type of the attachment body.
    pub content_type: String,
    /// Base64 body. Absent when the attachment was listed as a stub.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Backend-provided content digest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Marks a body-less listing entry.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stub: bool,
}

impl Attachment {
    /// Creates an inline attachment with a base64 body.
    pub fn inline(content_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            data: Some(data.into()),
            digest: None,
            stub: false,
        }
    }

    /// Returns a copy with the body dropped and the stub marker set.
    pub fn to_stub(&self) -> Self {
        Self {
            content_type: self.content_type.clone(),
            data: None,
            digest: self.digest.clone(),
            stub: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Contact document as exchanged with the UI and the document store.
///
/// Reserved keys (`_id`, `_rev`, `_attachments`) map to typed fields; every other key is kept
/// verbatim in [`ContactDocument::fields`].
pub struct ContactDocument {
    /// Store-assigned identifier. `None` before first insert.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    /// Revision observed when this copy was read.
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<Revision>,
    /// Named binary attachments.
    #[serde(
        rename = "_attachments",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub attachments: BTreeMap<String, Attachment>,
    /// Application payload (name, phone, location, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ContactDocument {
    /// Creates an unsaved document from an application payload.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Builder-style helper that sets one payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Builder-style helper that sets the document identifier.
    pub fn with_id(mut self, id: impl Into<DocumentId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Reads one payload field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns a copy carrying the given identity and revision.
    pub fn stamped(&self, id: DocumentId, rev: Revision) -> Self {
        Self {
            id: Some(id),
            rev: Some(rev),
            ..self.clone()
        }
    }

    /// Returns a copy whose attachments are replaced by body-less stubs.
    pub fn with_attachment_stubs(&self) -> Self {
        Self {
            attachments: self
                .attachments
                .iter()
                .map(|(name, attachment)| (name.clone(), attachment.to_stub()))
                .collect(),
            ..self.clone()
        }
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Identity and revision assigned by a successful write.
pub struct WriteReceipt {
    /// Identifier of the written document.
    pub id: DocumentId,
    /// Revision now current for that document.
    pub rev: Revision,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn contact_document_maps_reserved_keys_and_keeps_payload() {
        let doc: ContactDocument = serde_json::from_value(json!({
            "_id": "1",
            "_rev": "2-a",
            "name": "Ada",
            "phone": "555",
            "_attachments": {
                "photo.png": {"content_type": "image/png", "data": "iVBOR"}
            }
        }))
        .expect("decode document");

        assert_eq!(doc.id, Some(DocumentId::new("1")));
        assert_eq!(doc.rev.as_ref().and_then(Revision::generation), Some(2));
        assert_eq!(doc.field("name"), Some(&json!("Ada")));
        assert!(!doc.fields.contains_key("_id"));
        assert_eq!(
            doc.attachments.get("photo.png"),
            Some(&Attachment::inline("image/png", "iVBOR"))
        );
    }

    #[test]
    fn unsaved_document_serializes_without_identity_keys() {
        let doc = ContactDocument::default().with_field("name", "A");
        let value = serde_json::to_value(&doc).expect("encode document");
        assert_eq!(value, json!({"name": "A"}));
    }

    #[test]
    fn attachment_stub_drops_body_and_sets_marker() {
        let doc = ContactDocument::default();
        let mut doc = doc.with_field("name", "A");
        doc.attachments
            .insert("card.vcf".to_string(), Attachment::inline("text/vcard", "QkVH"));

        let stubbed = doc.with_attachment_stubs();
        let value = serde_json::to_value(&stubbed).expect("encode document");
        assert_eq!(
            value["_attachments"]["card.vcf"],
            json!({"content_type": "text/vcard", "stub": true})
        );
    }

    #[test]
    fn revision_generation_rejects_unprefixed_tokens() {
        assert_eq!(Revision::new("7-abc").generation(), Some(7));
        assert_eq!(Revision::new("abc").generation(), None);
    }
}
