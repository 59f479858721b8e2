//! Name tables compiled into a translet.
//!
//! Translets older than [`VER_SPLIT_NAMES_ARRAY`] carry one array of encoded names
//! (`uri:local`, `uri:@local` for attributes, `uri:?prefix` for namespaces). Newer ones
//! ship the URI, local name and node kind as parallel arrays.
use crate::consts::{CURRENT_TRANSLET_VERSION, VER_SPLIT_NAMES_ARRAY};
use crate::error::{Error, ErrorCode};
use crate::model::NodeKind;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    pub names: Vec<String>,
    pub uris: Vec<String>,
    pub kinds: Vec<NodeKind>,
}

impl NameTable {
    pub fn split(names: Vec<String>, uris: Vec<String>, kinds: Vec<NodeKind>) -> Self {
        Self { names, uris, kinds }
    }

    /// Decode the single-array encoding.
    pub fn from_legacy<S: AsRef<str>>(encoded: &[S]) -> Self {
        let mut table = Self::default();
        for name in encoded {
            let name = name.as_ref();
            let (uri, rest) = match name.rfind(':') {
                Some(i) => (&name[..i], &name[i + 1..]),
                None => ("", name),
            };
            let (kind, local) = if let Some(local) = rest.strip_prefix('@') {
                (NodeKind::Attribute, local)
            } else if let Some(local) = rest.strip_prefix('?') {
                (NodeKind::Namespace, local)
            } else {
                (NodeKind::Element, rest)
            };
            table.uris.push(uri.to_string());
            table.names.push(local.to_string());
            table.kinds.push(kind);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Build the effective name table for a translet of `version` and reject translets compiled
/// for a newer runtime.
pub fn normalize_names(
    translet: &str,
    version: u32,
    legacy: &[String],
    split: impl FnOnce() -> NameTable,
) -> Result<NameTable, Error> {
    if version > CURRENT_TRANSLET_VERSION {
        return Err(Error::from_code(ErrorCode::UNKNOWN_TRANSLET_VERSION_ERR, [translet]));
    }
    Ok(if version < VER_SPLIT_NAMES_ARRAY { NameTable::from_legacy(legacy) } else { split() })
}
