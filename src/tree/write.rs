//! Path resolution for writes.
//!
//! Records are mutated through their field slots. Mapping entries are never
//! mutated where they sit: the writer clones the matched entry, applies the
//! rest of the write to the clone, and only then puts the clone back under
//! the same key. Coercion happens before any assignment, so a failed write
//! leaves the tree exactly as it was.

use tracing::debug;

use super::coerce::{RawValue, coerce};
use super::error::TreeError;
use super::node::ConfigNode;
use super::path::Path;

/// Assign `value` to the node `path` addresses under `root`.
///
/// Fails with [`TreeError::InvalidPath`] when any step does not resolve
/// (including an empty optional on the way), and with
/// [`TreeError::TypeMismatch`] / [`TreeError::UnsupportedKind`] when the
/// terminal node's declared type rejects the value.
///
/// When a mapping key consumes the whole remaining path, the entire entry
/// is replaced by the coerced value; nothing is merged into the old entry.
pub fn resolve_write(path: &Path, root: &mut ConfigNode, value: &RawValue) -> Result<(), TreeError> {
    write_at(root, path.segments(), value, path)
}

fn write_at(
    node: &mut ConfigNode,
    rest: &[String],
    value: &RawValue,
    full: &Path,
) -> Result<(), TreeError> {
    if let ConfigNode::Optional(inner) = node {
        return match inner.as_deref_mut() {
            Some(inner) => write_at(inner, rest, value, full),
            None => Err(TreeError::invalid_path(full)),
        };
    }

    let Some(segment) = rest.first() else {
        let replacement = coerce(node.value_type(), value)?;
        *node = replacement;
        return Ok(());
    };

    match node {
        ConfigNode::Record(record) => {
            let field = record
                .get_mut(segment)
                .ok_or_else(|| TreeError::invalid_path(full))?;
            write_at(field, &rest[1..], value, full)
        }
        ConfigNode::Mapping(mapping) => {
            let (key, mut entry, consumed) = mapping
                .resolve(rest)
                .map(|(key, entry, consumed)| (key.to_string(), entry.clone(), consumed))
                .ok_or_else(|| TreeError::invalid_path(full))?;

            if consumed == rest.len() {
                debug!(key = %key, "replacing whole mapping entry");
            }
            write_at(&mut entry, &rest[consumed..], value, full)?;
            mapping.insert(key, entry);
            Ok(())
        }
        ConfigNode::Leaf(_) | ConfigNode::Optional(_) => Err(TreeError::invalid_path(full)),
    }
}
