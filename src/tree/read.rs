//! Path resolution for reads.

use tracing::debug;

use super::node::ConfigNode;
use super::path::Path;

/// Resolve `path` against `root`, returning the node it addresses.
///
/// Records consume one segment per field. Mappings consume as many
/// segments as the matched key spans (see [`super::Mapping::resolve`]).
/// Optional nodes are dereferenced transparently while segments remain;
/// an empty optional on the way down means not found.
///
/// The terminal node is returned as-is, so a path may address a whole
/// record or mapping as well as a leaf.
pub fn resolve_read<'a>(path: &Path, root: &'a ConfigNode) -> Option<&'a ConfigNode> {
    let found = read_at(root, path.segments());
    if found.is_none() {
        debug!(path = %path, "path did not resolve");
    }
    found
}

fn read_at<'a>(node: &'a ConfigNode, rest: &[String]) -> Option<&'a ConfigNode> {
    let Some(segment) = rest.first() else {
        return Some(node);
    };

    match node {
        ConfigNode::Optional(inner) => read_at(inner.as_deref()?, rest),
        ConfigNode::Record(record) => read_at(record.get(segment)?, &rest[1..]),
        ConfigNode::Mapping(mapping) => {
            let (key, entry, consumed) = mapping.resolve(rest)?;
            if consumed > 1 {
                debug!(key, consumed, "matched dotted mapping key");
            }
            read_at(entry, &rest[consumed..])
        }
        // Segments left over below a leaf
        ConfigNode::Leaf(_) => None,
    }
}
