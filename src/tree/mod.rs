//! Path-addressable configuration tree.
//!
//! A configuration snapshot is turned into a [`ConfigNode`] tree, which can
//! then be read or written by dotted [`Path`]:
//!
//! - [`resolve_read`] walks the tree and returns the addressed node
//! - [`resolve_write`] walks the tree and assigns a coerced value
//! - [`coerce`] turns raw strings into typed leaves
//!
//! ## Dotted mapping keys
//!
//! Mapping keys may themselves contain dots (plugin ids such as
//! `com.mattermost.nps`), so a path segment does not always correspond to a
//! single key. At a mapping, every key that is a dot-respecting prefix of the
//! remaining path is a candidate. Candidates are tried in a fixed order: keys
//! spanning more segments first, then lexicographically. The first candidate
//! wins and there is no backtracking into other candidates.
//!
//! Trees are built per operation and never cached; a caller that re-fetches
//! a snapshot between a read and a write simply builds a new tree.

pub mod coerce;
pub mod error;
pub mod json;
pub mod node;
pub mod path;
pub mod read;
pub mod write;

pub use coerce::{RawValue, coerce, parse_bool};
pub use error::{PathError, TreeError};
pub use json::{DEFAULT_MAPPING_PATHS, MappingPatterns, from_json, leaf_to_display, to_json};
pub use node::{ConfigNode, FloatWidth, IntWidth, Leaf, Mapping, Record, ValueType};
pub use path::Path;
pub use read::resolve_read;
pub use write::resolve_write;
