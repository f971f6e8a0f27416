//! ID type wrappers for type safety.

mod id_macro;

use serde::{Deserialize, Serialize};

use id_macro::impl_id;

/// Stable identity of one batch item.
///
/// Positions shift when earlier items are removed; the id does not, so an
/// in-flight conversion is always recorded against the item it started on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(String);

/// Opaque handle for a transient preview resource tied to one item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreviewHandle(String);

impl_id!(ItemId, PreviewHandle);
