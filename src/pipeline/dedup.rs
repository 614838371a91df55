use rustc_hash::FxHashSet;

use crate::clients::CatalogItem;

/// 作品IDで重複を除去する。最初に現れたものを残し、順序は保持する。
pub(crate) fn dedup_by_id(items: Vec<CatalogItem>) -> Vec<CatalogItem> {
    let mut seen = FxHashSet::default();
    let mut unique = Vec::with_capacity(items.len());

    for item in items {
        if seen.insert(item.id) {
            unique.push(item);
        }
    }

    unique
}
