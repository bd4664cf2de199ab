//! Table of contents: flattened outline entries and outline tree rebuilding.

use std::collections::{BTreeMap, HashSet};

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};
use serde::Serialize;

use crate::error::{Error, Result};

use super::metadata::{decode_text, encode_text};

/// Maximum depth followed in a `/Dests` name tree.
const MAX_NAME_TREE_DEPTH: usize = 32;

/// One table of contents entry.
///
/// Entries compare by level, title and page; the destination view is not
/// part of equality.
#[derive(Debug, Clone, Serialize)]
pub struct TocEntry {
    /// Nesting level, starting at 1
    pub level: u32,

    /// Entry title
    pub title: String,

    /// Target page (1-based), if the entry points into the document
    pub page: Option<u32>,

    /// Destination array without its page element, e.g. `/XYZ left top zoom`
    #[serde(skip)]
    view: Option<Vec<Object>>,
}

impl PartialEq for TocEntry {
    fn eq(&self, other: &Self) -> bool {
        self.level == other.level && self.title == other.title && self.page == other.page
    }
}

impl Eq for TocEntry {}

impl TocEntry {
    /// Create an entry pointing at `page`.
    pub fn new(level: u32, title: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            title: title.into(),
            page: Some(page),
            view: None,
        }
    }

    /// Create an entry without a destination.
    pub fn without_page(level: u32, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            page: None,
            view: None,
        }
    }

    /// Set how the target page is shown, as the destination array elements
    /// following the page (`[/XYZ 72 500 null]`, `[/FitH 700]`).
    pub fn with_view(mut self, view: Vec<Object>) -> Self {
        self.view = Some(view);
        self
    }

    /// Destination view of the entry; `None` means the page is shown with `/Fit`.
    pub fn view(&self) -> Option<&[Object]> {
        self.view.as_deref()
    }
}

/// Check outline hierarchy and page targets of a flat entry list.
pub fn validate_toc(entries: &[TocEntry], page_count: u32) -> Result<()> {
    let mut prev_level = 0;
    for (idx, entry) in entries.iter().enumerate() {
        if idx == 0 && entry.level != 1 {
            return Err(Error::InvalidToc(format!(
                "hierarchy level of item 0 must be 1, got {}",
                entry.level
            )));
        }
        if entry.level == 0 || entry.level > prev_level + 1 {
            return Err(Error::InvalidToc(format!(
                "item {} has level {} after level {}",
                idx, entry.level, prev_level
            )));
        }
        if let Some(page) = entry.page {
            if page == 0 || page > page_count {
                return Err(Error::PageOutOfRange(page, page_count));
            }
        }
        prev_level = entry.level;
    }
    Ok(())
}

/// Read the outline as a flat, depth-first list of entries.
pub(crate) fn read_toc(doc: &LopdfDocument) -> Vec<TocEntry> {
    let mut entries = Vec::new();

    let Some(root) = outline_root(doc) else {
        return entries;
    };
    let Ok(Object::Reference(first)) = root.get(b"First") else {
        return entries;
    };

    let pages: BTreeMap<ObjectId, u32> = doc
        .get_pages()
        .into_iter()
        .map(|(num, id)| (id, num))
        .collect();
    let mut visited = HashSet::new();
    walk_items(doc, *first, 1, &pages, &mut visited, &mut entries);

    entries
}

/// Replace the outline with one built from `entries`.
///
/// Old outline item objects are removed from the document. An empty list
/// removes the outline altogether.
pub(crate) fn write_toc(doc: &mut LopdfDocument, entries: &[TocEntry]) -> Result<()> {
    let pages = doc.get_pages();
    validate_toc(entries, pages.len() as u32)?;

    let old_ids = outline_object_ids(doc);
    for id in &old_ids {
        doc.objects.remove(id);
    }
    if !old_ids.is_empty() {
        log::debug!("Removed {} old outline objects", old_ids.len());
    }

    let root_id = catalog_id(doc)?;
    if entries.is_empty() {
        catalog_mut(doc, root_id)?.remove(b"Outlines");
        return Ok(());
    }

    let outlines_id = doc.new_object_id();
    let item_ids: Vec<ObjectId> = entries.iter().map(|_| doc.new_object_id()).collect();

    // Parent of each item (None = outline root) and children per node.
    let mut parents: Vec<Option<usize>> = Vec::with_capacity(entries.len());
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); entries.len()];
    let mut top_level = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for (idx, entry) in entries.iter().enumerate() {
        while let Some(&top) = stack.last() {
            if entries[top].level >= entry.level {
                stack.pop();
            } else {
                break;
            }
        }
        let parent = stack.last().copied();
        match parent {
            Some(p) => children[p].push(idx),
            None => top_level.push(idx),
        }
        parents.push(parent);
        stack.push(idx);
    }

    for (idx, entry) in entries.iter().enumerate() {
        let mut item = Dictionary::new();
        item.set("Title", encode_text(&entry.title));

        let parent_id = parents[idx].map_or(outlines_id, |p| item_ids[p]);
        item.set("Parent", Object::Reference(parent_id));

        let siblings = parents[idx].map_or(&top_level, |p| &children[p]);
        let pos = siblings.iter().position(|&s| s == idx).unwrap_or(0);
        if pos > 0 {
            item.set("Prev", Object::Reference(item_ids[siblings[pos - 1]]));
        }
        if let Some(&next) = siblings.get(pos + 1) {
            item.set("Next", Object::Reference(item_ids[next]));
        }

        if let (Some(&first), Some(&last)) = (children[idx].first(), children[idx].last()) {
            item.set("First", Object::Reference(item_ids[first]));
            item.set("Last", Object::Reference(item_ids[last]));
            item.set("Count", Object::Integer(descendants(entries, idx) as i64));
        }

        if let Some(page) = entry.page {
            let page_id = pages
                .get(&page)
                .copied()
                .ok_or(Error::PageOutOfRange(page, pages.len() as u32))?;
            let mut dest = vec![Object::Reference(page_id)];
            match entry.view() {
                Some(view) if !view.is_empty() => dest.extend_from_slice(view),
                _ => dest.push(Object::Name(b"Fit".to_vec())),
            }
            item.set("Dest", Object::Array(dest));
        }

        doc.objects.insert(item_ids[idx], Object::Dictionary(item));
    }

    let mut outlines = Dictionary::new();
    outlines.set("Type", Object::Name(b"Outlines".to_vec()));
    if let (Some(&first), Some(&last)) = (top_level.first(), top_level.last()) {
        outlines.set("First", Object::Reference(item_ids[first]));
        outlines.set("Last", Object::Reference(item_ids[last]));
    }
    outlines.set("Count", Object::Integer(entries.len() as i64));
    doc.objects.insert(outlines_id, Object::Dictionary(outlines));

    catalog_mut(doc, root_id)?.set("Outlines", Object::Reference(outlines_id));

    log::debug!("Wrote outline with {} entries", entries.len());
    Ok(())
}

/// Number of entries nested below `idx`.
fn descendants(entries: &[TocEntry], idx: usize) -> usize {
    let level = entries[idx].level;
    entries[idx + 1..]
        .iter()
        .take_while(|e| e.level > level)
        .count()
}

fn walk_items(
    doc: &LopdfDocument,
    first: ObjectId,
    level: u32,
    pages: &BTreeMap<ObjectId, u32>,
    visited: &mut HashSet<ObjectId>,
    entries: &mut Vec<TocEntry>,
) {
    let mut current = Some(first);

    while let Some(item_id) = current.take() {
        if !visited.insert(item_id) {
            log::warn!("Outline cycle at object {:?}, stopping", item_id);
            return;
        }
        let Ok(item) = doc.get_dictionary(item_id) else {
            log::warn!("Outline item {:?} is not a dictionary, skipping", item_id);
            return;
        };

        let title = item.get(b"Title").ok().and_then(decode_text).unwrap_or_default();
        let (page, view) = match destination(doc, item, pages) {
            Some((page, view)) => (page, Some(view)),
            None => (None, None),
        };
        entries.push(TocEntry {
            level,
            title,
            page,
            view,
        });

        if let Ok(Object::Reference(child)) = item.get(b"First") {
            walk_items(doc, *child, level + 1, pages, visited, entries);
        }

        if let Ok(Object::Reference(next)) = item.get(b"Next") {
            current = Some(*next);
        }
    }
}

/// Resolve an item's `/Dest` or GoTo action to a page number and the rest
/// of its destination array.
fn destination(
    doc: &LopdfDocument,
    item: &Dictionary,
    pages: &BTreeMap<ObjectId, u32>,
) -> Option<(Option<u32>, Vec<Object>)> {
    let dest = match item.get(b"Dest") {
        Ok(dest) => dest,
        Err(_) => {
            let action = resolve_dict(doc, item.get(b"A").ok()?)?;
            action.get(b"D").ok()?
        }
    };

    let array = explicit_destination(doc, dest)?;
    let page = match array.first()? {
        Object::Reference(page_id) => pages.get(page_id).copied(),
        // Remote destinations use a 0-based page index.
        Object::Integer(index) => u32::try_from(*index).ok().map(|i| i + 1),
        _ => None,
    };

    Some((page, array[1..].to_vec()))
}

/// Turn a destination into its array form, looking up named destinations.
fn explicit_destination<'a>(doc: &'a LopdfDocument, dest: &'a Object) -> Option<&'a [Object]> {
    match deref(doc, dest) {
        Object::Array(array) => Some(array.as_slice()),
        Object::String(name, _) | Object::Name(name) => {
            let found = named_destination(doc, name);
            if found.is_none() {
                log::debug!(
                    "Named destination {:?} not found",
                    String::from_utf8_lossy(name)
                );
            }
            found
        }
        _ => None,
    }
}

/// Look up a named destination in the `/Names` `/Dests` name tree, then in
/// the catalog's `/Dests` dictionary.
fn named_destination<'a>(doc: &'a LopdfDocument, name: &[u8]) -> Option<&'a [Object]> {
    let catalog = doc.catalog().ok()?;

    let from_tree = catalog
        .get(b"Names")
        .ok()
        .and_then(|names| resolve_dict(doc, names))
        .and_then(|names| names.get(b"Dests").ok())
        .and_then(|tree| resolve_dict(doc, tree))
        .and_then(|tree| lookup_name_tree(doc, tree, name, 0));

    let value = match from_tree {
        Some(value) => value,
        None => {
            let dests = resolve_dict(doc, catalog.get(b"Dests").ok()?)?;
            dests.get(name).ok()?
        }
    };

    // The value is either the array itself or a dictionary holding it in /D.
    match deref(doc, value) {
        Object::Array(array) => Some(array.as_slice()),
        Object::Dictionary(dict) => match deref(doc, dict.get(b"D").ok()?) {
            Object::Array(array) => Some(array.as_slice()),
            _ => None,
        },
        _ => None,
    }
}

fn lookup_name_tree<'a>(
    doc: &'a LopdfDocument,
    node: &'a Dictionary,
    name: &[u8],
    depth: usize,
) -> Option<&'a Object> {
    if depth > MAX_NAME_TREE_DEPTH {
        log::warn!("Name tree deeper than {}, stopping", MAX_NAME_TREE_DEPTH);
        return None;
    }

    if let Ok(Object::Array(pairs)) = node.get(b"Names").map(|names| deref(doc, names)) {
        for pair in pairs.chunks_exact(2) {
            if let Object::String(key, _) = deref(doc, &pair[0]) {
                if key.as_slice() == name {
                    return Some(&pair[1]);
                }
            }
        }
    }

    if let Ok(Object::Array(kids)) = node.get(b"Kids").map(|kids| deref(doc, kids)) {
        for kid in kids {
            let found = resolve_dict(doc, kid)
                .and_then(|kid| lookup_name_tree(doc, kid, name, depth + 1));
            if found.is_some() {
                return found;
            }
        }
    }

    None
}

/// Follow a single indirect reference; dangling references are returned as-is.
fn deref<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Reference(id) => doc.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn outline_root(doc: &LopdfDocument) -> Option<&Dictionary> {
    let catalog = doc.catalog().ok()?;
    resolve_dict(doc, catalog.get(b"Outlines").ok()?)
}

/// Object ids of the outline root and every item reachable from it.
fn outline_object_ids(doc: &LopdfDocument) -> Vec<ObjectId> {
    let mut ids = Vec::new();
    let Ok(catalog) = doc.catalog() else {
        return ids;
    };
    let root = match catalog.get(b"Outlines") {
        Ok(Object::Reference(id)) => {
            ids.push(*id);
            doc.get_dictionary(*id).ok()
        }
        Ok(Object::Dictionary(dict)) => Some(dict),
        _ => None,
    };

    let mut pending: Vec<ObjectId> = match root.map(|r| r.get(b"First")) {
        Some(Ok(Object::Reference(first))) => vec![*first],
        _ => Vec::new(),
    };
    let mut seen = HashSet::new();

    while let Some(id) = pending.pop() {
        if !seen.insert(id) {
            continue;
        }
        ids.push(id);
        if let Ok(item) = doc.get_dictionary(id) {
            for key in [b"First".as_slice(), b"Next".as_slice()] {
                if let Ok(Object::Reference(next)) = item.get(key) {
                    pending.push(*next);
                }
            }
        }
    }

    ids
}

pub(crate) fn catalog_id(doc: &LopdfDocument) -> Result<ObjectId> {
    match doc.trailer.get(b"Root") {
        Ok(Object::Reference(id)) => Ok(*id),
        _ => Err(Error::MissingObject("document catalog (/Root)".to_string())),
    }
}

fn catalog_mut(doc: &mut LopdfDocument, root_id: ObjectId) -> Result<&mut Dictionary> {
    Ok(doc.get_object_mut(root_id)?.as_dict_mut()?)
}
