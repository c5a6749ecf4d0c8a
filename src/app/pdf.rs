// pdf.rs
use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{AppError, Result};

/// Resource categories whose entries are looked up by name from content streams.
const RESOURCE_CATEGORIES: &[&[u8]] = &[
    b"XObject",
    b"Font",
    b"ExtGState",
    b"Pattern",
    b"Shading",
    b"ColorSpace",
    b"Properties",
];

/// Where a resources dictionary lives: its own object, or inline in the
/// page, pages node or other dictionary with that id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum ResourcesAt {
    Object(ObjectId),
    InlineOn(ObjectId),
}

/// `None` means "unknown, keep everything".
type Usage = Option<BTreeSet<Vec<u8>>>;

fn merge(slot: &mut Usage, used: Usage) {
    *slot = match (slot.take(), used) {
        (Some(mut names), Some(more)) => {
            names.extend(more);
            Some(names)
        }
        _ => None,
    };
}

fn merge_into<K: Ord>(map: &mut BTreeMap<K, Usage>, key: K, used: Usage) {
    match map.get_mut(&key) {
        Some(slot) => merge(slot, used),
        None => {
            map.insert(key, used);
        }
    }
}

/// Removes resource entries nothing on any page draws, then drops objects
/// that became unreachable. Returns the number of entries removed.
///
/// Pages without `/Resources` use the nearest ancestor's, which then counts
/// as shared. Shared resources keep the union of what their users draw.
/// Form XObjects and tiling patterns are followed, and their names count
/// against the dictionary they resolve names through. A content stream
/// that cannot be parsed, or a Type3 font, keeps all of its resources.
pub fn remove_unreferenced_resources(doc: &mut Document) -> Result<usize> {
    let mut walk = UsageWalk::new(doc);
    for page_id in doc.get_pages().into_values() {
        walk.page(page_id);
    }
    let usage = walk.usage;

    let mut inline_categories = Vec::new();
    let mut shared_categories: BTreeMap<ObjectId, Usage> = BTreeMap::new();
    for (at, used) in &usage {
        let Some(resources) = resources_dict(doc, *at) else { continue };
        for category in RESOURCE_CATEGORIES {
            match resources.get(category) {
                Ok(Object::Reference(id)) => merge_into(&mut shared_categories, *id, used.clone()),
                Ok(Object::Dictionary(_)) => inline_categories.push((*at, *category, used.clone())),
                _ => {}
            }
        }
    }

    let mut removed = 0;
    for (at, category, used) in inline_categories {
        let Some(used) = used else { continue };
        if let Some(Object::Dictionary(entries)) =
            resources_dict_mut(doc, at).and_then(|r| r.get_mut(category).ok())
        {
            removed += retain_used(entries, &used);
        }
    }
    for (id, used) in shared_categories {
        let Some(used) = used else { continue };
        if let Ok(entries) = doc.get_dictionary_mut(id) {
            removed += retain_used(entries, &used);
        }
    }

    let pruned = doc.prune_objects();
    tracing::debug!(removed, pruned = pruned.len(), "Pruned PDF resources");
    Ok(removed)
}

/// The page's own `/Resources`, or the first one found up its `/Parent` chain.
fn resources_location(doc: &Document, page_id: ObjectId) -> Option<ResourcesAt> {
    let mut seen = BTreeSet::new();
    let mut node_id = page_id;
    while seen.insert(node_id) {
        let node = doc.get_dictionary(node_id).ok()?;
        match node.get(b"Resources") {
            Ok(Object::Reference(id)) => return Some(ResourcesAt::Object(*id)),
            Ok(Object::Dictionary(_)) => return Some(ResourcesAt::InlineOn(node_id)),
            _ => {}
        }
        node_id = node.get(b"Parent").and_then(|p| p.as_reference()).ok()?;
    }
    None
}

fn resources_dict(doc: &Document, at: ResourcesAt) -> Option<&Dictionary> {
    match at {
        ResourcesAt::Object(id) => doc.get_dictionary(id).ok(),
        ResourcesAt::InlineOn(owner) => doc
            .get_dictionary(owner)
            .ok()?
            .get(b"Resources")
            .ok()?
            .as_dict()
            .ok(),
    }
}

fn resources_dict_mut(doc: &mut Document, at: ResourcesAt) -> Option<&mut Dictionary> {
    match at {
        ResourcesAt::Object(id) => doc.get_dictionary_mut(id).ok(),
        ResourcesAt::InlineOn(owner) => doc
            .get_dictionary_mut(owner)
            .ok()?
            .get_mut(b"Resources")
            .ok()?
            .as_dict_mut()
            .ok(),
    }
}

/// Names drawn through each resources dictionary, collected from page
/// content and every form or pattern it draws.
struct UsageWalk<'a> {
    doc: &'a Document,
    usage: BTreeMap<ResourcesAt, Usage>,
    walked: BTreeSet<(ObjectId, Option<ResourcesAt>)>,
}

impl<'a> UsageWalk<'a> {
    fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            usage: BTreeMap::new(),
            walked: BTreeSet::new(),
        }
    }

    fn page(&mut self, page_id: ObjectId) {
        let doc = self.doc;
        let Some(at) = resources_location(doc, page_id) else { return };
        let content = doc
            .get_page_content(page_id)
            .ok()
            .and_then(|bytes| Content::decode(&bytes).ok());
        self.content(Some(at), resources_dict(doc, at), content.as_ref());
    }

    /// `at` is `None` for resources inline in a stream; those are read but
    /// never pruned.
    fn content(&mut self, at: Option<ResourcesAt>, resources: Option<&'a Dictionary>, content: Option<&Content>) {
        let Some(content) = content else {
            if let Some(at) = at {
                merge_into(&mut self.usage, at, None);
            }
            return;
        };

        let mut names = BTreeSet::new();
        let mut drawn = BTreeSet::new();
        for operation in &content.operations {
            for operand in &operation.operands {
                collect_names(operand, &mut names);
            }
            let target = match operation.operator.as_str() {
                "Do" => operation.operands.first().map(|o| (b"XObject".as_slice(), o)),
                "Tf" => operation.operands.first().map(|o| (b"Font".as_slice(), o)),
                "scn" | "SCN" => operation.operands.last().map(|o| (b"Pattern".as_slice(), o)),
                _ => None,
            };
            if let Some((category, Object::Name(name))) = target {
                drawn.insert((category, name.clone()));
            }
        }
        if let Some(at) = at {
            merge_into(&mut self.usage, at, Some(names));
        }
        for (category, name) in drawn {
            self.follow(at, resources, category, &name);
        }
    }

    fn follow(&mut self, at: Option<ResourcesAt>, resources: Option<&'a Dictionary>, category: &[u8], name: &[u8]) {
        let doc = self.doc;
        let Some((id, object)) = resources.and_then(|r| lookup(doc, r, category, name)) else { return };
        let dict = match object {
            Object::Dictionary(dict) => dict,
            Object::Stream(stream) => &stream.dict,
            _ => return,
        };

        if has_name(dict, b"Subtype", b"Type3") {
            let owner = match dict.get(b"Resources") {
                Ok(Object::Reference(rid)) => Some(ResourcesAt::Object(*rid)),
                Ok(_) => None,
                Err(_) => at,
            };
            if let Some(owner) = owner {
                merge_into(&mut self.usage, owner, None);
            }
            return;
        }

        let Object::Stream(stream) = object else { return };
        let draws = has_name(dict, b"Subtype", b"Form") || dict.get(b"PatternType").and_then(|t| t.as_i64()).ok() == Some(1);
        if !draws {
            return;
        }
        if let Some(id) = id {
            if !self.walked.insert((id, at)) {
                return;
            }
        }

        let (inner_at, inner_resources) = match dict.get(b"Resources") {
            Err(_) => (at, resources),
            Ok(Object::Reference(rid)) => (Some(ResourcesAt::Object(*rid)), doc.get_dictionary(*rid).ok()),
            Ok(Object::Dictionary(own)) => (None, Some(own)),
            Ok(_) => (None, None),
        };
        let bytes = stream.decompressed_content().unwrap_or_else(|_| stream.content.clone());
        let content = Content::decode(&bytes).ok();
        self.content(inner_at, inner_resources, content.as_ref());
    }
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<(Option<ObjectId>, &'a Object)> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok().map(|target| (Some(*id), target)),
        _ => Some((None, object)),
    }
}

fn lookup<'a>(
    doc: &'a Document,
    resources: &'a Dictionary,
    category: &[u8],
    name: &[u8],
) -> Option<(Option<ObjectId>, &'a Object)> {
    let (_, entries) = resolve(doc, resources.get(category).ok()?)?;
    resolve(doc, entries.as_dict().ok()?.get(name).ok()?)
}

fn has_name(dict: &Dictionary, key: &[u8], value: &[u8]) -> bool {
    dict.get(key).and_then(|o| o.as_name()).ok() == Some(value)
}

fn collect_names(object: &Object, names: &mut BTreeSet<Vec<u8>>) {
    match object {
        Object::Name(name) => {
            names.insert(name.clone());
        }
        Object::Array(items) => items.iter().for_each(|item| collect_names(item, names)),
        Object::Dictionary(dict) => dict.iter().for_each(|(_, value)| collect_names(value, names)),
        _ => {}
    }
}

fn retain_used(entries: &mut Dictionary, used: &BTreeSet<Vec<u8>>) -> usize {
    let unused: Vec<Vec<u8>> = entries
        .iter()
        .map(|(key, _)| key)
        .filter(|key| !used.contains(key.as_slice()))
        .cloned()
        .collect();
    for key in &unused {
        entries.remove(key);
    }
    unused.len()
}

/// One page sized so that `image` is shown at `dpi`.
pub fn single_page_document(image: &RgbImage, dpi: f32) -> Result<Document> {
    let width_pt = image.width() as f32 * 72.0 / dpi;
    let height_pt = image.height() as f32 * 72.0 / dpi;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width() as i64,
            "Height" => image.height() as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        image.as_raw().clone(),
    ));
    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { "Im0" => image_id },
    });

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![width_pt.into(), 0.into(), 0.into(), height_pt.into(), 0.into(), 0.into()],
            ),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), width_pt.into(), height_pt.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    Ok(doc)
}

/// Compresses uncompressed streams and serializes.
pub fn save_to_vec(doc: &mut Document) -> Result<Vec<u8>> {
    doc.compress();
    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(|e| AppError::io("<pdf>", e))?;
    Ok(out)
}
