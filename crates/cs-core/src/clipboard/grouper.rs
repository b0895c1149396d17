use std::collections::HashMap;

use bytes::Bytes;

use crate::clipboard::{Content, Format, ObservedRepresentation};

/// Group observed representations into [`Content`] values.
///
/// Representations with byte-identical payloads collapse into one content that
/// carries every tag they were exposed under; different bytes always stay in
/// separate contents. Output follows the first occurrence of each buffer.
pub fn group_representations<I>(representations: I) -> Vec<Content>
where
    I: IntoIterator<Item = ObservedRepresentation>,
{
    // Bytes hashes and compares by content, so lookups are full byte equality.
    let mut index: HashMap<Bytes, usize> = HashMap::new();
    let mut groups: Vec<(Bytes, Vec<Format>)> = Vec::new();

    for rep in representations {
        let format = Format::new(rep.type_tag);
        match index.get(&rep.bytes) {
            Some(&slot) => groups[slot].1.push(format),
            None => {
                index.insert(rep.bytes.clone(), groups.len());
                groups.push((rep.bytes, vec![format]));
            }
        }
    }

    groups
        .into_iter()
        .map(|(bytes, formats)| Content::new(bytes, formats))
        .collect()
}
