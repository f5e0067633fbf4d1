//! Bidirectional tag <-> storage index table.

use crate::error::HelfrichError;

/// Tags may run up to this many times the particle count
const TAG_SPAN_FACTOR: usize = 8;

/// Tags below this are always accepted, however few particles there are
const MIN_TAG_SPAN: usize = 1 << 16;

/// Maps stable particle tags to their current storage index and back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdTable {
    /// Storage index for each tag, `None` if the tag is not stored here
    index_of_tag: Vec<Option<u32>>,
    /// Tag for each storage index
    tag_of_index: Vec<u32>,
}

impl IdTable {
    /// Build the table from the tag stored at each index
    ///
    /// The lookup is dense in the tag, so tags must stay below a span
    /// proportional to the number of particles. Fails if a tag appears twice.
    pub fn from_tags(tags: &[u32]) -> Result<Self, HelfrichError> {
        let limit = tags.len().saturating_mul(TAG_SPAN_FACTOR).max(MIN_TAG_SPAN);
        let span = match tags.iter().copied().max() {
            Some(tag) if tag as usize >= limit => {
                log::error!("tag {} exceeds the dense id table limit {}", tag, limit);
                return Err(HelfrichError::TagOutOfRange { tag, limit });
            }
            Some(tag) => tag as usize + 1,
            None => 0,
        };
        let mut index_of_tag = vec![None; span];

        for (index, &tag) in tags.iter().enumerate() {
            let slot = &mut index_of_tag[tag as usize];
            if slot.is_some() {
                return Err(HelfrichError::InvalidPermutation(tags.len()));
            }
            *slot = Some(index as u32);
        }

        Ok(Self {
            index_of_tag,
            tag_of_index: tags.to_vec(),
        })
    }

    /// Storage index of `tag`
    #[inline]
    pub fn index_of(&self, tag: u32) -> Option<usize> {
        self.index_of_tag
            .get(tag as usize)
            .copied()
            .flatten()
            .map(|i| i as usize)
    }

    /// Tag stored at `index`
    #[inline]
    pub fn tag_of(&self, index: usize) -> Option<u32> {
        self.tag_of_index.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.tag_of_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tag_of_index.is_empty()
    }

    /// Largest tag stored, if any
    pub fn max_tag(&self) -> Option<u32> {
        self.tag_of_index.iter().copied().max()
    }

    /// Tags in storage order
    pub fn tags(&self) -> &[u32] {
        &self.tag_of_index
    }
}
