//! Particle positions with owned and ghost copies.

use glam::DVec3;

use super::IdTable;
use crate::error::HelfrichError;

/// Particle position storage
///
/// Indices `0..n_local` are owned by this process; the remaining indices are
/// ghost copies that may be read but never receive forces.
#[derive(Debug, Clone)]
pub struct ParticleData {
    positions: Vec<DVec3>,
    ids: IdTable,
    n_local: usize,
}

impl ParticleData {
    /// All particles owned, particle `i` gets tag `i`
    pub fn new(positions: Vec<DVec3>) -> Self {
        let n = positions.len();
        Self::with_ghosts(positions, n)
    }

    /// The first `n_local` particles are owned, the rest are ghosts
    pub fn with_ghosts(positions: Vec<DVec3>, n_local: usize) -> Self {
        let tags: Vec<u32> = (0..positions.len() as u32).collect();
        let ids = IdTable::from_tags(&tags).unwrap_or_default();
        Self {
            n_local: n_local.min(positions.len()),
            positions,
            ids,
        }
    }

    /// Build from explicit tags, stored in the given order
    pub fn from_tagged(
        positions: Vec<DVec3>,
        tags: &[u32],
        n_local: usize,
    ) -> Result<Self, HelfrichError> {
        if tags.len() != positions.len() {
            return Err(HelfrichError::InvalidPermutation(positions.len()));
        }
        let ids = IdTable::from_tags(tags)?;
        Ok(Self {
            n_local: n_local.min(positions.len()),
            positions,
            ids,
        })
    }

    /// Positions in storage order
    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    /// Position of the particle with `tag`
    pub fn position_of(&self, tag: u32) -> Option<DVec3> {
        self.index_of(tag).map(|i| self.positions[i])
    }

    /// Move the particle with `tag`
    pub fn set_position(&mut self, tag: u32, position: DVec3) -> Result<(), HelfrichError> {
        let index = self.index_of(tag).ok_or(HelfrichError::UnknownTag(tag))?;
        self.positions[index] = position;
        Ok(())
    }

    #[inline]
    pub fn index_of(&self, tag: u32) -> Option<usize> {
        self.ids.index_of(tag)
    }

    #[inline]
    pub fn tag_of(&self, index: usize) -> Option<u32> {
        self.ids.tag_of(index)
    }

    /// Number of owned particles
    pub fn n_local(&self) -> usize {
        self.n_local
    }

    /// Number of ghost particles
    pub fn n_ghosts(&self) -> usize {
        self.positions.len() - self.n_local
    }

    /// Owned plus ghost particles
    pub fn n_total(&self) -> usize {
        self.positions.len()
    }

    pub fn max_tag(&self) -> Option<u32> {
        self.ids.max_tag()
    }

    #[inline]
    pub fn is_local(&self, index: usize) -> bool {
        index < self.n_local
    }

    /// Reorder storage so that new index `i` holds old index `order[i]`
    ///
    /// The order must permute the owned and ghost ranges separately. The id
    /// table is rebuilt afterwards.
    pub fn reorder(&mut self, order: &[usize]) -> Result<(), HelfrichError> {
        let n = self.positions.len();
        let invalid = HelfrichError::InvalidPermutation(n);
        if order.len() != n {
            return Err(invalid);
        }

        let mut seen = vec![false; n];
        for (new, &old) in order.iter().enumerate() {
            if old >= n || seen[old] || (new < self.n_local) != (old < self.n_local) {
                return Err(invalid);
            }
            seen[old] = true;
        }

        let positions = order.iter().map(|&old| self.positions[old]).collect();
        let tags: Vec<u32> = order.iter().map(|&old| self.ids.tags()[old]).collect();
        self.ids = IdTable::from_tags(&tags)?;
        self.positions = positions;

        log::trace!("reordered {} particles", n);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<DVec3> {
        (0..n).map(|i| DVec3::new(i as f64, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_ghost_counts() {
        let pdata = ParticleData::with_ghosts(line(5), 3);
        assert_eq!(pdata.n_local(), 3);
        assert_eq!(pdata.n_ghosts(), 2);
        assert!(pdata.is_local(2));
        assert!(!pdata.is_local(3));
    }

    #[test]
    fn test_reorder_keeps_tags() {
        let mut pdata = ParticleData::new(line(4));
        pdata.reorder(&[2, 0, 3, 1]).unwrap();
        assert_eq!(pdata.index_of(2), Some(0));
        assert_eq!(pdata.tag_of(3), Some(1));
        assert_eq!(pdata.position_of(3), Some(DVec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn test_reorder_rejects_mixing_ghosts() {
        let mut pdata = ParticleData::with_ghosts(line(4), 2);
        assert!(pdata.reorder(&[3, 1, 2, 0]).is_err());
        assert!(pdata.reorder(&[0, 0, 2, 3]).is_err());
        assert!(pdata.reorder(&[1, 0, 3, 2]).is_ok());
    }

    #[test]
    fn test_set_position_unknown_tag() {
        let mut pdata = ParticleData::new(line(2));
        let err = pdata.set_position(7, DVec3::ZERO).unwrap_err();
        assert_eq!(err, HelfrichError::UnknownTag(7));
    }
}
