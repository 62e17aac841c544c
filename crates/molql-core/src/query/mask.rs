/// Membership predicate over the atoms `0..size` of one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mask {
    /// Every atom is a member.
    Always { size: usize },
    /// Sorted, duplicate-free members. Used when few atoms are selected.
    Sparse { size: usize, members: Vec<usize> },
    /// One flag per atom.
    Dense {
        size: usize,
        flags: Vec<bool>,
        count: usize,
    },
}

impl Mask {
    /// Creates a mask containing every atom of a model.
    ///
    /// # Arguments
    ///
    /// * `size` - The model's atom count.
    ///
    /// # Return
    ///
    /// A mask whose membership test is a bounds check against `size`.
    pub fn always(size: usize) -> Self {
        Self::Always { size }
    }

    /// Builds a mask from arbitrary indices.
    ///
    /// Picks a flag vector when the indices cover more than an eighth of the atoms, and a
    /// sorted member list otherwise.
    ///
    /// # Arguments
    ///
    /// * `size` - The model's atom count.
    /// * `indices` - Member atoms. Duplicates collapse and indices outside `0..size` are ignored.
    ///
    /// # Return
    ///
    /// Either a [`Mask::Dense`] or a [`Mask::Sparse`] with the same membership.
    pub fn of_indices(size: usize, indices: &[usize]) -> Self {
        if indices.len().saturating_mul(8) > size {
            let mut flags = vec![false; size];
            let mut count = 0;
            for &i in indices {
                if i < size && !flags[i] {
                    flags[i] = true;
                    count += 1;
                }
            }
            Self::Dense { size, flags, count }
        } else {
            let mut members: Vec<usize> = indices.iter().copied().filter(|&i| i < size).collect();
            members.sort_unstable();
            members.dedup();
            Self::Sparse { size, members }
        }
    }

    /// The atom count of the model the mask covers, independent of membership.
    pub fn size(&self) -> usize {
        match self {
            Self::Always { size } | Self::Sparse { size, .. } | Self::Dense { size, .. } => *size,
        }
    }

    /// Tests whether `atom` is a member.
    ///
    /// # Arguments
    ///
    /// * `atom` - The atom index to test.
    ///
    /// # Return
    ///
    /// Returns `true` if `atom` is a member. Indices at or past [`size`](Self::size)
    /// are never members.
    pub fn has(&self, atom: usize) -> bool {
        match self {
            Self::Always { size } => atom < *size,
            Self::Sparse { members, .. } => members.binary_search(&atom).is_ok(),
            Self::Dense { flags, .. } => flags.get(atom).copied().unwrap_or(false),
        }
    }

    /// Number of member atoms.
    pub fn count(&self) -> usize {
        match self {
            Self::Always { size } => *size,
            Self::Sparse { members, .. } => members.len(),
            Self::Dense { count, .. } => *count,
        }
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Self::Always { .. })
    }

    /// Member atoms in ascending order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = usize> + '_> {
        match self {
            Self::Always { size } => Box::new(0..*size),
            Self::Sparse { members, .. } => Box::new(members.iter().copied()),
            Self::Dense { flags, .. } => Box::new(
                flags
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &member)| member.then_some(i)),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_contains_every_atom_in_range() {
        let mask = Mask::always(4);
        assert!(mask.has(0));
        assert!(mask.has(3));
        assert!(!mask.has(4));
        assert_eq!(mask.count(), 4);
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn sparse_mask_deduplicates_and_sorts() {
        let mask = Mask::of_indices(100, &[7, 3, 7, 250]);
        assert!(matches!(mask, Mask::Sparse { .. }));
        assert_eq!(mask.count(), 2);
        assert!(mask.has(3));
        assert!(!mask.has(4));
        assert!(!mask.has(250));
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![3, 7]);
    }

    #[test]
    fn dense_mask_counts_distinct_members() {
        let mask = Mask::of_indices(6, &[5, 5, 2, 5]);
        assert!(matches!(mask, Mask::Dense { .. }));
        assert_eq!(mask.count(), 2);
        assert_eq!(mask.size(), 6);
        assert!(mask.has(2));
        assert!(!mask.has(3));
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![2, 5]);
    }

    #[test]
    fn empty_selection_has_no_members() {
        let mask = Mask::of_indices(10, &[]);
        assert_eq!(mask.count(), 0);
        assert_eq!(mask.iter().next(), None);
    }
}
