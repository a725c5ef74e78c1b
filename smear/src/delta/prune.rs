use crate::{BoneHierarchy, Error};

/// Bones discarded when the user prunes the skeleton at `selected`: every descendant of each
/// selected bone. The selected bones themselves stay. Returned sorted and deduplicated.
pub fn discard_descendants(hierarchy: &BoneHierarchy, selected: &[usize]) -> Vec<usize> {
    let mut discarded = Vec::new();
    for &bone in selected {
        discarded.extend(hierarchy.descendants(bone));
    }
    discarded.sort_unstable();
    discarded.dedup();
    discarded
}

/// Representative bone for every bone of `hierarchy`.
///
/// Kept bones represent themselves. A discarded bone is represented by its nearest ancestor that
/// is not discarded. The walk is bounded by the bone count so a malformed hierarchy fails instead
/// of looping.
pub fn resolve_representatives(
    hierarchy: &BoneHierarchy,
    discarded: &[usize],
) -> Result<Vec<usize>, Error> {
    let bone_count = hierarchy.len();
    let mut is_discarded = vec![false; bone_count];
    for &bone in discarded {
        let slot = is_discarded
            .get_mut(bone)
            .ok_or(Error::UnknownBone { bone, bone_count })?;
        *slot = true;
    }

    let mut representatives = Vec::with_capacity(bone_count);
    for bone in 0..bone_count {
        if !is_discarded[bone] {
            representatives.push(bone);
            continue;
        }

        let mut current = bone;
        let mut steps = 0usize;
        let representative = loop {
            let parent = hierarchy
                .parent(current)
                .ok_or(Error::NoKeptAncestor { bone })?;
            if !is_discarded[parent] {
                break parent;
            }
            steps += 1;
            if steps >= bone_count {
                return Err(Error::HierarchyCycle { bone });
            }
            current = parent;
        };
        representatives.push(representative);
    }

    Ok(representatives)
}
