use crate::api::CourseId;

/// Compute the ordering that results from dropping `moved` onto the slot
/// currently held by `target`.
///
/// Returns `None` when the move is a no-op: either id is missing from
/// `current`, or `moved == target`. The moved id is removed first, then
/// inserted at the target's original position.
pub fn moved_order(
    current: &[CourseId],
    moved: CourseId,
    target: CourseId,
) -> Option<Vec<CourseId>> {
    if moved == target {
        return None;
    }
    let from = current.iter().position(|&id| id == moved)?;
    let to = current.iter().position(|&id| id == target)?;

    let mut order = current.to_vec();
    order.remove(from);
    // Position of `target` after the removal.
    let insert_at = if from < to { to - 1 } else { to };
    order.insert(insert_at, moved);
    Some(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_forward() {
        assert_eq!(moved_order(&[1, 2, 3, 4], 1, 3), Some(vec![2, 1, 3, 4]));
    }

    #[test]
    fn test_move_backward() {
        assert_eq!(moved_order(&[1, 2, 3, 4], 4, 2), Some(vec![1, 4, 2, 3]));
    }

    #[test]
    fn test_move_to_ends() {
        assert_eq!(moved_order(&[1, 2, 3], 3, 1), Some(vec![3, 1, 2]));
        assert_eq!(moved_order(&[1, 2, 3], 1, 3), Some(vec![2, 1, 3]));
    }

    #[test]
    fn test_noop_moves() {
        assert_eq!(moved_order(&[1, 2, 3], 2, 2), None);
        assert_eq!(moved_order(&[1, 2, 3], 9, 2), None);
        assert_eq!(moved_order(&[1, 2, 3], 1, 9), None);
    }

    #[test]
    fn test_adjacent_swap() {
        assert_eq!(moved_order(&[1, 2], 1, 2), Some(vec![2, 1]));
        assert_eq!(moved_order(&[1, 2], 2, 1), Some(vec![2, 1]));
    }
}
