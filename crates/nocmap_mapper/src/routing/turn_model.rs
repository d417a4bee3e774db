//! Legal next-hop directions under the West-First and Odd-Even turn models.
//!
//! Both models only produce minimal paths. At every hop at most one
//! horizontal and one vertical direction can be legal; when both are,
//! [`choose_direction`] picks the less loaded one.

use super::TurnModel;
use crate::topology::Direction;
use nocmap_common::{approximately_equal, definitely_less};

/// The directions a packet may take from its current node.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Candidates {
    /// East or west, if legal.
    pub horizontal: Option<Direction>,
    /// North or south, if legal.
    pub vertical: Option<Direction>,
}

impl Candidates {
    /// Returns `true` when no direction is legal.
    pub fn is_empty(&self) -> bool {
        self.horizontal.is_none() && self.vertical.is_none()
    }
}

fn toward_column(cur_col: u32, dst_col: u32) -> Option<Direction> {
    match dst_col.cmp(&cur_col) {
        std::cmp::Ordering::Greater => Some(Direction::East),
        std::cmp::Ordering::Less => Some(Direction::West),
        std::cmp::Ordering::Equal => None,
    }
}

fn toward_row(cur_row: u32, dst_row: u32) -> Option<Direction> {
    match dst_row.cmp(&cur_row) {
        std::cmp::Ordering::Greater => Some(Direction::South),
        std::cmp::Ordering::Less => Some(Direction::North),
        std::cmp::Ordering::Equal => None,
    }
}

/// Returns the legal minimal directions at `cur` for a packet travelling from
/// `src` to `dst`. Positions are `(row, col)`.
pub fn legal_directions(
    model: TurnModel,
    src: (u32, u32),
    cur: (u32, u32),
    dst: (u32, u32),
) -> Candidates {
    let horizontal = toward_column(cur.1, dst.1);
    let vertical = toward_row(cur.0, dst.0);
    match model {
        TurnModel::WestFirst => west_first(horizontal, vertical),
        TurnModel::OddEven => odd_even(src.1, cur.1, dst.1, horizontal, vertical),
    }
}

fn west_first(horizontal: Option<Direction>, vertical: Option<Direction>) -> Candidates {
    if horizontal == Some(Direction::West) {
        // Westward hops must all come before any turn.
        return Candidates {
            horizontal,
            vertical: None,
        };
    }
    Candidates {
        horizontal,
        vertical,
    }
}

fn odd_even(
    src_col: u32,
    cur_col: u32,
    dst_col: u32,
    horizontal: Option<Direction>,
    vertical: Option<Direction>,
) -> Candidates {
    let odd = |col: u32| col % 2 == 1;
    match horizontal {
        None => Candidates {
            horizontal: None,
            vertical,
        },
        Some(Direction::East) => {
            if vertical.is_none() {
                return Candidates {
                    horizontal,
                    vertical: None,
                };
            }
            // East-to-vertical turns are illegal in even columns, so turning
            // is only allowed in odd columns or before the first hop. Entering
            // an even destination column from its neighbour would force such
            // a turn.
            let may_turn = odd(cur_col) || cur_col == src_col;
            let may_go_east = odd(dst_col) || dst_col - cur_col != 1;
            Candidates {
                horizontal: may_go_east.then_some(Direction::East),
                vertical: if may_turn { vertical } else { None },
            }
        }
        Some(_) => {
            // Vertical-to-west turns are illegal in odd columns.
            Candidates {
                horizontal,
                vertical: if odd(cur_col) { None } else { vertical },
            }
        }
    }
}

/// Picks one direction out of the legal candidates.
///
/// A single candidate is taken as is. Otherwise the direction whose outgoing
/// link carries less bandwidth wins; equal usage favours the axis with the
/// longer remaining squared distance, and the horizontal axis on a full tie.
pub fn choose_direction(
    candidates: Candidates,
    horizontal_usage: f64,
    vertical_usage: f64,
    cur: (u32, u32),
    dst: (u32, u32),
) -> Option<Direction> {
    match (candidates.horizontal, candidates.vertical) {
        (None, None) => None,
        (Some(h), None) => Some(h),
        (None, Some(v)) => Some(v),
        (Some(h), Some(v)) => {
            if definitely_less(horizontal_usage, vertical_usage) {
                return Some(h);
            }
            if definitely_less(vertical_usage, horizontal_usage) {
                return Some(v);
            }
            debug_assert!(approximately_equal(horizontal_usage, vertical_usage));
            let dx = u64::from(cur.1.abs_diff(dst.1));
            let dy = u64::from(cur.0.abs_diff(dst.0));
            if dy * dy > dx * dx {
                Some(v)
            } else {
                Some(h)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn west_first_goes_west_only() {
        let c = legal_directions(TurnModel::WestFirst, (0, 3), (0, 3), (2, 0));
        assert_eq!(c.horizontal, Some(Direction::West));
        assert_eq!(c.vertical, None);
    }

    #[test]
    fn west_first_adaptive_eastward() {
        let c = legal_directions(TurnModel::WestFirst, (2, 0), (2, 0), (0, 3));
        assert_eq!(c.horizontal, Some(Direction::East));
        assert_eq!(c.vertical, Some(Direction::North));
    }

    #[test]
    fn west_first_same_column() {
        let c = legal_directions(TurnModel::WestFirst, (0, 1), (0, 1), (3, 1));
        assert_eq!(c.horizontal, None);
        assert_eq!(c.vertical, Some(Direction::South));
    }

    #[test]
    fn odd_even_no_turn_from_even_column_after_east() {
        // Arrived at column 2 (even) travelling east from column 0.
        let c = legal_directions(TurnModel::OddEven, (0, 0), (0, 2), (3, 4));
        assert_eq!(c.vertical, None);
        assert_eq!(c.horizontal, Some(Direction::East));
    }

    #[test]
    fn odd_even_turn_allowed_in_odd_column() {
        let c = legal_directions(TurnModel::OddEven, (0, 0), (0, 1), (3, 4));
        assert_eq!(c.vertical, Some(Direction::South));
        assert_eq!(c.horizontal, Some(Direction::East));
    }

    #[test]
    fn odd_even_source_column_may_turn() {
        let c = legal_directions(TurnModel::OddEven, (0, 2), (0, 2), (3, 4));
        assert_eq!(c.vertical, Some(Direction::South));
    }

    #[test]
    fn odd_even_even_destination_neighbour() {
        // Destination column 2 is even and one step east: must turn first.
        let c = legal_directions(TurnModel::OddEven, (0, 1), (0, 1), (3, 2));
        assert_eq!(c.horizontal, None);
        assert_eq!(c.vertical, Some(Direction::South));
    }

    #[test]
    fn odd_even_westward_vertical_only_in_even_columns() {
        let odd = legal_directions(TurnModel::OddEven, (0, 3), (0, 3), (2, 0));
        assert_eq!(odd.horizontal, Some(Direction::West));
        assert_eq!(odd.vertical, None);
        let even = legal_directions(TurnModel::OddEven, (0, 3), (0, 2), (2, 0));
        assert_eq!(even.horizontal, Some(Direction::West));
        assert_eq!(even.vertical, Some(Direction::South));
    }

    #[test]
    fn candidates_never_empty_before_arrival() {
        for model in [TurnModel::WestFirst, TurnModel::OddEven] {
            for src_col in 0..5 {
                for cur_col in 0..5 {
                    for dst in [(0, 0), (0, 4), (4, 2), (2, 3)] {
                        let cur = (2, cur_col);
                        if cur == dst {
                            continue;
                        }
                        let c = legal_directions(model, (2, src_col), cur, dst);
                        // Only columns reachable from src along a minimal path matter.
                        let between = (src_col <= cur_col && cur_col <= dst.1)
                            || (dst.1 <= cur_col && cur_col <= src_col);
                        if between {
                            assert!(!c.is_empty(), "{model:?} {src_col} {cur:?} {dst:?}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn choose_prefers_lower_usage() {
        let c = Candidates {
            horizontal: Some(Direction::East),
            vertical: Some(Direction::South),
        };
        assert_eq!(
            choose_direction(c, 5.0, 1.0, (0, 0), (3, 3)),
            Some(Direction::South)
        );
        assert_eq!(
            choose_direction(c, 1.0, 5.0, (0, 0), (3, 3)),
            Some(Direction::East)
        );
    }

    #[test]
    fn choose_tie_prefers_longer_axis() {
        let c = Candidates {
            horizontal: Some(Direction::East),
            vertical: Some(Direction::South),
        };
        assert_eq!(
            choose_direction(c, 2.0, 2.0, (0, 0), (3, 1)),
            Some(Direction::South)
        );
        assert_eq!(
            choose_direction(c, 2.0, 2.0, (0, 0), (1, 3)),
            Some(Direction::East)
        );
        assert_eq!(
            choose_direction(c, 2.0, 2.0, (0, 0), (2, 2)),
            Some(Direction::East)
        );
    }

    #[test]
    fn choose_single_candidate() {
        let c = Candidates {
            horizontal: None,
            vertical: Some(Direction::North),
        };
        assert_eq!(
            choose_direction(c, 0.0, 100.0, (3, 0), (0, 0)),
            Some(Direction::North)
        );
        assert_eq!(
            choose_direction(Candidates::default(), 0.0, 0.0, (0, 0), (0, 0)),
            None
        );
    }
}
