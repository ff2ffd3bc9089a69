//! The three reduction policies.
//!
//! Every policy walks the columns from weight 0 upward and consumes only the
//! current stage's untouched bits, oldest first. A carry produced for column
//! `c + 1` is appended to the next heap before that column's own turn, so a
//! column sees the carries-in from its lower neighbour when deciding what to
//! schedule. The top column never receives a cell: there is no column above
//! it to carry into.

use crate::bit::Bit;
use crate::cell::{CellKind, CompressorCell, Consumption};
use crate::heap::{BitHeap, HeapColumn};
use crate::trace::{StageObserver, TraceEvent};

/// Accumulates one stage transition: the next heap snapshot, the cells
/// placed, and the per-kind sequence counters that make cell names unique
/// within the stage.
struct StageBuilder<'a> {
    stage: usize,
    next: BitHeap,
    cells: Vec<CompressorCell>,
    fa_seq: usize,
    ha_seq: usize,
    observer: &'a mut dyn StageObserver,
}

impl<'a> StageBuilder<'a> {
    fn new(width: usize, stage: usize, observer: &'a mut dyn StageObserver) -> StageBuilder<'a> {
        StageBuilder {
            stage,
            next: BitHeap::new(width),
            cells: Vec::new(),
            fa_seq: 0,
            ha_seq: 0,
            observer,
        }
    }

    /// Height already placed in the next heap at `column` (cell outputs and
    /// carries-in from the column below).
    fn placed(&self, column: usize) -> usize {
        self.next.height(column)
    }

    fn place(&mut self, column: usize, kind: CellKind, inputs: Vec<Bit>, start: usize) {
        debug_assert_eq!(inputs.len(), kind.arity());
        let sequence = match kind {
            CellKind::FullAdder => {
                self.fa_seq += 1;
                self.fa_seq - 1
            }
            CellKind::HalfAdder => {
                self.ha_seq += 1;
                self.ha_seq - 1
            }
        };
        let cell = CompressorCell {
            stage: self.stage,
            column,
            sequence,
            kind,
            inputs,
        };
        self.next.add_bit(column, cell.sum_bit());
        self.next.add_bit(column + 1, cell.carry_bit());
        self.next.record_consumption(Consumption {
            column,
            start,
            kind,
            sequence,
        });
        self.observer.on_event(&TraceEvent::CellPlaced {
            stage: self.stage,
            column,
            kind,
            sequence,
            start,
        });
        self.cells.push(cell);
    }

    fn passthrough(&mut self, column: usize, bits: impl IntoIterator<Item = Bit>) {
        for bit in bits {
            self.next.add_bit(column, bit);
        }
    }

    fn finish(self) -> (BitHeap, Vec<CompressorCell>) {
        (self.next, self.cells)
    }
}

/// Dadda (as-late-as-possible): schedule only the cells needed to bring each
/// column down to the stage target, preferring a single half adder when the
/// column is exactly one over.
pub(crate) fn dadda_stage(
    heap: &BitHeap,
    stage: usize,
    target: usize,
    observer: &mut dyn StageObserver,
) -> (BitHeap, Vec<CompressorCell>) {
    let width = heap.width();
    let mut builder = StageBuilder::new(width, stage, observer);

    for col in 0..width {
        let mut working: HeapColumn = heap.column(col).clone();
        let mut index = 0;

        if col < width - 1 {
            while working.height() >= 3 && working.height() + builder.placed(col) > target {
                if working.height() + builder.placed(col) == target + 1 {
                    // One over target: a half adder retires the excess.
                    break;
                }
                let inputs = working.take_front(3);
                builder.place(col, CellKind::FullAdder, inputs, index);
                index += 3;
            }

            if working.height() >= 2 && working.height() + builder.placed(col) == target + 1 {
                let inputs = working.take_front(2);
                builder.place(col, CellKind::HalfAdder, inputs, index);
            }
        }

        builder.passthrough(col, working.into_bits());
    }

    builder.finish()
}

/// Bickerstaff (as-soon-as-possible): every complete group of three goes into
/// a full adder immediately. A trailing pair is retired with a half adder
/// when passthrough would still exceed the target, or when the column is the
/// lowest-weight one left holding a pair, so that pairs do not drift upward
/// forever.
pub(crate) fn bickerstaff_stage(
    heap: &BitHeap,
    stage: usize,
    target: usize,
    observer: &mut dyn StageObserver,
) -> (BitHeap, Vec<CompressorCell>) {
    let width = heap.width();
    let rightmost_pair = (0..width).find(|&col| heap.height(col) % 3 == 2);
    let mut builder = StageBuilder::new(width, stage, observer);

    for col in 0..width {
        let mut working: HeapColumn = heap.column(col).clone();
        let mut index = 0;

        if col < width - 1 {
            while working.height() >= 3 {
                let inputs = working.take_front(3);
                builder.place(col, CellKind::FullAdder, inputs, index);
                index += 3;
            }

            if working.height() == 2 {
                let current = working.height() + builder.placed(col);
                if current > target || rightmost_pair == Some(col) {
                    let inputs = working.take_front(2);
                    builder.place(col, CellKind::HalfAdder, inputs, index);
                }
            }
        }

        builder.passthrough(col, working.into_bits());
    }

    builder.finish()
}

/// FA-only greedy: groups of three into full adders, no half adders, no
/// target. The caller repeats stages until no column below the top holds
/// three or more bits.
pub(crate) fn fa_only_stage(
    heap: &BitHeap,
    stage: usize,
    observer: &mut dyn StageObserver,
) -> (BitHeap, Vec<CompressorCell>) {
    let width = heap.width();
    let mut builder = StageBuilder::new(width, stage, observer);

    for col in 0..width {
        let mut working: HeapColumn = heap.column(col).clone();
        let mut index = 0;

        if col < width - 1 {
            while working.height() >= 3 {
                let inputs = working.take_front(3);
                builder.place(col, CellKind::FullAdder, inputs, index);
                index += 3;
            }
        }

        builder.passthrough(col, working.into_bits());
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit::BitKind;
    use crate::trace::NullObserver;

    fn stacked_heap(width: usize, heights: &[usize]) -> BitHeap {
        let mut heap = BitHeap::new(width);
        for (col, &height) in heights.iter().enumerate() {
            for i in 0..height {
                heap.add_bit(col, Bit::normal(format!("x{col}_{i}")));
            }
        }
        heap
    }

    fn fa_count(cells: &[CompressorCell]) -> usize {
        cells.iter().filter(|c| c.kind == CellKind::FullAdder).count()
    }

    #[test]
    fn test_dadda_uses_half_adder_when_one_over() {
        let heap = stacked_heap(3, &[3, 0, 0]);
        let (next, cells) = dadda_stage(&heap, 0, 2, &mut NullObserver);
        // 3 bits against target 2 is one over: HA, not FA.
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].kind, CellKind::HalfAdder);
        assert_eq!(next.height(0), 2);
        assert_eq!(next.height(1), 1);
    }

    #[test]
    fn test_dadda_counts_carries_in_before_scheduling() {
        let heap = stacked_heap(3, &[3, 3, 0]);
        let (next, cells) = dadda_stage(&heap, 0, 2, &mut NullObserver);
        // Column 0 retires a pair; its carry makes column 1 four high, which
        // forces a full adder there instead of a half adder.
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].kind, CellKind::HalfAdder);
        assert_eq!(cells[0].column, 0);
        assert_eq!(cells[1].kind, CellKind::FullAdder);
        assert_eq!(cells[1].column, 1);
        assert_eq!(next.height(0), 2);
        assert_eq!(next.height(1), 2);
        assert_eq!(next.height(2), 1);
    }

    #[test]
    fn test_dadda_consumes_oldest_first() {
        let heap = stacked_heap(2, &[4, 0]);
        let (next, cells) = dadda_stage(&heap, 0, 2, &mut NullObserver);
        // Four against target 2 is two over: one FA, eating the head of the
        // column.
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].kind, CellKind::FullAdder);
        let names: Vec<&str> = cells[0].inputs.iter().map(Bit::name).collect();
        assert_eq!(names, vec!["x0_0", "x0_1", "x0_2"]);
        assert_eq!(next.height(0), 2);
    }

    #[test]
    fn test_dadda_leaves_top_column_alone() {
        let heap = stacked_heap(2, &[0, 5]);
        let (next, cells) = dadda_stage(&heap, 0, 2, &mut NullObserver);
        assert!(cells.is_empty());
        assert_eq!(next.height(1), 5);
    }

    #[test]
    fn test_bickerstaff_retires_rightmost_pair() {
        // Both pairs fit the target; only the lowest-weight one is retired.
        let heap = stacked_heap(4, &[2, 0, 2, 0]);
        let (next, cells) = bickerstaff_stage(&heap, 0, 2, &mut NullObserver);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].kind, CellKind::HalfAdder);
        assert_eq!(cells[0].column, 0);
        assert_eq!(next.height(0), 1);
        assert_eq!(next.height(1), 1);
        assert_eq!(next.height(2), 2);
    }

    #[test]
    fn test_bickerstaff_fills_full_adders_eagerly() {
        let heap = stacked_heap(3, &[7, 0, 0]);
        let (next, cells) = bickerstaff_stage(&heap, 0, 6, &mut NullObserver);
        // Two FAs immediately; the leftover bit passes through.
        assert_eq!(fa_count(&cells), 2);
        assert_eq!(next.height(0), 3);
        assert_eq!(next.height(1), 2);
    }

    #[test]
    fn test_fa_only_ignores_pairs() {
        let heap = stacked_heap(3, &[8, 2, 0]);
        let (next, cells) = fa_only_stage(&heap, 0, &mut NullObserver);
        assert_eq!(fa_count(&cells), 2);
        assert_eq!(cells.len(), 2);
        assert_eq!(next.height(0), 4);
        assert_eq!(next.height(1), 4);
    }

    #[test]
    fn test_full_adder_reduces_total_by_one() {
        let heap = stacked_heap(4, &[6, 4, 3, 1]);
        let before = heap.total_bits();
        let (next, cells) = fa_only_stage(&heap, 0, &mut NullObserver);
        assert_eq!(next.total_bits(), before - fa_count(&cells));
    }

    #[test]
    fn test_consumption_records_cover_consumed_bits() {
        let heap = stacked_heap(3, &[8, 5, 0]);
        let (next, cells) = bickerstaff_stage(&heap, 0, 4, &mut NullObserver);
        assert_eq!(next.consumed().len(), cells.len());
        for record in next.consumed() {
            // Every record points at a full input group inside the pre-stage
            // column.
            assert!(record.start + record.kind.arity() <= heap.height(record.column));
        }
        // Column 0: two FAs at 0 and 3, then the pair at 6 (over target).
        let starts: Vec<usize> = next
            .consumed()
            .iter()
            .filter(|r| r.column == 0)
            .map(|r| r.start)
            .collect();
        assert_eq!(starts, vec![0, 3, 6]);
    }

    #[test]
    fn test_cell_outputs_are_typed() {
        let heap = stacked_heap(2, &[3, 0]);
        let (next, _) = fa_only_stage(&heap, 2, &mut NullObserver);
        assert_eq!(next.column(0).bits()[0].kind(), BitKind::FaSum);
        assert_eq!(next.column(0).bits()[0].name(), "fa_s2_c0_n0_s");
        assert_eq!(next.column(1).bits()[0].kind(), BitKind::FaCarry);
        assert_eq!(next.column(1).bits()[0].name(), "fa_s2_c0_n0_c");
    }
}
