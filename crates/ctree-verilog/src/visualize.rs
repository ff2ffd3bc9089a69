//! Plain-text rendering of stage transitions for the console.

use ctree_core::{BitHeap, BitKind, CellKind, ReductionModel};

fn glyph(kind: BitKind) -> char {
    match kind {
        BitKind::Normal => '*',
        BitKind::InvertedMsb => '~',
        BitKind::FaSum | BitKind::FaCarry => 'F',
        BitKind::HaSum | BitKind::HaCarry => 'H',
    }
}

/// Dot-matrix view of a heap: one column per weight, MSB on the left.
pub fn render_heap(heap: &BitHeap) -> String {
    let mut out = String::new();
    let width = heap.width();
    let max = heap.max_height();

    out.push_str("  col:");
    for col in (0..width).rev() {
        out.push_str(&format!(" {col:2}"));
    }
    out.push('\n');

    for row in (0..max).rev() {
        out.push_str("      ");
        for col in (0..width).rev() {
            match heap.column(col).get(row) {
                Some(bit) => out.push_str(&format!("  {}", glyph(bit.kind()))),
                None => out.push_str("   "),
            }
        }
        out.push('\n');
    }

    out.push_str("  hgt:");
    for col in (0..width).rev() {
        out.push_str(&format!(" {:2}", heap.height(col)));
    }
    out.push('\n');
    out
}

/// One stage transition: the before/after heaps plus a per-column cell
/// summary taken from the recorded consumptions.
pub fn render_transition(
    before: &BitHeap,
    after: &BitHeap,
    stage: usize,
    target: Option<usize>,
) -> String {
    let mut out = String::new();
    match target {
        Some(target) => out.push_str(&format!(
            "Stage {} (target height {target})\n",
            stage + 1
        )),
        None => out.push_str(&format!("Stage {} (FA-only)\n", stage + 1)),
    }

    out.push_str("before:\n");
    out.push_str(&render_heap(before));
    out.push_str("after:\n");
    out.push_str(&render_heap(after));

    let fa_total = after
        .consumed()
        .iter()
        .filter(|r| r.kind == CellKind::FullAdder)
        .count();
    let ha_total = after.consumed().len() - fa_total;
    out.push_str(&format!("Total: {fa_total} full adders, {ha_total} half adders\n"));

    for col in 0..after.width() {
        let fa = after
            .consumed()
            .iter()
            .filter(|r| r.column == col && r.kind == CellKind::FullAdder)
            .count();
        let ha = after
            .consumed()
            .iter()
            .filter(|r| r.column == col && r.kind == CellKind::HalfAdder)
            .count();
        if fa + ha > 0 {
            let mut parts = Vec::new();
            if fa > 0 {
                parts.push(format!("{fa} FA"));
            }
            if ha > 0 {
                parts.push(format!("{ha} HA"));
            }
            out.push_str(&format!("  column {col:2}: {}\n", parts.join(", ")));
        }
    }
    out
}

/// Every transition of a built model, in order.
pub fn render_model(model: &ReductionModel) -> String {
    let mut out = String::new();
    out.push_str("Initial partial products (stage 0):\n");
    out.push_str(&render_heap(&model.stages()[0]));
    out.push('\n');

    for stage in 0..model.num_stages() {
        let target = model.targets().get(stage).copied();
        out.push_str(&render_transition(
            &model.stages()[stage],
            &model.stages()[stage + 1],
            stage,
            target,
        ));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctree_core::{Algorithm, Config, Encoding, ReductionModel};

    #[test]
    fn test_render_model_mentions_every_stage() {
        let config = Config::new(4, Encoding::Binary, Algorithm::Dadda).with_unsigned(true);
        let model = ReductionModel::build(config).unwrap();
        let text = render_model(&model);
        assert!(text.contains("Initial partial products (stage 0):"));
        assert!(text.contains("Stage 1 (target height 3)"));
        assert!(text.contains("Stage 2 (target height 2)"));
        assert!(text.contains("full adders"));
    }

    #[test]
    fn test_render_heap_heights_row() {
        let config = Config::new(4, Encoding::Binary, Algorithm::Dadda).with_unsigned(true);
        let model = ReductionModel::build(config).unwrap();
        let text = render_heap(&model.stages()[0]);
        // Heights 0,1,2,3,4,3,2,1 from MSB down to LSB.
        assert!(text.contains("hgt:  0  1  2  3  4  3  2  1"));
    }
}
