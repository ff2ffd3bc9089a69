//! Graphviz DOT export. Layout puts stage 0 at the top and the MSB columns
//! on the left.

use crate::error::{Error, Result};
use crate::verilog::passthrough_index;
use ctree_core::{BitKind, CellKind, ReductionModel};
use ctree_core::prefix::PrefixTree;
use std::collections::HashMap;

fn bit_color(kind: BitKind) -> &'static str {
    match kind {
        BitKind::Normal => "lightgray",
        BitKind::InvertedMsb => "lightpink",
        BitKind::FaSum | BitKind::FaCarry => "lightblue",
        BitKind::HaSum | BitKind::HaCarry => "lightyellow",
    }
}

/// Render the full stage history as a DOT digraph, one rank per stage, edges
/// following the recorded provenance.
pub fn compressor_dot(model: &ReductionModel, show_final_adder: bool) -> Result<String> {
    let mut dot = String::new();
    dot.push_str("digraph CompressorTree {\n");
    dot.push_str("  rankdir=TB;\n");
    dot.push_str("  ranksep=1.5;\n");
    dot.push_str("  nodesep=0.4;\n");
    dot.push_str("  node [shape=box, style=filled, fontname=\"Arial\"];\n");
    dot.push_str("  edge [fontname=\"Arial\", fontsize=10];\n");
    dot.push_str("  newrank=true;\n\n");

    let width = model.config().product_width();
    let mut node_id = 0usize;
    // grids[stage][col][idx] = DOT node name of that heap bit.
    let mut grids: Vec<Vec<Vec<String>>> = Vec::new();

    for (stage, heap) in model.stages().iter().enumerate() {
        dot.push_str(&format!("  // Stage {stage}\n"));
        dot.push_str("  {\n    rank=same;\n");
        let mut grid: Vec<Vec<String>> = vec![Vec::new(); width];
        for col in (0..width).rev() {
            for bit in heap.column(col).bits() {
                let name = format!("n{node_id}");
                node_id += 1;
                dot.push_str(&format!(
                    "    {name} [label=\"{}\", fillcolor=\"{}\"];\n",
                    bit.name(),
                    bit_color(bit.kind())
                ));
                grid[col].push(name);
            }
        }
        dot.push_str("  }\n\n");
        grids.push(grid);
    }

    for stage in 0..model.num_stages() {
        let prev = &model.stages()[stage];
        let next = &model.stages()[stage + 1];
        let starts: HashMap<(CellKind, usize, usize), usize> = next
            .consumed()
            .iter()
            .map(|r| ((r.kind, r.column, r.sequence), r.start))
            .collect();

        dot.push_str(&format!("  // Stage {} cells\n", stage + 1));
        for cell in model.cells().iter().filter(|c| c.stage == stage) {
            let instance = cell.instance_name();
            let color = match cell.kind {
                CellKind::FullAdder => "lightblue",
                CellKind::HalfAdder => "lightyellow",
            };
            dot.push_str(&format!(
                "  {instance} [label=\"{}\\nc{}\", fillcolor=\"{color}\"];\n",
                cell.kind, cell.column
            ));
            let start = starts[&(cell.kind, cell.column, cell.sequence)];
            for offset in 0..cell.kind.arity() {
                dot.push_str(&format!(
                    "  {} -> {instance};\n",
                    grids[stage][cell.column][start + offset]
                ));
            }
        }

        dot.push_str(&format!("  // Stage {} wiring\n", stage + 1));
        for col in 0..width {
            for (idx, bit) in next.column(col).bits().iter().enumerate() {
                let target = &grids[stage + 1][col][idx];
                if bit.kind().is_cell_output() && bit.name().contains(&format!("_s{stage}_")) {
                    // Output of a cell from this stage: instance name is the
                    // bit name minus the `_s`/`_c` suffix.
                    let instance = &bit.name()[..bit.name().len() - 2];
                    dot.push_str(&format!("  {instance} -> {target};\n"));
                } else {
                    let prev_idx =
                        passthrough_index(prev, col, bit.name()).ok_or_else(|| Error::Provenance {
                            name: bit.name().to_string(),
                            stage: stage + 1,
                            column: col,
                        })?;
                    dot.push_str(&format!(
                        "  {} -> {target} [style=dashed];\n",
                        grids[stage][col][prev_idx]
                    ));
                }
            }
        }
        dot.push('\n');
    }

    if show_final_adder {
        dot.push_str("  // Final carry-propagate addition\n");
        dot.push_str("  final_adder [label=\"sum + carry\", fillcolor=\"palegreen\"];\n");
        dot.push_str("  product [label=\"product\", fillcolor=\"palegreen\"];\n");
        let last = grids.last().unwrap();
        for col_nodes in last.iter() {
            for node in col_nodes {
                dot.push_str(&format!("  {node} -> final_adder;\n"));
            }
        }
        dot.push_str("  final_adder -> product;\n");
    }

    dot.push_str("}\n");
    Ok(dot)
}

/// Render a prefix tree as a DOT digraph, one rank per level.
pub fn prefix_dot(tree: &PrefixTree) -> String {
    let mut dot = String::new();
    dot.push_str("digraph PrefixTree {\n");
    dot.push_str("    rankdir=TB;\n");
    dot.push_str("    node [shape=circle];\n\n");

    for (level, nodes) in tree.levels().iter().enumerate() {
        dot.push_str(&format!("    // Level {level}\n"));
        dot.push_str("    {rank=same;\n");
        for node in nodes {
            let fill = if node.is_input {
                ", style=filled, fillcolor=lightblue"
            } else if node.is_buffer {
                ", style=filled, fillcolor=lightgray"
            } else {
                ""
            };
            dot.push_str(&format!(
                "        L{level}_{} [label=\"{}\"{fill}];\n",
                node.index, node.index
            ));
        }
        dot.push_str("    }\n\n");
    }

    for level in 1..=tree.max_level() {
        for node in &tree.levels()[level] {
            let (left_lvl, left_idx) = node.left;
            if node.is_buffer {
                dot.push_str(&format!(
                    "    L{left_lvl}_{left_idx} -> L{level}_{} [style=dashed];\n",
                    node.index
                ));
            } else {
                let (right_lvl, right_idx) = node.right;
                dot.push_str(&format!(
                    "    L{left_lvl}_{left_idx} -> L{level}_{} [color=blue];\n",
                    node.index
                ));
                dot.push_str(&format!(
                    "    L{right_lvl}_{right_idx} -> L{level}_{} [color=red];\n",
                    node.index
                ));
            }
        }
    }

    dot.push_str("}\n");
    dot
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctree_core::{Algorithm, Config, Encoding};
    use ctree_core::prefix::Technique;

    #[test]
    fn test_compressor_dot_structure() {
        let config = Config::new(4, Encoding::Binary, Algorithm::Dadda).with_unsigned(true);
        let model = ReductionModel::build(config).unwrap();
        let dot = compressor_dot(&model, true).unwrap();
        assert!(dot.starts_with("digraph CompressorTree {"));
        assert!(dot.contains("rank=same;"));
        assert!(dot.contains("fa_s0_c"));
        assert!(dot.contains("final_adder -> product;"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn test_prefix_dot_structure() {
        let tree = PrefixTree::build(4, Technique::KoggeStone, 0).unwrap();
        let dot = prefix_dot(&tree);
        assert!(dot.starts_with("digraph PrefixTree {"));
        assert!(dot.contains("L0_0 [label=\"0\", style=filled, fillcolor=lightblue];"));
        // Level 2, position 3 combines with position 1.
        assert!(dot.contains("L1_1 -> L2_3 [color=red];"));
    }
}
