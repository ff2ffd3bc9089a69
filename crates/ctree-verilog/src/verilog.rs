//! SystemVerilog generation from a built reduction model.
//!
//! Every bit of every stage is resolved back to its producer: either a cell
//! recorded for the previous stage transition, or an exact-name match in the
//! previous stage's column. Anything else is a hard error.

use crate::error::{Error, Result};
use ctree_core::{BitKind, CellKind, CompressorCell, Encoding, ReductionModel};
use std::collections::{HashMap, HashSet};

/// Generate the complete `compressor_tree` module with cell instantiations
/// and self-contained `fa`/`ha` definitions.
pub fn generate(model: &ReductionModel) -> Result<String> {
    let mut sv = String::new();

    header(&mut sv, model);
    module_declaration(&mut sv, model);
    wire_declarations(&mut sv, model);
    stage_signals(&mut sv, model);
    stage0_assignments(&mut sv, model);
    for stage in 0..model.num_stages() {
        reduction_stage(&mut sv, model, stage)?;
    }
    final_outputs(&mut sv, model)?;
    sv.push_str("endmodule\n");
    cell_definitions(&mut sv);

    Ok(sv)
}

fn header(sv: &mut String, model: &ReductionModel) {
    let config = model.config();
    sv.push_str("//\n");
    sv.push_str(&format!("// Compressor tree, {} reduction\n", config.algorithm));
    sv.push_str(&format!("// Input width: {} bits\n", config.width));
    sv.push_str(&format!("// Encoding: {}\n", config.encoding));
    sv.push_str(&format!(
        "// Type: {}\n",
        if config.unsigned { "unsigned" } else { "signed" }
    ));
    sv.push_str(&format!("// Partial products: {}\n", config.num_pp()));
    sv.push_str(&format!("// Product width: {}\n", config.product_width()));
    sv.push_str(&format!("// Reduction stages: {}\n", model.num_stages()));
    sv.push_str("//\n\n");
}

fn module_declaration(sv: &mut String, model: &ReductionModel) {
    let config = model.config();
    let num_pp = config.num_pp();
    let prod_width = config.product_width();

    sv.push_str("module compressor_tree #(\n");
    sv.push_str("    parameter PIPE = 0\n");
    sv.push_str(")(\n");
    sv.push_str("    input logic clk,\n");
    sv.push_str("    input logic rst,\n");

    match config.encoding {
        Encoding::Booth => {
            sv.push_str(&format!(
                "    input logic [{}:0][{}:0] pp,\n",
                num_pp - 1,
                config.width
            ));
            sv.push_str("    /* verilator lint_off ASCRANGE */\n");
            sv.push_str(&format!("    input logic [0:{}] cpl,\n", num_pp - 1));
            sv.push_str("    /* verilator lint_on ASCRANGE */\n");
        }
        Encoding::Binary => {
            sv.push_str(&format!(
                "    input logic [{}:0][{}:0] pp,\n",
                num_pp - 1,
                config.width - 1
            ));
        }
    }

    sv.push_str(&format!("    output logic [{}:0] sum,\n", prod_width - 1));
    sv.push_str(&format!("    output logic [{}:0] carry\n", prod_width - 1));
    sv.push_str(");\n\n");

    sv.push_str(&format!(
        "    parameter COMPRESSOR_TREE_STAGES = {};\n\n",
        model.num_stages()
    ));
}

fn wire_declarations(sv: &mut String, model: &ReductionModel) {
    sv.push_str("    // FA and HA output wires\n");
    for cell in model.full_adders().chain(model.half_adders()) {
        sv.push_str(&format!(
            "    logic {}, {};\n",
            cell.sum_name(),
            cell.carry_name()
        ));
    }
    sv.push('\n');
}

fn stage_signals(sv: &mut String, model: &ReductionModel) {
    for (stage, heap) in model.stages().iter().enumerate() {
        sv.push_str(&format!("    // Stage {stage} signals\n"));
        for col in 0..heap.width() {
            let height = heap.height(col);
            if height > 0 {
                sv.push_str(&format!(
                    "    logic [{}:0] stage{stage}_col{col};\n",
                    height - 1
                ));
            }
        }
        sv.push('\n');
    }
}

fn stage0_assignments(sv: &mut String, model: &ReductionModel) {
    sv.push_str("    // Stage 0: partial product assignment\n");
    let heap = &model.stages()[0];
    for col in 0..heap.width() {
        for (idx, bit) in heap.column(col).bits().iter().enumerate() {
            let rhs = if bit.is_literal_one() {
                "1'b1".to_string()
            } else if bit.kind() == BitKind::InvertedMsb {
                format!("~{}", bit.name())
            } else {
                bit.name().to_string()
            };
            sv.push_str(&format!("    assign stage0_col{col}[{idx}] = {rhs};\n"));
        }
    }
    sv.push('\n');
}

fn reduction_stage(sv: &mut String, model: &ReductionModel, stage: usize) -> Result<()> {
    sv.push_str(&format!("    // Stage {}: reduction\n", stage + 1));

    let next = &model.stages()[stage + 1];
    let starts: HashMap<(CellKind, usize, usize), usize> = next
        .consumed()
        .iter()
        .map(|r| ((r.kind, r.column, r.sequence), r.start))
        .collect();

    for cell in model
        .full_adders()
        .chain(model.half_adders())
        .filter(|c| c.stage == stage)
    {
        instantiate_cell(sv, cell, starts[&(cell.kind, cell.column, cell.sequence)]);
    }

    stage_mapping(sv, model, stage)
}

fn instantiate_cell(sv: &mut String, cell: &CompressorCell, start: usize) {
    let name = cell.instance_name();
    let stage = cell.stage;
    let col = cell.column;
    match cell.kind {
        CellKind::FullAdder => {
            sv.push_str(&format!("    fa {name} (\n"));
            sv.push_str(&format!("        .a(stage{stage}_col{col}[{start}]),\n"));
            sv.push_str(&format!("        .b(stage{stage}_col{col}[{}]),\n", start + 1));
            sv.push_str(&format!("        .c_in(stage{stage}_col{col}[{}]),\n", start + 2));
        }
        CellKind::HalfAdder => {
            sv.push_str(&format!("    ha {name} (\n"));
            sv.push_str(&format!("        .a(stage{stage}_col{col}[{start}]),\n"));
            sv.push_str(&format!("        .b(stage{stage}_col{col}[{}]),\n", start + 1));
        }
    }
    sv.push_str(&format!("        .s({}),\n", cell.sum_name()));
    sv.push_str(&format!("        .c_out({})\n", cell.carry_name()));
    sv.push_str("    );\n\n");
}

/// Wire every bit of stage `stage + 1` from its producer.
fn stage_mapping(sv: &mut String, model: &ReductionModel, stage: usize) -> Result<()> {
    sv.push_str(&format!("    // Map to stage {} columns\n", stage + 1));

    let produced: HashSet<String> = model
        .cells()
        .iter()
        .filter(|c| c.stage == stage)
        .flat_map(|c| [c.sum_name(), c.carry_name()])
        .collect();

    let prev = &model.stages()[stage];
    let next = &model.stages()[stage + 1];

    for col in 0..next.width() {
        for (idx, bit) in next.column(col).bits().iter().enumerate() {
            if produced.contains(bit.name()) {
                // Fresh output of this stage's cells.
                sv.push_str(&format!(
                    "    assign stage{}_col{col}[{idx}] = {};\n",
                    stage + 1,
                    bit.name()
                ));
            } else {
                let prev_idx = passthrough_index(prev, col, bit.name()).ok_or_else(|| {
                    Error::Provenance {
                        name: bit.name().to_string(),
                        stage: stage + 1,
                        column: col,
                    }
                })?;
                sv.push_str(&format!(
                    "    assign stage{}_col{col}[{idx}] = stage{stage}_col{col}[{prev_idx}];\n",
                    stage + 1
                ));
            }
        }
    }
    sv.push('\n');
    Ok(())
}

/// Index of a passthrough bit in the previous stage's column, by exact name.
pub(crate) fn passthrough_index(
    prev: &ctree_core::BitHeap,
    column: usize,
    name: &str,
) -> Option<usize> {
    prev.column(column).position(name)
}

fn final_outputs(sv: &mut String, model: &ReductionModel) -> Result<()> {
    sv.push_str("    // Final outputs (sum and carry)\n");
    let stage = model.num_stages();
    let heap = model.final_stage();

    for col in 0..heap.width() {
        match heap.height(col) {
            0 => {
                sv.push_str(&format!("    assign sum[{col}] = 1'b0;\n"));
                sv.push_str(&format!("    assign carry[{col}] = 1'b0;\n"));
            }
            1 => {
                sv.push_str(&format!("    assign sum[{col}] = stage{stage}_col{col}[0];\n"));
                sv.push_str(&format!("    assign carry[{col}] = 1'b0;\n"));
            }
            2 => {
                sv.push_str(&format!("    assign sum[{col}] = stage{stage}_col{col}[0];\n"));
                sv.push_str(&format!("    assign carry[{col}] = stage{stage}_col{col}[1];\n"));
            }
            height => {
                return Err(Error::UnreducedColumn {
                    column: col,
                    height,
                })
            }
        }
    }
    sv.push('\n');
    Ok(())
}

fn cell_definitions(sv: &mut String) {
    sv.push('\n');
    sv.push_str("module fa (\n");
    sv.push_str("    input logic a,\n");
    sv.push_str("    input logic b,\n");
    sv.push_str("    input logic c_in,\n");
    sv.push_str("    output logic s,\n");
    sv.push_str("    output logic c_out\n");
    sv.push_str(");\n");
    sv.push_str("    assign {c_out, s} = 2'(a) + 2'(b) + 2'(c_in);\n");
    sv.push_str("endmodule\n\n");
    sv.push_str("module ha (\n");
    sv.push_str("    input logic a,\n");
    sv.push_str("    input logic b,\n");
    sv.push_str("    output logic s,\n");
    sv.push_str("    output logic c_out\n");
    sv.push_str(");\n");
    sv.push_str("    assign {c_out, s} = 2'(a) + 2'(b);\n");
    sv.push_str("endmodule\n");
}
