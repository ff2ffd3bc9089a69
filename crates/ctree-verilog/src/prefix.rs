//! SystemVerilog generation for parallel-prefix trees.
//!
//! Buffer nodes are emitted as `prefix_cell` instances with identity inputs
//! (`g_lo = 0`, `p_lo = 1`, `a_lo = 0`) so that every level registers
//! uniformly when pipelining is enabled.

use ctree_core::prefix::PrefixTree;

pub fn generate(tree: &PrefixTree) -> String {
    let mut sv = String::new();

    sv.push_str("//\n");
    sv.push_str(&format!("// Parallel prefix tree - {}\n", tree.technique()));
    sv.push_str(&format!("// Width: {} bits\n", tree.width()));
    sv.push_str(&format!("// Levels: {}\n", tree.max_level()));
    sv.push_str(&format!("// Pipeline stages: {}\n", tree.pipeline()));
    sv.push_str("//\n\n");

    sv.push_str("module prefix_tree #(\n");
    sv.push_str(&format!("    parameter WIDTH = {},\n", tree.width()));
    sv.push_str(&format!("    parameter PIPE = {}\n", tree.pipeline()));
    sv.push_str(") (\n");
    sv.push_str("    input  logic clk,\n");
    sv.push_str("    input  logic rst,\n");
    sv.push_str("    input  logic [WIDTH-1:0] g_in,  // Generate inputs\n");
    sv.push_str("    input  logic [WIDTH-1:0] p_in,  // Propagate inputs\n");
    sv.push_str("    input  logic [WIDTH-1:0] a_in,  // Auxiliary inputs\n");
    sv.push_str("    output logic [WIDTH-1:0] g_out, // Generate outputs (prefix)\n");
    sv.push_str("    output logic [WIDTH-1:0] p_out, // Propagate outputs\n");
    sv.push_str("    output logic [WIDTH-1:0] a_out  // Auxiliary outputs\n");
    sv.push_str(");\n\n");

    sv.push_str(&format!(
        "    parameter PREFIX_STAGES = {};\n\n",
        tree.max_level()
    ));

    for level in 0..=tree.max_level() {
        sv.push_str(&format!("    // Level {level} signals\n"));
        sv.push_str(&format!("    logic [WIDTH-1:0] g_L{level};\n"));
        sv.push_str(&format!("    logic [WIDTH-1:0] p_L{level};\n"));
        sv.push_str(&format!("    logic [WIDTH-1:0] a_L{level};\n\n"));
    }

    sv.push_str("    // Connect inputs to level 0\n");
    sv.push_str("    assign g_L0 = g_in;\n");
    sv.push_str("    assign p_L0 = p_in;\n");
    sv.push_str("    assign a_L0 = a_in;\n\n");

    for level in 1..=tree.max_level() {
        sv.push_str(&format!("    // Level {level} prefix cells\n"));
        for node in &tree.levels()[level] {
            let i = node.index;
            let (left_lvl, left_idx) = node.left;
            sv.push_str(&format!(
                "    prefix_cell #(.PIPE(PIPE)) cell_L{level}_{i} (\n"
            ));
            sv.push_str("        .clk(clk),\n");
            sv.push_str("        .rst(rst),\n");
            sv.push_str(&format!("        .g_hi(g_L{left_lvl}[{left_idx}]),\n"));
            sv.push_str(&format!("        .p_hi(p_L{left_lvl}[{left_idx}]),\n"));
            sv.push_str(&format!("        .a_hi(a_L{left_lvl}[{left_idx}]),\n"));
            if node.is_buffer {
                sv.push_str("        .g_lo(1'b0),\n");
                sv.push_str("        .p_lo(1'b1),\n");
                sv.push_str("        .a_lo(1'b0),\n");
            } else {
                let (right_lvl, right_idx) = node.right;
                sv.push_str(&format!("        .g_lo(g_L{right_lvl}[{right_idx}]),\n"));
                sv.push_str(&format!("        .p_lo(p_L{right_lvl}[{right_idx}]),\n"));
                sv.push_str(&format!("        .a_lo(a_L{right_lvl}[{right_idx}]),\n"));
            }
            sv.push_str(&format!("        .g_out(g_L{level}[{i}]),\n"));
            sv.push_str(&format!("        .p_out(p_L{level}[{i}]),\n"));
            sv.push_str(&format!("        .a_out(a_L{level}[{i}])\n"));
            sv.push_str("    );\n");
        }
        sv.push('\n');
    }

    sv.push_str("    // Connect outputs from final level\n");
    sv.push_str(&format!("    assign g_out = g_L{};\n", tree.max_level()));
    sv.push_str(&format!("    assign p_out = p_L{};\n", tree.max_level()));
    sv.push_str(&format!("    assign a_out = a_L{};\n\n", tree.max_level()));

    sv.push_str("endmodule\n");
    sv
}
