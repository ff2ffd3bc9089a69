use crate::bit::{Bit, BitKind};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Compressor cell variety: a 3:2 full adder or a 2:2 half adder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    FullAdder,
    HalfAdder,
}

impl CellKind {
    /// Number of input bits the cell consumes.
    pub fn arity(self) -> usize {
        match self {
            CellKind::FullAdder => 3,
            CellKind::HalfAdder => 2,
        }
    }

    /// Instance-name prefix in the emitted netlist.
    pub fn prefix(self) -> &'static str {
        match self {
            CellKind::FullAdder => "fa",
            CellKind::HalfAdder => "ha",
        }
    }

    pub fn sum_kind(self) -> BitKind {
        match self {
            CellKind::FullAdder => BitKind::FaSum,
            CellKind::HalfAdder => BitKind::HaSum,
        }
    }

    pub fn carry_kind(self) -> BitKind {
        match self {
            CellKind::FullAdder => BitKind::FaCarry,
            CellKind::HalfAdder => BitKind::HaCarry,
        }
    }
}

impl Display for CellKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CellKind::FullAdder => f.write_str("FA"),
            CellKind::HalfAdder => f.write_str("HA"),
        }
    }
}

/// Provenance record for one cell instantiated during a stage transition:
/// which index in the pre-stage column ordering its input group started at.
///
/// These records are attached to the stage they produced and are never
/// reconstructed after the fact; the emitter wires cell inputs from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumption {
    pub column: usize,
    pub start: usize,
    pub kind: CellKind,
    pub sequence: usize,
}

/// One instantiated compressor cell.
///
/// `sequence` counts cells of the same kind within the producing stage, so
/// the derived output names are globally unique and trace back to exactly one
/// cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressorCell {
    pub stage: usize,
    pub column: usize,
    pub sequence: usize,
    pub kind: CellKind,
    pub inputs: Vec<Bit>,
}

impl CompressorCell {
    /// Deterministic instance name, e.g. `fa_s0_c4_n2`.
    pub fn instance_name(&self) -> String {
        format!(
            "{}_s{}_c{}_n{}",
            self.kind.prefix(),
            self.stage,
            self.column,
            self.sequence
        )
    }

    pub fn sum_name(&self) -> String {
        format!("{}_s", self.instance_name())
    }

    pub fn carry_name(&self) -> String {
        format!("{}_c", self.instance_name())
    }

    pub fn sum_bit(&self) -> Bit {
        Bit::new(self.sum_name(), self.kind.sum_kind())
    }

    pub fn carry_bit(&self) -> Bit {
        Bit::new(self.carry_name(), self.kind.carry_kind())
    }
}
