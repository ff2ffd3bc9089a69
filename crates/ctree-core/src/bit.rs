use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Name of the literal constant-one bit. Algebraic correction constants are
/// ordinary heap bits carrying this name, and they keep their identity across
/// every reduction stage.
pub const LITERAL_ONE: &str = "1'b1";

/// How a heap bit enters the netlist.
///
/// `Normal` bits are wired through as-is, `InvertedMsb` bits are complemented
/// at stage 0, and the remaining kinds are compressor-cell outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitKind {
    Normal,
    InvertedMsb,
    FaSum,
    FaCarry,
    HaSum,
    HaCarry,
}

impl BitKind {
    pub fn is_cell_output(self) -> bool {
        match self {
            BitKind::Normal | BitKind::InvertedMsb => false,
            BitKind::FaSum | BitKind::FaCarry | BitKind::HaSum | BitKind::HaCarry => true,
        }
    }
}

/// A named logical bit. Identity is the name string: two `Bit`s with the same
/// name denote the same signal. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bit {
    name: String,
    kind: BitKind,
}

impl Bit {
    pub fn new(name: impl Into<String>, kind: BitKind) -> Bit {
        Bit {
            name: name.into(),
            kind,
        }
    }

    pub fn normal(name: impl Into<String>) -> Bit {
        Bit::new(name, BitKind::Normal)
    }

    /// A literal constant-one bit.
    pub fn one() -> Bit {
        Bit::new(LITERAL_ONE, BitKind::Normal)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> BitKind {
        self.kind
    }

    pub fn is_literal_one(&self) -> bool {
        self.name == LITERAL_ONE
    }
}

impl Display for Bit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
