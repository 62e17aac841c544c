use phf::{Map, phf_map};
use serde::Serialize;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Which range category a residue's annotation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecondaryStructureType {
    #[default]
    None,
    /// `_struct_conf` (helices and turns).
    Helix,
    /// `_struct_sheet_range`.
    Sheet,
}

impl SecondaryStructureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Helix => "helix",
            Self::Sheet => "sheet",
        }
    }
}

impl fmt::Display for SecondaryStructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

mod bits {
    pub const HELIX: u32 = 1 << 0;
    pub const BETA: u32 = 1 << 1;
    pub const BEND: u32 = 1 << 2;
    pub const TURN: u32 = 1 << 3;
    pub const BETA_STRAND: u32 = 1 << 4;
    pub const BETA_SHEET: u32 = 1 << 5;
    pub const RIGHT_HANDED: u32 = 1 << 6;
    pub const LEFT_HANDED: u32 = 1 << 7;
    pub const HELIX_ALPHA: u32 = 1 << 8;
    pub const HELIX_3_10: u32 = 1 << 9;
    pub const HELIX_PI: u32 = 1 << 10;
    pub const HELIX_GAMMA: u32 = 1 << 11;
    pub const HELIX_OMEGA: u32 = 1 << 12;
    pub const HELIX_2_7: u32 = 1 << 13;
    pub const HELIX_POLYPROLINE: u32 = 1 << 14;
    pub const DOUBLE_HELIX: u32 = 1 << 15;
    pub const TURN_TYPE_1: u32 = 1 << 16;
    pub const TURN_TYPE_1_PRIME: u32 = 1 << 17;
    pub const TURN_TYPE_2: u32 = 1 << 18;
    pub const TURN_TYPE_2_PRIME: u32 = 1 << 19;
    pub const TURN_TYPE_3: u32 = 1 << 20;
    pub const TURN_TYPE_3_PRIME: u32 = 1 << 21;
    pub const NA: u32 = 1 << 22;
}

/// Bitmask describing the subtype of a secondary-structure element.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct SecondaryStructureFlags(u32);

impl SecondaryStructureFlags {
    pub const NONE: Self = Self(0);
    pub const HELIX: Self = Self(bits::HELIX);
    pub const BETA: Self = Self(bits::BETA);
    pub const BEND: Self = Self(bits::BEND);
    pub const TURN: Self = Self(bits::TURN);
    pub const BETA_STRAND: Self = Self(bits::BETA_STRAND);
    pub const BETA_SHEET: Self = Self(bits::BETA_SHEET);
    pub const RIGHT_HANDED: Self = Self(bits::RIGHT_HANDED);
    pub const LEFT_HANDED: Self = Self(bits::LEFT_HANDED);
    pub const HELIX_ALPHA: Self = Self(bits::HELIX_ALPHA);
    pub const HELIX_3_10: Self = Self(bits::HELIX_3_10);
    pub const HELIX_PI: Self = Self(bits::HELIX_PI);
    pub const HELIX_GAMMA: Self = Self(bits::HELIX_GAMMA);
    pub const HELIX_OMEGA: Self = Self(bits::HELIX_OMEGA);
    pub const HELIX_2_7: Self = Self(bits::HELIX_2_7);
    pub const HELIX_POLYPROLINE: Self = Self(bits::HELIX_POLYPROLINE);
    pub const DOUBLE_HELIX: Self = Self(bits::DOUBLE_HELIX);
    pub const TURN_TYPE_1: Self = Self(bits::TURN_TYPE_1);
    pub const TURN_TYPE_1_PRIME: Self = Self(bits::TURN_TYPE_1_PRIME);
    pub const TURN_TYPE_2: Self = Self(bits::TURN_TYPE_2);
    pub const TURN_TYPE_2_PRIME: Self = Self(bits::TURN_TYPE_2_PRIME);
    pub const TURN_TYPE_3: Self = Self(bits::TURN_TYPE_3);
    pub const TURN_TYPE_3_PRIME: Self = Self(bits::TURN_TYPE_3_PRIME);
    /// Not annotated, or annotated with a code outside the known tables.
    pub const NA: Self = Self(bits::NA);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Flags for a PDB helix class code (`1`..`10`).
    pub fn from_pdb_helix_class(code: &str) -> Self {
        PDB_HELIX_CLASS
            .get(code.trim())
            .map_or(Self::NA, |&bits| Self(bits))
    }

    /// Flags for an mmCIF `conf_type_id` code such as `HELX_RH_AL_P`.
    pub fn from_conf_type(code: &str) -> Self {
        MMCIF_CONF_TYPE
            .get(code.trim().to_ascii_uppercase().as_str())
            .map_or(Self::NA, |&bits| Self(bits))
    }
}

impl BitOr for SecondaryStructureFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for SecondaryStructureFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for SecondaryStructureFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecondaryStructureFlags({:#x})", self.0)
    }
}

static PDB_HELIX_CLASS: Map<&'static str, u32> = phf_map! {
    "1" => bits::HELIX | bits::RIGHT_HANDED | bits::HELIX_ALPHA,
    "2" => bits::HELIX | bits::RIGHT_HANDED | bits::HELIX_OMEGA,
    "3" => bits::HELIX | bits::RIGHT_HANDED | bits::HELIX_PI,
    "4" => bits::HELIX | bits::RIGHT_HANDED | bits::HELIX_GAMMA,
    "5" => bits::HELIX | bits::RIGHT_HANDED | bits::HELIX_3_10,
    "6" => bits::HELIX | bits::LEFT_HANDED | bits::HELIX_ALPHA,
    "7" => bits::HELIX | bits::LEFT_HANDED | bits::HELIX_OMEGA,
    "8" => bits::HELIX | bits::LEFT_HANDED | bits::HELIX_GAMMA,
    "9" => bits::HELIX | bits::HELIX_2_7,
    "10" => bits::HELIX | bits::HELIX_POLYPROLINE,
};

static MMCIF_CONF_TYPE: Map<&'static str, u32> = phf_map! {
    "HELX_P" => bits::HELIX,
    "HELX_OT_P" => bits::HELIX,
    "HELX_RH_P" => bits::HELIX | bits::RIGHT_HANDED,
    "HELX_RH_OT_P" => bits::HELIX | bits::RIGHT_HANDED,
    "HELX_RH_AL_P" => bits::HELIX | bits::RIGHT_HANDED | bits::HELIX_ALPHA,
    "HELX_RH_GA_P" => bits::HELIX | bits::RIGHT_HANDED | bits::HELIX_GAMMA,
    "HELX_RH_OM_P" => bits::HELIX | bits::RIGHT_HANDED | bits::HELIX_OMEGA,
    "HELX_RH_PI_P" => bits::HELIX | bits::RIGHT_HANDED | bits::HELIX_PI,
    "HELX_RH_27_P" => bits::HELIX | bits::RIGHT_HANDED | bits::HELIX_2_7,
    "HELX_RH_3T_P" => bits::HELIX | bits::RIGHT_HANDED | bits::HELIX_3_10,
    "HELX_RH_PP_P" => bits::HELIX | bits::RIGHT_HANDED | bits::HELIX_POLYPROLINE,
    "HELX_LH_P" => bits::HELIX | bits::LEFT_HANDED,
    "HELX_LH_OT_P" => bits::HELIX | bits::LEFT_HANDED,
    "HELX_LH_AL_P" => bits::HELIX | bits::LEFT_HANDED | bits::HELIX_ALPHA,
    "HELX_LH_GA_P" => bits::HELIX | bits::LEFT_HANDED | bits::HELIX_GAMMA,
    "HELX_LH_OM_P" => bits::HELIX | bits::LEFT_HANDED | bits::HELIX_OMEGA,
    "HELX_LH_PI_P" => bits::HELIX | bits::LEFT_HANDED | bits::HELIX_PI,
    "HELX_LH_27_P" => bits::HELIX | bits::LEFT_HANDED | bits::HELIX_2_7,
    "HELX_LH_3T_P" => bits::HELIX | bits::LEFT_HANDED | bits::HELIX_3_10,
    "HELX_LH_PP_P" => bits::HELIX | bits::LEFT_HANDED | bits::HELIX_POLYPROLINE,
    "HELX_N" => bits::HELIX | bits::DOUBLE_HELIX,
    "HELX_OT_N" => bits::HELIX | bits::DOUBLE_HELIX,
    "HELX_RH_N" => bits::HELIX | bits::DOUBLE_HELIX | bits::RIGHT_HANDED,
    "HELX_LH_N" => bits::HELIX | bits::DOUBLE_HELIX | bits::LEFT_HANDED,
    "TURN_P" => bits::TURN,
    "TURN_OT_P" => bits::TURN,
    "TURN_TY1_P" => bits::TURN | bits::TURN_TYPE_1,
    "TURN_TY1P_P" => bits::TURN | bits::TURN_TYPE_1_PRIME,
    "TURN_TY2_P" => bits::TURN | bits::TURN_TYPE_2,
    "TURN_TY2P_P" => bits::TURN | bits::TURN_TYPE_2_PRIME,
    "TURN_TY3_P" => bits::TURN | bits::TURN_TYPE_3,
    "TURN_TY3P_P" => bits::TURN | bits::TURN_TYPE_3_PRIME,
    "STRN" => bits::BETA | bits::BETA_STRAND,
    "BEND" => bits::BEND,
};

/// Per-residue secondary-structure annotation, indexed by residue index.
#[derive(Debug, Clone, Default)]
pub struct SecondaryStructure {
    pub kind: Vec<SecondaryStructureType>,
    /// Row of the annotating record in its source category. Meaningless for `None`.
    pub index: Vec<usize>,
    pub flags: Vec<SecondaryStructureFlags>,
    /// Shared by every residue of one annotated element; 0 when unannotated.
    pub key: Vec<u32>,
}

impl SecondaryStructure {
    pub fn unassigned(residue_count: usize) -> Self {
        Self {
            kind: vec![SecondaryStructureType::None; residue_count],
            index: vec![0; residue_count],
            flags: vec![SecondaryStructureFlags::NA; residue_count],
            key: vec![0; residue_count],
        }
    }

    pub fn len(&self) -> usize {
        self.kind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_empty()
    }

    /// Number of distinct annotated elements.
    pub fn element_count(&self) -> usize {
        self.key.iter().copied().max().unwrap_or(0) as usize
    }
}
