//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the input schema of both prediction endpoints.**
//!
//! Each entry pairs the JSON field name accepted by `/predict` with the
//! canonical column name the model was trained on (and that `/predict_csv`
//! uploads must carry).
//!
//! ## Rules:
//! 1. Add, remove or rename a feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// One column of the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    /// Field name in the `/predict` JSON body
    pub field: &'static str,
    /// Column name in CSV uploads and in the trained model
    pub column: &'static str,
}

const fn spec(field: &'static str, column: &'static str) -> FeatureSpec {
    FeatureSpec { field, column }
}

/// Canonical feature layout, in the order the model was trained with
pub const FEATURE_LAYOUT: &[FeatureSpec] = &[
    spec("Destination_Port", "Destination Port"),              // 0  integer
    spec("Init_Win_bytes_forward", "Init_Win_bytes_forward"),  // 1  integer
    spec("Init_Win_bytes_backward", "Init_Win_bytes_backward"),// 2  integer
    spec("Bwd_Packets_s", "Bwd Packets/s"),                    // 3
    spec("min_seg_size_forward", "min_seg_size_forward"),      // 4  integer
    spec("Fwd_IAT_Std", "Fwd IAT Std"),                        // 5
    spec("Flow_IAT_Min", "Flow IAT Min"),                      // 6
    spec("Bwd_Packet_Length_Min", "Bwd Packet Length Min"),    // 7  integer
    spec("Fwd_Packets_s", "Fwd Packets/s"),                    // 8
    spec("Fwd_IAT_Min", "Fwd IAT Min"),                        // 9
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 10;

/// One flow in canonical layout order
pub type FeatureVector = [f64; FEATURE_COUNT];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version and the canonical column names.
/// Used to fingerprint the layout in `/health`.
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for feature in FEATURE_LAYOUT {
        hasher.update(feature.column.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub columns: Vec<String>,
    /// `/predict` field names, same order as `columns`
    pub fields: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            columns: canonical_columns(),
            fields: FEATURE_LAYOUT.iter().map(|f| f.field.to_string()).collect(),
        }
    }
}

// ============================================================================
// LOOKUP
// ============================================================================

/// Canonical column names in layout order
pub fn canonical_columns() -> Vec<String> {
    FEATURE_LAYOUT.iter().map(|f| f.column.to_string()).collect()
}

/// Layout index of a canonical column name (exact, case-sensitive)
pub fn column_index(column: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|f| f.column == column)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_names_unique() {
        let fields: HashSet<_> = FEATURE_LAYOUT.iter().map(|f| f.field).collect();
        let columns: HashSet<_> = FEATURE_LAYOUT.iter().map(|f| f.column).collect();
        assert_eq!(fields.len(), FEATURE_COUNT);
        assert_eq!(columns.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_info_pairs_fields_with_columns() {
        let info = LayoutInfo::current();
        assert_eq!(info.fields.len(), info.columns.len());
        assert_eq!(info.fields[0], "Destination_Port");
        assert_eq!(info.columns[0], "Destination Port");
        assert_eq!(info.fields[3], "Bwd_Packets_s");
        assert_eq!(info.columns[3], "Bwd Packets/s");
    }

    #[test]
    fn test_column_index_case_sensitive() {
        assert_eq!(column_index("Destination Port"), Some(0));
        assert_eq!(column_index("Fwd IAT Min"), Some(9));
        assert_eq!(column_index("destination port"), None);
    }

    #[test]
    fn test_layout_hash_stable() {
        assert_eq!(layout_hash(), layout_hash());
        assert_ne!(layout_hash(), 0);
        assert_eq!(LayoutInfo::current().hash, layout_hash());
    }
}
