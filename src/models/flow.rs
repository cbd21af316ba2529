//! Flow record model - body of `POST /predict`

use serde::{Deserialize, Serialize};

use crate::logic::features::{FeatureVector, FEATURE_COUNT};

/// One network flow as entered by hand.
///
/// Integer fields reject floats and numeric strings; float fields accept any
/// JSON number but reject strings. Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowRecord {
    #[serde(rename = "Destination_Port")]
    pub destination_port: i64,
    #[serde(rename = "Init_Win_bytes_forward")]
    pub init_win_bytes_forward: i64,
    #[serde(rename = "Init_Win_bytes_backward")]
    pub init_win_bytes_backward: i64,
    #[serde(rename = "Bwd_Packets_s")]
    pub bwd_packets_s: f64,
    #[serde(rename = "min_seg_size_forward")]
    pub min_seg_size_forward: i64,
    #[serde(rename = "Fwd_IAT_Std")]
    pub fwd_iat_std: f64,
    #[serde(rename = "Flow_IAT_Min")]
    pub flow_iat_min: f64,
    #[serde(rename = "Bwd_Packet_Length_Min")]
    pub bwd_packet_length_min: i64,
    #[serde(rename = "Fwd_Packets_s")]
    pub fwd_packets_s: f64,
    #[serde(rename = "Fwd_IAT_Min")]
    pub fwd_iat_min: f64,
}

impl FlowRecord {
    /// Values in canonical layout order (see `FEATURE_LAYOUT`)
    pub fn to_feature_vector(&self) -> FeatureVector {
        let v: [f64; FEATURE_COUNT] = [
            self.destination_port as f64,
            self.init_win_bytes_forward as f64,
            self.init_win_bytes_backward as f64,
            self.bwd_packets_s,
            self.min_seg_size_forward as f64,
            self.fwd_iat_std,
            self.flow_iat_min,
            self.bwd_packet_length_min as f64,
            self.fwd_packets_s,
            self.fwd_iat_min,
        ];
        v
    }
}
