//! Wire contract for replicating runs between peers.
//!
//! Transport is the host's business; this module only defines the packets,
//! their JSON and bincode encodings, and the outbound hook.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ids::{AnimationTarget, RunId};
use crate::request::AnimationRequest;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationRunPacket {
    pub run_id: RunId,
    pub target: AnimationTarget,
    pub requests: Vec<AnimationRequest>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct AnimationStopPacket {
    pub run_id: RunId,
}

macro_rules! packet_codec {
    ($ty:ty) => {
        impl $ty {
            /// Compact binary encoding.
            pub fn to_bytes(&self) -> Result<Vec<u8>> {
                Ok(bincode::serialize(self)?)
            }

            pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
                Ok(bincode::deserialize(bytes)?)
            }

            pub fn to_json(&self) -> Result<String> {
                Ok(serde_json::to_string(self)?)
            }

            pub fn from_json(json: &str) -> Result<Self> {
                Ok(serde_json::from_str(json)?)
            }
        }
    };
}

packet_codec!(AnimationRunPacket);
packet_codec!(AnimationStopPacket);

/// Outbound replication hook, called for synchronized runs on entity targets.
pub trait Synchronizer {
    fn sync_run(&mut self, packet: &AnimationRunPacket);
    fn sync_stop(&mut self, packet: &AnimationStopPacket);
}

/// Outgoing packet queue the host drains into its transport.
#[derive(Clone, Debug, Default)]
pub struct PacketOutbox {
    pub runs: Vec<AnimationRunPacket>,
    pub stops: Vec<AnimationStopPacket>,
}

impl PacketOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty() && self.stops.is_empty()
    }

    /// Take everything queued so far.
    pub fn drain(&mut self) -> (Vec<AnimationRunPacket>, Vec<AnimationStopPacket>) {
        (std::mem::take(&mut self.runs), std::mem::take(&mut self.stops))
    }
}

impl Synchronizer for PacketOutbox {
    fn sync_run(&mut self, packet: &AnimationRunPacket) {
        self.runs.push(packet.clone());
    }

    fn sync_stop(&mut self, packet: &AnimationStopPacket) {
        self.stops.push(*packet);
    }
}
