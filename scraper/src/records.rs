use strum::{
    Display,
    EnumString,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum LockStatus {
    Locked,
    Unlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Downstream,
    Upstream,
}

/// One row of the downstream (receive) channel table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRecordDown {
    pub receiver_id: u32,
    pub channel_id: u32,
    pub lock_status: LockStatus,
    /// Hz
    pub frequency: u64,
    /// Modulation code, `N/A` when the modem reports none.
    pub modulation: String,
    pub symbol_rate: u64,
    /// dB
    pub snr: f64,
    /// dBmV
    pub power: f64,
}

/// One row of the upstream (transmit) channel table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRecordUp {
    pub transmitter_id: u32,
    pub channel_id: u32,
    pub lock_status: LockStatus,
    /// Hz
    pub frequency: u64,
    pub modulation: String,
    pub symbol_rate: u64,
    pub channel_type: String,
    /// dBmV
    pub power: f64,
}
