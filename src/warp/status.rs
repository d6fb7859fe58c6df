//! Connection status reported by `warp-cli status`

use std::fmt;

/// Connection state of the WARP daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnecting,
    Disconnected,
    /// `Status update: Unable` with `Reason: No Network`
    NoNetwork,
    #[default]
    Unknown,
}

/// Markers in match order. "Connecting" and "Disconnecting" go first so a
/// transition is never reported as the state it is leaving or entering.
const MARKERS: [(&str, ConnectionStatus); 5] = [
    ("Connecting", ConnectionStatus::Connecting),
    ("Disconnecting", ConnectionStatus::Disconnecting),
    ("Connected", ConnectionStatus::Connected),
    ("Disconnected", ConnectionStatus::Disconnected),
    ("No Network", ConnectionStatus::NoNetwork),
];

impl ConnectionStatus {
    /// Classify raw `status` output. First marker found wins.
    pub fn parse(output: &str) -> Self {
        MARKERS
            .iter()
            .find(|(marker, _)| output.contains(marker))
            .map(|(_, status)| *status)
            .unwrap_or(ConnectionStatus::Unknown)
    }

    /// Whether the daemon is still moving between states and polling should
    /// continue
    pub fn is_transitional(self) -> bool {
        matches!(
            self,
            ConnectionStatus::Connecting
                | ConnectionStatus::Disconnecting
                | ConnectionStatus::NoNetwork
        )
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionStatus::Connecting => "Connecting",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Disconnecting => "Disconnecting",
            ConnectionStatus::Disconnected => "Disconnected",
            ConnectionStatus::NoNetwork => "No Network",
            ConnectionStatus::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}
