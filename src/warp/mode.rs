//! WARP operating modes and the `warp-cli settings` parser

/// Operating mode of the WARP client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    DnsOverHttps,
    Warp,
    WarpWithDnsOverHttps,
    DnsOverTls,
    WarpWithDnsOverTls,
    WarpProxy,
    TunnelOnly,
    #[default]
    Unknown,
}

impl Mode {
    /// Every selectable mode, in menu order
    pub const ALL: [Mode; 7] = [
        Mode::DnsOverHttps,
        Mode::Warp,
        Mode::WarpWithDnsOverHttps,
        Mode::DnsOverTls,
        Mode::WarpWithDnsOverTls,
        Mode::WarpProxy,
        Mode::TunnelOnly,
    ];

    /// Argument passed to `warp-cli mode`
    pub fn cli_arg(self) -> &'static str {
        match self {
            Mode::DnsOverHttps => "doh",
            Mode::Warp => "warp",
            Mode::WarpWithDnsOverHttps => "warp+doh",
            Mode::DnsOverTls => "dot",
            Mode::WarpWithDnsOverTls => "warp+dot",
            Mode::WarpProxy => "proxy",
            Mode::TunnelOnly => "tunnel_only",
            Mode::Unknown => "unknown",
        }
    }

    /// Name printed by `warp-cli settings` on its `Mode:` line
    pub fn settings_name(self) -> &'static str {
        match self {
            Mode::DnsOverHttps => "DnsOverHttps",
            Mode::Warp => "Warp",
            Mode::WarpWithDnsOverHttps => "WarpWithDnsOverHttps",
            Mode::DnsOverTls => "DnsOverTls",
            Mode::WarpWithDnsOverTls => "WarpWithDnsOverTls",
            Mode::WarpProxy => "WarpProxy",
            Mode::TunnelOnly => "TunnelOnly",
            Mode::Unknown => "Unknown",
        }
    }

    /// Menu label
    pub fn label(self) -> &'static str {
        match self {
            Mode::DnsOverHttps => "DNS over HTTPS (DoH)",
            Mode::Warp => "WARP",
            Mode::WarpWithDnsOverHttps => "WARP + DoH",
            Mode::DnsOverTls => "DNS over TLS (DoT)",
            Mode::WarpWithDnsOverTls => "WARP + DoT",
            Mode::WarpProxy => "Proxy",
            Mode::TunnelOnly => "Tunnel Only",
            Mode::Unknown => "Unknown",
        }
    }

    /// Case-sensitive lookup by settings name; anything else is `Unknown`
    pub fn from_settings_name(token: &str) -> Self {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.settings_name() == token)
            .unwrap_or(Mode::Unknown)
    }

    /// Extract the current mode from `warp-cli settings` output, e.g.
    /// `Mode: WarpProxy on port 40000`. Only the first `Mode:` line counts.
    pub fn parse_settings(output: &str) -> Self {
        const MARKER: &str = "Mode:";

        for line in output.lines() {
            let Some(idx) = line.find(MARKER) else {
                continue;
            };
            let rest = line[idx + MARKER.len()..].trim_start();
            let token = rest
                .split(char::is_whitespace)
                .next()
                .unwrap_or_default();
            return Mode::from_settings_name(token);
        }

        Mode::Unknown
    }
}
