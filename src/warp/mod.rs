//! warp-cli integration - process gateway, output parsers and status polling

pub mod cli;
mod mode;
pub mod reconcile;
mod status;

pub use cli::{CliCommand, WarpCli, WarpCtl};
pub use mode::Mode;
pub use reconcile::{reconcile, CancelToken, PollSchedule, Reconciled};
pub use status::ConnectionStatus;
