//! sanwatch: SAN fleet health checks and inventory.
//!
//! Interrogates a fleet of storage and fabric devices (EMC
//! Celerra/VNX filers, Cisco MDS switches, EMC Clariion/VNX and
//! Symmetrix/VMAX arrays, IBM SVC clusters), parses the vendor CLI
//! output into typed records, and reduces them to per-device fault
//! reports against an expected-state table.
//!
//! The layers are kept separate: transports execute commands and
//! yield raw text, parsers turn text into records without I/O, and
//! checks turn records into faults without I/O. Soft transport
//! failures are values, so one dead device never aborts a fleet run.
//!
//! ```no_run
//! use sanwatch::config::FleetConfig;
//! use sanwatch::expected::ExpectedState;
//! use sanwatch::run::{RunOptions, check_fleet};
//!
//! # async fn demo() -> sanwatch::Result<()> {
//! let fleet = FleetConfig::load("fleet.toml".as_ref())?;
//! let devices = fleet.select(None)?;
//! let reports = check_fleet(&devices, &ExpectedState::default(), &RunOptions::default()).await;
//! for report in &reports {
//!     println!("{report}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod expected;
pub mod fault;
pub mod reconcile;
pub mod record;
pub mod report;
pub mod run;
pub mod transport;
pub mod vendors;

pub use config::{DeviceConfig, FleetConfig};
pub use device::DeviceKind;
pub use error::{Error, Result};
pub use expected::ExpectedState;
pub use fault::{Fault, FaultCategory};
pub use report::{CheckStatus, DeviceReport};
pub use run::{RunOptions, check_fleet};
