//! npsmap
//!
//! Data plumbing for an interactive map of U.S. national park visitation.
//! Pairs with the `npsmap` CLI.
//!
//! ### Features
//! - Fetch the U.S. states topology, decode state shapes and interior borders
//! - Load park locations from CSV and project them with Albers USA
//!   (scale 1300, translate `[487.5, 305]`, aligned with the state shapes)
//! - Format visitor counts (`"4.5 million"`, `"4.5M"`)
//! - Caller-owned observable UI state: states list, color scale, tooltip scale
//! - Export parks as CSV, the aggregate as JSON, or a static SVG snapshot
//!
//! ### Example
//! ```no_run
//! use npsmap::{Client, MapState, stats, store};
//!
//! let client = Client::default();
//! let data = client.fetch_park_data()?;
//!
//! let mut state = MapState::new();
//! state.states.set(data.states.clone());
//! if let Some(domain) = stats::column_extent(&data.parks_data, "Visitors") {
//!     store::update_color_scale_domain(&mut state.color_scale, domain);
//! }
//! println!("{}", npsmap::format::format_visitor_count_abbrev(4_500_000));
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod color;
pub mod format;
pub mod layout;
pub mod models;
pub mod parks;
pub mod path;
pub mod projection;
pub mod stats;
pub mod storage;
pub mod store;
pub mod topology;

pub use api::{Client, Source};
pub use models::{ParkData, StateFeature, StatesLayer};
pub use parks::ParkRecord;
pub use projection::AlbersUsa;
pub use store::MapState;
