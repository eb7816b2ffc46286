//! One store per record family, mirroring the data model.

pub mod activity_store;
pub mod coa_store;
pub mod content_store;
pub mod location_store;
pub mod log_store;
pub mod neighbor_store;
pub mod settings_store;
pub mod visitor_store;

pub use activity_store::ActivityStore;
pub use coa_store::CoaStore;
pub use content_store::ContentStore;
pub use location_store::LocationStore;
pub use log_store::LogStore;
pub use neighbor_store::NeighborStore;
pub use settings_store::SettingsStore;
pub use visitor_store::VisitorStore;
