//! Record types held by the stores.

pub mod activity;
pub mod coa;
pub mod content;
pub mod location;
pub mod log_entry;
pub mod neighbor;
pub mod settings;
pub mod visitor;

pub use activity::Activity;
pub use coa::{CoaColor, CoaPart, CoaType, VisitorCoaPart, VisitorPart};
pub use content::Content;
pub use location::Location;
pub use log_entry::LogEntry;
pub use neighbor::Neighbor;
pub use settings::Settings;
pub use visitor::{NewVisitor, Visitor, VisitorProfile};
