mod instance;
mod part;
mod placement;
mod sheet;
mod stock;

pub use instance::Instance;
pub use part::{InstanceId, PartInstance, PartType};
pub use placement::Placement;
pub use sheet::Sheet;
pub use stock::Stock;
