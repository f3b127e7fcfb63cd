pub mod domain;
pub mod parser;
pub mod ports;

pub use domain::{ConversationTurn, DetectionResult, FactCheckResult, HistoryEntry, ImageInput};
pub use parser::{parse, strip_fences, ParseFailure};
pub use ports::{ModelGateway, PortError, PortResult};
