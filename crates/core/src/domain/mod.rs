pub mod communication;
pub mod dividend;
pub mod fund;

pub use communication::{CommunicationRecord, CommunicationStatus};
pub use dividend::MonthlyDividend;
pub use fund::{FundRecord, FundType};
