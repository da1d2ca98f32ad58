//! Flat pro-rata payouts to investor positions.

pub mod pro_rata;

pub use pro_rata::{
    distribute_pro_rata, DistributionBatch, DistributionRecord, DistributionRequest,
    InvestorPosition, PayoutStatus,
};
