pub mod models;

pub use models::{
    Allowance, Bid, BlockchainBalance, HealthSnapshot, Metadata, Model, Provider,
    ReadinessDetails, ReadinessLabel, RouterConfig, RouterHealth, TokenBalance,
};
