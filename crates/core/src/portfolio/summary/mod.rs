//! Summary module - net invested capital, totals and the annualized return.

mod flow_classifier;
mod summary_calculator;
mod summary_model;

pub use flow_classifier::{
    classify_cash_flows, classify_flow, ClassifiedFlows, ExternalFlow, FlowType, FundingEvent,
};
pub use summary_calculator::{
    annualized_return, average_funding_rates, PortfolioSummaryCalculator, SummaryInputs,
};
pub use summary_model::PortfolioSummary;
