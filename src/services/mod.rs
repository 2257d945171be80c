//! Service layer for budgetwise
//!
//! The service layer runs user mutations against the ledger store and the
//! persistence collaborator and serves analyses of the result.

pub mod session;

pub use session::BudgetSession;
