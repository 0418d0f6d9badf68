pub mod budget_repository;
pub mod transaction_repository;
pub mod user_repository;

pub use budget_repository::BudgetRepository;
pub use transaction_repository::TransactionRepository;
pub use user_repository::UserRepository;
