pub mod api;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod db;
pub mod enums;
pub mod error;
pub mod scheduler;
pub mod services;

pub use config::Config;
pub use enums::{ CommissionStatus, DepositStatus, InvestmentStatus, TxKind, TxStatus, WithdrawalStatus };
pub use error::{ AppError, Result };
