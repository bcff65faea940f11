pub mod taxi;
pub mod token;

pub use taxi::TaxiContract;
pub use token::IERC20;
