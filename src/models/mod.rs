pub mod amount;
pub mod encoding;
pub mod payment;
pub mod response;
pub mod ride;
pub mod user;
pub mod views;

pub use amount::*;
pub use payment::*;
pub use response::*;
pub use ride::*;
pub use user::*;
pub use views::*;
