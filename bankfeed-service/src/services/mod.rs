pub mod categorize;
pub mod plaid;
pub mod provider;
pub mod session;
pub mod simplefin;

pub use plaid::PlaidClient;
pub use provider::{BankProvider, ConnectRequest};
pub use session::{Credential, SessionStore, DEFAULT_SESSION};
pub use simplefin::SimplefinClient;
