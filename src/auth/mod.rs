// Authentication module
// Gateway handshake, retry policy and the background token refresher

mod authenticator;
mod policy;
mod refresher;
mod token;
mod types;

pub use authenticator::{Authenticator, GatewayEndpoint, HttpAuthenticator};
pub use policy::{AttemptCounting, RetryPolicy};
pub use refresher::{transition, Action, Event, RefreshState, RefresherHandle, TokenRefresher};
pub use token::SharedToken;
pub use types::Credentials;
