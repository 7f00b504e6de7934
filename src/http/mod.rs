//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → dispatch.rs (affinity / strategy picks a backend)
//!     → forward.rs (send to backend, stream response back)
//!     → response.rs (503/502 on failure)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{ForwardError, Forwarder, HyperForwarder};
pub use request::X_REQUEST_ID;
pub use server::{build_router, AppState, HttpServer};
