/*!
 * API Module
 * External interface: JSON lines over TCP
 */

pub mod handlers;
pub mod server;
pub mod types;

pub use handlers::{handle, handle_line};
pub use server::{serve, start_server};
pub use types::{ApiRequest, ApiResponse};
