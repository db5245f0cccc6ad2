pub mod editor;
pub mod request_gate;

pub use editor::{EditorSnapshot, GenerateOutcome, IgnoreReason, ImageEditor};
pub use request_gate::{RequestGate, RequestTicket};
