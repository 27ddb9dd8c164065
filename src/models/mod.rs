pub mod authorization;
pub mod codes;
pub mod extraction;
pub mod order;

pub use authorization::{AuthPatch, AuthStatus, NewPriorAuthorization, PriorAuthorization};
pub use extraction::{CodeSuggestion, Confidence, DocumentFields, GuidelineChunk, ValidationVerdict};
pub use order::{NewOrder, Order, OrderPatch, OrderStatus};
