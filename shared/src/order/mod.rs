//! Order status lifecycle
//!
//! - [`OrderStatus`] / [`OrderAction`] - wire enums
//! - [`lifecycle`] - transition table and guards

pub mod lifecycle;
pub mod status;

pub use lifecycle::{
    TRANSITIONS, Transition, TransitionError, allowed_actions, allowed_actions_for, apply,
    next_status, parties_of, transition,
};
pub use status::{OrderAction, OrderStatus, Party};
