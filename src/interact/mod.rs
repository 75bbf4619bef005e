//! Pointer interaction: hit testing and the drag state machine.

mod config;
mod interactor;

pub use config::{InteractorConfig, Tool};
pub use interactor::{
    DragMode, InteractionEvent, Interactor, POINT_PICK_RADIUS, PointerState, ProvisionalLink,
    hit_test,
};
