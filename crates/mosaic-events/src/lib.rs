#![forbid(unsafe_code)]

//! Unified event bus for the mosaic media loading pipeline.

mod bus;
mod event;
mod loader;
mod placeholder;

pub use bus::EventBus;
pub use event::Event;
pub use loader::LoaderEvent;
pub use placeholder::PlaceholderEvent;
