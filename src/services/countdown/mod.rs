mod collaborators;
mod controller;
pub mod decompose;
mod error;
mod input;
pub mod persistence;
mod scheduler;
mod storage;

pub use collaborators::{
    Clock, CountdownView, InputField, ManualClock, RecordingView, SystemClock, ViewCall,
};
pub use controller::{Collaborators, ControllerOptions, CountdownController};
pub use decompose::decompose;
pub use error::CountdownError;
pub use input::parse_target_input;
pub use persistence::{JsonFileStore, KeyValueStore, MemoryStore, TargetSlot, TARGET_DATE_KEY};
pub use scheduler::{CountdownEvent, ManualScheduler, TickScheduler, TokioScheduler};
pub use storage::SqliteStore;
