// Application layer - Use case interactors

pub mod container;
pub mod merge_interactor;
pub mod workspace;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use merge_interactor::{MergeInteractor, MergeRequest};
pub use workspace::MergeWorkspace;
