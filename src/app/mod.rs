// Application layer - Use case interactors

pub mod access_interactor;
pub mod admin_interactor;
pub mod container;
pub mod dashboard_interactor;
pub mod filmstrip_interactor;
pub mod inspect_interactor;
pub mod save_video_interactor;
pub mod sign_in_interactor;
pub mod transcode_interactor;

// Re-export interactors
pub use access_interactor::AccessInteractor;
pub use admin_interactor::{AdminInteractor, AdminView};
pub use dashboard_interactor::{DashboardInteractor, DashboardView};
pub use filmstrip_interactor::{Filmstrip, FilmstripFrame, FilmstripInteractor};
pub use inspect_interactor::{InspectInteractor, VideoProperties};
pub use save_video_interactor::SaveVideoInteractor;
pub use sign_in_interactor::SignInInteractor;
pub use transcode_interactor::{EngineHandle, RunOutcome, TranscodeInteractor};
