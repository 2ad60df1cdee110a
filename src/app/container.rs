use std::sync::Arc;

use crate::adapters::{
    FFmpegEngineLoader, FFprobeAdapter, FsDeliveryAdapter, JsonStoreAdapter, MagicLinkOutboxAdapter,
    MockEngineAdapter, MockEngineLoader, MockProbeAdapter, SourceFetchAdapter, StaticSessionAdapter,
    TracingLogAdapter, TurnstileAdapter,
};
use crate::adapters::toml_config::AppConfig;
use crate::app::{
    access_interactor::AccessInteractor, admin_interactor::AdminInteractor,
    dashboard_interactor::DashboardInteractor, filmstrip_interactor::FilmstripInteractor,
    inspect_interactor::InspectInteractor, save_video_interactor::SaveVideoInteractor,
    sign_in_interactor::SignInInteractor,
    transcode_interactor::{EngineHandle, TranscodeInteractor},
};
use crate::domain::errors::DomainError;
use crate::ports::{
    DeliveryPort, EngineLoader, HumanVerificationPort, LogPort, MagicLinkPort, PersistencePort, ProbePort,
    SessionPort, SourceFetchPort,
};

pub trait AppContainer: Send + Sync {
    fn transcode_interactor(&self) -> Arc<TranscodeInteractor>;
    fn filmstrip_interactor(&self) -> Arc<FilmstripInteractor>;
    fn inspect_interactor(&self) -> Arc<InspectInteractor>;
    fn save_video_interactor(&self) -> Arc<SaveVideoInteractor>;
    fn dashboard_interactor(&self) -> Arc<DashboardInteractor>;
    fn admin_interactor(&self) -> Arc<AdminInteractor>;
    fn sign_in_interactor(&self) -> Arc<SignInInteractor>;
    fn access_interactor(&self) -> Arc<AccessInteractor>;
}

pub struct DefaultAppContainer {
    transcode_interactor: Arc<TranscodeInteractor>,
    filmstrip_interactor: Arc<FilmstripInteractor>,
    inspect_interactor: Arc<InspectInteractor>,
    save_video_interactor: Arc<SaveVideoInteractor>,
    dashboard_interactor: Arc<DashboardInteractor>,
    admin_interactor: Arc<AdminInteractor>,
    sign_in_interactor: Arc<SignInInteractor>,
    access_interactor: Arc<AccessInteractor>,
}

impl DefaultAppContainer {
    pub fn new(config: &AppConfig) -> Result<Self, DomainError> {
        let (loader, probe_port): (Arc<dyn EngineLoader>, Arc<dyn ProbePort>) = if config.dry_run {
            tracing::info!("dry run: using the in-memory engine");
            (
                Arc::new(MockEngineLoader::new(Arc::new(MockEngineAdapter::new()))),
                Arc::new(MockProbeAdapter::new()),
            )
        } else {
            (
                Arc::new(FFmpegEngineLoader::new(config.engine.scratch_dir.clone())),
                Arc::new(FFprobeAdapter::new(config.engine.probe_binary.clone())),
            )
        };
        // One engine per process, shared by previews, exports and filmstrips
        let engine = Arc::new(EngineHandle::new(loader, config.engine.source()));

        let fetch_port: Arc<dyn SourceFetchPort> = Arc::new(SourceFetchAdapter::new());
        let delivery_port: Arc<dyn DeliveryPort> = Arc::new(FsDeliveryAdapter::new(
            config.paths.preview_dir.clone(),
            config.paths.output_dir.clone(),
        ));
        let store_port: Arc<dyn PersistencePort> =
            Arc::new(JsonStoreAdapter::new(config.paths.store_path.clone()));
        let session_port: Arc<dyn SessionPort> = Arc::new(StaticSessionAdapter::new(config.session.user()));
        let verification_port: Arc<dyn HumanVerificationPort> = Arc::new(TurnstileAdapter::new(
            config.verification.endpoint.clone(),
            config.verification.secret.clone(),
        ));
        let magic_link_port: Arc<dyn MagicLinkPort> =
            Arc::new(MagicLinkOutboxAdapter::new(config.paths.outbox_path.clone()));

        let log = |component: &'static str| -> Arc<dyn LogPort> {
            Arc::new(TracingLogAdapter::for_component(component))
        };

        let transcode_interactor = Arc::new(TranscodeInteractor::new(
            Arc::clone(&engine),
            Arc::clone(&fetch_port),
            Arc::clone(&delivery_port),
            log("transcode"),
        ));

        let filmstrip_interactor = Arc::new(FilmstripInteractor::new(
            Arc::clone(&engine),
            Arc::clone(&fetch_port),
            log("filmstrip"),
        ));

        let inspect_interactor = Arc::new(InspectInteractor::new(probe_port, log("inspect")));

        let save_video_interactor = Arc::new(SaveVideoInteractor::new(
            Arc::clone(&session_port),
            Arc::clone(&store_port),
            log("save"),
        ));

        let dashboard_interactor = Arc::new(DashboardInteractor::new(
            Arc::clone(&session_port),
            Arc::clone(&store_port),
            config.access.clone(),
            log("dashboard"),
        ));

        let admin_interactor = Arc::new(AdminInteractor::new(
            Arc::clone(&session_port),
            Arc::clone(&store_port),
            config.access.clone(),
            log("admin"),
        ));

        let sign_in_interactor = Arc::new(SignInInteractor::new(
            verification_port,
            magic_link_port,
            log("sign-in"),
        ));

        let access_interactor = Arc::new(AccessInteractor::new(
            session_port,
            config.access.clone(),
            log("access"),
        ));

        Ok(Self {
            transcode_interactor,
            filmstrip_interactor,
            inspect_interactor,
            save_video_interactor,
            dashboard_interactor,
            admin_interactor,
            sign_in_interactor,
            access_interactor,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn transcode_interactor(&self) -> Arc<TranscodeInteractor> {
        Arc::clone(&self.transcode_interactor)
    }

    fn filmstrip_interactor(&self) -> Arc<FilmstripInteractor> {
        Arc::clone(&self.filmstrip_interactor)
    }

    fn inspect_interactor(&self) -> Arc<InspectInteractor> {
        Arc::clone(&self.inspect_interactor)
    }

    fn save_video_interactor(&self) -> Arc<SaveVideoInteractor> {
        Arc::clone(&self.save_video_interactor)
    }

    fn dashboard_interactor(&self) -> Arc<DashboardInteractor> {
        Arc::clone(&self.dashboard_interactor)
    }

    fn admin_interactor(&self) -> Arc<AdminInteractor> {
        Arc::clone(&self.admin_interactor)
    }

    fn sign_in_interactor(&self) -> Arc<SignInInteractor> {
        Arc::clone(&self.sign_in_interactor)
    }

    fn access_interactor(&self) -> Arc<AccessInteractor> {
        Arc::clone(&self.access_interactor)
    }
}
