use clinic_core::{
    BookingService, ClinicService, CoreConfig, DocumentStore, GoogleTokenVerifier,
    PatientService, PlatformAdminService, TokenService,
};
use std::sync::Arc;

/// Application state shared across REST API handlers.
///
/// Built once at startup; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    /// `None` when no Google client id is configured.
    pub google: Option<Arc<GoogleTokenVerifier>>,
    pub admins: PlatformAdminService,
    pub clinics: ClinicService,
    pub bookings: BookingService,
    pub patients: PatientService,
}

impl AppState {
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<DocumentStore>) -> Self {
        let google = cfg
            .google_client_id()
            .map(|client_id| Arc::new(GoogleTokenVerifier::new(client_id)));
        Self {
            tokens: Arc::new(TokenService::new(&cfg)),
            google,
            admins: PlatformAdminService::new(cfg.clone(), store.clone()),
            clinics: ClinicService::new(cfg.clone(), store.clone()),
            bookings: BookingService::new(cfg.clone(), store.clone()),
            patients: PatientService::new(store),
        }
    }

    pub fn with_google_verifier(mut self, verifier: GoogleTokenVerifier) -> Self {
        self.google = Some(Arc::new(verifier));
        self
    }
}
