use std::sync::Arc;

use crate::application::account_service::AccountService;
use crate::application::admin_service::AdminService;
use crate::application::auth_service::AuthService;
use crate::application::notification_service::NotificationService;
use crate::application::profile_service::ProfileService;
use crate::application::quote_service::QuoteService;
use crate::application::report_service::ReportService;
use crate::application::settings_service::SettingsService;
use crate::application::suggestion_service::SuggestionService;
use crate::data::notification_repository::KvNotificationRepository;
use crate::data::plan_request_repository::KvPlanRequestRepository;
use crate::data::profile_repository::KvProfileRepository;
use crate::data::quote_repository::KvQuoteRepository;
use crate::data::reset_code_repository::KvResetCodeRepository;
use crate::data::store::Storage;
use crate::data::suggestion_repository::KvSuggestionRepository;
use crate::data::user_repository::KvUserRepository;
use crate::infrastructure::clock::Clock;
use crate::infrastructure::report_viewer::ReportViewer;

pub type Auth = AuthService<KvUserRepository, KvResetCodeRepository>;
pub type Quotes = QuoteService<KvQuoteRepository, KvSuggestionRepository>;
pub type Suggestions = SuggestionService<KvSuggestionRepository>;
pub type Notifications = NotificationService<KvNotificationRepository>;
pub type Profiles = ProfileService<KvProfileRepository>;
pub type SettingsSvc = SettingsService<KvProfileRepository>;
pub type Accounts =
    AccountService<KvUserRepository, KvQuoteRepository, KvProfileRepository, KvPlanRequestRepository>;
pub type Admin = AdminService<KvPlanRequestRepository, KvUserRepository, KvResetCodeRepository>;
pub type Reports = ReportService<KvQuoteRepository, KvProfileRepository>;

/// Every service wired over one store.
#[derive(Clone)]
pub struct AppContext {
    pub storage: Storage,
    pub auth: Auth,
    pub quotes: Quotes,
    pub suggestions: Suggestions,
    pub notifications: Notifications,
    pub profiles: Profiles,
    pub settings: SettingsSvc,
    pub accounts: Accounts,
    pub admin: Admin,
    pub reports: Reports,
}

impl AppContext {
    pub fn new(
        storage: Storage,
        clock: Arc<dyn Clock>,
        viewer: Arc<dyn ReportViewer>,
        admin_password: Option<String>,
    ) -> Self {
        let users = Arc::new(KvUserRepository::new(storage.clone()));
        let codes = Arc::new(KvResetCodeRepository::new(storage.clone()));
        let quote_repo = Arc::new(KvQuoteRepository::new(storage.clone()));
        let suggestion_repo = Arc::new(KvSuggestionRepository::new(storage.clone()));
        let notification_repo = Arc::new(KvNotificationRepository::new(storage.clone()));
        let profile_repo = Arc::new(KvProfileRepository::new(storage.clone()));
        let request_repo = Arc::new(KvPlanRequestRepository::new(storage.clone()));

        let auth = AuthService::new(Arc::clone(&users), codes, Arc::clone(&clock));
        let suggestions = SuggestionService::new(suggestion_repo);
        let quotes = QuoteService::new(
            Arc::clone(&quote_repo),
            suggestions.clone(),
            Arc::clone(&clock),
        );
        let accounts = AccountService::new(
            Arc::clone(&users),
            Arc::clone(&quote_repo),
            Arc::clone(&profile_repo),
            Arc::clone(&request_repo),
            Arc::clone(&clock),
        );
        let admin = AdminService::new(
            request_repo,
            users,
            auth.clone(),
            admin_password,
            Arc::clone(&clock),
        );
        let reports = ReportService::new(
            quote_repo,
            Arc::clone(&profile_repo),
            viewer,
            Arc::clone(&clock),
        );

        Self {
            storage,
            auth,
            quotes,
            suggestions,
            notifications: NotificationService::new(notification_repo, clock),
            profiles: ProfileService::new(Arc::clone(&profile_repo)),
            settings: SettingsService::new(profile_repo),
            accounts,
            admin,
            reports,
        }
    }
}
