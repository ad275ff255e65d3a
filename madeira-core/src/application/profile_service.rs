use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::data::profile_repository::ProfileRepository;
use crate::domain::error::DomainError;
use crate::domain::profile::{CompanyProfile, ProfileUpdate};
use crate::presentation::format::{format_cnpj, format_phone};

pub const MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;

/// Company data shown on quote documents, one profile per user.
#[derive(Clone)]
pub struct ProfileService<P: ProfileRepository + 'static> {
    repo: Arc<P>,
}

impl<P> ProfileService<P>
where
    P: ProfileRepository + 'static,
{
    pub fn new(repo: Arc<P>) -> Self {
        Self { repo }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<CompanyProfile, DomainError> {
        Ok(self.repo.profile(user_id).await?.unwrap_or_default())
    }

    /// Phone and CNPJ are stored formatted.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<CompanyProfile, DomainError> {
        let mut profile = self.get(user_id).await?;
        if let Some(company) = update.company {
            profile.company = company.trim().to_string();
        }
        if let Some(phone) = update.phone {
            profile.phone = format_phone(&phone);
        }
        if let Some(address) = update.address {
            profile.address = address.trim().to_string();
        }
        if let Some(email) = update.email {
            profile.email = email.trim().to_lowercase();
        }
        if let Some(cnpj) = update.cnpj {
            profile.cnpj = format_cnpj(&cnpj);
        }
        self.repo.save_profile(user_id, &profile).await?;
        Ok(profile)
    }

    #[instrument(skip(self, bytes))]
    pub async fn set_logo(
        &self,
        user_id: Uuid,
        bytes: &[u8],
        mime: &str,
    ) -> Result<CompanyProfile, DomainError> {
        if !mime.starts_with("image/") {
            warn!(mime, "logo is not an image");
            return Err(DomainError::Validation(format!("logo must be an image, got {mime}")));
        }
        if bytes.is_empty() || bytes.len() > MAX_LOGO_BYTES {
            return Err(DomainError::Validation("logo must be between 1 byte and 2MB".into()));
        }
        let mut profile = self.get(user_id).await?;
        profile.logo = format!("data:{mime};base64,{}", STANDARD.encode(bytes));
        self.repo.save_profile(user_id, &profile).await?;
        info!(user_id = %user_id, bytes = bytes.len(), "logo stored");
        Ok(profile)
    }

    pub async fn remove_logo(&self, user_id: Uuid) -> Result<CompanyProfile, DomainError> {
        let mut profile = self.get(user_id).await?;
        if !profile.logo.is_empty() {
            profile.logo.clear();
            self.repo.save_profile(user_id, &profile).await?;
        }
        Ok(profile)
    }
}

/// Guesses an image MIME type from a file extension.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
