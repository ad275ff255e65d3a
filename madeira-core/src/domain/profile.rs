use serde::{Deserialize, Serialize};

/// Company data printed in quote headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyProfile {
    pub company: String,
    pub phone: String,
    pub address: String,
    pub email: String,
    pub cnpj: String,
    /// `data:<mime>;base64,...` URL, empty when no logo was uploaded.
    pub logo: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub company: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub cnpj: Option<String>,
}

/// Saved client with an optional phone, used for autocomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContact {
    pub name: String,
    #[serde(default)]
    pub phone: String,
}
