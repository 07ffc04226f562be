//! The owner's systems (restaurants and supermarkets) and their branding.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiClient, ApiError, ApiHook, FormPart, Method, Payload};
use crate::tenant::SystemId;

use super::menu::ImageUpload;

const SYSTEMS: &str = "/core/systems/";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemCategory {
  #[default]
  Restaurant,
  Supermarket,
}

impl SystemCategory {
  pub fn as_str(self) -> &'static str {
    match self {
      SystemCategory::Restaurant => "restaurant",
      SystemCategory::Supermarket => "supermarket",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct System {
  pub id: u64,
  pub name: String,
  pub category: SystemCategory,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub is_public: bool,
  #[serde(default = "active")]
  pub is_active: bool,
  #[serde(default)]
  pub logo: Option<String>,
  #[serde(default)]
  pub public_title: Option<String>,
  #[serde(default)]
  pub phone_number: Option<String>,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub subdomain: Option<String>,
}

fn active() -> bool {
  true
}

impl System {
  pub fn system_id(&self) -> SystemId {
    SystemId::from(self.id)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSystem {
  pub name: String,
  pub category: SystemCategory,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderImage {
  pub id: u64,
  pub image: String,
  #[serde(default)]
  pub caption: Option<String>,
  #[serde(default = "active")]
  pub is_active: bool,
}

pub struct SystemService {
  hook: ApiHook,
}

impl SystemService {
  pub fn new(client: &ApiClient) -> Self {
    Self { hook: client.hook() }
  }

  pub fn hook(&self) -> &ApiHook {
    &self.hook
  }

  fn system_url(id: &SystemId) -> String {
    format!("{}{}/", SYSTEMS, id)
  }

  fn sliders_url(id: &SystemId) -> String {
    format!("{}slider-images/", Self::system_url(id))
  }

  fn invalidate(&self, id: &SystemId) {
    self.hook.clear_cache(&Self::system_url(id));
    self.hook.clear_cache(SYSTEMS);
  }

  pub async fn list(&self) -> Result<Option<Vec<System>>, ApiError> {
    self.hook.get(SYSTEMS).await
  }

  pub async fn get(&self, id: &SystemId) -> Result<Option<System>, ApiError> {
    self.hook.get(&Self::system_url(id)).await
  }

  pub async fn create(&self, system: &NewSystem) -> Result<Option<System>, ApiError> {
    let url = format!("{}create/", SYSTEMS);
    let created = self.hook.call(Method::Post, &url, Payload::json(system)?).await?;
    self.hook.clear_cache(SYSTEMS);
    Ok(created)
  }

  /// Partial update; `changes` holds only the fields to overwrite.
  pub async fn update(&self, id: &SystemId, changes: &Value) -> Result<Option<System>, ApiError> {
    let updated = self
      .hook
      .call(Method::Patch, &Self::system_url(id), Payload::json(changes)?)
      .await?;
    self.invalidate(id);
    Ok(updated)
  }

  pub async fn delete(&self, id: &SystemId) -> Result<(), ApiError> {
    let url = format!("{}delete/", Self::system_url(id));
    let _: Option<Value> = self.hook.call(Method::Delete, &url, Payload::None).await?;
    self.invalidate(id);
    Ok(())
  }

  pub async fn upload_logo(&self, id: &SystemId, logo: ImageUpload) -> Result<Option<Value>, ApiError> {
    let url = format!("{}logo/", Self::system_url(id));
    let uploaded = self
      .hook
      .call(Method::Patch, &url, Payload::Multipart(vec![logo.into_part("logo")]))
      .await?;
    self.invalidate(id);
    Ok(uploaded)
  }

  pub async fn public_profile(&self, id: &SystemId) -> Result<Option<Value>, ApiError> {
    self.hook.get(&format!("{}public-profile/", Self::system_url(id))).await
  }

  pub async fn update_public_profile(
    &self,
    id: &SystemId,
    changes: &Value,
  ) -> Result<Option<Value>, ApiError> {
    let url = format!("{}public-profile/", Self::system_url(id));
    let updated = self.hook.call(Method::Patch, &url, Payload::json(changes)?).await?;
    self.hook.clear_cache(&url);
    self.invalidate(id);
    Ok(updated)
  }

  pub async fn slider_images(&self, id: &SystemId) -> Result<Option<Vec<SliderImage>>, ApiError> {
    self.hook.get(&Self::sliders_url(id)).await
  }

  pub async fn add_slider_image(
    &self,
    id: &SystemId,
    image: ImageUpload,
    caption: Option<&str>,
    is_active: bool,
  ) -> Result<Option<SliderImage>, ApiError> {
    let mut parts = vec![image.into_part("image")];
    if let Some(caption) = caption {
      parts.push(FormPart::text("caption", caption));
    }
    parts.push(FormPart::text("is_active", is_active.to_string()));

    let url = Self::sliders_url(id);
    let added = self.hook.call(Method::Post, &url, Payload::Multipart(parts)).await?;
    self.hook.clear_cache(&url);
    Ok(added)
  }
}
