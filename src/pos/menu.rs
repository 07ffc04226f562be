//! Restaurant menu items.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiClient, ApiError, ApiHook, FormPart, Method, Payload};
use crate::tenant::SystemId;

use super::{de, form_fields, with_query};

/// Category keywords and their icons, in match order.
const CATEGORY_ICONS: &[(&str, &str)] = &[
  ("pizza", "🍕"),
  ("burger", "🍔"),
  ("sandwich", "🥪"),
  ("drinks", "🥤"),
  ("dessert", "🍰"),
  ("salad", "🥗"),
  ("soup", "🥣"),
  ("pasta", "🍝"),
  ("seafood", "🦞"),
  ("chicken", "🍗"),
  ("beef", "🥩"),
  ("vegetarian", "🥬"),
  ("breakfast", "🍳"),
  ("lunch", "🍱"),
  ("dinner", "🍽️"),
  ("snacks", "🍿"),
  ("ice cream", "🍦"),
  ("coffee", "☕"),
  ("tea", "🫖"),
  ("juice", "🧃"),
  ("smoothie", "🥤"),
  ("wine", "🍷"),
  ("beer", "🍺"),
  ("cocktail", "🍹"),
];

pub const DEFAULT_ICON: &str = "🍽️";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
  pub id: u64,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(deserialize_with = "de::decimal")]
  pub price: f64,
  #[serde(default, deserialize_with = "de::opt_decimal")]
  pub cost: Option<f64>,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub is_available: bool,
  #[serde(default)]
  pub image: Option<String>,
}

/// Fields sent when creating or updating an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MenuItemDraft {
  pub name: String,
  pub description: String,
  pub category: String,
  pub price: f64,
  pub cost: f64,
  pub is_available: bool,
}

/// An image to upload alongside a draft.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
  pub file_name: String,
  pub mime: String,
  pub bytes: Vec<u8>,
}

impl ImageUpload {
  /// Multipart file part under the form field `field`.
  pub fn into_part(self, field: &str) -> FormPart {
    FormPart::file(field, self.file_name, self.mime, self.bytes)
  }
}

/// Icon for a category: exact match first, then the first keyword the
/// category contains, then the plate.
pub fn category_icon(category: &str) -> &'static str {
  let normalized = category.trim().to_lowercase();

  if let Some((_, icon)) = CATEGORY_ICONS.iter().find(|(key, _)| *key == normalized) {
    return *icon;
  }
  CATEGORY_ICONS
    .iter()
    .find(|(key, _)| normalized.contains(key))
    .map(|(_, icon)| *icon)
    .unwrap_or(DEFAULT_ICON)
}

/// SVG data URL rendering a single emoji, used as a placeholder image.
pub fn emoji_svg(emoji: &str) -> String {
  format!(
    "data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'>\
     <text y='50%' x='50%' dominant-baseline='middle' text-anchor='middle' font-size='50'>{}</text></svg>",
    emoji
  )
}

fn with_placeholder(mut item: MenuItem) -> MenuItem {
  if item.image.as_deref().map_or(true, str::is_empty) {
    item.image = Some(emoji_svg(category_icon(&item.category)));
  }
  item
}

/// Case-insensitive search over name, description and category, limited to
/// `categories` when any are given.
pub fn filter_items<'a>(
  items: &'a [MenuItem],
  categories: &[String],
  search: &str,
) -> Vec<&'a MenuItem> {
  let needle = search.to_lowercase();
  items
    .iter()
    .filter(|item| categories.is_empty() || categories.contains(&item.category))
    .filter(|item| {
      needle.is_empty()
        || item.name.to_lowercase().contains(&needle)
        || item.description.to_lowercase().contains(&needle)
        || item.category.to_lowercase().contains(&needle)
    })
    .collect()
}

pub struct MenuService {
  hook: ApiHook,
  system: SystemId,
}

impl MenuService {
  pub fn new(client: &ApiClient, system: SystemId) -> Self {
    Self {
      hook: client.hook(),
      system,
    }
  }

  pub fn hook(&self) -> &ApiHook {
    &self.hook
  }

  fn collection(&self) -> String {
    format!("/restaurant/{}/menu-items/", self.system)
  }

  fn item_url(&self, id: u64) -> String {
    format!("{}{}/", self.collection(), id)
  }

  fn invalidate(&self, id: Option<u64>) {
    if let Some(id) = id {
      self.hook.clear_cache(&self.item_url(id));
    }
    self.hook.clear_cache(&self.collection());
  }

  /// Items, optionally limited to one category. Items without an image get
  /// an emoji placeholder.
  pub async fn list(&self, category: Option<&str>) -> Result<Option<Vec<MenuItem>>, ApiError> {
    let url = match category.filter(|c| !c.is_empty()) {
      Some(category) => with_query(&self.collection(), &[("category", category)]),
      None => self.collection(),
    };

    let items: Option<Vec<MenuItem>> = self.hook.get(&url).await?;
    Ok(items.map(|items| items.into_iter().map(with_placeholder).collect()))
  }

  pub async fn categories(&self) -> Result<Option<Vec<String>>, ApiError> {
    let url = format!("{}categories/", self.collection());
    self.hook.get(&url).await
  }

  pub async fn get(&self, id: u64) -> Result<Option<MenuItem>, ApiError> {
    let item: Option<MenuItem> = self.hook.get(&self.item_url(id)).await?;
    Ok(item.map(with_placeholder))
  }

  pub async fn create(
    &self,
    draft: &MenuItemDraft,
    image: Option<ImageUpload>,
  ) -> Result<Option<MenuItem>, ApiError> {
    let payload = Self::payload(draft, image)?;
    let created = self.hook.call(Method::Post, &self.collection(), payload).await?;
    self.invalidate(None);
    Ok(created)
  }

  /// Full replacement (PUT); multipart when an image is attached.
  pub async fn update(
    &self,
    id: u64,
    draft: &MenuItemDraft,
    image: Option<ImageUpload>,
  ) -> Result<Option<MenuItem>, ApiError> {
    let payload = Self::payload(draft, image)?;
    let updated = self.hook.call(Method::Put, &self.item_url(id), payload).await?;
    self.invalidate(Some(id));
    Ok(updated)
  }

  /// Partial update, e.g. `{"is_available": false}`.
  pub async fn patch(&self, id: u64, changes: Value) -> Result<Option<MenuItem>, ApiError> {
    let updated = self
      .hook
      .call(Method::Patch, &self.item_url(id), Payload::Json(changes))
      .await?;
    self.invalidate(Some(id));
    Ok(updated)
  }

  pub async fn delete(&self, id: u64) -> Result<(), ApiError> {
    let _: Option<Value> = self
      .hook
      .call(Method::Delete, &self.item_url(id), Payload::None)
      .await?;
    self.invalidate(Some(id));
    Ok(())
  }

  fn payload(draft: &MenuItemDraft, image: Option<ImageUpload>) -> Result<Payload, ApiError> {
    match image {
      None => Ok(Payload::json(draft)?),
      Some(image) => {
        let mut parts = form_fields(draft)?;
        parts.push(image.into_part("image"));
        Ok(Payload::Multipart(parts))
      }
    }
  }
}
