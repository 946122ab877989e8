//! The add-a-restaurant form and its submission

use chrono::{DateTime, Utc};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::Session;
use crate::error::Result;
use crate::model::{CuisineType, NewRestaurant, PriceRange, Restaurant};
use crate::postgrest::Collection;
use crate::storage::{ObjectStorage, UploadOptions};

/// Form fields that must be filled before submitting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Name,
    CuisineType,
    PriceRange,
    Address,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequiredField::Name => "name",
            RequiredField::CuisineType => "cuisine_type",
            RequiredField::PriceRange => "price_range",
            RequiredField::Address => "address",
        };
        f.write_str(name)
    }
}

/// Why a form was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required fields: {}", join_fields(.0))]
    MissingFields(Vec<RequiredField>),
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// State of the add form, as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestaurantForm {
    pub name: String,
    pub cuisine_type: Option<CuisineType>,
    pub price_range: Option<PriceRange>,
    pub address: String,
    pub description: String,
}

/// A form that passed validation, trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidForm {
    pub name: String,
    pub cuisine_type: CuisineType,
    pub price_range: PriceRange,
    pub address: String,
    pub description: Option<String>,
}

impl RestaurantForm {
    /// Check the required fields; blank after trimming counts as missing.
    pub fn validate(&self) -> std::result::Result<ValidForm, ValidationError> {
        let name = self.name.trim();
        let address = self.address.trim();

        let mut missing = Vec::new();
        if name.is_empty() {
            missing.push(RequiredField::Name);
        }
        if self.cuisine_type.is_none() {
            missing.push(RequiredField::CuisineType);
        }
        if self.price_range.is_none() {
            missing.push(RequiredField::PriceRange);
        }
        if address.is_empty() {
            missing.push(RequiredField::Address);
        }

        match (self.cuisine_type, self.price_range) {
            (Some(cuisine_type), Some(price_range)) if missing.is_empty() => {
                let description = self.description.trim();
                Ok(ValidForm {
                    name: name.to_string(),
                    cuisine_type,
                    price_range,
                    address: address.to_string(),
                    description: (!description.is_empty()).then(|| description.to_string()),
                })
            }
            _ => Err(ValidationError::MissingFields(missing)),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A photo picked for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImageFile {
    pub fn new(file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            content_type: content_type_for(file_name).to_string(),
            bytes,
        }
    }

    /// Read a local file
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(&file_name, bytes))
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Storage key for an uploaded photo: `restaurants/{unix millis}_{file name}`
pub fn image_key(file_name: &str, at: DateTime<Utc>) -> String {
    format!("restaurants/{}_{}", at.timestamp_millis(), file_name)
}

/// Validates, uploads the optional photo, and creates the restaurant
#[derive(Clone)]
pub struct Submission {
    restaurants: Collection<Restaurant>,
    storage: Arc<dyn ObjectStorage>,
}

impl Submission {
    pub fn new(restaurants: Collection<Restaurant>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            restaurants,
            storage,
        }
    }

    /// Submit the form for the session's user.
    ///
    /// An invalid form makes no backend call. A failed upload aborts before the
    /// restaurant is created; an uploaded photo is not removed if the create
    /// fails afterwards.
    pub async fn submit(
        &self,
        session: &Session,
        form: &RestaurantForm,
        image: Option<&ImageFile>,
    ) -> Result<Restaurant> {
        let valid = form.validate()?;

        let image_url = match image {
            Some(file) => {
                let key = image_key(&file.file_name, Utc::now());
                let options = UploadOptions::upsert().with_content_type(&file.content_type);
                let uploaded = self
                    .storage
                    .upload(session, &key, file.bytes.clone(), options)
                    .await?;
                log::debug!("photo stored at {}", uploaded.public_url);
                Some(uploaded.public_url)
            }
            None => None,
        };

        let record = NewRestaurant {
            id: Uuid::new_v4().to_string(),
            name: valid.name,
            cuisine_type: valid.cuisine_type,
            price_range: valid.price_range,
            address: valid.address,
            description: valid.description,
            image_url,
            user_id: session.user.id.clone(),
        };
        let created = self.restaurants.create(session, &record).await?;
        log::info!("restaurant {} added by {}", created.id, session.user.id);
        Ok(created)
    }
}
