//! Person profiles and their media references.
//!
//! The free functions operate on an already-loaded [`Document`]; they never
//! touch the disk. [`PersonService`] wraps each of them in one load / run /
//! save cycle against the [`DocumentStore`].
//!
//! Ids are supplied by the caller and are not checked for uniqueness. When
//! several persons share an id, every lookup resolves to the first one in
//! stored order.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, instrument};

use crate::document::{Document, GalleryItem, Person, Video};
use crate::errors::ServiceError;
use crate::storage::document_store::DocumentStore;

/// Create request. Only `id` and `name` are required.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInput {
    pub id: Option<String>,
    pub name: Option<String>,
    pub greeting: Option<String>,
    pub theme: Option<String>,
    pub custom_message: Option<String>,
    pub review: Option<String>,
}

/// Parse a positional path segment. Anything that is not a non-negative
/// integer cannot address an element, so it reports `what` as not found.
pub fn parse_index(raw: &str, what: &str) -> Result<usize, ServiceError> {
    raw.trim().parse::<usize>().map_err(|_| ServiceError::not_found(what))
}

pub fn list_all(doc: &Document) -> &[Person] {
    &doc.persons
}

pub fn find_by_id<'a>(doc: &'a Document, id: &str) -> Result<&'a Person, ServiceError> {
    doc.persons.iter().find(|p| p.id == id).ok_or_else(|| ServiceError::not_found("person"))
}

fn find_by_id_mut<'a>(doc: &'a mut Document, id: &str) -> Result<&'a mut Person, ServiceError> {
    doc.persons.iter_mut().find(|p| p.id == id).ok_or_else(|| ServiceError::not_found("person"))
}

pub fn create(doc: &mut Document, input: PersonInput) -> Result<Person, ServiceError> {
    let id = input.id.filter(|s| !s.is_empty()).ok_or_else(|| ServiceError::required("id"))?;
    let name = input.name.filter(|s| !s.is_empty()).ok_or_else(|| ServiceError::required("name"))?;
    let person = Person {
        id,
        name,
        greeting: input.greeting.unwrap_or_default(),
        theme: input.theme.unwrap_or_default(),
        custom_message: input.custom_message.unwrap_or_default(),
        review: input.review.unwrap_or_default(),
        gallery: Vec::new(),
        videos: Vec::new(),
        voice: None,
    };
    doc.persons.push(person.clone());
    Ok(person)
}

pub fn remove(doc: &mut Document, id: &str) -> Result<Person, ServiceError> {
    let pos = doc
        .persons
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| ServiceError::not_found("person"))?;
    Ok(doc.persons.remove(pos))
}

pub fn set_custom_message(doc: &mut Document, id: &str, message: String) -> Result<(), ServiceError> {
    find_by_id_mut(doc, id)?.custom_message = message;
    Ok(())
}

pub fn clear_custom_message(doc: &mut Document, id: &str) -> Result<(), ServiceError> {
    set_custom_message(doc, id, String::new())
}

pub fn append_gallery_item(doc: &mut Document, id: &str, item: GalleryItem) -> Result<Person, ServiceError> {
    let person = find_by_id_mut(doc, id)?;
    person.gallery.push(item);
    Ok(person.clone())
}

pub fn remove_gallery_item(doc: &mut Document, id: &str, index: usize) -> Result<GalleryItem, ServiceError> {
    let person = find_by_id_mut(doc, id).map_err(|_| ServiceError::not_found("image"))?;
    if index >= person.gallery.len() {
        return Err(ServiceError::not_found("image"));
    }
    Ok(person.gallery.remove(index))
}

pub fn append_video(doc: &mut Document, id: &str, video: Video) -> Result<Person, ServiceError> {
    let person = find_by_id_mut(doc, id)?;
    person.videos.push(video);
    Ok(person.clone())
}

pub fn remove_video_at(doc: &mut Document, id: &str, index: usize) -> Result<Video, ServiceError> {
    let person = find_by_id_mut(doc, id).map_err(|_| ServiceError::not_found("video"))?;
    if index >= person.videos.len() {
        return Err(ServiceError::not_found("video"));
    }
    Ok(person.videos.remove(index))
}

pub fn set_voice(doc: &mut Document, id: &str, voice: String) -> Result<(), ServiceError> {
    find_by_id_mut(doc, id)?.voice = Some(voice);
    Ok(())
}

/// Empty strings count as "no voice", matching what older files contain.
pub fn clear_voice(doc: &mut Document, id: &str) -> Result<String, ServiceError> {
    let person = find_by_id_mut(doc, id).map_err(|_| ServiceError::not_found("voice"))?;
    match person.voice.take() {
        Some(v) if !v.is_empty() => Ok(v),
        other => {
            person.voice = other;
            Err(ServiceError::not_found("voice"))
        }
    }
}

/// File-backed person operations; each call is one load / mutate / save cycle.
#[derive(Clone)]
pub struct PersonService {
    store: Arc<DocumentStore>,
}

impl PersonService {
    pub fn new(store: Arc<DocumentStore>) -> Self { Self { store } }

    pub async fn list(&self) -> Result<Vec<Person>, ServiceError> {
        self.store.read(|doc| Ok(list_all(doc).to_vec())).await
    }

    pub async fn get(&self, id: &str) -> Result<Person, ServiceError> {
        self.store.read(|doc| find_by_id(doc, id).cloned()).await
    }

    #[instrument(skip(self, input), fields(person_id = input.id.as_deref().unwrap_or_default()))]
    pub async fn create(&self, input: PersonInput) -> Result<Person, ServiceError> {
        let person = self.store.update(|doc| create(doc, input)).await?;
        info!(person_id = %person.id, "person_created");
        Ok(person)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<Person, ServiceError> {
        let removed = self.store.update(|doc| remove(doc, id)).await?;
        info!(person_id = %id, "person_deleted");
        Ok(removed)
    }

    #[instrument(skip(self, message))]
    pub async fn set_custom_message(&self, id: &str, message: Option<String>) -> Result<(), ServiceError> {
        let message = message.ok_or_else(|| ServiceError::required("message"))?;
        self.store.update(|doc| set_custom_message(doc, id, message)).await
    }

    #[instrument(skip(self))]
    pub async fn clear_custom_message(&self, id: &str) -> Result<(), ServiceError> {
        self.store.update(|doc| clear_custom_message(doc, id)).await
    }

    #[instrument(skip(self, item))]
    pub async fn add_gallery_item(&self, id: &str, item: GalleryItem) -> Result<Person, ServiceError> {
        self.store.update(|doc| append_gallery_item(doc, id, item)).await
    }

    #[instrument(skip(self))]
    pub async fn remove_gallery_item(&self, id: &str, index: &str) -> Result<GalleryItem, ServiceError> {
        let index = parse_index(index, "image")?;
        self.store.update(|doc| remove_gallery_item(doc, id, index)).await
    }

    #[instrument(skip(self, video))]
    pub async fn add_video(&self, id: &str, video: Video) -> Result<Person, ServiceError> {
        self.store.update(|doc| append_video(doc, id, video)).await
    }

    #[instrument(skip(self))]
    pub async fn remove_video(&self, id: &str, index: &str) -> Result<Video, ServiceError> {
        let index = parse_index(index, "video")?;
        self.store.update(|doc| remove_video_at(doc, id, index)).await
    }

    #[instrument(skip(self, voice))]
    pub async fn set_voice(&self, id: &str, voice: Option<String>) -> Result<(), ServiceError> {
        let voice = voice.filter(|v| !v.is_empty()).ok_or_else(|| ServiceError::required("voice"))?;
        self.store.update(|doc| set_voice(doc, id, voice)).await
    }

    #[instrument(skip(self))]
    pub async fn clear_voice(&self, id: &str) -> Result<(), ServiceError> {
        self.store.update(|doc| clear_voice(doc, id)).await.map(|_| ())
    }
}
