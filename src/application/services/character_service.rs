//! Character Service - Application service for a story's cast
//!
//! Every character of a story is offered to the Character Agent for every
//! scene, so there is no per-scene membership to manage here.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::application::ports::outbound::{CharacterRepositoryPort, StoryRepositoryPort};
use crate::application::services::error::{validate_length, ServiceError};
use crate::domain::entities::Character;
use crate::domain::value_objects::{CharacterId, StoryId};

pub const NAME_MAX_CHARS: usize = 100;
pub const TRAITS_MAX_CHARS: usize = 1000;
pub const BACKSTORY_MAX_CHARS: usize = 5000;

/// Request to create a new character
#[derive(Debug, Clone)]
pub struct CreateCharacterRequest {
    pub name: String,
    pub traits: String,
    pub backstory: Option<String>,
}

/// Request to update an existing character
#[derive(Debug, Clone, Default)]
pub struct UpdateCharacterRequest {
    pub name: Option<String>,
    pub traits: Option<String>,
    pub backstory: Option<String>,
}

/// Character service trait defining the application use cases
#[async_trait]
pub trait CharacterService: Send + Sync {
    async fn create_character(
        &self,
        story_id: StoryId,
        request: CreateCharacterRequest,
    ) -> Result<Character, ServiceError>;

    async fn get_character(&self, id: CharacterId) -> Result<Option<Character>, ServiceError>;

    /// Every character in a story
    async fn list_characters(&self, story_id: StoryId) -> Result<Vec<Character>, ServiceError>;

    async fn update_character(
        &self,
        id: CharacterId,
        request: UpdateCharacterRequest,
    ) -> Result<Character, ServiceError>;

    async fn delete_character(&self, id: CharacterId) -> Result<(), ServiceError>;
}

pub struct CharacterServiceImpl {
    stories: Arc<dyn StoryRepositoryPort>,
    characters: Arc<dyn CharacterRepositoryPort>,
}

impl CharacterServiceImpl {
    pub fn new(
        stories: Arc<dyn StoryRepositoryPort>,
        characters: Arc<dyn CharacterRepositoryPort>,
    ) -> Self {
        Self { stories, characters }
    }

    fn validate_create_request(request: &CreateCharacterRequest) -> Result<(), ServiceError> {
        validate_length("Name", &request.name, 1, NAME_MAX_CHARS)?;
        validate_length("Traits", &request.traits, 1, TRAITS_MAX_CHARS)?;
        if let Some(ref backstory) = request.backstory {
            validate_length("Backstory", backstory, 0, BACKSTORY_MAX_CHARS)?;
        }
        Ok(())
    }

    fn validate_update_request(request: &UpdateCharacterRequest) -> Result<(), ServiceError> {
        if let Some(ref name) = request.name {
            validate_length("Name", name, 1, NAME_MAX_CHARS)?;
        }
        if let Some(ref traits) = request.traits {
            validate_length("Traits", traits, 1, TRAITS_MAX_CHARS)?;
        }
        if let Some(ref backstory) = request.backstory {
            validate_length("Backstory", backstory, 0, BACKSTORY_MAX_CHARS)?;
        }
        Ok(())
    }
}

#[async_trait]
impl CharacterService for CharacterServiceImpl {
    #[instrument(skip(self, request), fields(story_id = %story_id, name = %request.name))]
    async fn create_character(
        &self,
        story_id: StoryId,
        request: CreateCharacterRequest,
    ) -> Result<Character, ServiceError> {
        Self::validate_create_request(&request)?;

        if self.stories.get(story_id).await?.is_none() {
            return Err(ServiceError::not_found("Story", story_id));
        }

        let mut character = Character::new(story_id, request.name, request.traits);
        if let Some(backstory) = request.backstory.filter(|b| !b.trim().is_empty()) {
            character = character.with_backstory(backstory);
        }

        self.characters.create(&character).await?;

        info!(character_id = %character.id, "Created character: {}", character.name);
        Ok(character)
    }

    #[instrument(skip(self))]
    async fn get_character(&self, id: CharacterId) -> Result<Option<Character>, ServiceError> {
        debug!(character_id = %id, "Fetching character");
        Ok(self.characters.get(id).await?)
    }

    #[instrument(skip(self))]
    async fn list_characters(&self, story_id: StoryId) -> Result<Vec<Character>, ServiceError> {
        if self.stories.get(story_id).await?.is_none() {
            return Err(ServiceError::not_found("Story", story_id));
        }
        Ok(self.characters.list_by_story(story_id).await?)
    }

    #[instrument(skip(self, request), fields(character_id = %id))]
    async fn update_character(
        &self,
        id: CharacterId,
        request: UpdateCharacterRequest,
    ) -> Result<Character, ServiceError> {
        Self::validate_update_request(&request)?;

        let mut character = self
            .characters
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Character", id))?;

        if let Some(name) = request.name {
            character.name = name;
        }
        if let Some(traits) = request.traits {
            character.traits = traits;
        }
        if let Some(backstory) = request.backstory {
            character.backstory = (!backstory.trim().is_empty()).then_some(backstory);
        }

        self.characters.update(&character).await?;

        info!(character_id = %id, "Updated character: {}", character.name);
        Ok(character)
    }

    #[instrument(skip(self), fields(character_id = %id))]
    async fn delete_character(&self, id: CharacterId) -> Result<(), ServiceError> {
        if self.characters.get(id).await?.is_none() {
            return Err(ServiceError::not_found("Character", id));
        }
        self.characters.delete(id).await?;

        info!(character_id = %id, "Deleted character");
        Ok(())
    }
}
