use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{NewPet, Pet};

#[derive(Clone)]
pub struct PetService {
    pets: Arc<RwLock<Vec<Pet>>>,
}

impl Default for PetService {
    fn default() -> Self {
        Self::new()
    }
}

impl PetService {
    pub fn new() -> Self {
        let pets = vec![
            Pet { id: 123, name: "Big Bird".into(), tag: "bird".into() },
            Pet { id: 456, name: "Charlie".into(), tag: "dog".into() },
        ];
        Self { pets: Arc::new(RwLock::new(pets)) }
    }

    pub async fn list(&self, tags: &[&str], limit: Option<usize>) -> Vec<Pet> {
        self.pets
            .read()
            .await
            .iter()
            .filter(|p| tags.is_empty() || tags.contains(&p.tag.as_str()))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    pub async fn get_by_id(&self, id: i64) -> Option<Pet> {
        self.pets.read().await.iter().find(|p| p.id == id).cloned()
    }

    pub async fn create(&self, new_pet: NewPet) -> Pet {
        let mut pets = self.pets.write().await;
        let id = pets.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let pet = Pet { id, name: new_pet.name, tag: new_pet.tag };
        pets.push(pet.clone());
        pet
    }

    /// Returns false when no pet had that id.
    pub async fn delete(&self, id: i64) -> bool {
        let mut pets = self.pets.write().await;
        let before = pets.len();
        pets.retain(|p| p.id != id);
        pets.len() != before
    }
}
