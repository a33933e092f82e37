// ── Pet profile ──

use chrono::{DateTime, NaiveDate, Utc};
use furbulous_api::Pet;
use furbulous_api::vocabulary::{gender_label, pet_type_label};
use serde::Serialize;

/// Display view of a pet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PetProfile {
    pub pet_id: i64,
    pub name: String,
    pub gender: &'static str,
    pub pet_type: &'static str,
    pub breed: Option<String>,
    pub weight: Option<f64>,
    pub sterilized: bool,
    pub birthday: Option<NaiveDate>,
    /// Whole days since `birthday` as of the evaluation time.
    pub age_days: Option<i64>,
    /// Age as reported by the vendor.
    pub reported_age: Option<i64>,
    pub avatar: Option<String>,
    pub food_brand: Option<String>,
}

impl PetProfile {
    /// Build a profile evaluated at `now`.
    pub fn from_pet(pet: &Pet, now: DateTime<Utc>) -> Self {
        let born = pet
            .birth_timestamp
            .filter(|ts| *ts > 0)
            .and_then(|ts| DateTime::from_timestamp(ts, 0));

        Self {
            pet_id: pet.pet_id,
            name: pet
                .nickname
                .clone()
                .unwrap_or_else(|| format!("Pet {}", pet.pet_id)),
            gender: gender_label(pet.gender_code),
            pet_type: pet_type_label(pet.pet_type_code),
            breed: pet.breed.clone(),
            weight: pet.weight,
            sterilized: pet.sterilized,
            birthday: born.map(|b| b.date_naive()),
            age_days: born.map(|b| (now - b).num_days()),
            reported_age: pet.age,
            avatar: pet.avatar.clone(),
            food_brand: pet.food_brand.clone(),
        }
    }
}
