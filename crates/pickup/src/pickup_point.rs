use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pvz_core::{CityId, DomainError, DomainResult, Entity, PickupPointId};

/// A city from the immutable reference table, denormalized with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
}

impl City {
    pub fn new(id: CityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A registered pickup point (PVZ).
///
/// Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupPoint {
    pub id: PickupPointId,
    pub registered_at: DateTime<Utc>,
    pub city: City,
}

impl Entity for PickupPoint {
    type Id = PickupPointId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Registration request for a pickup point.
///
/// `id` and `registered_at` are optional; the registry fills them in when the
/// caller leaves them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterPickupPoint {
    pub city_name: String,
    pub id: Option<PickupPointId>,
    pub registered_at: Option<DateTime<Utc>>,
}

impl RegisterPickupPoint {
    pub fn in_city(city_name: impl Into<String>) -> Self {
        Self {
            city_name: city_name.into(),
            id: None,
            registered_at: None,
        }
    }

    pub fn with_id(mut self, id: PickupPointId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn registered_at(mut self, at: DateTime<Utc>) -> Self {
        self.registered_at = Some(at);
        self
    }

    /// Rejects requests that can never resolve to a city.
    pub fn validate(&self) -> DomainResult<()> {
        if self.city_name.trim().is_empty() {
            return Err(DomainError::validation("city cannot be empty"));
        }
        Ok(())
    }

    /// Build the entity once the city name has been resolved.
    pub fn into_pickup_point(self, city: City, now: DateTime<Utc>) -> PickupPoint {
        PickupPoint {
            id: self.id.unwrap_or_default(),
            registered_at: self.registered_at.unwrap_or(now),
            city,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn moscow() -> City {
        City::new(CityId(3), "Москва")
    }

    #[test]
    fn missing_fields_are_generated() {
        let now = Utc::now();
        let point = RegisterPickupPoint::in_city("Москва").into_pickup_point(moscow(), now);

        assert_eq!(point.city.id, CityId(3));
        assert_eq!(point.registered_at, now);
    }

    #[test]
    fn supplied_fields_are_kept() {
        let id = PickupPointId::new();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let point = RegisterPickupPoint::in_city("Москва")
            .with_id(id)
            .registered_at(at)
            .into_pickup_point(moscow(), Utc::now());

        assert_eq!(point.id, id);
        assert_eq!(point.registered_at, at);
    }

    #[test]
    fn blank_city_is_rejected() {
        let err = RegisterPickupPoint::in_city("   ").validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
