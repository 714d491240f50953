use crate::{
    auth::{Action, AuthUser, authorize},
    crypto::{CryptoCodec, DecryptionError},
    error::ApiError,
    geo::{self, Coordinate},
    models::{
        CreatePoiRequest, CreatePoiResponse, NearbyPoi, NewPoi, OwnedPoi, Poi, PoiSearchResult,
    },
    repository::RepositoryState,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// DecodedPoi
///
/// A record whose ciphertext fields decrypted successfully. Output of the
/// first (decode) stage of the scan pipeline; the second stage filters and
/// projects over these without touching the codec again.
struct DecodedPoi {
    id: Uuid,
    name: String,
    location: String,
    category: String,
    uploaded_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DecodedPoi {
    /// The record's coordinate, if its location text parses as one.
    fn coordinate(&self) -> Option<Coordinate> {
        geo::parse_latlng(&self.location)
    }
}

/// PoiCatalog
///
/// The POI record catalog: create, keyword search, list-by-owner, delete and
/// radius search, built over an opaque record store and the field codec.
///
/// Search and nearby are a full scan with per-record decrypt-then-filter.
/// That linear shape is the contract here; a spatial index could replace it
/// behind this interface without changing any operation's behavior.
#[derive(Clone)]
pub struct PoiCatalog {
    repo: RepositoryState,
    codec: Arc<CryptoCodec>,
}

impl PoiCatalog {
    pub fn new(repo: RepositoryState, codec: Arc<CryptoCodec>) -> Self {
        Self { repo, codec }
    }

    /// Decode stage: attempts to decrypt both sensitive fields.
    fn decode(&self, poi: &Poi) -> Result<DecodedPoi, DecryptionError> {
        Ok(DecodedPoi {
            id: poi.id,
            name: self.codec.decrypt(&poi.name_encrypted)?,
            location: self.codec.decrypt(&poi.location_encrypted)?,
            category: poi.category.clone(),
            uploaded_by: poi.uploaded_by,
            created_at: poi.created_at,
            updated_at: poi.updated_at,
        })
    }

    /// Decode-or-skip: unreadable records are logged and dropped so one bad
    /// row can never fail a whole scan.
    fn decode_readable(&self, records: &[Poi]) -> Vec<DecodedPoi> {
        records
            .iter()
            .filter_map(|poi| match self.decode(poi) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    tracing::warn!(poi_id = %poi.id, "skipping unreadable POI record: {e}");
                    None
                }
            })
            .collect()
    }

    /// create
    ///
    /// Admin-only registration of a new POI. Validates all three fields, then
    /// encrypts name and location before anything is persisted.
    pub async fn create(
        &self,
        caller: &AuthUser,
        req: CreatePoiRequest,
    ) -> Result<CreatePoiResponse, ApiError> {
        authorize(caller, Action::CreatePoi)?;

        if req.name.trim().is_empty() {
            return Err(ApiError::validation("A POI name is required."));
        }
        if req.category.trim().is_empty() {
            return Err(ApiError::validation("A POI category is required."));
        }
        if req.location.trim().is_empty() {
            return Err(ApiError::validation("A POI location is required."));
        }
        if geo::parse_latlng(&req.location).is_none() {
            return Err(ApiError::validation(
                "Invalid location format. Must be 'lat,lng' with valid numbers.",
            ));
        }

        let record = self
            .repo
            .create_poi(NewPoi {
                name_encrypted: self.codec.encrypt(&req.name),
                location_encrypted: self.codec.encrypt(&req.location),
                category: req.category,
                uploaded_by: caller.id,
            })
            .await?;

        tracing::info!(poi_id = %record.id, "POI registered");
        Ok(CreatePoiResponse {
            success: true,
            message: "POI uploaded successfully.".to_string(),
            poi_id: record.id,
        })
    }

    /// search_by_keyword
    ///
    /// Scans every record, keeping those whose decrypted name contains the
    /// keyword case-insensitively. When a center is supplied, each hit gets
    /// its distance from the center attached (two decimals); hits whose
    /// stored location cannot be parsed are then subject to the same
    /// corrupt-record policy as radius search and are skipped.
    pub async fn search_by_keyword(
        &self,
        caller: &AuthUser,
        keyword: &str,
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> Result<Vec<PoiSearchResult>, ApiError> {
        authorize(caller, Action::SearchPoi)?;

        if keyword.trim().is_empty() {
            return Err(ApiError::validation("Search keyword is required."));
        }
        let center = resolve_center(lat, lng)?;

        let records = self.repo.all_pois().await?;
        let needle = keyword.to_lowercase();

        let mut results = Vec::new();
        for poi in self.decode_readable(&records) {
            if !poi.name.to_lowercase().contains(&needle) {
                continue;
            }
            let distance = match center {
                None => None,
                Some(center) => match poi.coordinate() {
                    Some(here) => Some(geo::round_km(geo::distance_km(center, here))),
                    None => {
                        tracing::warn!(
                            poi_id = %poi.id,
                            "skipping POI with unparsable coordinates"
                        );
                        continue;
                    }
                },
            };
            results.push(PoiSearchResult {
                id: poi.id,
                name: poi.name,
                location: poi.location,
                category: poi.category,
                uploaded_by: poi.uploaded_by,
                created_at: poi.created_at,
                updated_at: poi.updated_at,
                distance,
            });
        }
        Ok(results)
    }

    /// list_own
    ///
    /// Every record the caller uploaded, decrypted. No pagination.
    pub async fn list_own(&self, caller: &AuthUser) -> Result<Vec<OwnedPoi>, ApiError> {
        authorize(caller, Action::ListOwnPois)?;

        let records = self.repo.pois_by_owner(caller.id).await?;
        Ok(self
            .decode_readable(&records)
            .into_iter()
            .map(|poi| OwnedPoi {
                id: poi.id,
                name: poi.name,
                location: poi.location,
                category: poi.category,
            })
            .collect())
    }

    /// delete
    ///
    /// Owner-or-admin removal. A concurrent delete that wins the race is
    /// reported as `NotFound`, never as a conflict.
    pub async fn delete(&self, caller: &AuthUser, id: Uuid) -> Result<(), ApiError> {
        let poi = self
            .repo
            .get_poi(id)
            .await?
            .ok_or_else(|| ApiError::not_found("POI not found."))?;

        authorize(caller, Action::DeletePoi {
            owner: poi.uploaded_by,
        })?;

        if !self.repo.delete_poi(id).await? {
            return Err(ApiError::not_found("POI not found."));
        }
        tracing::info!(poi_id = %id, "POI deleted");
        Ok(())
    }

    /// nearby
    ///
    /// Scans every record; keeps those within `radius_km` of the center,
    /// boundary inclusive. Records whose location fails to decrypt or parse
    /// are skipped and logged, never surfaced as an operation error.
    pub async fn nearby(
        &self,
        caller: &AuthUser,
        lat: Option<f64>,
        lng: Option<f64>,
        radius_km: Option<f64>,
    ) -> Result<Vec<NearbyPoi>, ApiError> {
        authorize(caller, Action::NearbyPoi)?;

        let (Some(lat), Some(lng), Some(radius_km)) = (lat, lng, radius_km) else {
            return Err(ApiError::validation("lat, lng, and radius are required."));
        };
        if !lat.is_finite() || !lng.is_finite() {
            return Err(ApiError::validation(
                "Center coordinates must be finite numbers.",
            ));
        }
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(ApiError::validation(
                "radius must be a positive number of kilometers.",
            ));
        }
        let center = Coordinate { lat, lng };

        let records = self.repo.all_pois().await?;

        let mut results = Vec::new();
        for poi in self.decode_readable(&records) {
            let Some(here) = poi.coordinate() else {
                tracing::warn!(
                    poi_id = %poi.id,
                    "skipping POI with unparsable coordinates"
                );
                continue;
            };
            let distance = geo::distance_km(center, here);
            if distance <= radius_km {
                results.push(NearbyPoi {
                    id: poi.id,
                    name: poi.name,
                    location: poi.location,
                    category: poi.category,
                    distance: geo::round_km(distance),
                });
            }
        }
        Ok(results)
    }
}

/// A search center is either fully absent or fully specified; half a
/// coordinate is treated as malformed input.
fn resolve_center(lat: Option<f64>, lng: Option<f64>) -> Result<Option<Coordinate>, ApiError> {
    match (lat, lng) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => {
            if !lat.is_finite() || !lng.is_finite() {
                return Err(ApiError::validation(
                    "Center coordinates must be finite numbers.",
                ));
            }
            Ok(Some(Coordinate { lat, lng }))
        }
        _ => Err(ApiError::validation(
            "Both lat and lng are required to attach distances.",
        )),
    }
}
