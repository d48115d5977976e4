use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pvz_core::{PickupPointId, ProductId, ReceptionId};
use pvz_pickup::{
    ListQuery, PickupPoint, PickupPointView, Product, Reception, ReceptionStatus, ReceptionView,
    RegisterPickupPoint,
};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct DummyLoginRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePickupPointRequest {
    pub city: String,
    pub id: Option<PickupPointId>,
    pub registration_date: Option<DateTime<Utc>>,
}

impl From<CreatePickupPointRequest> for RegisterPickupPoint {
    fn from(body: CreatePickupPointRequest) -> Self {
        RegisterPickupPoint {
            city_name: body.city,
            id: body.id,
            registered_at: body.registration_date,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartReceptionRequest {
    pub pvz_id: PickupPointId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddProductRequest {
    #[serde(rename = "type")]
    pub product_type: String,
    pub pvz_id: PickupPointId,
}

/// Raw listing parameters; parsed by hand so every failure names its field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPickupPointsParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListPickupPointsParams {
    pub fn into_query(self, now: DateTime<Utc>) -> Result<ListQuery, String> {
        let start = self
            .start_date
            .as_deref()
            .map(|raw| parse_timestamp("startDate", raw))
            .transpose()?;
        let end = self
            .end_date
            .as_deref()
            .map(|raw| parse_timestamp("endDate", raw))
            .transpose()?;
        let page = self
            .page
            .as_deref()
            .map(|raw| parse_number("page", raw))
            .transpose()?;
        let limit = self
            .limit
            .as_deref()
            .map(|raw| parse_number("limit", raw))
            .transpose()?;

        ListQuery::from_parts(start, end, page, limit, now).map_err(|e| e.to_string())
    }
}

fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| format!("invalid {field} param: expected RFC 3339 timestamp"))
}

fn parse_number(field: &str, raw: &str) -> Result<u32, String> {
    raw.parse::<u32>()
        .map_err(|_| format!("invalid {field} param: expected positive integer"))
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupPointResponse {
    pub id: PickupPointId,
    pub registration_date: DateTime<Utc>,
    pub city: String,
}

impl From<PickupPoint> for PickupPointResponse {
    fn from(p: PickupPoint) -> Self {
        Self {
            id: p.id,
            registration_date: p.registered_at,
            city: p.city.name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionResponse {
    pub id: ReceptionId,
    pub date_time: DateTime<Utc>,
    pub pvz_id: PickupPointId,
    pub status: ReceptionStatus,
}

impl From<Reception> for ReceptionResponse {
    fn from(r: Reception) -> Self {
        Self {
            id: r.id,
            date_time: r.started_at,
            pvz_id: r.pickup_point_id,
            status: r.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub date_time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub product_type: String,
    pub reception_id: ReceptionId,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            date_time: p.created_at,
            product_type: p.product_type.name,
            reception_id: p.reception_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReceptionViewResponse {
    pub reception: ReceptionResponse,
    pub products: Vec<ProductResponse>,
}

impl From<ReceptionView> for ReceptionViewResponse {
    fn from(v: ReceptionView) -> Self {
        Self {
            reception: v.reception.into(),
            products: v.products.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PickupPointViewResponse {
    pub pvz: PickupPointResponse,
    pub receptions: Vec<ReceptionViewResponse>,
}

impl From<PickupPointView> for PickupPointViewResponse {
    fn from(v: PickupPointView) -> Self {
        Self {
            pvz: v.pickup_point.into(),
            receptions: v.receptions.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pvz_core::CityId;
    use pvz_pickup::City;

    #[test]
    fn listing_params_default_and_validate() {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();

        let query = ListPickupPointsParams::default().into_query(now).unwrap();
        assert_eq!(query.window.to, now);
        assert_eq!(query.page.limit(), 10);

        let params = ListPickupPointsParams {
            start_date: Some("2025-04-01T00:00:00+03:00".to_string()),
            limit: Some("30".to_string()),
            ..Default::default()
        };
        let query = params.into_query(now).unwrap();
        assert_eq!(
            query.window.from,
            Utc.with_ymd_and_hms(2025, 3, 31, 21, 0, 0).unwrap()
        );
        assert_eq!(query.page.limit(), 30);

        for (page, limit) in [("0", "10"), ("1", "31"), ("x", "10"), ("1", "-5")] {
            let params = ListPickupPointsParams {
                page: Some(page.to_string()),
                limit: Some(limit.to_string()),
                ..Default::default()
            };
            assert!(params.into_query(now).is_err(), "page={page} limit={limit}");
        }
    }

    #[test]
    fn responses_use_camel_case_wire_names() {
        let point = PickupPoint {
            id: PickupPointId::new(),
            registered_at: Utc::now(),
            city: City::new(CityId(1), "Москва"),
        };
        let reception = Reception::start(point.id, Utc::now());

        let json = serde_json::to_value(PickupPointResponse::from(point)).unwrap();
        assert_eq!(json["city"], "Москва");
        assert!(json.get("registrationDate").is_some());

        let json = serde_json::to_value(ReceptionResponse::from(reception)).unwrap();
        assert_eq!(json["status"], "in_progress");
        assert!(json.get("pvzId").is_some());
        assert!(json.get("dateTime").is_some());
    }

    #[test]
    fn product_request_reads_type_field() {
        let body: AddProductRequest = serde_json::from_value(serde_json::json!({
            "type": "обувь",
            "pvzId": "0190b1f4-7c2a-7d3e-9a65-1f2e3d4c5b6a",
        }))
        .unwrap();
        assert_eq!(body.product_type, "обувь");
    }
}
