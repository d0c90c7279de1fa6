use mongodb::bson::{oid::ObjectId, to_document, Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{AppError, AppResult};

/// Parses a path id into the store's identifier format.
pub fn parse_id(raw: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(raw)
        .map_err(|_| AppError::BadRequest(format!("{raw} is not a valid item id")))
}

/// Request body for create and replace. `product` must be a string and
/// `price` a number; every field, checked or not, is kept in submitted order.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ItemBody(Map<String, Value>);

/// Type check for the two fields the list filters rely on.
#[allow(dead_code)]
#[derive(Deserialize)]
struct ItemShape {
    product: String,
    price: Number,
}

impl TryFrom<Value> for ItemBody {
    type Error = AppError;

    fn try_from(value: Value) -> AppResult<Self> {
        let Value::Object(fields) = value else {
            return Err(AppError::BadRequest(
                "item body must be a JSON object".to_string(),
            ));
        };

        if fields.contains_key("_id") {
            return Err(AppError::BadRequest(
                "_id is assigned by the store and cannot be set".to_string(),
            ));
        }
        if let Some(key) = fields.keys().find(|key| key.starts_with('$')) {
            return Err(AppError::BadRequest(format!(
                "field name {key} must not start with $"
            )));
        }

        ItemShape::deserialize(&Value::Object(fields.clone()))
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        Ok(Self(fields))
    }
}

impl ItemBody {
    pub fn product(&self) -> &str {
        self.0
            .get("product")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn to_document(&self) -> AppResult<Document> {
        to_document(&self.0).map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

/// Renders a stored document as JSON with `_id` as a hex string.
pub fn document_to_json(mut doc: Document) -> Value {
    if let Ok(id) = doc.get_object_id("_id") {
        doc.insert("_id", id.to_hex());
    }
    Bson::Document(doc).into_relaxed_extjson()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use serde_json::json;

    fn bad_request_message(result: AppResult<ItemBody>) -> String {
        match result {
            Err(AppError::BadRequest(message)) => message,
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn parse_id_accepts_object_id_hex() {
        let id = ObjectId::new();
        assert_eq!(parse_id(&id.to_hex()).unwrap(), id);
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(matches!(parse_id("not-an-id"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_id(""), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn body_keeps_extra_fields() {
        let item = ItemBody::try_from(json!({
            "product": "Widget",
            "price": 10,
            "quantity": 3,
            "tags": ["metal"],
        }))
        .unwrap();

        assert_eq!(item.product(), "Widget");

        let doc = item.to_document().unwrap();
        assert_eq!(doc.get_str("product").unwrap(), "Widget");
        assert!(doc.contains_key("tags"));
        assert!(!doc.contains_key("_id"));
    }

    #[test]
    fn body_keeps_submitted_key_order() {
        let raw = r#"{"zeta":1,"product":"Widget","alpha":true,"price":10}"#;
        let item = ItemBody::try_from(serde_json::from_str::<Value>(raw).unwrap()).unwrap();
        assert_eq!(serde_json::to_string(&item).unwrap(), raw);

        let doc = item.to_document().unwrap();
        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "product", "alpha", "price"]);
    }

    #[test]
    fn body_must_be_object() {
        let message = bad_request_message(ItemBody::try_from(json!(["Widget", 10])));
        assert!(message.contains("JSON object"));
    }

    #[test]
    fn body_requires_product() {
        let message = bad_request_message(ItemBody::try_from(json!({ "price": 10 })));
        assert!(message.contains("product"));
    }

    #[test]
    fn body_rejects_string_price() {
        let result = ItemBody::try_from(json!({ "product": "Widget", "price": "10" }));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn body_accepts_negative_price() {
        let item = ItemBody::try_from(json!({ "product": "Refund", "price": -5 })).unwrap();
        assert_eq!(item.to_document().unwrap().get_i64("price").unwrap(), -5);
    }

    #[test]
    fn body_accepts_blank_product() {
        let item = ItemBody::try_from(json!({ "product": "  ", "price": 1 })).unwrap();
        assert_eq!(item.product(), "  ");
    }

    #[test]
    fn body_rejects_numeric_product() {
        let result = ItemBody::try_from(json!({ "product": 7, "price": 1 }));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn body_rejects_client_identity() {
        let message = bad_request_message(ItemBody::try_from(json!({
            "_id": "65f000000000000000000000",
            "product": "Widget",
            "price": 10,
        })));
        assert!(message.contains("_id"));
    }

    #[test]
    fn body_rejects_operator_keys() {
        let result = ItemBody::try_from(json!({
            "product": "Widget",
            "price": 10,
            "$set": { "price": 0 },
        }));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn document_id_rendered_as_hex() {
        let id = ObjectId::new();
        let rendered = document_to_json(doc! { "_id": id, "product": "Widget", "price": 10_i64 });
        assert_eq!(
            rendered,
            json!({ "_id": id.to_hex(), "product": "Widget", "price": 10 })
        );
    }
}
