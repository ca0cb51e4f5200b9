//! Supabase Realtime (Phoenix channel) message types.
//!
//! Every frame is a JSON object with `topic`, `event`, `payload` and `ref`.
//! Row changes arrive as `postgres_changes` events:
//!
//! ```json
//! {"topic":"realtime:stock-p1","event":"postgres_changes","ref":null,
//!  "payload":{"ids":[1],"data":{"type":"UPDATE","schema":"public","table":"products",
//!   "commit_timestamp":"2024-05-01T10:00:00Z","record":{"id":"p1","stock":3}}}}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::{ProductId, StockChange};

pub const EVENT_JOIN: &str = "phx_join";
pub const EVENT_LEAVE: &str = "phx_leave";
pub const EVENT_REPLY: &str = "phx_reply";
pub const EVENT_ERROR: &str = "phx_error";
pub const EVENT_CLOSE: &str = "phx_close";
pub const EVENT_HEARTBEAT: &str = "heartbeat";
pub const EVENT_POSTGRES_CHANGES: &str = "postgres_changes";
pub const HEARTBEAT_TOPIC: &str = "phoenix";

/// Outbound Phoenix frame.
#[derive(Debug, Serialize)]
pub struct OutboundMessage {
    pub topic: String,
    pub event: &'static str,
    pub payload: Value,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_ref: Option<String>,
}

impl OutboundMessage {
    /// Join request for `UPDATE` events on one product row.
    pub fn join(
        topic: &str,
        schema: &str,
        table: &str,
        product_id: &ProductId,
        access_token: &str,
        reference: String,
    ) -> Self {
        Self {
            topic: topic.to_string(),
            event: EVENT_JOIN,
            payload: json!({
                "config": {
                    "broadcast": { "ack": false, "self": false },
                    "presence": { "key": "" },
                    "postgres_changes": [{
                        "event": "UPDATE",
                        "schema": schema,
                        "table": table,
                        "filter": format!("id=eq.{product_id}"),
                    }],
                },
                "access_token": access_token,
            }),
            join_ref: Some(reference.clone()),
            reference,
        }
    }

    pub fn leave(topic: &str, reference: String) -> Self {
        Self {
            topic: topic.to_string(),
            event: EVENT_LEAVE,
            payload: json!({}),
            reference,
            join_ref: None,
        }
    }

    pub fn heartbeat(reference: String) -> Self {
        Self {
            topic: HEARTBEAT_TOPIC.to_string(),
            event: EVENT_HEARTBEAT,
            payload: json!({}),
            reference,
            join_ref: None,
        }
    }
}

/// Inbound Phoenix frame.
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

impl InboundMessage {
    /// Status of a `phx_reply` (`"ok"` or `"error"`).
    pub fn reply_status(&self) -> Option<&str> {
        self.payload.get("status").and_then(Value::as_str)
    }
}

/// `payload` of a `postgres_changes` event.
#[derive(Debug, Deserialize)]
pub struct ChangesPayload {
    pub data: ChangeData,
}

#[derive(Debug, Deserialize)]
pub struct ChangeData {
    #[serde(rename = "type", alias = "eventType")]
    pub kind: String,
    #[serde(default)]
    pub commit_timestamp: Option<DateTime<Utc>>,
    #[serde(default, alias = "new")]
    pub record: Map<String, Value>,
}

impl ChangeData {
    /// Convert an `UPDATE` into a stock change for `product_id`.
    ///
    /// A record without a usable `stock` column still yields a change, with
    /// `stock` left empty. The row's own `updated_at` is preferred over the
    /// commit timestamp.
    pub fn into_stock_change(self, product_id: &ProductId) -> Option<StockChange> {
        if !self.kind.eq_ignore_ascii_case("UPDATE") {
            return None;
        }
        let stock = self
            .record
            .get("stock")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok());
        let updated_at = self
            .record
            .get("updated_at")
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|ts| ts.with_timezone(&Utc))
            .or(self.commit_timestamp);
        Some(StockChange {
            product_id: product_id.clone(),
            stock,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_message_filters_on_product_row() {
        let msg = OutboundMessage::join(
            "realtime:stock-p1",
            "public",
            "products",
            &ProductId::new("p1"),
            "anon",
            "1".into(),
        );
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["event"], "phx_join");
        assert_eq!(value["ref"], "1");
        assert_eq!(value["join_ref"], "1");
        let change = &value["payload"]["config"]["postgres_changes"][0];
        assert_eq!(change["event"], "UPDATE");
        assert_eq!(change["table"], "products");
        assert_eq!(change["filter"], "id=eq.p1");
    }

    #[test]
    fn heartbeat_uses_phoenix_topic() {
        let value = serde_json::to_value(OutboundMessage::heartbeat("7".into())).unwrap();
        assert_eq!(value["topic"], "phoenix");
        assert_eq!(value["event"], "heartbeat");
        assert!(value.get("join_ref").is_none());
    }

    #[test]
    fn decodes_update_with_stock() {
        let raw = r#"{"topic":"realtime:stock-p1","event":"postgres_changes","ref":null,
            "payload":{"ids":[1],"data":{"type":"UPDATE","schema":"public","table":"products",
            "commit_timestamp":"2024-05-01T10:00:00Z",
            "record":{"id":"p1","stock":3,"updated_at":"2024-05-01T09:59:59.5+00:00"}}}}"#;
        let msg: InboundMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.event, EVENT_POSTGRES_CHANGES);
        let payload: ChangesPayload = serde_json::from_value(msg.payload).unwrap();
        let change = payload
            .data
            .into_stock_change(&ProductId::new("p1"))
            .unwrap();
        assert_eq!(change.stock, Some(3));
        assert_eq!(
            change.updated_at.unwrap().to_rfc3339(),
            "2024-05-01T09:59:59.500+00:00"
        );
    }

    #[test]
    fn update_without_stock_column_has_no_stock() {
        let data: ChangeData = serde_json::from_str(
            r#"{"type":"UPDATE","commit_timestamp":"2024-05-01T10:00:00Z","record":{"id":"p1","name":"bag"}}"#,
        )
        .unwrap();
        let change = data.into_stock_change(&ProductId::new("p1")).unwrap();
        assert_eq!(change.stock, None);
        assert!(change.updated_at.is_some());
    }

    #[test]
    fn client_style_payload_is_accepted() {
        let data: ChangeData =
            serde_json::from_str(r#"{"eventType":"UPDATE","new":{"stock":12}}"#).unwrap();
        let change = data.into_stock_change(&ProductId::new("p1")).unwrap();
        assert_eq!(change.stock, Some(12));
    }

    #[test]
    fn non_update_events_are_ignored() {
        let data: ChangeData =
            serde_json::from_str(r#"{"type":"DELETE","record":{}}"#).unwrap();
        assert!(data.into_stock_change(&ProductId::new("p1")).is_none());
    }

    #[test]
    fn reply_status_is_read_from_payload() {
        let msg: InboundMessage = serde_json::from_str(
            r#"{"topic":"realtime:stock-p1","event":"phx_reply","ref":"1","payload":{"status":"ok","response":{}}}"#,
        )
        .unwrap();
        assert_eq!(msg.reply_status(), Some("ok"));
    }
}
