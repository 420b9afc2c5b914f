//! Tool bridge between the agent runtime and the booking backend.
//!
//! Two operations are declared, statically, for the lifetime of the process:
//! `get_available_slots` and `book_car_service`. Dispatch translates a tool
//! invocation into a backend REST call and the backend's answer into a
//! structured result the model can read. The invariant the whole bridge
//! hangs on: an invocation the agent got *wrong* (unknown name, missing
//! required argument) is a protocol error; an invocation the agent got
//! *right* that fails for a domain or transport reason comes back as a
//! `success: false` payload, never as a raised error.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, warn};

use carbot_core::config::BackendConfig;

pub const GET_AVAILABLE_SLOTS: &str = "get_available_slots";
pub const BOOK_CAR_SERVICE: &str = "book_car_service";

const BOOKING_REQUIRED_FIELDS: [&str; 6] =
    ["customer_name", "phone", "car_model", "service_type", "date", "time"];

#[derive(Clone, Debug, PartialEq)]
pub struct ToolDeclaration {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// The agent asked for an operation that was never declared. This is a
    /// declaration mismatch, not a domain failure, and must stay loud.
    #[error("unknown tool `{name}` requested by the agent")]
    UnknownTool { name: String },
    #[error("tool `{tool}` invocation is missing required argument `{field}`")]
    MissingArgument { tool: &'static str, field: &'static str },
}

#[async_trait]
pub trait ToolDispatcher: Send + Sync {
    fn declarations(&self) -> &[ToolDeclaration];

    /// Dispatches one tool invocation. `Err` is reserved for protocol-level
    /// failures; every expected business or transport outcome is `Ok` data.
    async fn dispatch(&self, name: &str, arguments: &Value) -> Result<Value, BridgeError>;
}

/// The static tool set consumed by the completion capability.
pub fn declarations() -> Vec<ToolDeclaration> {
    vec![
        ToolDeclaration {
            name: GET_AVAILABLE_SLOTS,
            description: "Retrieves all available car service time slots. Automatically \
                          filters out past time slots for today and only shows future \
                          available slots. Returns a JSON object with success status, total \
                          count, and array of slot objects. Each slot contains date \
                          (YYYY-MM-DD format) and time (HH:MM AM/PM format). Never guess or \
                          assume slot availability.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "date": {
                        "type": "string",
                        "description": "Optional date filter in YYYY-MM-DD format (e.g., '2025-12-31'). If provided, only slots for that specific date will be returned. If omitted, returns all available slots for all dates."
                    }
                }
            }),
        },
        ToolDeclaration {
            name: BOOK_CAR_SERVICE,
            description: "Creates a new car service booking appointment with customer \
                          details and generates a unique ticket ID. Validates that the \
                          requested slot is available before booking. Returns booking \
                          confirmation with ticket ID, customer info, and appointment \
                          details. Use this tool ONLY after collecting all required \
                          customer information and confirming their preferred slot.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "customer_name": {
                        "type": "string",
                        "description": "Full name of the customer (e.g., 'John Doe')"
                    },
                    "phone": {
                        "type": "string",
                        "description": "Customer's phone number with country code (e.g., '+1 123-456-7890')"
                    },
                    "car_model": {
                        "type": "string",
                        "description": "Make and model of the car with year (e.g., 'Honda Civic 2024')"
                    },
                    "service_type": {
                        "type": "string",
                        "description": "Type of service needed (e.g., 'Oil Change', 'Full Service', 'Brake Check', 'Tire Rotation')"
                    },
                    "date": {
                        "type": "string",
                        "description": "Appointment date in YYYY-MM-DD format (e.g., '2025-12-31')"
                    },
                    "time": {
                        "type": "string",
                        "description": "Appointment time in HH:MM AM/PM format (e.g., '03:00 PM'). Must match an available slot."
                    }
                },
                "required": ["customer_name", "phone", "car_model", "service_type", "date", "time"]
            }),
        },
    ]
}

/// Bridge implementation backed by the booking backend's REST API.
pub struct HttpToolBridge {
    client: reqwest::Client,
    base_url: String,
    declarations: Vec<ToolDeclaration>,
}

impl HttpToolBridge {
    pub fn new(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            declarations: declarations(),
        })
    }

    async fn get_available_slots(&self, arguments: &Value) -> Value {
        let date_filter = arguments
            .get("date")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty());

        let mut request = self.client.get(format!("{}/api/slots", self.base_url));
        if let Some(date) = date_filter {
            request = request.query(&[("date", date)]);
        }

        debug!(event_name = "bridge.slots.request", date = ?date_filter, "querying backend slots");
        self.send(request).await
    }

    async fn book_car_service(&self, arguments: &Value) -> Result<Value, BridgeError> {
        // Reject incomplete invocations before any backend traffic. Nothing
        // here is ever silently defaulted.
        for field in BOOKING_REQUIRED_FIELDS {
            let present = arguments
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|value| !value.trim().is_empty());
            if !present {
                return Err(BridgeError::MissingArgument { tool: BOOK_CAR_SERVICE, field });
            }
        }

        let body: Value = BOOKING_REQUIRED_FIELDS
            .iter()
            .map(|field| (field.to_string(), arguments[*field].clone()))
            .collect::<serde_json::Map<_, _>>()
            .into();

        debug!(
            event_name = "bridge.book.request",
            date = %arguments["date"],
            time = %arguments["time"],
            "submitting booking to backend"
        );
        let request = self.client.post(format!("{}/api/book", self.base_url)).json(&body);
        Ok(self.send(request).await)
    }

    /// Sends the request and folds every transport or non-2xx outcome into
    /// the `success: false` envelope. The completion capability never sees a
    /// raised error for backend unavailability, only a readable failure it
    /// can relay.
    async fn send(&self, request: reqwest::RequestBuilder) -> Value {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(event_name = "bridge.transport_failure", error = %err, "backend unreachable");
                return failure(format!("failed to reach booking backend: {err}"));
            }
        };

        let status = response.status();
        let body = match response.json::<Value>().await {
            Ok(body) => body,
            Err(err) => {
                warn!(event_name = "bridge.malformed_body", error = %err, "backend body unreadable");
                return failure(format!("backend returned an unreadable response: {err}"));
            }
        };

        if status.is_success() {
            body
        } else {
            let detail = body
                .get("detail")
                .or_else(|| body.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("backend rejected the request with status {status}"));
            warn!(event_name = "bridge.backend_rejection", status = %status, detail = %detail, "backend rejected call");
            failure(detail)
        }
    }
}

fn failure(message: String) -> Value {
    json!({ "success": false, "error": message })
}

#[async_trait]
impl ToolDispatcher for HttpToolBridge {
    fn declarations(&self) -> &[ToolDeclaration] {
        &self.declarations
    }

    async fn dispatch(&self, name: &str, arguments: &Value) -> Result<Value, BridgeError> {
        match name {
            GET_AVAILABLE_SLOTS => Ok(self.get_available_slots(arguments).await),
            BOOK_CAR_SERVICE => self.book_car_service(arguments).await,
            other => {
                error!(event_name = "bridge.unknown_tool", tool = other, "declaration mismatch");
                Err(BridgeError::UnknownTool { name: other.to_string() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use carbot_core::config::BackendConfig;

    use super::{
        declarations, BridgeError, HttpToolBridge, ToolDispatcher, BOOK_CAR_SERVICE,
        GET_AVAILABLE_SLOTS,
    };

    fn bridge(base_url: &str) -> HttpToolBridge {
        HttpToolBridge::new(&BackendConfig { base_url: base_url.to_string(), timeout_secs: 2 })
            .expect("client builds")
    }

    #[test]
    fn exactly_two_tools_are_declared() {
        let declared = declarations();
        assert_eq!(declared.len(), 2);
        assert_eq!(declared[0].name, GET_AVAILABLE_SLOTS);
        assert_eq!(declared[1].name, BOOK_CAR_SERVICE);

        let required = declared[1].input_schema["required"]
            .as_array()
            .expect("booking schema lists required fields");
        assert_eq!(required.len(), 6);
    }

    #[tokio::test]
    async fn unknown_tool_is_a_protocol_error() {
        let result = bridge("http://127.0.0.1:1").dispatch("cancel_booking", &json!({})).await;
        assert_eq!(
            result,
            Err(BridgeError::UnknownTool { name: "cancel_booking".to_string() })
        );
    }

    #[tokio::test]
    async fn missing_required_field_is_rejected_before_any_http() {
        // Port 1 is unreachable; reaching it would surface as a success:false
        // transport payload, so a protocol error proves nothing was sent.
        let arguments = json!({
            "customer_name": "John Doe",
            "phone": "+1 123-456-7890",
            "car_model": "Honda Civic 2024",
            "service_type": "Oil Change",
            "date": "2025-12-31"
        });
        let result = bridge("http://127.0.0.1:1").dispatch(BOOK_CAR_SERVICE, &arguments).await;
        assert_eq!(
            result,
            Err(BridgeError::MissingArgument { tool: BOOK_CAR_SERVICE, field: "time" })
        );
    }

    #[tokio::test]
    async fn blank_required_field_counts_as_missing() {
        let arguments = json!({
            "customer_name": "  ",
            "phone": "+1 123-456-7890",
            "car_model": "Honda Civic 2024",
            "service_type": "Oil Change",
            "date": "2025-12-31",
            "time": "03:00 PM"
        });
        let result = bridge("http://127.0.0.1:1").dispatch(BOOK_CAR_SERVICE, &arguments).await;
        assert_eq!(
            result,
            Err(BridgeError::MissingArgument { tool: BOOK_CAR_SERVICE, field: "customer_name" })
        );
    }

    #[tokio::test]
    async fn unreachable_backend_maps_to_structured_failure() {
        let result = bridge("http://127.0.0.1:1")
            .dispatch(GET_AVAILABLE_SLOTS, &json!({}))
            .await
            .expect("transport failure is data, not an error");

        assert_eq!(result["success"], json!(false));
        let message = result["error"].as_str().expect("failure carries a message");
        assert!(message.contains("failed to reach booking backend"));
    }
}
