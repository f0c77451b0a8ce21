//! Weather tool - canned report, no network access

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;
use crate::Result;
use super::{required_str, Tool};

const CANNED_CELSIUS: i32 = 30;

/// Get the weather in a given location
pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str { "get_weather" }
    fn description(&self) -> &str { "Get the weather in a given location" }
    fn step_label(&self) -> &str { "weather tool" }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City or place name"
                },
                "unit": {
                    "type": "string",
                    "enum": ["C", "F"],
                    "description": "Temperature unit (default C)"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, params: Value) -> Result<String> {
        let location = required_str(&params, "location")?;
        let unit = params.get("unit").and_then(|v| v.as_str()).unwrap_or("C");
        info!("Getting weather for {}", location);

        // "F", "fahrenheit" and friends; anything else reads as Celsius
        let (degrees, unit) = if unit.trim_start().starts_with(&['F', 'f'][..]) {
            (CANNED_CELSIUS * 9 / 5 + 32, "F")
        } else {
            (CANNED_CELSIUS, "C")
        };

        Ok(format!("It's {} degrees {} in {}", degrees, unit, location))
    }
}
