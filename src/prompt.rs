use serde::Deserialize;
use serde_json::Value;

// Output formats offered by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Email,
    Social,
    Report,
    Summary,
}

impl Format {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "email" => Some(Format::Email),
            "social" => Some(Format::Social),
            "report" => Some(Format::Report),
            "summary" => Some(Format::Summary),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Email => "email",
            Format::Social => "social",
            Format::Report => "report",
            Format::Summary => "summary",
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            Format::Email => "Format them as professional emails.",
            Format::Social => {
                "Format them as engaging social media posts with appropriate hashtags."
            }
            Format::Report => "Format them as structured report sections.",
            Format::Summary => "Create concise summaries.",
        }
    }
}

// Provider neutral message pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Build the instruction for `text`. `None` means the caller asked for a
    /// format we don't know, which gets the plain polishing instruction.
    pub fn build(text: &str, format: Option<Format>, variations: u32) -> Self {
        let mut system = format!(
            "You are a professional writing assistant. Polish and improve the user's text. \
             Provide {variations} distinct and improved variations of the text. \
             Return strictly a JSON object with the format {{ \"suggestions\": [\"variation 1\", \"variation 2\", ...] }}."
        );
        if let Some(format) = format {
            system.push(' ');
            system.push_str(format.instruction());
        }

        Self {
            system,
            user: text.to_string(),
        }
    }
}

// What a model is asked to return; the single string form shows up in practice
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<String>),
    One(String),
}

impl From<OneOrMany> for Vec<String> {
    fn from(v: OneOrMany) -> Self {
        match v {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

// Result of normalizing model output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variations {
    pub items: Vec<String>,
    pub degraded: bool, // raw text returned because JSON parsing failed
}

// Items from the requested JSON shapes, None for anything else
fn decode_items(value: Value) -> Option<Vec<String>> {
    match value {
        Value::Object(mut map) => match map.remove("suggestions") {
            None | Some(Value::Null) => Some(Vec::new()),
            Some(suggestions) => serde_json::from_value::<OneOrMany>(suggestions)
                .ok()
                .map(Vec::from),
        },
        list @ Value::Array(_) => serde_json::from_value(list).ok(),
        _ => None,
    }
}

/// Turn raw model output into an ordered list of variations.
///
/// Output that isn't the requested JSON shape is returned whole as a single
/// variation instead of failing the request.
pub fn parse_variations(content: &str) -> Variations {
    match serde_json::from_str::<Value>(content).ok().and_then(decode_items) {
        Some(items) => Variations {
            items,
            degraded: false,
        },
        None => Variations {
            items: vec![content.to_string()],
            degraded: true,
        },
    }
}
