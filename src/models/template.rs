use serde::{Deserialize, Serialize};

/// Saved naming template from the template library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub components: Vec<TemplateComponent>,
    pub preview: String,
    pub created_at: String,
}

/// Building block of a library template, e.g. `{"label": "-", "type": "separator"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateComponent {
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}
